use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{CreateUser, User};
use crate::error::{AppError, AppResult};

pub struct UserRepository;

impl UserRepository {
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> AppResult<User> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }

        let email = data.email.trim();
        if email.is_empty() {
            return Err(AppError::Validation("email is required".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query("INSERT INTO users (id, name, email, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(email)
            .bind(now)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: now,
        })
    }

    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users ORDER BY created_at",
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }
}
