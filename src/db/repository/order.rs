use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{CreateOrder, Order, ORDER_STATUS_COMPLETED, ORDER_STATUS_PENDING};
use crate::error::{AppError, AppResult};

pub struct OrderRepository;

impl OrderRepository {
    pub async fn create(pool: &SqlitePool, data: CreateOrder) -> AppResult<Order> {
        let item = data.item.trim();
        if item.is_empty() {
            return Err(AppError::Validation("item is required".to_string()));
        }

        if data.amount_cents <= 0 {
            return Err(AppError::Validation(
                "amount_cents must be positive".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, item, amount_cents, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.user_id)
        .bind(item)
        .bind(data.amount_cents)
        .bind(ORDER_STATUS_PENDING)
        .bind(now)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(Order {
            id,
            user_id: data.user_id,
            item: item.to_string(),
            amount_cents: data.amount_cents,
            status: ORDER_STATUS_PENDING.to_string(),
            created_at: now,
        })
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<Order>> {
        sqlx::query_as::<_, Order>(
            "SELECT id, user_id, item, amount_cents, status, created_at FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Mark an order completed, returning the updated row.
    pub async fn complete(pool: &SqlitePool, id: &str) -> AppResult<Order> {
        let mut order = Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

        sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(ORDER_STATUS_COMPLETED)
            .bind(id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        order.status = ORDER_STATUS_COMPLETED.to_string();
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::test_pool;

    #[tokio::test]
    async fn complete_updates_status_and_errors_on_unknown_id() {
        let pool = test_pool().await;

        let order = OrderRepository::create(
            &pool,
            CreateOrder {
                user_id: "user-1".to_string(),
                item: "widget".to_string(),
                amount_cents: 1999,
            },
        )
        .await
        .unwrap();
        assert_eq!(order.status, ORDER_STATUS_PENDING);

        let completed = OrderRepository::complete(&pool, &order.id).await.unwrap();
        assert_eq!(completed.status, ORDER_STATUS_COMPLETED);

        let err = OrderRepository::complete(&pool, "no-such-order")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
