use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{CreateSubscription, Subscription};
use crate::error::{AppError, AppResult};

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    /// Register a new webhook subscription. Rejects empty name, empty
    /// target URL and an empty event-type set without persisting anything.
    pub async fn create(pool: &SqlitePool, data: CreateSubscription) -> AppResult<Subscription> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }

        let target_url = data.target_url.trim();
        if target_url.is_empty() {
            return Err(AppError::Validation("target_url is required".to_string()));
        }

        if data.event_types.is_empty() {
            return Err(AppError::Validation(
                "event_types must contain at least one event type".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();
        let event_types_json = serde_json::to_string(&data.event_types)
            .map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, name, target_url, event_types, active, created_at)
            VALUES (?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(target_url)
        .bind(&event_types_json)
        .bind(now)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(Subscription {
            id,
            name: name.to_string(),
            target_url: target_url.to_string(),
            event_types: data.event_types,
            active: true,
            created_at: now,
        })
    }

    /// List all subscriptions, active and inactive.
    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, name, target_url, event_types, active, created_at
            FROM subscriptions
            ORDER BY created_at
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, name, target_url, event_types, active, created_at
            FROM subscriptions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Active subscriptions listening for the given event type, in
    /// creation order. The event-type match happens in Rust because the
    /// column holds a JSON array.
    pub async fn find_active_by_event_type(
        pool: &SqlitePool,
        event_type: &str,
    ) -> AppResult<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, name, target_url, event_types, active, created_at
            FROM subscriptions
            WHERE active = 1
            ORDER BY created_at
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(subscriptions
            .into_iter()
            .filter(|s| s.event_types.iter().any(|t| t == event_type))
            .collect())
    }

    /// Hard-delete a subscription. Its delivery log entries are kept.
    pub async fn delete_by_id(pool: &SqlitePool, id: &str) -> AppResult<Subscription> {
        let subscription = Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subscription {} not found", id)))?;

        sqlx::query("DELETE FROM subscriptions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::test_pool;

    fn sub(name: &str, url: &str, event_types: &[&str]) -> CreateSubscription {
        CreateSubscription {
            name: name.to_string(),
            target_url: url.to_string(),
            event_types: event_types.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_without_persisting() {
        let pool = test_pool().await;

        for invalid in [
            sub("", "http://example.com/hook", &["user.created"]),
            sub("S1", "", &["user.created"]),
            sub("S1", "http://example.com/hook", &[]),
        ] {
            let err = SubscriptionRepository::create(&pool, invalid)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }

        assert!(SubscriptionRepository::list(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_persists_with_active_flag_and_fresh_id() {
        let pool = test_pool().await;

        let created = SubscriptionRepository::create(
            &pool,
            sub("S1", "http://example.com/hook", &["user.created"]),
        )
        .await
        .unwrap();

        assert!(created.active);
        assert!(!created.id.is_empty());

        let found = SubscriptionRepository::find_by_id(&pool, &created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "S1");
        assert_eq!(found.event_types, vec!["user.created".to_string()]);
        assert!(found.active);
    }

    #[tokio::test]
    async fn find_active_by_event_type_filters_on_type() {
        let pool = test_pool().await;

        SubscriptionRepository::create(&pool, sub("A", "http://a/hook", &["user.created"]))
            .await
            .unwrap();
        SubscriptionRepository::create(
            &pool,
            sub("B", "http://b/hook", &["order.created", "user.created"]),
        )
        .await
        .unwrap();
        SubscriptionRepository::create(&pool, sub("C", "http://c/hook", &["order.completed"]))
            .await
            .unwrap();

        let matches = SubscriptionRepository::find_active_by_event_type(&pool, "user.created")
            .await
            .unwrap();
        let names: Vec<&str> = matches.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        let none = SubscriptionRepository::find_active_by_event_type(&pool, "order.paid")
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_from_matching_and_errors_on_unknown_id() {
        let pool = test_pool().await;

        let created =
            SubscriptionRepository::create(&pool, sub("A", "http://a/hook", &["user.created"]))
                .await
                .unwrap();

        let deleted = SubscriptionRepository::delete_by_id(&pool, &created.id)
            .await
            .unwrap();
        assert_eq!(deleted.id, created.id);

        let matches = SubscriptionRepository::find_active_by_event_type(&pool, "user.created")
            .await
            .unwrap();
        assert!(matches.is_empty());

        let err = SubscriptionRepository::delete_by_id(&pool, "no-such-id")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
