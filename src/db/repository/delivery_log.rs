use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{CreateDeliveryLog, DeliveryLog};
use crate::error::{AppError, AppResult};

pub struct DeliveryLogRepository;

impl DeliveryLogRepository {
    /// Append one delivery attempt to the audit trail. Entries are never
    /// updated or deleted afterwards.
    pub async fn append(pool: &SqlitePool, entry: CreateDeliveryLog) -> AppResult<DeliveryLog> {
        let id = Uuid::new_v4().to_string();
        let sent_at = Utc::now().naive_utc();
        let payload_json =
            serde_json::to_string(&entry.payload).map_err(|e| AppError::Internal(e.into()))?;
        let status = entry.status.as_str();

        sqlx::query(
            r#"
            INSERT INTO delivery_logs (
                id, event_type, subscription_id, target_url, payload,
                status, status_code, response_body, error_message, sent_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&entry.event_type)
        .bind(&entry.subscription_id)
        .bind(&entry.target_url)
        .bind(&payload_json)
        .bind(status)
        .bind(entry.status_code)
        .bind(&entry.response_body)
        .bind(&entry.error_message)
        .bind(sent_at)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(DeliveryLog {
            id,
            event_type: entry.event_type,
            subscription_id: entry.subscription_id,
            target_url: entry.target_url,
            payload: entry.payload,
            status: status.to_string(),
            status_code: entry.status_code,
            response_body: entry.response_body,
            error_message: entry.error_message,
            sent_at,
        })
    }

    /// Delivery history for one subscription, newest first.
    pub async fn list_by_subscription(
        pool: &SqlitePool,
        subscription_id: &str,
    ) -> AppResult<Vec<DeliveryLog>> {
        sqlx::query_as::<_, DeliveryLog>(
            r#"
            SELECT id, event_type, subscription_id, target_url, payload,
                   status, status_code, response_body, error_message, sent_at
            FROM delivery_logs
            WHERE subscription_id = ?
            ORDER BY sent_at DESC
            "#,
        )
        .bind(subscription_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Most recent delivery attempts across all subscriptions.
    pub async fn list_all(pool: &SqlitePool, limit: i64) -> AppResult<Vec<DeliveryLog>> {
        sqlx::query_as::<_, DeliveryLog>(
            r#"
            SELECT id, event_type, subscription_id, target_url, payload,
                   status, status_code, response_body, error_message, sent_at
            FROM delivery_logs
            ORDER BY sent_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }
}
