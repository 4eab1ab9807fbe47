use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// Outcome of a single delivery attempt.
///
/// `Success` means the subscriber answered with any HTTP status, 2xx or
/// not; `Failed` means the transport failed (refused connection, DNS
/// failure, timeout). Whether a 4xx/5xx answer should instead count as
/// failed is an open product question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Success,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Success => "success",
            DeliveryStatus::Failed => "failed",
        }
    }
}

/// One row in the append-only delivery audit trail. Immutable once
/// written; survives deletion of the subscription it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryLog {
    pub id: String,
    pub event_type: String,
    pub subscription_id: String,
    /// The subscription's URL at the time of the attempt, captured so
    /// later edits don't rewrite history.
    pub target_url: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub status_code: Option<i64>,
    pub response_body: Option<String>,
    pub error_message: Option<String>,
    pub sent_at: NaiveDateTime,
}

impl FromRow<'_, SqliteRow> for DeliveryLog {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let payload: String = row.try_get("payload")?;
        let payload: serde_json::Value =
            serde_json::from_str(&payload).map_err(|e| sqlx::Error::ColumnDecode {
                index: "payload".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            event_type: row.try_get("event_type")?,
            subscription_id: row.try_get("subscription_id")?,
            target_url: row.try_get("target_url")?,
            payload,
            status: row.try_get("status")?,
            status_code: row.try_get("status_code")?,
            response_body: row.try_get("response_body")?,
            error_message: row.try_get("error_message")?,
            sent_at: row.try_get("sent_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateDeliveryLog {
    pub event_type: String,
    pub subscription_id: String,
    pub target_url: String,
    pub payload: serde_json::Value,
    pub status: DeliveryStatus,
    pub status_code: Option<i64>,
    pub response_body: Option<String>,
    pub error_message: Option<String>,
}
