use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// A registered webhook endpoint and the event types it listens to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub target_url: String,
    pub event_types: Vec<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

// `event_types` is stored as a JSON array in a TEXT column, so the row
// mapping is written out by hand instead of derived.
impl FromRow<'_, SqliteRow> for Subscription {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let event_types: String = row.try_get("event_types")?;
        let event_types: Vec<String> =
            serde_json::from_str(&event_types).map_err(|e| sqlx::Error::ColumnDecode {
                index: "event_types".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            target_url: row.try_get("target_url")?,
            event_types,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscription {
    pub name: String,
    pub target_url: String,
    pub event_types: Vec<String>,
}
