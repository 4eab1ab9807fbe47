use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::{DeliveryLog, DeliveryLogRepository};
use crate::error::AppResult;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_deliveries))
}

#[derive(Debug, Deserialize)]
pub struct ListDeliveriesQuery {
    pub limit: Option<i64>,
}

/// Most recent delivery attempts across all subscriptions.
async fn list_deliveries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListDeliveriesQuery>,
) -> AppResult<Json<Vec<DeliveryLog>>> {
    let limit = query
        .limit
        .unwrap_or(state.config.dispatcher.log_default_limit)
        .clamp(1, 1000);

    let logs = DeliveryLogRepository::list_all(&state.db, limit).await?;
    Ok(Json(logs))
}
