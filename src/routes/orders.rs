use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use crate::db::{CreateOrder, Order, OrderRepository};
use crate::error::AppResult;
use crate::services::dispatcher::{
    DispatcherService, EVENT_ORDER_COMPLETED, EVENT_ORDER_CREATED,
};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_order))
        .route("/:id/complete", post(complete_order))
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
    pub webhooks_triggered: usize,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateOrder>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    let order = OrderRepository::create(&state.db, body).await?;

    let dispatch = DispatcherService::new(&state)
        .trigger(EVENT_ORDER_CREATED, order_payload(&order))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            order,
            webhooks_triggered: dispatch.targets_attempted,
        }),
    ))
}

async fn complete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderResponse>> {
    let order = OrderRepository::complete(&state.db, &id).await?;

    let dispatch = DispatcherService::new(&state)
        .trigger(EVENT_ORDER_COMPLETED, order_payload(&order))
        .await?;

    Ok(Json(OrderResponse {
        order,
        webhooks_triggered: dispatch.targets_attempted,
    }))
}

fn order_payload(order: &Order) -> serde_json::Value {
    json!({
        "orderId": order.id,
        "userId": order.user_id,
        "item": order.item,
        "amountCents": order.amount_cents,
        "status": order.status,
    })
}
