use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::dispatcher::{DispatchResult, DispatcherService};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/trigger", post(trigger_event))
}

#[derive(Debug, Deserialize)]
pub struct TriggerEventRequest {
    pub event_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct TriggerEventResponse {
    pub message: String,
    #[serde(flatten)]
    pub result: DispatchResult,
}

/// Manually announce an event. The response reports how many webhooks
/// were attempted; per-target outcomes live in the delivery log.
async fn trigger_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TriggerEventRequest>,
) -> AppResult<Json<TriggerEventResponse>> {
    if body.event_type.trim().is_empty() {
        return Err(AppError::BadRequest("event_type is required".to_string()));
    }

    let result = DispatcherService::new(&state)
        .trigger(&body.event_type, body.payload)
        .await?;

    Ok(Json(TriggerEventResponse {
        message: format!("Event triggered to {} webhook(s)", result.targets_attempted),
        result,
    }))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::db::test_util::test_pool;
    use crate::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn triggering_an_unheard_event_reports_zero_attempts() {
        let state = Arc::new(AppState {
            db: test_pool().await,
            config: Config::default(),
            http: reqwest::Client::new(),
        });
        let app = crate::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/events/trigger")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "event_type": "order.paid", "payload": { "orderId": 1 } })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["targets_attempted"], 0);
        assert_eq!(body["event_type"], "order.paid");
    }
}
