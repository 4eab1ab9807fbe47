use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};

use crate::db::{
    CreateSubscription, DeliveryLog, DeliveryLogRepository, Subscription, SubscriptionRepository,
};
use crate::error::AppResult;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_subscriptions).post(register_subscription))
        .route("/:id", delete(delete_subscription))
        .route("/:id/deliveries", get(list_subscription_deliveries))
}

async fn register_subscription(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSubscription>,
) -> AppResult<(StatusCode, Json<Subscription>)> {
    let subscription = SubscriptionRepository::create(&state.db, body).await?;

    tracing::info!(
        "Registered subscription {} ({}) for {:?}",
        subscription.id,
        subscription.name,
        subscription.event_types
    );

    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<Subscription>>> {
    let subscriptions = SubscriptionRepository::list(&state.db).await?;
    Ok(Json(subscriptions))
}

async fn delete_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Subscription>> {
    let deleted = SubscriptionRepository::delete_by_id(&state.db, &id).await?;
    tracing::info!("Deleted subscription {} ({})", deleted.id, deleted.name);
    Ok(Json(deleted))
}

/// Delivery history for one subscription, newest first. Returns entries
/// even for ids that no longer exist: the log outlives the subscription.
async fn list_subscription_deliveries(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<DeliveryLog>>> {
    let logs = DeliveryLogRepository::list_by_subscription(&state.db, &id).await?;
    Ok(Json(logs))
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

    async fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            db: test_pool().await,
            config: Config::default(),
            http: reqwest::Client::new(),
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn register_then_list_then_delete() {
        let state = test_state().await;
        let app = crate::router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/subscriptions",
                json!({
                    "name": "S1",
                    "target_url": "http://x/webhook",
                    "event_types": ["user.created"]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        assert_eq!(created["active"], true);
        let id = created["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/subscriptions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/subscriptions/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/subscriptions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_registration_is_unprocessable() {
        let state = test_state().await;
        let app = crate::router(state);

        let response = app
            .oneshot(post_json(
                "/api/subscriptions",
                json!({ "name": "", "target_url": "http://x/webhook", "event_types": ["a"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn deleting_unknown_subscription_is_not_found() {
        let state = test_state().await;
        let app = crate::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/subscriptions/no-such-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
