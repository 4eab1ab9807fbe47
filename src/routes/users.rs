use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::db::{CreateUser, User, UserRepository};
use crate::error::AppResult;
use crate::services::dispatcher::{DispatcherService, EVENT_USER_CREATED};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_users).post(create_user))
}

#[derive(Debug, Serialize)]
pub struct UserCreatedResponse {
    pub user: User,
    pub webhooks_triggered: usize,
}

/// Create a user, then announce `user.created`. The fan-out runs to
/// completion before the response is sent, so its latency is included.
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserCreatedResponse>)> {
    let user = UserRepository::create(&state.db, body).await?;

    let dispatch = DispatcherService::new(&state)
        .trigger(
            EVENT_USER_CREATED,
            json!({
                "userId": user.id,
                "name": user.name,
                "email": user.email,
            }),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            user,
            webhooks_triggered: dispatch.targets_attempted,
        }),
    ))
}

async fn list_users(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<User>>> {
    let users = UserRepository::list(&state.db).await?;
    Ok(Json(users))
}
