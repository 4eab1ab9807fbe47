use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::{
    CreateDeliveryLog, DeliveryLogRepository, DeliveryStatus, Subscription,
    SubscriptionRepository,
};
use crate::error::AppResult;
use crate::AppState;

pub const EVENT_USER_CREATED: &str = "user.created";
pub const EVENT_ORDER_CREATED: &str = "order.created";
pub const EVENT_ORDER_COMPLETED: &str = "order.completed";

/// Outbound wire format posted to each subscriber.
#[derive(Debug, Serialize)]
struct EventEnvelope<'a> {
    #[serde(rename = "eventType")]
    event_type: &'a str,
    data: &'a Value,
    timestamp: String,
}

/// Per-target outcome included in the dispatch summary.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    pub subscription_id: String,
    pub target_url: String,
    pub status: String,
    pub status_code: Option<i64>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DispatchResult {
    pub event_type: String,
    pub targets_attempted: usize,
    pub outcomes: Vec<DeliveryOutcome>,
}

/// Fans an event out to every active subscription matching its type and
/// records one delivery log entry per attempt.
pub struct DispatcherService {
    pool: SqlitePool,
    http: reqwest::Client,
    delivery_timeout: Duration,
}

impl DispatcherService {
    pub fn new(state: &Arc<AppState>) -> Self {
        Self {
            pool: state.db.clone(),
            http: state.http.clone(),
            delivery_timeout: Duration::from_millis(state.config.dispatcher.delivery_timeout_ms),
        }
    }

    /// Announce that `event_type` occurred. Triggering an event nobody
    /// listens for succeeds with zero attempts; individual delivery
    /// failures are logged, never raised. Only storage errors propagate.
    pub async fn trigger(&self, event_type: &str, payload: Value) -> AppResult<DispatchResult> {
        let targets =
            SubscriptionRepository::find_active_by_event_type(&self.pool, event_type).await?;

        if targets.is_empty() {
            tracing::debug!("No active subscriptions for event type {}", event_type);
            return Ok(DispatchResult {
                event_type: event_type.to_string(),
                targets_attempted: 0,
                outcomes: Vec::new(),
            });
        }

        tracing::info!(
            "Dispatching {} to {} subscription(s)",
            event_type,
            targets.len()
        );

        // One future per target, joined before returning. A slow or
        // failing subscriber never delays, cancels or alters the log
        // entry of another; the delivery timeout applies per target.
        let attempts = targets
            .iter()
            .map(|target| self.deliver(event_type, &payload, target));
        let results = futures::future::join_all(attempts).await;

        // Every attempt has run and been logged at this point; surface
        // the first log-write failure, if any.
        let mut outcomes = Vec::with_capacity(results.len());
        for result in results {
            outcomes.push(result?);
        }

        Ok(DispatchResult {
            event_type: event_type.to_string(),
            targets_attempted: outcomes.len(),
            outcomes,
        })
    }

    /// One POST to one subscriber, always followed by exactly one log
    /// append regardless of how the POST went.
    async fn deliver(
        &self,
        event_type: &str,
        payload: &Value,
        target: &Subscription,
    ) -> AppResult<DeliveryOutcome> {
        let envelope = EventEnvelope {
            event_type,
            data: payload,
            timestamp: Utc::now().to_rfc3339(),
        };

        let response = self
            .http
            .post(&target.target_url)
            .timeout(self.delivery_timeout)
            .json(&envelope)
            .send()
            .await;

        let entry = match response {
            // The subscriber answered: a delivered attempt, whatever the
            // status code (see DeliveryStatus).
            Ok(response) => {
                let status_code = response.status().as_u16() as i64;
                let body = response.text().await.unwrap_or_default();
                tracing::debug!(
                    "Delivered {} to {} ({})",
                    event_type,
                    target.target_url,
                    status_code
                );
                CreateDeliveryLog {
                    event_type: event_type.to_string(),
                    subscription_id: target.id.clone(),
                    target_url: target.target_url.clone(),
                    payload: payload.clone(),
                    status: DeliveryStatus::Success,
                    status_code: Some(status_code),
                    response_body: Some(body),
                    error_message: None,
                }
            }
            Err(e) => {
                let status_code = e.status().map(|s| s.as_u16() as i64);
                tracing::warn!(
                    "Delivery of {} to {} failed: {}",
                    event_type,
                    target.target_url,
                    e
                );
                CreateDeliveryLog {
                    event_type: event_type.to_string(),
                    subscription_id: target.id.clone(),
                    target_url: target.target_url.clone(),
                    payload: payload.clone(),
                    status: DeliveryStatus::Failed,
                    status_code,
                    response_body: None,
                    error_message: Some(e.to_string()),
                }
            }
        };

        let status = entry.status;
        let status_code = entry.status_code;
        let error = entry.error_message.clone();
        DeliveryLogRepository::append(&self.pool, entry).await?;

        Ok(DeliveryOutcome {
            subscription_id: target.id.clone(),
            target_url: target.target_url.clone(),
            status: status.as_str().to_string(),
            status_code,
            error,
        })
    }
}
