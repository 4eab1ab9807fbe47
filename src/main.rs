use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod routes;
mod services;

use config::Config;
use services::init;

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Config,
    pub http: reqwest::Client,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webhook_dispatcher=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting webhook dispatcher service");

    // Initialize database
    let pool = init::init_db(&config).await?;

    // Shared client for outbound webhook deliveries
    let http = reqwest::Client::new();

    let app_state = Arc::new(AppState {
        db: pool,
        config: config.clone(),
        http,
    });

    let app = router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))
        // Webhook subscription registry
        .nest("/api/subscriptions", routes::subscriptions::router())
        // Delivery audit log
        .nest("/api/deliveries", routes::deliveries::router())
        // Manual event trigger
        .nest("/api/events", routes::events::router())
        // Domain operations that fire events
        .nest("/api/users", routes::users::router())
        .nest("/api/orders", routes::orders::router())
        // Add shared state
        .with_state(state)
        // Add middleware
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to bind SIGTERM");
        tokio::select! {
            _ = ctrl_c => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("Failed to bind Ctrl+C");
    }

    tracing::info!("Shutdown signal received");
}
