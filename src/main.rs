use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cleanbook::config::AppConfig;
use cleanbook::db;
use cleanbook::handlers;
use cleanbook::services::notifications::webhook::WebhookNotifier;
use cleanbook::services::notifications::{LogNotifier, Notifier};
use cleanbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let notifier: Box<dyn Notifier> = if config.notify_webhook_url.is_empty() {
        tracing::info!("no NOTIFY_WEBHOOK_URL set, booking events are only streamed");
        Box::new(LogNotifier)
    } else {
        tracing::info!("forwarding booking events to {}", config.notify_webhook_url);
        Box::new(WebhookNotifier::new(
            config.notify_webhook_url.clone(),
            config.notify_webhook_token.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?)
    };

    if config.admin_token == "changeme" {
        tracing::warn!("ADMIN_TOKEN is the default value, set it before exposing the server");
    }

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        notifier,
        events_tx,
    });

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
