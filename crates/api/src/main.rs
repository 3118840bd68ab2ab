use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use replydesk_api::config::{LogFormat, ServerConfig};
use replydesk_api::router::build_app_router;
use replydesk_api::state::AppState;
use replydesk_db::{DbPool, MemoryStore, PgStore, RecordStore};
use replydesk_events::{
    EventBus, EventPersistence, FanoutPublisher, NotificationPort, WebhookPublisher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    // --- Tracing ---
    let (text_layer, json_layer) = match config.log_format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "replydesk_api=debug,tower_http=debug".into()),
        )
        .with(text_layer)
        .with(json_layer)
        .init();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Record store ---
    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            let pg = PgStore::connect(url)
                .await
                .context("Failed to connect to database")?;
            pg.run_migrations()
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database connected and migrations applied");
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };
    let pool = DbPool::new(store, config.store_timeout());
    replydesk_db::health_check(&pool)
        .await
        .context("Store health check failed")?;

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let port: Arc<dyn NotificationPort> = match &config.notify_webhook_url {
        Some(url) => {
            let webhook = WebhookPublisher::new(url.clone())
                .context("Failed to build webhook publisher")?;
            tracing::info!(url = %url, "Publishing template events to webhook");
            let ports: Vec<Arc<dyn NotificationPort>> = vec![event_bus.clone(), Arc::new(webhook)];
            Arc::new(FanoutPublisher::new(ports))
        }
        None => event_bus.clone(),
    };

    // Spawn event persistence (writes all events to the audit trail).
    let persistence_handle = tokio::spawn(EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    tracing::info!("Event persistence started");

    // --- App state ---
    let config = Arc::new(config);
    let state = AppState::new(pool, Arc::clone(&config), event_bus, port);
    let app = build_app_router(state, &config).context("Invalid CORS configuration")?;

    // --- Start server ---
    let ip = config
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    // The router (and every AppState clone holding the bus) is gone once
    // serve returns, which closes the channel and ends persistence.
    tracing::info!("Server stopped accepting connections, draining event persistence");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, persistence_handle).await.is_err() {
        tracing::warn!("Event persistence did not drain before the shutdown timeout");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
