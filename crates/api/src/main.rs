use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use studysync_api::cache::ListCache;
use studysync_api::config::ServerConfig;
use studysync_api::router::build_app_router;
use studysync_api::state::AppState;
use studysync_api::telemetry::{init_tracing, LogConfig};
use studysync_events::{EmailConfig, EmailDelivery, LogNotifier, Notifier};
use studysync_worker::{ReminderWorker, SCAN_INTERVAL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing(&LogConfig::from_env());

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    // --- Database ---
    let pool = studysync_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    studysync_db::health_check(&pool)
        .await
        .context("Database health check failed")?;

    studysync_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- List cache ---
    let cache = ListCache::connect(config.redis_url.as_deref()).await;

    // --- Reminder worker ---
    let notifier: Arc<dyn Notifier> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "Reminders will be emailed");
            Arc::new(EmailDelivery::new(email_config).context("Invalid SMTP configuration")?)
        }
        None => {
            tracing::info!("SMTP_HOST not set, reminders will be logged");
            Arc::new(LogNotifier)
        }
    };

    let worker_cancel = CancellationToken::new();
    let worker = ReminderWorker::new(pool.clone(), notifier);
    let worker_handle = tokio::spawn({
        let cancel = worker_cancel.clone();
        async move { worker.run(cancel).await }
    });

    // --- App state & router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host: IpAddr = config.host.parse().context("Invalid HOST address")?;
    let addr = SocketAddr::new(host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(%addr, "Starting server");

    let server_shutdown = CancellationToken::new();
    let mut server = tokio::spawn({
        let shutdown = server_shutdown.clone();
        async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        }
    });

    tokio::select! {
        () = shutdown_signal() => {}
        result = &mut server => {
            worker_cancel.cancel();
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(anyhow::Error::new(e).context("Server error")),
                Err(e) => Err(anyhow::Error::new(e).context("Server task failed")),
            };
        }
    }

    // --- Graceful shutdown ---
    server_shutdown.cancel();
    worker_cancel.cancel();

    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(grace, &mut server).await {
        Ok(Ok(Ok(()))) => tracing::info!("Server drained"),
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error during shutdown"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task failed during shutdown"),
        Err(_) => {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "Shutdown grace period elapsed, abandoning in-flight requests"
            );
            server.abort();
        }
    }

    if tokio::time::timeout(SCAN_INTERVAL, worker_handle).await.is_err() {
        tracing::warn!("Reminder worker did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or (on Unix) SIGTERM.
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
