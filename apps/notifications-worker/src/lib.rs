//! Notifications worker
//!
//! Consumes the notification queues, sends transactional email and serves the per-user
//! notifications API.
//!
//! ```text
//! email-notifications ──▶ EmailNotificationHandler ──▶ EmailDispatchService ──▶ SMTP
//!                                                             │
//! transaction-events  ──▶ TransactionEventHandler ────────────┤
//!                                 │                           ▼
//!                                 ▼                    email_deliveries
//! notification-events ──▶ NotificationService ──▶ notifications (MongoDB)
//!                                 │
//!                                 ▼
//!                     socket-notification-events
//! ```
//!
//! A failed database connection at startup is fatal. An unreachable broker is not: the worker
//! serves the REST API without consuming queues or publishing socket events. Missing email
//! credentials disable email.

pub mod broker;
pub mod config;
pub mod handlers;
pub mod server;

use config::Config;
use domain_notifications::{MongoNotificationRepository, NotificationService};
use email::{
    DeliveryRepository, EmailDispatchService, MongoDeliveryRepository, ProviderAdapter,
    TemplateEngine,
};
use eyre::{Result, WrapErr};
use server::AppState;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Run the worker until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error when configuration is invalid, MongoDB cannot be reached or the HTTP
/// listener fails.
pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    core_config::tracing::init_tracing(&config.environment);

    let metrics = match messaging::nats::init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Prometheus recorder not installed");
            None
        }
    };

    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "Starting notifications worker"
    );

    let mongo_client = database::mongodb::connect_from_config_with_retry(&config.mongodb, None)
        .await
        .wrap_err("Failed to connect to MongoDB")?;
    let db = mongo_client.database(config.mongodb.database());

    let notifications_repo = MongoNotificationRepository::new(&db);
    if let Err(e) = notifications_repo.init_indexes().await {
        warn!(error = %e, "Failed to create notification indexes");
    }
    let deliveries_repo = MongoDeliveryRepository::new(&db);
    if let Err(e) = deliveries_repo.init_indexes().await {
        warn!(error = %e, "Failed to create email delivery indexes");
    }

    let jetstream = broker::connect(&config.broker.url).await;
    let publisher = broker::socket_publisher(jetstream.as_ref()).await;

    let templates = Arc::new(TemplateEngine::new().wrap_err("Failed to load email templates")?);
    let deliveries: Arc<dyn DeliveryRepository> = Arc::new(deliveries_repo);
    let email = Arc::new(
        EmailDispatchService::initialize(
            ProviderAdapter::new(config.email.clone()),
            templates,
            deliveries,
        )
        .await,
    );

    let notifications = NotificationService::new(notifications_repo, publisher);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut workers = broker::spawn_consumers(
        jetstream.as_ref(),
        &config.broker,
        &notifications,
        &email,
        &shutdown_rx,
    )
    .await;

    let state = AppState {
        db,
        email,
        metrics,
    };
    let app = server::app(state, notifications);

    let listener = tokio::net::TcpListener::bind(config.server.address())
        .await
        .wrap_err_with(|| format!("Failed to bind {}", config.server.address()))?;
    info!(address = %config.server.address(), "HTTP server listening");

    let mut server_shutdown = shutdown_rx.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.wait_for(|stop| *stop).await;
            })
            .await
    });

    if let Err(e) = shutdown_signal().await {
        error!(error = %e, "Error waiting for shutdown signal");
    }
    let _ = shutdown_tx.send(true);

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "Queue worker failed"),
            Err(e) => error!(error = %e, "Queue worker task panicked"),
        }
    }

    server
        .await
        .wrap_err("HTTP server task failed")?
        .wrap_err("HTTP server error")?;

    drop(mongo_client);
    info!("Notifications worker stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        sigterm.recv().await;
        Ok::<(), std::io::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<std::io::Result<()>>();

    tokio::select! {
        result = ctrl_c => {
            result.wrap_err("Failed to listen for Ctrl+C")?;
            info!("Received Ctrl+C, initiating shutdown");
        }
        result = terminate => {
            result.wrap_err("Failed to listen for SIGTERM")?;
            info!("Received SIGTERM, initiating shutdown");
        }
    }

    Ok(())
}
