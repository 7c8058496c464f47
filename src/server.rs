use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};
use crate::routes;
use crate::state::AppState;

/// Start the HTTP server and run until a shutdown signal arrives
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    let database = DatabaseManager::connect_lazy(&config.database)?;

    // Runs beside the listener; without a database the server still answers and /health reports the outage
    let startup_check = database.clone();
    let auto_migrate = config.database.auto_migrate;
    tokio::spawn(async move {
        let result = if auto_migrate {
            startup_check.migrate().await
        } else {
            startup_check.health_check().await
        };
        if let Err(e) = result {
            warn!("Database not ready at startup: {}", e);
        }
    });

    let jwt = JwtManager::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    info!("========================================");
    info!("Markdown Editor API");
    info!("========================================");
    info!("Mode:     {:?}", config.environment);
    info!("Listen:   {}", bind_addr);
    info!("Database: {}", config.database_display());
    info!("========================================");

    let state = AppState::new(
        Arc::new(PgStore::new(database.pool().clone())),
        jwt,
        Arc::new(config),
    );
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to create SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Shutdown signal received, draining connections");
}
