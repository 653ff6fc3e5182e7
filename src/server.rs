//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::settings::Settings;
use crate::db::{establish_async_connection_pool, run_migrations};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until a shutdown signal arrives.
    ///
    /// # Errors
    /// - Migration errors when `database.auto_migrate` is set
    /// - Database connection pool initialization errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> AppResult<()> {
        self.log_settings();

        if self.settings.database.auto_migrate {
            self.apply_migrations().await?;
        }

        let pool = establish_async_connection_pool(&self.settings.database).await?;
        tracing::info!("Database connection pool initialized");

        let state = AppState::new(pool);
        let router = create_router(state, &self.settings.server);

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            AppError::Internal {
                source: anyhow::anyhow!("Failed to bind to {}: {}", address, e),
            }
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    async fn apply_migrations(&self) -> AppResult<()> {
        let database_url = self.settings.database.url.clone();
        let applied = tokio::task::spawn_blocking(move || run_migrations(&database_url))
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })??;

        if applied.is_empty() {
            tracing::info!("Database schema is up to date");
        } else {
            tracing::info!(migrations = ?applied, "Applied pending migrations");
        }

        Ok(())
    }

    fn log_settings(&self) {
        let settings = &self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            "Application starting"
        );

        tracing::info!(
            host = %settings.server.host,
            port = settings.server.port,
            request_timeout = settings.server.request_timeout,
            "Server configuration loaded"
        );

        // URL omitted, it may carry credentials
        tracing::info!(
            max_connections = settings.database.max_connections,
            max_idle_connections = settings.database.max_idle_connections,
            connection_timeout = settings.database.connection_timeout,
            idle_timeout = settings.database.idle_timeout,
            auto_migrate = settings.database.auto_migrate,
            "Database configuration loaded"
        );

        tracing::info!(
            level = %settings.logger.level,
            console_enabled = settings.logger.console.enabled,
            file_enabled = settings.logger.file.enabled,
            "Logger configuration loaded"
        );
    }
}

/// Waits for Ctrl+C or SIGTERM.
///
/// If a signal handler cannot be installed the error is logged and that
/// branch never resolves, so the other signal still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
