//! SeaORM-based database implementation
//!
//! The catalog runs on SQLite, PostgreSQL or MySQL; the backend is picked from
//! the connection URL.

use sea_orm::{ConnectOptions, Database as SeaOrmDatabase, DatabaseBackend, DatabaseConnection};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, AppResult};

pub mod migrations;
pub mod repositories;

/// Database connection manager with multi-database support
#[derive(Clone)]
pub struct Database {
    pub connection: Arc<DatabaseConnection>,
    pub backend: DatabaseBackend,
}

impl Database {
    /// Connect using the configured URL
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        let backend = Self::detect_backend(&config.url)?;
        info!("Connecting to {:?} database", backend);

        let connection_url = match backend {
            DatabaseBackend::Sqlite => Self::ensure_sqlite_auto_creation(&config.url)?,
            _ => config.url.clone(),
        };

        let mut connect_options = ConnectOptions::new(&connection_url);
        connect_options
            .max_connections(config.max_connections.unwrap_or(10))
            .min_connections(1)
            .connect_timeout(Duration::from_secs(5))
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        let connection = match SeaOrmDatabase::connect(connect_options).await {
            Ok(conn) => conn,
            Err(e) => {
                // Log the full error chain for debugging
                tracing::error!("Database connection failed: {:?}", e);
                let mut source = e.source();
                let mut level = 0;
                while let Some(err) = source {
                    tracing::error!("  Level {}: {}", level, err);
                    source = err.source();
                    level += 1;
                }
                return Err(AppError::Database(e));
            }
        };

        debug!("Database connection established successfully");

        Ok(Self {
            connection: Arc::new(connection),
            backend,
        })
    }

    fn detect_backend(url: &str) -> AppResult<DatabaseBackend> {
        if url.starts_with("sqlite:") {
            Ok(DatabaseBackend::Sqlite)
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Ok(DatabaseBackend::Postgres)
        } else if url.starts_with("mysql:") {
            Ok(DatabaseBackend::MySql)
        } else {
            Err(AppError::configuration(format!(
                "Unsupported database URL format: {url}"
            )))
        }
    }

    /// Ensure SQLite URL includes auto-creation mode if needed
    fn ensure_sqlite_auto_creation(url: &str) -> AppResult<String> {
        if url.contains("mode=") || url.contains(":memory:") {
            return Ok(url.to_string());
        }

        let file_path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .ok_or_else(|| AppError::configuration(format!("Invalid SQLite URL format: {url}")))?;

        let path = std::path::Path::new(file_path);
        if path.exists() {
            return Ok(url.to_string());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!("Created directory for SQLite database: {}", parent.display());
            }
        }

        let separator = if url.contains('?') { '&' } else { '?' };
        Ok(format!("{url}{separator}mode=rwc"))
    }

    /// Run database migrations
    pub async fn migrate(&self) -> AppResult<()> {
        use migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        info!("Running database migrations for {:?}", self.backend);
        Migrator::up(&*self.connection, None).await?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the main database connection
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        self.connection.clone()
    }
}
