use std::time::Duration;

use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config;

/// Errors from DatabaseManager and the repositories
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration failed: {0}")]
    Migration(#[from] MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Process-wide owner of the PostgreSQL pool
pub struct DatabaseManager {
    pool: RwLock<Option<PgPool>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: RwLock::new(None),
        })
    }

    /// Get the main pool, connecting and migrating on first use
    pub async fn main_pool() -> Result<PgPool, DatabaseError> {
        Self::instance().get_pool().await
    }

    async fn get_pool(&self) -> Result<PgPool, DatabaseError> {
        // Fast path: try read lock
        {
            let pool = self.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let mut slot = self.pool.write().await;
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        let connection_string = Self::build_connection_string()?;
        let settings = &config::config().database;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connection_timeout))
            .connect(&connection_string)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("Created database pool (max {} connections), schema up to date", settings.max_connections);
        *slot = Some(pool.clone());
        Ok(pool)
    }

    fn build_connection_string() -> Result<String, DatabaseError> {
        Self::connection_string_from(|key| std::env::var(key).ok())
    }

    /// DATABASE_URL wins; otherwise the URL is assembled from the POSTGRES_* variables
    fn connection_string_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String, DatabaseError> {
        if let Some(base) = lookup("DATABASE_URL").filter(|s| !s.is_empty()) {
            let url = url::Url::parse(&base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
            return Ok(url.into());
        }

        let host = lookup("POSTGRES_HOST").ok_or(DatabaseError::ConfigMissing("DATABASE_URL or POSTGRES_HOST"))?;
        let database = lookup("POSTGRES_DB_NAME").ok_or(DatabaseError::ConfigMissing("POSTGRES_DB_NAME"))?;

        let mut url = url::Url::parse("postgres://localhost").map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_host(Some(&host)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        if let Some(port) = lookup("POSTGRES_PORT") {
            let port = port.parse::<u16>().map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
            url.set_port(Some(port)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        if let Some(user) = lookup("POSTGRES_USER") {
            url.set_username(&user).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        if let Some(password) = lookup("POSTGRES_PASSWORD") {
            url.set_password(Some(&password)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        url.set_path(&format!("/{}", database));

        Ok(url.into())
    }

    /// Pings the main pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::main_pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close() {
        let mut slot = Self::instance().pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}

/// Map a unique-constraint violation to `Conflict`, pass everything else through
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DatabaseError::Conflict(message.to_string()),
        _ => DatabaseError::Sqlx(err),
    }
}
