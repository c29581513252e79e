use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::repository::{
    PgAccountRepository, PgInvestmentRepository, PgPolicyRepository, PgSessionRepository,
    PgTenantRepository, Repositories,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    /// A uniqueness constraint rejected the write (duplicate email, domain, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Translate unique violations into [`DatabaseError::Conflict`], leaving everything else intact
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Conflict(format!("{what} already exists"))
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Owns the Postgres pool shared by every repository
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Build a lazily connecting pool; nothing touches the network until the first query
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        info!("Using database {}", Self::redact(url)?);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(url)?;

        Ok(Self { pool })
    }

    /// Apply the embedded migrations
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Postgres-backed repositories sharing this pool
    pub fn repositories(&self) -> Repositories {
        Repositories {
            tenants: Arc::new(PgTenantRepository::new(self.pool.clone())),
            accounts: Arc::new(PgAccountRepository::new(self.pool.clone())),
            policies: Arc::new(PgPolicyRepository::new(self.pool.clone())),
            investments: Arc::new(PgInvestmentRepository::new(self.pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(self.pool.clone())),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    /// Host and database name only, for logs
    fn redact(database_url: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        let host = url.host_str().unwrap_or("localhost");
        let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
        Ok(format!("{}{}{}", host, port, url.path()))
    }
}
