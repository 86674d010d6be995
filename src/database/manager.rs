use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the document store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection pool setup and collection bootstrapping for Postgres
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against `database.url`
    pub async fn connect(database: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = database
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let url = url::Url::parse(connection_string).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }

        let pool = PgPoolOptions::new()
            .max_connections(database.max_connections)
            .acquire_timeout(Duration::from_secs(database.connection_timeout))
            .connect(connection_string)
            .await?;

        info!(
            "Created database pool for {}:{}{}",
            url.host_str().unwrap_or("localhost"),
            url.port().unwrap_or(5432),
            url.path()
        );
        Ok(pool)
    }

    /// Create the backing table for a collection if it does not exist yet
    pub async fn ensure_collection(pool: &PgPool, name: &str) -> Result<(), DatabaseError> {
        let table = Self::table_identifier(name)?;
        let query = format!(
            "CREATE TABLE IF NOT EXISTS {} (id BIGSERIAL PRIMARY KEY, doc JSONB NOT NULL)",
            table
        );
        sqlx::query(&query).execute(pool).await?;
        info!("Collection ready: {}", name);
        Ok(())
    }

    /// Validated and quoted table identifier for a collection name
    pub fn table_identifier(name: &str) -> Result<String, DatabaseError> {
        if !Self::is_valid_collection_name(name) {
            return Err(DatabaseError::InvalidCollectionName(name.to_string()));
        }
        Ok(Self::quote_identifier(name))
    }

    /// Quote SQL identifier to prevent injection
    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Collection names are lowercase identifiers: [a-z_][a-z0-9_]*
    fn is_valid_collection_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() || c == '_' => {}
            _ => return false,
        }
        name.len() <= 63 && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}
