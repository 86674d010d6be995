use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::TokenVerifier;
use crate::config::{AppConfig, StoreBackend};
use crate::database::{
    ConfigurationRepository, DatabaseManager, DocumentCollection, MemoryCollection, PgCollection,
    SchemaBindingRepository, Seed,
};
use crate::schema::{JsonSchemaValidator, SchemaFetcher, SchemaValidator};

/// Shared handles passed to every handler. Cloning is cheap: everything is
/// reference counted.
#[derive(Clone)]
pub struct AppState {
    pub configurations: ConfigurationRepository,
    pub schema_bindings: SchemaBindingRepository,
    pub schemas: SchemaFetcher,
    pub validator: Arc<dyn SchemaValidator>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(
        configurations: Arc<dyn DocumentCollection>,
        schema_bindings: Arc<dyn DocumentCollection>,
        schemas: SchemaFetcher,
        validator: Arc<dyn SchemaValidator>,
        verifier: TokenVerifier,
    ) -> Self {
        Self {
            configurations: ConfigurationRepository::configurations(configurations),
            schema_bindings: SchemaBindingRepository::schema_bindings(schema_bindings),
            schemas,
            validator,
            verifier: Arc::new(verifier),
        }
    }

    /// Wire up the store, schema client and token verifier from configuration
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let verifier = TokenVerifier::new(&config.security.jwt_secret, config.security.session_cookie.clone())
            .context("SECURITY_JWT_SECRET must be set")?;

        let (configurations, schema_bindings) = open_collections(config).await?;

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        let schemas = SchemaFetcher::new(client, config.schemas.cache_ttl());

        Ok(Self::new(
            configurations,
            schema_bindings,
            schemas,
            Arc::new(JsonSchemaValidator::new()),
            verifier,
        ))
    }
}

async fn open_collections(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn DocumentCollection>, Arc<dyn DocumentCollection>)> {
    let database = &config.database;
    match database.backend {
        StoreBackend::Postgres => {
            if let Some(path) = &database.seed_file {
                warn!("Ignoring STORE_SEED_FILE {} for the Postgres store", path.display());
            }
            let pool = DatabaseManager::connect(database)
                .await
                .context("failed to connect to the document store")?;
            for name in [&database.configurations_collection, &database.schema_bindings_collection] {
                DatabaseManager::ensure_collection(&pool, name)
                    .await
                    .with_context(|| format!("failed to prepare collection '{}'", name))?;
            }
            info!("Using Postgres document store");
            Ok((
                Arc::new(PgCollection::new(pool.clone(), &database.configurations_collection)?),
                Arc::new(PgCollection::new(pool, &database.schema_bindings_collection)?),
            ))
        }
        StoreBackend::Memory => {
            let configurations = MemoryCollection::new();
            let schema_bindings = MemoryCollection::new();
            match &database.seed_file {
                Some(path) => {
                    let seed = Seed::load(path).await?;
                    seed.apply(&configurations, &schema_bindings).await;
                    info!(
                        "Seeded in-memory store from {}: {} configurations, {} schema bindings",
                        path.display(),
                        seed.configurations.len(),
                        seed.schema_bindings.len()
                    );
                }
                None => warn!("In-memory store has no STORE_SEED_FILE; every lookup will miss"),
            }
            warn!("Using in-memory document store; writes are lost on restart");
            Ok((Arc::new(configurations), Arc::new(schema_bindings)))
        }
    }
}
