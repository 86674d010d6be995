use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Error)]
pub enum SchemaFetchError {
    #[error("invalid schema URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported schema URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status { url: Url, status: reqwest::StatusCode },

    #[error("{url} did not return a JSON document: {source}")]
    Decode {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

struct CachedSchema {
    schema: Arc<Value>,
    fetched_at: Instant,
}

/// Retrieves JSON Schema documents over HTTP.
///
/// Successful responses are cached by URL. Without a TTL an entry is reused for
/// the lifetime of the process, so a schema republished at the same URL is not
/// observed until restart.
#[derive(Clone)]
pub struct SchemaFetcher {
    client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CachedSchema>>>,
    ttl: Option<Duration>,
}

impl SchemaFetcher {
    pub fn new(client: reqwest::Client, ttl: Option<Duration>) -> Self {
        Self {
            client,
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Parse a resolved schema location; only http(s) is fetched
    pub fn parse_url(location: &str) -> Result<Url, SchemaFetchError> {
        let url = Url::parse(location).map_err(|source| SchemaFetchError::InvalidUrl {
            url: location.to_string(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(SchemaFetchError::UnsupportedScheme(other.to_string())),
        }
    }

    pub async fn fetch(&self, url: &Url) -> Result<Arc<Value>, SchemaFetchError> {
        if let Some(schema) = self.cached(url).await {
            debug!("Schema cache hit: {}", url);
            return Ok(schema);
        }

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/schema+json, application/json")
            .send()
            .await
            .map_err(|source| SchemaFetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SchemaFetchError::Status {
                url: url.clone(),
                status,
            });
        }

        let schema: Value = response.json().await.map_err(|source| SchemaFetchError::Decode {
            url: url.clone(),
            source,
        })?;
        let schema = Arc::new(schema);

        self.cache.write().await.insert(
            url.to_string(),
            CachedSchema {
                schema: Arc::clone(&schema),
                fetched_at: Instant::now(),
            },
        );

        info!("Fetched schema {}", url);
        Ok(schema)
    }

    async fn cached(&self, url: &Url) -> Option<Arc<Value>> {
        let cache = self.cache.read().await;
        let entry = cache.get(url.as_str())?;
        if is_fresh(entry.fetched_at.elapsed(), self.ttl) {
            Some(Arc::clone(&entry.schema))
        } else {
            None
        }
    }
}

fn is_fresh(age: Duration, ttl: Option<Duration>) -> bool {
    match ttl {
        Some(ttl) => age < ttl,
        None => true,
    }
}
