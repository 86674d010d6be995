use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::database::collection::MemoryCollection;
use crate::database::models::{Configuration, SchemaBinding};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("seed file {path} lists {what} '{key}' more than once")]
    Duplicate {
        path: PathBuf,
        what: &'static str,
        key: String,
    },
}

/// Initial contents for the in-memory store:
/// `{"configurations": [...], "schemaBindings": [...]}`.
///
/// Entries are decoded with the same strict models the API reads back, so a
/// seed that loads is a seed every endpoint can serve.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Seed {
    #[serde(default)]
    pub configurations: Vec<Configuration>,
    #[serde(default)]
    pub schema_bindings: Vec<SchemaBinding>,
}

impl Seed {
    pub async fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = tokio::fs::read(path).await.map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let seed: Seed = serde_json::from_slice(&raw).map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        seed.check_unique(path)?;
        Ok(seed)
    }

    fn check_unique(&self, path: &Path) -> Result<(), SeedError> {
        let duplicate = |what: &'static str, key: String| SeedError::Duplicate {
            path: path.to_path_buf(),
            what,
            key,
        };

        let mut keys = HashSet::new();
        for configuration in &self.configurations {
            let key = configuration.key().to_string();
            if !keys.insert(key.clone()) {
                return Err(duplicate("configuration", key));
            }
        }

        let mut ids = HashSet::new();
        for binding in &self.schema_bindings {
            if !ids.insert(binding.configuration_id.as_str()) {
                return Err(duplicate("schema binding", binding.configuration_id.clone()));
            }
        }
        Ok(())
    }

    pub async fn apply(&self, configurations: &MemoryCollection, schema_bindings: &MemoryCollection) {
        for configuration in &self.configurations {
            configurations.insert(configuration.to_document()).await;
        }
        for binding in &self.schema_bindings {
            schema_bindings.insert(binding.to_document()).await;
        }
    }
}
