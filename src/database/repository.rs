use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::database::collection::{Document, DocumentCollection};
use crate::database::manager::DatabaseError;
use crate::database::models::{Configuration, ConfigurationKey, SchemaBinding};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Stored {collection} document does not match its expected shape: {source}")]
    Decode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Typed view over a document collection. Every document read back is
/// decoded into `T`; a document that does not decode is an error, not a miss.
pub struct Repository<T> {
    name: &'static str,
    collection: Arc<dyn DocumentCollection>,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            collection: Arc::clone(&self.collection),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: DeserializeOwned,
{
    pub fn new(name: &'static str, collection: Arc<dyn DocumentCollection>) -> Self {
        Self {
            name,
            collection,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_one(&self, filter: &Document) -> Result<Option<T>, RepositoryError> {
        match self.collection.find_one(filter).await? {
            Some(doc) => self.decode(doc).map(Some),
            None => Ok(None),
        }
    }

    pub async fn select_any(&self, filter: &Document) -> Result<Vec<T>, RepositoryError> {
        self.collection
            .find(filter)
            .await?
            .into_iter()
            .map(|doc| self.decode(doc))
            .collect()
    }

    /// Replace the first match; returns false when nothing matched
    pub async fn replace_one(&self, filter: &Document, replacement: Document) -> Result<bool, RepositoryError> {
        let result = self.collection.replace_one(filter, replacement).await?;
        Ok(result.matched_count > 0)
    }

    pub async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(self.collection.ping().await?)
    }

    fn decode(&self, doc: Value) -> Result<T, RepositoryError> {
        serde_json::from_value(doc).map_err(|source| RepositoryError::Decode {
            collection: self.name,
            source,
        })
    }
}

pub type ConfigurationRepository = Repository<Configuration>;
pub type SchemaBindingRepository = Repository<SchemaBinding>;

impl Repository<Configuration> {
    pub fn configurations(collection: Arc<dyn DocumentCollection>) -> Self {
        Self::new("configuration", collection)
    }

    pub async fn find(&self, key: &ConfigurationKey) -> Result<Option<Configuration>, RepositoryError> {
        self.select_one(&key.filter()).await
    }

    /// All configurations of one device, in storage order
    pub async fn list(&self, vehicle_id: &str, device_id: &str) -> Result<Vec<Configuration>, RepositoryError> {
        let mut filter = Document::new();
        filter.insert("vehicleId".to_string(), Value::String(vehicle_id.to_string()));
        filter.insert("deviceId".to_string(), Value::String(device_id.to_string()));
        self.select_any(&filter).await
    }

    /// Overwrite an existing configuration; never creates one
    pub async fn replace(&self, configuration: &Configuration) -> Result<bool, RepositoryError> {
        self.replace_one(&configuration.key().filter(), configuration.to_document())
            .await
    }
}

impl Repository<SchemaBinding> {
    pub fn schema_bindings(collection: Arc<dyn DocumentCollection>) -> Self {
        Self::new("schema binding", collection)
    }

    pub async fn find(&self, configuration_id: &str) -> Result<Option<SchemaBinding>, RepositoryError> {
        self.select_one(&SchemaBinding::filter(configuration_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::collection::MemoryCollection;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn configuration(vehicle: &str, device: &str, id: &str) -> Value {
        json!({
            "vehicleId": vehicle,
            "deviceId": device,
            "configurationId": id,
            "configurationVersionHash": "h1",
            "content": {},
            "updatedBy": "a@example.com",
            "lastUpdate": "Mon, 19 Oct 2026 10:00:00 GMT"
        })
    }

    #[tokio::test]
    async fn corrupt_document_is_decode_error() {
        let collection = Arc::new(MemoryCollection::new());
        collection
            .insert(doc(json!({"vehicleId": "v1", "deviceId": "d1", "configurationId": "c1"})))
            .await;
        let repo = ConfigurationRepository::configurations(collection);

        let key = ConfigurationKey {
            vehicle_id: "v1".into(),
            device_id: "d1".into(),
            configuration_id: "c1".into(),
        };
        assert!(matches!(repo.find(&key).await, Err(RepositoryError::Decode { .. })));
    }

    #[tokio::test]
    async fn list_filters_by_vehicle_and_device() {
        let collection = Arc::new(MemoryCollection::new());
        collection.insert(doc(configuration("v1", "d1", "a"))).await;
        collection.insert(doc(configuration("v1", "d2", "b"))).await;
        collection.insert(doc(configuration("v1", "d1", "c"))).await;
        let repo = ConfigurationRepository::configurations(collection);

        let ids: Vec<String> = repo
            .list("v1", "d1")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.configuration_id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn replace_reports_missing_key() {
        let collection = Arc::new(MemoryCollection::new());
        let repo = ConfigurationRepository::configurations(collection.clone());
        let config: Configuration = serde_json::from_value(configuration("v1", "d1", "c1")).unwrap();

        assert!(!repo.replace(&config).await.unwrap());
        assert!(collection.is_empty().await);
    }

    #[tokio::test]
    async fn binding_lookup_by_configuration_id() {
        let collection = Arc::new(MemoryCollection::new());
        collection
            .insert(doc(json!({"configurationId": "c1", "url": "https://schemas.example.com/{hash}.json"})))
            .await;
        let repo = SchemaBindingRepository::schema_bindings(collection);

        let binding = repo.find("c1").await.unwrap().unwrap();
        assert_eq!(binding.resolve("h2"), "https://schemas.example.com/h2.json");
        assert!(repo.find("c2").await.unwrap().is_none());
    }
}
