use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::database::collection::Document;

/// Compound key of a configuration, as it appears in the route path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationKey {
    pub vehicle_id: String,
    pub device_id: String,
    pub configuration_id: String,
}

impl ConfigurationKey {
    pub fn filter(&self) -> Document {
        let mut filter = Document::new();
        filter.insert("vehicleId".to_string(), json!(self.vehicle_id));
        filter.insert("deviceId".to_string(), json!(self.device_id));
        filter.insert("configurationId".to_string(), json!(self.configuration_id));
        filter
    }
}

impl std::fmt::Display for ConfigurationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.vehicle_id, self.device_id, self.configuration_id)
    }
}

/// Latest content stored for one vehicle/device/configuration triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Configuration {
    pub vehicle_id: String,
    pub device_id: String,
    pub configuration_id: String,
    pub configuration_version_hash: String,
    pub content: Map<String, Value>,
    pub updated_by: String,
    /// HTTP-date of the last write
    pub last_update: String,
}

impl Configuration {
    pub fn key(&self) -> ConfigurationKey {
        ConfigurationKey {
            vehicle_id: self.vehicle_id.clone(),
            device_id: self.device_id.clone(),
            configuration_id: self.configuration_id.clone(),
        }
    }

    pub fn to_document(&self) -> Document {
        let mut doc = self.key().filter();
        doc.insert("configurationVersionHash".to_string(), json!(self.configuration_version_hash));
        doc.insert("content".to_string(), Value::Object(self.content.clone()));
        doc.insert("updatedBy".to_string(), json!(self.updated_by));
        doc.insert("lastUpdate".to_string(), json!(self.last_update));
        doc
    }

    pub fn summary(&self) -> ConfigurationSummary {
        ConfigurationSummary {
            vehicle_id: self.vehicle_id.clone(),
            device_id: self.device_id.clone(),
            configuration_id: self.configuration_id.clone(),
            configuration_version_hash: self.configuration_version_hash.clone(),
            updated_by: self.updated_by.clone(),
            last_update: self.last_update.clone(),
        }
    }
}

/// Configuration without its content, for listings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSummary {
    pub vehicle_id: String,
    pub device_id: String,
    pub configuration_id: String,
    pub configuration_version_hash: String,
    pub updated_by: String,
    pub last_update: String,
}

/// POST body: the new content and the schema version it claims to satisfy
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigurationUpdate {
    pub configuration_version_hash: String,
    pub content: Map<String, Value>,
}

impl ConfigurationUpdate {
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
