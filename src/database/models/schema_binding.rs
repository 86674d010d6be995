use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::collection::Document;

/// Placeholder substituted with a version hash to locate a schema revision
pub const HASH_PLACEHOLDER: &str = "{hash}";

/// Maps a configuration type to the templated URL of its JSON Schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaBinding {
    pub configuration_id: String,
    pub url: String,
}

impl SchemaBinding {
    pub fn filter(configuration_id: &str) -> Document {
        let mut filter = Document::new();
        filter.insert("configurationId".to_string(), json!(configuration_id));
        filter
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Self::filter(&self.configuration_id);
        doc.insert("url".to_string(), json!(self.url));
        doc
    }

    /// Concrete schema location for one version hash
    pub fn resolve(&self, version_hash: &str) -> String {
        self.url.replace(HASH_PLACEHOLDER, version_hash)
    }
}
