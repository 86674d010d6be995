pub mod configuration;
pub mod schema_binding;

pub use configuration::{Configuration, ConfigurationKey, ConfigurationSummary, ConfigurationUpdate};
pub use schema_binding::SchemaBinding;
