//! JSON Schema validation.

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// Error type for schema validation failures.
#[derive(Debug, Clone, Error)]
pub enum SchemaValidationError {
    /// The schema document itself is not a usable JSON Schema
    #[error("invalid JSON Schema: {0}")]
    InvalidSchema(String),

    /// The instance does not conform; one message per violation
    #[error("{}", .0.join("; "))]
    Rejected(Vec<String>),
}

/// Validates JSON data against a JSON Schema.
///
/// The draft is taken from the schema's `$schema` keyword, defaulting to
/// Draft 2020-12. An empty schema `{}` accepts any value.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, schema: &Value, data: &Value) -> Result<(), SchemaValidationError>;
}

/// Validator backed by the `jsonschema` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaValidator;

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, schema: &Value, data: &Value) -> Result<(), SchemaValidationError> {
        let validator =
            Validator::new(schema).map_err(|e| SchemaValidationError::InvalidSchema(e.to_string()))?;

        // Collect all errors so the log shows every violation at once
        let errors: Vec<String> = validator
            .iter_errors(data)
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();

        if !errors.is_empty() {
            return Err(SchemaValidationError::Rejected(errors));
        }

        Ok(())
    }
}
