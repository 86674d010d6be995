pub mod fetcher;
pub mod validator;

pub use fetcher::{SchemaFetchError, SchemaFetcher};
pub use validator::{JsonSchemaValidator, SchemaValidationError, SchemaValidator};
