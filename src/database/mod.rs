pub mod collection;
pub mod manager;
pub mod models;
pub mod repository;
pub mod seed;

pub use collection::{Document, DocumentCollection, MemoryCollection, PgCollection, ReplaceResult};
pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{ConfigurationRepository, RepositoryError, SchemaBindingRepository};
pub use seed::{Seed, SeedError};
