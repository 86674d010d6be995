pub mod schema;
pub mod token;
