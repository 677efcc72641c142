pub mod connection;
pub mod endpoints;

pub use connection::{ApiConnectionError, ModelBackend};
pub use endpoints::{GenerateContentRequest, GenerateContentResponse, JsonSchema, Provider, SchemaType};
