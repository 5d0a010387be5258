//! GraphQL schema and resolvers over the in-memory store.

pub mod context;
pub mod mutation;
pub mod query;
pub mod schema;
pub mod subscription;
pub mod types;

pub use context::{ApiContext, ApiOptions, ChatBus};
pub use schema::{ChatSchema, build_schema};
