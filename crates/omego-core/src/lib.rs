//! omego-core - Core library for omego
//!
//! This crate provides the schema version token grammar and its total order,
//! the typed configuration for database administration, and the environment
//! snapshot that replaces ambient host detection.

pub mod config;
pub mod environment;
pub mod error;
pub mod schema_version;

pub use config::{Config, DbConfig};
pub use environment::EnvironmentSnapshot;
pub use error::{CoreError, CoreResult};
pub use schema_version::{is_schema_token, sort_schemas, SchemaVersion};
