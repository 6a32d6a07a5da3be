//! tfplug - provider lifecycle contracts for Rust
//!
//! Traits and value types a Terraform-style provider implements: provider
//! configuration, resource CRUD plus import, data source reads, the dynamic
//! attribute bag exchanged with the host and schema-level validation.

// Core modules
pub mod context;
pub mod error;
pub mod logging;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use logging::LogLevel;
pub use provider::{DataSourceFactory, Provider, ResourceFactory};
pub use resource::{Resource, ResourceWithConfigure};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{AttributePath, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue};
