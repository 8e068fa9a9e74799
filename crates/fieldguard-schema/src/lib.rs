//! Type-keyed field validation.
//!
//! Validators are registered once per field of a type, at startup, and
//! shared by every instance of that type. [`SchemaRegistry::check`] looks up
//! the schema for an instance's type, runs each field's validators in
//! declaration order and reports failures per field.
//!
//! Instances are inspected through their `serde` representation: the own
//! fields of an instance are the entries of the JSON object it serializes to.

pub mod config;
pub mod error;
pub mod identity;
pub mod registry;
pub mod report;
pub mod schema;
pub mod validator;

pub use config::RegistryConfig;
pub use error::{Result, SchemaError};
pub use identity::TypeIdentity;
pub use registry::SchemaRegistry;
pub use report::ErrorReport;
pub use schema::{FieldKey, Schema};
pub use validator::{Outcome, Validator};
