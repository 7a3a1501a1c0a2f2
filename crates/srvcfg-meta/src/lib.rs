//! Schema metadata and validation settings for server configuration.
//!
//! The resolution engine does not know which elements are singletons or
//! which attributes are durations; it asks a [`SchemaMetadata`] catalog.
//! This crate also carries the user-tunable [`ValidationSettings`].

pub mod error;
pub mod loader;
pub mod registry;
pub mod schema;
pub mod settings;

pub use error::{Error, Result};
pub use loader::SchemaLoader;
pub use registry::SchemaMetadata;
pub use schema::{AttributeType, ElementKind, ElementSchema};
pub use settings::{IgnoreRule, SettingsResolver, ValidationSettings};
