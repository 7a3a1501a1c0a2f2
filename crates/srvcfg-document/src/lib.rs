//! Document Model for server configuration files
//!
//! Parses one physical XML file into an owned element tree that carries
//! 1-based line numbers for every element and attribute, and extracts the
//! top-level `<include>` and `<variable>` directives the resolver acts on.

pub mod directive;
pub mod document;
pub mod element;
pub mod error;

pub use directive::{Directive, IncludeDirective, OnConflict, VariableDirective};
pub use document::ConfigDocument;
pub use element::{XmlAttribute, XmlElement};
pub use error::{Error, Result};
