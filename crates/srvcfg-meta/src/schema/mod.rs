//! Schema definitions for configuration elements
//!
//! A schema entry tells the engine how an element merges (its
//! [`ElementKind`]), which attributes it accepts and their declared
//! [`AttributeType`], and which features must be enabled for it to be
//! available.

pub mod builtins;
pub mod element;
pub mod kind;
pub mod types;

pub use element::ElementSchema;
pub use kind::ElementKind;
pub use types::AttributeType;
