//! Configuration resolution engine for multi-file XML server configuration
//!
//! This crate turns a server directory into one effective configuration:
//!
//! - **Include traversal**: nested `<include>` files and `configDropins`
//! - **Variables**: predefined, environment and declared variables with
//!   `${...}` expressions
//! - **Merge**: one logical tree under `onConflict` policies, with
//!   provenance for every attribute
//! - **Validation**: schema recognition, type checks and best-match hints
//! - **Revalidation**: dependency tracking and per-root background workers
//!
//! # Architecture
//!
//! ```text
//!                     srvcfg-cli
//!                         |
//!                    srvcfg-core
//!                         |
//!        +----------------+----------------+
//!        |                |                |
//!    srvcfg-fs      srvcfg-meta     srvcfg-document
//! ```
//!
//! # Example
//!
//! ```no_run
//! use srvcfg_core::{ConfigEngine, Result};
//! use srvcfg_fs::{DiskProvider, ServerLayout};
//! use srvcfg_meta::{SchemaMetadata, ValidationSettings};
//!
//! fn example() -> Result<()> {
//!     let engine = ConfigEngine::new(SchemaMetadata::with_builtins(), ValidationSettings::default());
//!     let layout = ServerLayout::from_server_dir("/opt/wlp/usr/servers/defaultServer");
//!     let resolved = engine.resolve(&layout, &DiskProvider::new())?;
//!     for diagnostic in &resolved.diagnostics {
//!         println!("{diagnostic}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod dependency;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod include;
pub mod merge;
pub mod revalidate;
pub mod validate;
pub mod values;
pub mod variables;

pub use cache::DocumentCache;
pub use dependency::{DependencyGraph, RootDependencies};
pub use diagnostics::{Diagnostic, DiagnosticKind, QuickFix, Severity, count_severity};
pub use engine::{ConfigEngine, EffectiveValue, ResolvedConfiguration};
pub use error::{Error, Result};
pub use fuzzy::{DEFAULT_THRESHOLD, best_match, similarity};
pub use include::{ConfigurationFile, EdgeTarget, FileId, IncludeEdge, Layer};
pub use merge::{LogicalAttribute, LogicalElement, MergeEngine, SourceLocation};
pub use revalidate::{ResolutionEvent, Revalidator, Trigger};
pub use validate::Validator;
pub use variables::{Referrers, Resolution, Resolver, Tier, VariableEntry, VariableTable};
