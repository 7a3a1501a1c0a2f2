//! Schema file loading
//!
//! Extends a [`SchemaMetadata`] catalog from a TOML, JSON or YAML file
//! holding a list of elements under the `element` key:
//!
//! ```toml
//! [[element]]
//! name = "customLogin"
//! kind = "singleton"
//! features = ["appSecurity"]
//!
//! [element.attributes]
//! realm = "string"
//! timeout = "duration"
//! ```

use serde::Deserialize;
use srvcfg_fs::{ConfigStore, NormalizedPath};

use crate::{ElementSchema, Result, SchemaMetadata};

#[derive(Debug, Default, Deserialize)]
struct SchemaFile {
    #[serde(default, rename = "element")]
    elements: Vec<ElementSchema>,
}

/// Loads element schemas from disk.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    store: ConfigStore,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read all element entries from a schema file.
    pub fn load_file(&self, path: &NormalizedPath) -> Result<Vec<ElementSchema>> {
        let file: SchemaFile = self.store.load(path)?;
        tracing::debug!(%path, count = file.elements.len(), "Loaded schema file");
        Ok(file.elements)
    }

    /// Built-in catalog extended with the entries of `path`.
    pub fn load_with_builtins(&self, path: &NormalizedPath) -> Result<SchemaMetadata> {
        let mut schema = SchemaMetadata::with_builtins();
        schema.extend(self.load_file(path)?);
        Ok(schema)
    }
}
