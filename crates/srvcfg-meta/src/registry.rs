//! Element catalog
//!
//! Maps element names to their [`ElementSchema`]. The merge engine asks it
//! how an element merges; validation asks it which attributes exist and
//! what type they carry.

use std::collections::BTreeMap;

use crate::schema::{AttributeType, ElementKind, ElementSchema, builtins};

/// Catalog of element schemas keyed by element name.
///
/// # Example
///
/// ```
/// use srvcfg_meta::{ElementKind, SchemaMetadata};
///
/// let schema = SchemaMetadata::with_builtins();
/// assert_eq!(schema.classify("logging"), Some(ElementKind::Singleton));
/// assert_eq!(schema.classify("noSuchElement"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaMetadata {
    elements: BTreeMap<String, ElementSchema>,
}

impl SchemaMetadata {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the built-in server elements.
    pub fn with_builtins() -> Self {
        let mut schema = Self::new();
        schema.extend(builtins::builtin_elements());
        schema
    }

    /// Register an element. A previous entry of the same name is replaced.
    pub fn register(&mut self, element: ElementSchema) {
        self.elements.insert(element.name.clone(), element);
    }

    /// Register several elements, later entries replacing earlier ones.
    pub fn extend(&mut self, elements: impl IntoIterator<Item = ElementSchema>) {
        for element in elements {
            self.register(element);
        }
    }

    /// Merge classification of an element, or `None` when unknown.
    pub fn classify(&self, name: &str) -> Option<ElementKind> {
        self.elements.get(name).map(|e| e.kind)
    }

    pub fn element(&self, name: &str) -> Option<&ElementSchema> {
        self.elements.get(name)
    }

    /// Declared type of `element.attribute`.
    pub fn attribute_type(&self, element: &str, attribute: &str) -> Option<&AttributeType> {
        self.elements.get(element)?.attributes.get(attribute)
    }

    /// All known element names, sorted.
    pub fn element_names(&self) -> Vec<&str> {
        self.elements.keys().map(String::as_str).collect()
    }

    /// Declared attribute names of an element, sorted.
    pub fn attribute_names(&self, element: &str) -> Vec<&str> {
        self.elements
            .get(element)
            .map(|e| e.attributes.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
