//! Merge Engine
//!
//! Combines the element trees of all contributing files into one logical
//! tree. Each file's contribution is its included files' contributions,
//! combined in document order under each include's `onConflict`, followed
//! by the file's own elements. The including file therefore always wins
//! over what it includes, wherever the `<include>` sits in it.

use std::collections::HashMap;

use serde::Serialize;
use srvcfg_document::{OnConflict, XmlElement};
use srvcfg_fs::NormalizedPath;
use srvcfg_meta::{ElementKind, SchemaMetadata};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::include::{ConfigurationFile, EdgeTarget, FileId, Traversal};

/// Where a value was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: NormalizedPath,
    pub line: u32,
}

/// An attribute and the declaration it currently comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalAttribute {
    pub name: String,
    /// Raw value, before variable expansion
    pub value: String,
    pub location: SourceLocation,
}

/// The merged view of one configuration element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalElement {
    pub name: String,
    pub kind: ElementKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: Vec<LogicalAttribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LogicalElement>,
    /// First declaration
    pub location: SourceLocation,
    /// Files that declared this element
    #[serde(skip)]
    origins: Vec<FileId>,
}

impl LogicalElement {
    pub fn attribute(&self, name: &str) -> Option<&LogicalAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Raw value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(|a| a.value.as_str())
    }

    /// `name` or `name[id]`.
    pub fn display_name(&self) -> String {
        match &self.id {
            Some(id) => format!("{}[{}]", self.name, id),
            None => self.name.clone(),
        }
    }

    /// Merge identity; `None` for elements that never merge.
    fn key(&self) -> Option<(&str, Option<&str>)> {
        match self.kind {
            ElementKind::Singleton => Some((&self.name, None)),
            ElementKind::KeyedFactory => self.id.as_deref().map(|id| (self.name.as_str(), Some(id))),
            ElementKind::UnkeyedFactory => None,
        }
    }

    /// Pre-order walk over this element and its descendants.
    pub fn walk(&self) -> impl Iterator<Item = &LogicalElement> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// Merged tree plus merge diagnostics.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub elements: Vec<LogicalElement>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct MergeEngine<'a> {
    schema: &'a SchemaMetadata,
    report_overrides: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> MergeEngine<'a> {
    pub fn new(schema: &'a SchemaMetadata, report_overrides: bool) -> Self {
        Self {
            schema,
            report_overrides,
            diagnostics: Vec::new(),
        }
    }

    pub fn merge(mut self, traversal: &Traversal) -> MergeOutcome {
        // The chain is post-order, so every included file is done before
        // the file including it.
        let mut contributions: HashMap<FileId, Vec<LogicalElement>> = HashMap::new();
        for &file in &traversal.chain {
            let source = &traversal.files[file];
            let mut combined = Vec::new();
            for &index in &source.includes {
                let edge = &traversal.edges[index];
                if let EdgeTarget::Resolved { file: child } = edge.target {
                    if let Some(contribution) = contributions.remove(&child) {
                        self.combine(&mut combined, contribution, edge.on_conflict);
                    }
                }
            }
            let own = self.own_elements(source);
            self.combine(&mut combined, own, OnConflict::Merge);
            contributions.insert(file, combined);
        }

        let mut elements = Vec::new();
        for start in &traversal.starts {
            if let Some(contribution) = contributions.remove(start) {
                self.combine(&mut elements, contribution, OnConflict::Merge);
            }
        }

        MergeOutcome {
            elements,
            diagnostics: self.diagnostics,
        }
    }

    fn own_elements(&mut self, file: &ConfigurationFile) -> Vec<LogicalElement> {
        let Some(document) = &file.document else {
            return Vec::new();
        };
        document
            .elements()
            .map(|element| self.convert(element, file))
            .collect()
    }

    fn convert(&mut self, element: &XmlElement, file: &ConfigurationFile) -> LogicalElement {
        let id = element.id().map(str::to_string);
        let kind = self
            .schema
            .classify(&element.name)
            .unwrap_or_else(|| ElementKind::infer(id.is_some()));
        let location = |line| SourceLocation {
            file: file.path.clone(),
            line,
        };

        let mut logical = LogicalElement {
            name: element.name.clone(),
            kind,
            id,
            attributes: element
                .attributes
                .iter()
                .map(|a| LogicalAttribute {
                    name: a.name.clone(),
                    value: a.value.clone(),
                    location: location(a.line),
                })
                .collect(),
            text: element.text.clone(),
            children: Vec::new(),
            location: location(element.line),
            origins: vec![file.id],
        };
        for child in &element.children {
            let child = self.convert(child, file);
            self.absorb(&mut logical.children, child, false);
        }
        logical
    }

    /// Add `incoming` elements to `existing` under a conflict policy.
    fn combine(
        &mut self,
        existing: &mut Vec<LogicalElement>,
        incoming: Vec<LogicalElement>,
        policy: OnConflict,
    ) {
        for element in incoming {
            let Some(index) = find_match(existing, &element) else {
                existing.push(element);
                continue;
            };
            match policy {
                OnConflict::Merge => self.merge_into(&mut existing[index], element, false),
                OnConflict::Ignore => {
                    tracing::trace!(element = %element.display_name(), "Ignoring conflicting element");
                }
                OnConflict::Replace => self.replace(&mut existing[index], element),
            }
        }
    }

    /// Merge one element into a list with the default rules.
    fn absorb(&mut self, list: &mut Vec<LogicalElement>, element: LogicalElement, quiet: bool) {
        match find_match(list, &element) {
            Some(index) => self.merge_into(&mut list[index], element, quiet),
            None => list.push(element),
        }
    }

    fn merge_into(&mut self, existing: &mut LogicalElement, incoming: LogicalElement, quiet: bool) {
        let duplicate = incoming.origins.iter().any(|o| existing.origins.contains(o));
        if duplicate && !quiet {
            self.diagnostics.push(Diagnostic::info(
                DiagnosticKind::DuplicateElement,
                &incoming.location.file,
                incoming.location.line,
                vec![incoming.display_name()],
            ));
        }

        let display = existing.display_name();
        for attribute in incoming.attributes {
            match existing.attributes.iter_mut().find(|a| a.name == attribute.name) {
                Some(old) => {
                    if old.value != attribute.value && !duplicate && !quiet {
                        self.report_override(&display, old, &attribute);
                    }
                    *old = attribute;
                }
                None => existing.attributes.push(attribute),
            }
        }
        if incoming.text.is_some() {
            existing.text = incoming.text;
        }
        for child in incoming.children {
            self.absorb(&mut existing.children, child, quiet || duplicate);
        }
        for origin in incoming.origins {
            if !existing.origins.contains(&origin) {
                existing.origins.push(origin);
            }
        }
    }

    fn replace(&mut self, existing: &mut LogicalElement, incoming: LogicalElement) {
        self.diagnostics.push(Diagnostic::info(
            DiagnosticKind::Replace,
            &incoming.location.file,
            incoming.location.line,
            vec![
                incoming.display_name(),
                incoming.location.file.to_string(),
                existing.location.file.to_string(),
            ],
        ));
        let display = incoming.display_name();
        for attribute in &incoming.attributes {
            if let Some(old) = existing.attribute(&attribute.name) {
                if old.value != attribute.value {
                    self.report_override(&display, old, attribute);
                }
            }
        }
        *existing = incoming;
    }

    fn report_override(&mut self, element: &str, old: &LogicalAttribute, new: &LogicalAttribute) {
        if !self.report_overrides {
            return;
        }
        self.diagnostics.push(Diagnostic::info(
            DiagnosticKind::Override,
            &new.location.file,
            new.location.line,
            vec![
                format!("{element}.{}", new.name),
                old.value.clone(),
                new.value.clone(),
                old.location.file.to_string(),
                old.location.line.to_string(),
            ],
        ));
    }
}

fn find_match(list: &[LogicalElement], element: &LogicalElement) -> Option<usize> {
    let key = element.key()?;
    list.iter().position(|e| e.key() == Some(key))
}
