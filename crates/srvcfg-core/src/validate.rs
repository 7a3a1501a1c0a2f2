//! Per-element validation
//!
//! Every element of every contributing file is checked, not only the
//! declarations that won the merge: schema recognition, feature
//! availability, `${...}` evaluation and declared-type checks.

use srvcfg_document::XmlElement;
use srvcfg_fs::NormalizedPath;
use srvcfg_meta::{AttributeType, ElementSchema, SchemaMetadata, ValidationSettings};

use crate::diagnostics::{Diagnostic, DiagnosticKind, QuickFix, Severity};
use crate::fuzzy::best_match;
use crate::include::Traversal;
use crate::merge::LogicalElement;
use crate::values::{self, IdIndex, Mismatch};
use crate::variables::{Failure, FailureKind, Referrers, Resolver, VariableTable};

const NO_EXCLUSIONS: &[&str] = &[];

pub struct Validator<'a> {
    schema: &'a SchemaMetadata,
    settings: &'a ValidationSettings,
    table: &'a VariableTable,
    referrers: &'a Referrers,
    ids: IdIndex,
    features: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Validator<'a> {
    pub fn new(
        schema: &'a SchemaMetadata,
        settings: &'a ValidationSettings,
        table: &'a VariableTable,
        referrers: &'a Referrers,
        elements: &[LogicalElement],
    ) -> Self {
        Self {
            schema,
            settings,
            table,
            referrers,
            ids: id_index(elements),
            features: enabled_features(elements),
            diagnostics: Vec::new(),
        }
    }

    pub fn validate(mut self, traversal: &Traversal) -> Vec<Diagnostic> {
        for &file in &traversal.chain {
            let source = &traversal.files[file];
            let Some(document) = &source.document else {
                continue;
            };
            for top in document.elements() {
                for element in top.descendants() {
                    self.check_element(element, &source.path);
                }
            }
        }
        self.diagnostics
    }

    fn check_element(&mut self, element: &XmlElement, file: &NormalizedPath) {
        let schema = self.schema.element(&element.name);
        let ignored = self.settings.is_element_ignored(&element.name);

        match schema {
            None if !ignored => {
                let suggestion = best_match(
                    &self.schema.element_names(),
                    &element.name,
                    NO_EXCLUSIONS,
                    self.settings.threshold,
                );
                self.diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::UnrecognizedElement,
                        file,
                        element.line,
                        vec![element.name.clone()],
                    )
                    .with_best_match(suggestion)
                    .with_fix(QuickFix::IgnoreElement {
                        element: element.name.clone(),
                    }),
                );
            }
            Some(schema) if !ignored && !schema.is_available(&self.features) => {
                self.diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::UnavailableElement,
                    file,
                    element.line,
                    vec![element.name.clone(), schema.features.join(", ")],
                ));
            }
            _ => {}
        }

        for attribute in &element.attributes {
            if let Some(schema) = schema {
                self.check_recognized(schema, element, &attribute.name, attribute.line, file);
            }

            let resolution = Resolver::new(self.table)
                .with_referrers(self.referrers)
                .resolve(&attribute.value);
            if !resolution.is_ok() {
                for failure in &resolution.failures {
                    let diagnostic = self.failure_diagnostic(failure, file, attribute.line);
                    self.diagnostics.push(diagnostic);
                }
                continue;
            }

            let Some(ty) = schema.and_then(|s| s.attributes.get(&attribute.name)) else {
                continue;
            };
            let qualified = format!("{}.{}", element.name, attribute.name);
            let outcome = match &resolution.items {
                Some(items) => {
                    let item_type = match ty {
                        AttributeType::List(inner) => inner.as_ref(),
                        other => other,
                    };
                    items
                        .iter()
                        .try_for_each(|item| values::check(item_type, item, &self.ids))
                }
                None => values::check(ty, &resolution.value, &self.ids),
            };
            if let Err((value, mismatch)) = outcome {
                let diagnostic = mismatch_diagnostic(
                    &qualified,
                    &value,
                    mismatch,
                    file,
                    attribute.line,
                    self.settings.threshold,
                );
                self.diagnostics.push(diagnostic);
            }
        }
    }

    fn check_recognized(
        &mut self,
        schema: &ElementSchema,
        element: &XmlElement,
        attribute: &str,
        line: u32,
        file: &NormalizedPath,
    ) {
        if attribute == "id"
            || schema.open
            || schema.attributes.contains_key(attribute)
            || self.settings.is_attribute_ignored(&element.name, attribute)
        {
            return;
        }
        let present: Vec<&str> = element.attributes.iter().map(|a| a.name.as_str()).collect();
        let candidates: Vec<&str> = schema.attributes.keys().map(String::as_str).collect();
        let suggestion = best_match(&candidates, attribute, &present, self.settings.threshold);
        self.diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::UnrecognizedAttribute,
                file,
                line,
                vec![element.name.clone(), attribute.to_string()],
            )
            .with_best_match(suggestion)
            .with_fix(QuickFix::IgnoreAttribute {
                element: element.name.clone(),
                attribute: attribute.to_string(),
            }),
        );
    }

    fn failure_diagnostic(&self, failure: &Failure, file: &NormalizedPath, line: u32) -> Diagnostic {
        let expression = failure.expression.clone();
        let error = |kind, args| Diagnostic::new(kind, Severity::Error, file, line, args);
        match &failure.kind {
            FailureKind::Undefined { name } => Diagnostic::warning(
                DiagnosticKind::VariableUndefined,
                file,
                line,
                vec![name.clone()],
            )
            .with_fix(QuickFix::DeclareVariable { name: name.clone() })
            .with_best_match(self.similar_variable(name)),
            FailureKind::Recursive { name } => {
                error(DiagnosticKind::VariableRecursive, vec![name.clone()])
            }
            FailureKind::MissingLeftOperand => {
                error(DiagnosticKind::MissingLeftOperand, vec![expression])
            }
            FailureKind::MissingRightOperand => {
                error(DiagnosticKind::MissingRightOperand, vec![expression])
            }
            FailureKind::UndefinedOperand { operand } => error(
                DiagnosticKind::UndefinedOperand,
                vec![expression, operand.clone()],
            )
            .with_fix(QuickFix::DeclareVariable {
                name: operand.clone(),
            })
            .with_best_match(self.similar_variable(operand)),
            FailureKind::InvalidOperand { operand, value } => error(
                DiagnosticKind::InvalidOperand,
                vec![expression, operand.clone(), value.clone()],
            ),
            FailureKind::InvalidExpression => {
                error(DiagnosticKind::InvalidVariableExpression, vec![expression])
            }
            FailureKind::DivisionByZero => error(DiagnosticKind::DivisionByZero, vec![expression]),
            FailureKind::Overflow => error(DiagnosticKind::ArithmeticOverflow, vec![expression]),
        }
    }

    fn similar_variable(&self, name: &str) -> Option<String> {
        let names: Vec<&str> = self.table.names().collect();
        best_match(&names, name, NO_EXCLUSIONS, self.settings.threshold)
    }
}

fn mismatch_diagnostic(
    attribute: &str,
    value: &str,
    mismatch: Mismatch,
    file: &NormalizedPath,
    line: u32,
    threshold: u8,
) -> Diagnostic {
    let args = |extra: Option<String>| {
        let mut args = vec![attribute.to_string(), value.to_string()];
        args.extend(extra);
        args
    };
    match mismatch {
        Mismatch::Primitive(type_name) => Diagnostic::error(
            DiagnosticKind::InvalidType,
            file,
            line,
            args(Some(type_name.to_string())),
        ),
        Mismatch::Duration => {
            Diagnostic::error(DiagnosticKind::InvalidDuration, file, line, args(None))
        }
        Mismatch::Enum(allowed) => {
            let suggestion = best_match(&allowed, value, NO_EXCLUSIONS, threshold);
            Diagnostic::error(
                DiagnosticKind::InvalidEnum,
                file,
                line,
                args(Some(allowed.join(", "))),
            )
            .with_best_match(suggestion)
        }
        Mismatch::Union(description) => Diagnostic::error(
            DiagnosticKind::UnionNoMatch,
            file,
            line,
            args(Some(description)),
        ),
        Mismatch::Reference { target, known } => {
            let suggestion = best_match(&known, value, NO_EXCLUSIONS, threshold);
            Diagnostic::error(
                DiagnosticKind::UnresolvedReference,
                file,
                line,
                args(Some(target)),
            )
            .with_best_match(suggestion)
        }
    }
}

/// Ids of every logical element, grouped by element name.
pub fn id_index(elements: &[LogicalElement]) -> IdIndex {
    let mut index = IdIndex::new();
    for element in elements.iter().flat_map(LogicalElement::walk) {
        if let Some(id) = &element.id {
            let ids = index.entry(element.name.clone()).or_default();
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    index
}

/// Elements referring to each id through a reference-typed attribute.
///
/// Values still containing `${` are skipped; they are not ids yet.
pub fn referrer_index(schema: &SchemaMetadata, elements: &[LogicalElement]) -> Referrers {
    let mut index = Referrers::new();
    for element in elements.iter().flat_map(LogicalElement::walk) {
        let Some(element_schema) = schema.element(&element.name) else {
            continue;
        };
        let label = element.id.as_ref().unwrap_or(&element.name);
        for attribute in &element.attributes {
            let is_reference = match element_schema.attributes.get(&attribute.name) {
                Some(AttributeType::Reference(_)) => true,
                Some(AttributeType::List(inner)) => {
                    matches!(inner.as_ref(), AttributeType::Reference(_))
                }
                _ => false,
            };
            if !is_reference || attribute.value.contains("${") {
                continue;
            }
            for target in values::split_list(&attribute.value) {
                let referring = index.entry(target.to_string()).or_default();
                if !referring.contains(label) {
                    referring.push(label.clone());
                }
            }
        }
    }
    index
}

/// Lower-cased features of the merged `featureManager`, de-duplicated.
pub fn enabled_features(elements: &[LogicalElement]) -> Vec<String> {
    let mut features: Vec<String> = Vec::new();
    for manager in elements.iter().filter(|e| e.name == "featureManager") {
        for feature in manager.children.iter().filter(|c| c.name == "feature") {
            let Some(name) = feature.text.as_deref().map(str::trim) else {
                continue;
            };
            let name = name.to_lowercase();
            if !name.is_empty() && !features.contains(&name) {
                features.push(name);
            }
        }
    }
    features
}
