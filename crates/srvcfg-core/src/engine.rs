//! Resolution pipeline
//!
//! [`ConfigEngine::resolve`] runs one root end to end: predefined and
//! environment variables, include traversal, variable declarations,
//! merge and validation. Configuration problems end up in
//! [`ResolvedConfiguration::diagnostics`]; only infrastructure failures
//! are returned as errors.

use std::sync::Arc;

use serde::Serialize;
use srvcfg_document::Directive;
use srvcfg_fs::{FileProvider, NormalizedPath, ServerLayout};
use srvcfg_meta::{SchemaMetadata, ValidationSettings};

use crate::Result;
use crate::cache::DocumentCache;
use crate::dependency::RootDependencies;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity};
use crate::include::{ConfigurationFile, FileId, IncludeEdge, IncludeResolver, Traversal};
use crate::merge::{LogicalElement, MergeEngine, SourceLocation};
use crate::validate::{self, Validator};
use crate::variables::{Referrers, Resolver, Tier, VariableEntry, VariableTable, parse_env};

/// Prefix under which `server.env` keys are visible.
pub const ENV_PREFIX: &str = "env.";

/// Shared, reusable resolution engine.
#[derive(Debug, Clone)]
pub struct ConfigEngine {
    schema: Arc<SchemaMetadata>,
    settings: ValidationSettings,
    cache: Arc<DocumentCache>,
}

impl ConfigEngine {
    pub fn new(schema: SchemaMetadata, settings: ValidationSettings) -> Self {
        Self {
            schema: Arc::new(schema),
            settings,
            cache: Arc::new(DocumentCache::new()),
        }
    }

    /// Share a document cache with other engines.
    pub fn with_cache(mut self, cache: Arc<DocumentCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<DocumentCache> {
        &self.cache
    }

    pub fn schema(&self) -> &SchemaMetadata {
        &self.schema
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Resolve the configuration rooted at `layout`.
    ///
    /// Fails only when the root `server.xml` is absent or a file cannot be
    /// read at all. Resolving the same inputs twice yields equal results.
    pub fn resolve(
        &self,
        layout: &ServerLayout,
        provider: &dyn FileProvider,
    ) -> Result<ResolvedConfiguration> {
        tracing::debug!(server = %layout.server_dir, "Resolving server configuration");

        let base = base_variables(layout, provider);
        let traversal = IncludeResolver::new(provider, &self.cache, base.clone()).resolve(layout)?;

        let mut diagnostics = traversal.diagnostics.clone();
        let variables = declare_chain(base, &traversal, &mut diagnostics);

        let merged = MergeEngine::new(&self.schema, self.settings.report_overrides).merge(&traversal);
        diagnostics.extend(merged.diagnostics);

        let referrers = validate::referrer_index(&self.schema, &merged.elements);
        let validation = Validator::new(
            &self.schema,
            &self.settings,
            &variables,
            &referrers,
            &merged.elements,
        )
        .validate(&traversal);
        diagnostics.extend(validation);

        let dependencies = RootDependencies::from_traversal(layout, &traversal);
        let Traversal {
            files,
            edges,
            chain,
            root,
            ..
        } = traversal;

        tracing::debug!(
            server = %layout.server_dir,
            files = chain.len(),
            diagnostics = diagnostics.len(),
            "Resolved server configuration"
        );

        Ok(ResolvedConfiguration {
            root: files[root].path.clone(),
            server_dir: layout.server_dir.clone(),
            files,
            chain,
            edges,
            variables,
            referrers,
            elements: merged.elements,
            diagnostics,
            dependencies,
        })
    }
}

/// Predefined location variables and `server.env` entries.
fn base_variables(layout: &ServerLayout, provider: &dyn FileProvider) -> VariableTable {
    let mut table = VariableTable::new();
    for (name, value) in layout.predefined_variables() {
        table.declare(VariableEntry::new(name, Tier::Builtin).with_value(value));
    }

    for env_file in layout.env_files() {
        let bytes = match provider.read(&env_file) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(path = %env_file, error = %e, "Skipping unreadable environment file");
                continue;
            }
        };
        for entry in parse_env(&String::from_utf8_lossy(&bytes)) {
            table.declare(
                VariableEntry::new(format!("{ENV_PREFIX}{}", entry.key), Tier::Environment)
                    .with_value(entry.value)
                    .declared_at(&env_file, entry.line),
            );
        }
    }
    table
}

/// Add the `<variable>` declarations of every contributing file.
fn declare_chain(
    mut table: VariableTable,
    traversal: &Traversal,
    diagnostics: &mut Vec<Diagnostic>,
) -> VariableTable {
    for &id in &traversal.chain {
        let file = &traversal.files[id];
        let Some(document) = &file.document else {
            continue;
        };
        for directive in document.directives() {
            let Directive::Variable(variable) = directive else {
                continue;
            };
            let Some(name) = variable.name.as_deref().filter(|n| !n.is_empty()) else {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::VariableMissingName,
                    &file.path,
                    variable.line,
                    Vec::new(),
                ));
                continue;
            };
            if name.contains("${") {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::VariableNameInvalid,
                    &file.path,
                    variable.line,
                    vec![name.to_string()],
                ));
            }
            if variable.value.is_none() && variable.default_value.is_none() {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::VariableMissingValue,
                    &file.path,
                    variable.line,
                    vec![name.to_string()],
                ));
            }

            let mut entry =
                VariableEntry::new(name, file.layer.tier()).declared_at(&file.path, variable.line);
            entry.value = variable.value.clone();
            entry.default_value = variable.default_value.clone();
            table.declare(entry);
        }
    }
    table
}

/// The effective value of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveValue {
    /// Value as written
    pub raw: String,
    /// Value after variable expansion, `None` when expansion failed
    pub resolved: Option<String>,
    /// Declaration that won
    pub location: SourceLocation,
}

/// Result of resolving one root.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfiguration {
    /// Path of the root `server.xml`
    pub root: NormalizedPath,
    pub server_dir: NormalizedPath,
    pub files: Vec<ConfigurationFile>,
    /// Contributing files, lowest precedence first
    pub chain: Vec<FileId>,
    pub edges: Vec<IncludeEdge>,
    pub variables: VariableTable,
    /// Elements referring to each id, for `${list(id)}`
    #[serde(skip)]
    pub referrers: Referrers,
    pub elements: Vec<LogicalElement>,
    pub diagnostics: Vec<Diagnostic>,
    pub dependencies: RootDependencies,
}

impl ResolvedConfiguration {
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.variables).with_referrers(&self.referrers)
    }

    /// Top-level logical element by name and, for keyed elements, id.
    ///
    /// Without an id the first element of that name is returned.
    pub fn element(&self, name: &str, id: Option<&str>) -> Option<&LogicalElement> {
        self.elements
            .iter()
            .filter(|e| e.name == name)
            .find(|e| id.is_none() || e.id.as_deref() == id)
    }

    /// Effective value of `element[id].attribute`, with the declaration
    /// that won.
    pub fn lookup(&self, element: &str, id: Option<&str>, attribute: &str) -> Option<EffectiveValue> {
        let attribute = self.element(element, id)?.attribute(attribute)?;
        let resolution = self.resolver().resolve(&attribute.value);
        Some(EffectiveValue {
            raw: attribute.value.clone(),
            resolved: resolution.is_ok().then_some(resolution.value),
            location: attribute.location.clone(),
        })
    }

    /// Lower-cased features enabled by the merged `featureManager`.
    pub fn enabled_features(&self) -> Vec<String> {
        validate::enabled_features(&self.elements)
    }

    /// Contributing file paths, lowest precedence first.
    pub fn chain_paths(&self) -> Vec<&NormalizedPath> {
        self.chain.iter().map(|&id| &self.files[id].path).collect()
    }

    pub fn diagnostics_for<'a>(
        &'a self,
        file: &'a NormalizedPath,
    ) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| &d.file == file)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}
