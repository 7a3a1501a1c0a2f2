//! Include traversal
//!
//! Files are walked depth-first with an explicit frame stack. A global
//! visited set, keyed by physical identity, stops both cycles and repeated
//! traversal of files reached twice. `<variable>` declarations met before
//! an `<include>` are visible to its `location`.
//!
//! The root chain is walked before the default dropins so a file reachable
//! from both belongs to the config tier. Default dropin variables are
//! declared up front so root include locations can still use them.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use srvcfg_document::{Directive, IncludeDirective, OnConflict, VariableDirective};
use srvcfg_fs::{FileProvider, NormalizedPath, ServerLayout};

use super::{ConfigurationFile, EdgeTarget, FileId, IncludeEdge, Layer};
use crate::cache::DocumentCache;
use crate::diagnostics::{Diagnostic, DiagnosticKind, QuickFix, Severity};
use crate::variables::{FailureKind, Resolver, VariableEntry, VariableTable};
use crate::{Error, Result};

const XML_EXTENSION: &str = "xml";

/// Everything learned while following includes.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    pub files: Vec<ConfigurationFile>,
    pub edges: Vec<IncludeEdge>,
    /// Contributing files, lowest precedence first
    pub chain: Vec<FileId>,
    /// Start files in precedence order: default dropins, root, override dropins
    pub starts: Vec<FileId>,
    /// The root `server.xml`
    pub root: FileId,
    pub diagnostics: Vec<Diagnostic>,
    /// Include targets that were looked for but not found
    pub missing: BTreeSet<NormalizedPath>,
}

struct Frame {
    file: FileId,
    directives: Vec<Directive>,
    next: usize,
}

/// Follows includes and dropins for one root.
pub struct IncludeResolver<'a> {
    provider: &'a dyn FileProvider,
    cache: &'a DocumentCache,
    /// Declarations visible so far
    table: VariableTable,
    visited: HashMap<NormalizedPath, FileId>,
    reach: Vec<BTreeSet<FileId>>,
    finished: Vec<bool>,
    reported: HashSet<FileId>,
    /// Dropins whose variables were declared before the walk
    predeclared: HashSet<NormalizedPath>,
    out: Traversal,
}

impl<'a> IncludeResolver<'a> {
    /// `table` holds the declarations known before any file is read
    /// (predefined and environment variables).
    pub fn new(provider: &'a dyn FileProvider, cache: &'a DocumentCache, table: VariableTable) -> Self {
        Self {
            provider,
            cache,
            table,
            visited: HashMap::new(),
            reach: Vec::new(),
            finished: Vec::new(),
            reported: HashSet::new(),
            predeclared: HashSet::new(),
            out: Traversal::default(),
        }
    }

    /// Resolve the root configuration of `layout` and its dropins.
    pub fn resolve(mut self, layout: &ServerLayout) -> Result<Traversal> {
        let root_path = layout.server_xml();
        let Some(root_bytes) = self.provider.read(&root_path)? else {
            return Err(Error::ServerNotFound {
                path: root_path.to_string(),
            });
        };

        let defaults_dir = layout.defaults_dropins_dir();
        let overrides_dir = layout.overrides_dropins_dir();
        let defaults = self.dropins(&defaults_dir);
        for path in &defaults {
            self.predeclare(path);
        }

        tracing::debug!(path = %root_path, "Resolving root configuration");
        let root = self.open(root_path, &root_bytes, Layer::Config);
        self.out.files[root].dropins = vec![defaults_dir, overrides_dir.clone()];
        self.out.root = root;
        self.walk(root);
        let root_end = self.out.chain.len();

        for path in defaults {
            self.traverse_dropin(path, Layer::DefaultDropins);
        }
        // Default dropins rank below the root chain.
        let defaults_end = self.out.chain.len();
        self.out.chain[..defaults_end].rotate_left(root_end);
        self.out.starts.push(root);

        for path in self.dropins(&overrides_dir) {
            self.traverse_dropin(path, Layer::OverrideDropins);
        }

        Ok(self.out)
    }

    /// Declare the top-level variables of a default dropin without
    /// claiming the file or anything it includes.
    fn predeclare(&mut self, path: &NormalizedPath) {
        let Ok(Some(bytes)) = self.provider.read(path) else {
            return;
        };
        let canonical = self.provider.canonicalize(path);
        let Ok(document) = self.cache.get_or_parse(&canonical, &bytes) else {
            return;
        };
        for directive in document.directives() {
            let Directive::Variable(variable) = directive else {
                continue;
            };
            let Some(name) = variable.name.as_deref() else {
                continue;
            };
            let mut entry = VariableEntry::new(name, Layer::DefaultDropins.tier())
                .declared_at(path, variable.line);
            entry.value = variable.value.clone();
            entry.default_value = variable.default_value.clone();
            self.table.declare(entry);
        }
        self.predeclared.insert(canonical);
    }

    /// XML files directly inside a dropins folder, sorted by name.
    fn dropins(&self, dir: &NormalizedPath) -> Vec<NormalizedPath> {
        match self.provider.list_files(dir) {
            Ok(files) => files
                .into_iter()
                .filter(|f| {
                    f.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(XML_EXTENSION))
                })
                .collect(),
            Err(e) => {
                tracing::warn!(%dir, error = %e, "Cannot list dropins folder - skipping");
                Vec::new()
            }
        }
    }

    fn traverse_dropin(&mut self, path: NormalizedPath, layer: Layer) {
        let canonical = self.provider.canonicalize(&path);
        if self.visited.contains_key(&canonical) {
            return;
        }
        match self.provider.read(&path) {
            Ok(Some(bytes)) => {
                tracing::debug!(%path, ?layer, "Loading dropin");
                let id = self.open(path, &bytes, layer);
                self.out.starts.push(id);
                self.walk(id);
            }
            Ok(None) => tracing::debug!(%path, "Dropin vanished - skipping"),
            Err(e) => tracing::warn!(%path, error = %e, "Cannot read dropin - skipping"),
        }
    }

    /// Register a file and parse it through the cache.
    fn open(&mut self, path: NormalizedPath, bytes: &[u8], layer: Layer) -> FileId {
        let id = self.out.files.len();
        let canonical = self.provider.canonicalize(&path);
        let dir = path.parent().unwrap_or_else(|| path.clone());

        let document = match self.cache.get_or_parse(&canonical, bytes) {
            Ok(document) => Some(document),
            Err(e) => {
                self.out.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::MalformedXml,
                    &path,
                    e.line(),
                    vec![path.to_string(), e.to_string()],
                ));
                None
            }
        };

        self.visited.insert(canonical.clone(), id);
        self.reach.push(BTreeSet::new());
        self.finished.push(false);
        self.out.files.push(ConfigurationFile {
            id,
            path,
            canonical,
            dir,
            layer,
            document,
            includes: Vec::new(),
            dropins: Vec::new(),
        });
        id
    }

    fn frame(&self, file: FileId) -> Frame {
        let directives = self.out.files[file]
            .document
            .as_ref()
            .map(|doc| doc.directives())
            .unwrap_or_default();
        Frame {
            file,
            directives,
            next: 0,
        }
    }

    /// Depth-first walk from `start`; files join the chain in post-order.
    fn walk(&mut self, start: FileId) {
        let mut stack = vec![self.frame(start)];
        while let Some(top) = stack.last_mut() {
            let Some(directive) = top.directives.get(top.next).cloned() else {
                if let Some(done) = stack.pop() {
                    self.finish(done.file);
                }
                continue;
            };
            top.next += 1;
            let file = top.file;

            match directive {
                Directive::Variable(variable) => self.declare(file, &variable),
                Directive::Include(include) => {
                    if let Some(child) = self.follow(file, &include) {
                        stack.push(self.frame(child));
                    }
                }
            }
        }
    }

    fn declare(&mut self, file: FileId, variable: &VariableDirective) {
        let Some(name) = variable.name.as_deref() else {
            return;
        };
        let source = &self.out.files[file];
        if self.predeclared.contains(&source.canonical) {
            return;
        }
        let mut entry = VariableEntry::new(name, source.layer.tier())
            .declared_at(&source.path, variable.line);
        entry.value = variable.value.clone();
        entry.default_value = variable.default_value.clone();
        self.table.declare(entry);
    }

    /// Follow one include. Returns the file to descend into, if any.
    fn follow(&mut self, from: FileId, include: &IncludeDirective) -> Option<FileId> {
        let (path, dir, layer) = {
            let source = &self.out.files[from];
            (source.path.clone(), source.dir.clone(), source.layer)
        };

        let optional = include.optional().unwrap_or_else(|raw| {
            self.out.diagnostics.push(Diagnostic::warning(
                DiagnosticKind::InvalidOptional,
                &path,
                include.line,
                vec![raw.to_string()],
            ));
            false
        });
        let on_conflict = include.on_conflict().unwrap_or_else(|raw| {
            self.out.diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::InvalidOnConflict,
                    &path,
                    include.line,
                    vec![raw.to_string()],
                )
                .with_best_match(crate::fuzzy::best_match(
                    &["MERGE", "IGNORE", "REPLACE"],
                    &raw.to_uppercase(),
                    &[] as &[&str],
                    crate::fuzzy::DEFAULT_THRESHOLD,
                )),
            );
            OnConflict::Merge
        });

        let mut edge = IncludeEdge {
            from,
            line: include.line,
            location: include.location.clone(),
            optional,
            on_conflict,
            target: EdgeTarget::NoLocation,
        };

        let location = include.location.as_deref().map(str::trim).unwrap_or_default();
        if location.is_empty() {
            self.out.diagnostics.push(Diagnostic::error(
                DiagnosticKind::IncludeLocationMissing,
                &path,
                include.line,
                Vec::new(),
            ));
            self.push_edge(edge);
            return None;
        }

        let resolution = Resolver::new(&self.table).resolve(location);
        if let Some(failure) = resolution.failures.first() {
            let (variable, fix) = match &failure.kind {
                FailureKind::Undefined { name } => (
                    format!("${{{name}}}"),
                    Some(QuickFix::DeclareVariable { name: name.clone() }),
                ),
                FailureKind::Recursive { name } => (format!("${{{name}}}"), None),
                _ => (failure.expression.clone(), None),
            };
            let mut diagnostic = Diagnostic::error(
                DiagnosticKind::IncludeUnresolved,
                &path,
                include.line,
                vec![location.to_string(), variable.clone()],
            );
            if let Some(fix) = fix {
                diagnostic = diagnostic.with_fix(fix);
            }
            self.out.diagnostics.push(diagnostic);
            edge.target = EdgeTarget::Unresolved { variable };
            self.push_edge(edge);
            return None;
        }

        let target = dir.join(resolution.value.trim());
        let canonical = self.provider.canonicalize(&target);
        tracing::debug!(from = %path, target = %target, "Resolving include");

        if let Some(&existing) = self.visited.get(&canonical) {
            edge.target = EdgeTarget::AlreadyIncluded { file: existing };
            self.push_edge(edge);
            return None;
        }

        match self.provider.read(&target) {
            Ok(Some(bytes)) => {
                let id = self.open(target, &bytes, layer);
                edge.target = EdgeTarget::Resolved { file: id };
                self.push_edge(edge);
                Some(id)
            }
            Ok(None) => {
                let (kind, severity) = if optional {
                    (DiagnosticKind::IncludeOptionalNotFound, Severity::Info)
                } else {
                    (DiagnosticKind::IncludeNotFound, Severity::Error)
                };
                self.out.diagnostics.push(Diagnostic::new(
                    kind,
                    severity,
                    &path,
                    include.line,
                    vec![target.to_string()],
                ));
                self.out.missing.insert(target.clone());
                edge.target = EdgeTarget::Missing { path: target };
                self.push_edge(edge);
                None
            }
            Err(e) => {
                self.out.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::ReadFailed,
                    &path,
                    include.line,
                    vec![target.to_string(), e.to_string()],
                ));
                self.out.missing.insert(target.clone());
                edge.target = EdgeTarget::Missing { path: target };
                self.push_edge(edge);
                None
            }
        }
    }

    fn push_edge(&mut self, edge: IncludeEdge) {
        let index = self.out.edges.len();
        self.out.files[edge.from].includes.push(index);
        self.out.edges.push(edge);
    }

    /// Post-order step: add to the chain, compute what the file reaches,
    /// and report files it reaches through more than one direct include.
    fn finish(&mut self, file: FileId) {
        self.out.chain.push(file);

        // Per direct include: the target plus everything it reaches. A
        // target still on the stack (a cycle) contributes only itself.
        let sets: Vec<(u32, BTreeSet<FileId>)> = self.out.files[file]
            .includes
            .iter()
            .filter_map(|&index| {
                let edge = &self.out.edges[index];
                let target = edge.target.file()?;
                let mut set = if self.finished[target] {
                    self.reach[target].clone()
                } else {
                    BTreeSet::new()
                };
                set.insert(target);
                Some((edge.line, set))
            })
            .collect();

        let mut counts: BTreeMap<FileId, usize> = BTreeMap::new();
        for (_, set) in &sets {
            for &reached in set {
                *counts.entry(reached).or_default() += 1;
            }
        }
        let duplicates: Vec<FileId> = counts
            .into_iter()
            .filter(|&(reached, count)| count > 1 && reached != file)
            .map(|(reached, _)| reached)
            .collect();

        for &duplicate in &duplicates {
            if self.reported.contains(&duplicate) {
                continue;
            }
            // Only the outermost duplicated file is named; what it reaches
            // is duplicated as a consequence.
            let covered = duplicates
                .iter()
                .any(|&other| other != duplicate && self.reach[other].contains(&duplicate));
            if covered {
                continue;
            }
            let Some(line) = sets
                .iter()
                .find(|(_, set)| set.contains(&duplicate))
                .map(|(line, _)| *line)
            else {
                continue;
            };
            let source = &self.out.files[file];
            self.out.diagnostics.push(Diagnostic::info(
                DiagnosticKind::IncludeDuplicate,
                &source.path,
                line,
                vec![self.out.files[duplicate].path.to_string()],
            ));
        }
        self.reported.extend(duplicates);

        self.reach[file] = sets.into_iter().flat_map(|(_, set)| set).collect();
        self.finished[file] = true;
    }
}
