//! Variable table and `${...}` evaluation
//!
//! Declarations come from several sources, each at a precedence tier.
//! The effective value of a name is the explicit value of the highest
//! ranked declaration that has one, otherwise the highest ranked default.

mod env;
mod expression;

pub use env::{EnvEntry, parse_env};
pub use expression::{Failure, FailureKind, Referrers, Resolution, Resolver};

use std::collections::BTreeMap;

use serde::Serialize;
use srvcfg_fs::NormalizedPath;

/// Precedence tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// Predefined location variables
    Builtin,
    DefaultDropins,
    /// Declarations in the root file and its includes
    Config,
    /// `server.env` files
    Environment,
    OverrideDropins,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::DefaultDropins => write!(f, "default-dropins"),
            Self::Config => write!(f, "config"),
            Self::Environment => write!(f, "environment"),
            Self::OverrideDropins => write!(f, "override-dropins"),
        }
    }
}

/// One declaration of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Declaring file; `None` for predefined variables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<NormalizedPath>,
    pub line: u32,
    pub tier: Tier,
    /// Declaration order, breaks ties within a tier (later wins)
    #[serde(skip)]
    pub sequence: usize,
}

impl VariableEntry {
    pub fn new(name: impl Into<String>, tier: Tier) -> Self {
        Self {
            name: name.into(),
            value: None,
            default_value: None,
            file: None,
            line: 0,
            tier,
            sequence: 0,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn declared_at(mut self, file: &NormalizedPath, line: u32) -> Self {
        self.file = Some(file.clone());
        self.line = line;
        self
    }

    fn rank(&self) -> (Tier, usize) {
        (self.tier, self.sequence)
    }
}

/// All declarations, grouped by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableTable {
    entries: BTreeMap<String, Vec<VariableEntry>>,
    #[serde(skip)]
    next_sequence: usize,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration. Within a tier, later declarations outrank
    /// earlier ones.
    pub fn declare(&mut self, mut entry: VariableEntry) {
        entry.sequence = self.next_sequence;
        self.next_sequence += 1;
        let declarations = self.entries.entry(entry.name.clone()).or_default();
        declarations.push(entry);
        declarations.sort_by_key(VariableEntry::rank);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The declaration supplying the effective value.
    pub fn winner(&self, name: &str) -> Option<&VariableEntry> {
        let declarations = self.entries.get(name)?;
        declarations
            .iter()
            .rev()
            .find(|e| e.value.is_some())
            .or_else(|| declarations.iter().rev().find(|e| e.default_value.is_some()))
    }

    /// Effective raw value (before `${...}` expansion).
    pub fn effective(&self, name: &str) -> Option<&str> {
        let winner = self.winner(name)?;
        winner
            .value
            .as_deref()
            .or(winner.default_value.as_deref())
    }

    /// All declarations of a name, lowest rank first.
    pub fn declarations(&self, name: &str) -> &[VariableEntry] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Declared names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
