//! Diagnostics produced by resolution and validation
//!
//! A [`Diagnostic`] carries a template id ([`DiagnosticKind`]), the
//! substitution values, the rendered message, and the file and 1-based
//! line it concerns, so a presentation layer can either show the message
//! as-is or re-render it from the template.

use std::fmt;

use serde::{Deserialize, Serialize};
use srvcfg_fs::NormalizedPath;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational notice
    Info,
    /// Potential problem
    Warning,
    /// Configuration error
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Message template identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    // Document
    MalformedXml,
    ReadFailed,

    // Includes
    IncludeLocationMissing,
    IncludeUnresolved,
    IncludeNotFound,
    IncludeOptionalNotFound,
    IncludeDuplicate,
    InvalidOnConflict,
    InvalidOptional,

    // Variables
    VariableMissingName,
    VariableNameInvalid,
    VariableMissingValue,
    VariableUndefined,
    VariableRecursive,

    // Expressions
    MissingLeftOperand,
    MissingRightOperand,
    UndefinedOperand,
    InvalidOperand,
    InvalidVariableExpression,
    DivisionByZero,
    ArithmeticOverflow,

    // Types
    InvalidType,
    InvalidDuration,
    InvalidEnum,
    UnionNoMatch,
    UnresolvedReference,

    // Merge
    Override,
    Replace,
    DuplicateElement,

    // Schema
    UnrecognizedElement,
    UnrecognizedAttribute,
    UnavailableElement,
}

impl DiagnosticKind {
    /// Message template; `{n}` is replaced by the n-th argument.
    pub fn template(&self) -> &'static str {
        use DiagnosticKind::*;
        match self {
            MalformedXml => "The file {0} is not well-formed XML: {1}",
            ReadFailed => "The file {0} could not be read: {1}",
            IncludeLocationMissing => "The include element has no location attribute",
            IncludeUnresolved => "The include location {0} refers to the undefined variable {1}",
            IncludeNotFound => "The included file {0} does not exist",
            IncludeOptionalNotFound => "The optional included file {0} does not exist",
            IncludeDuplicate => "The file {0} is included more than once",
            InvalidOnConflict => "Invalid onConflict value {0}, using MERGE",
            InvalidOptional => "Invalid optional value {0}, using false",
            VariableMissingName => "The variable element has no name attribute",
            VariableNameInvalid => "The variable name {0} must not contain a variable reference",
            VariableMissingValue => "The variable {0} has neither a value nor a default value",
            VariableUndefined => "The variable {0} is not defined",
            VariableRecursive => "The variable {0} refers to itself",
            MissingLeftOperand => "The expression {0} is missing its left operand",
            MissingRightOperand => "The expression {0} is missing its right operand",
            UndefinedOperand => "The operand {1} in the expression {0} is not a defined variable",
            InvalidOperand => "The operand {1} in the expression {0} has the non-numeric value {2}",
            InvalidVariableExpression => {
                "The expression {0} is not valid: only one arithmetic operator is allowed"
            }
            DivisionByZero => "The expression {0} divides by zero",
            ArithmeticOverflow => "The expression {0} overflows a 64-bit integer",
            InvalidType => "The value {1} of attribute {0} is not a valid {2}",
            InvalidDuration => "The value {1} of attribute {0} is not a valid duration",
            InvalidEnum => "The value {1} of attribute {0} is not one of {2}",
            UnionNoMatch => "The value {1} of attribute {0} does not match any of the types {2}",
            UnresolvedReference => "The attribute {0} refers to {1}, but no {2} with that id exists",
            Override => "The value {2} of attribute {0} overrides the value {1} set in {3} at line {4}",
            Replace => "The element {0} from {1} replaces the one from {2}",
            DuplicateElement => "The element {0} is declared more than once in this file",
            UnrecognizedElement => "The element {0} is not recognized",
            UnrecognizedAttribute => "The attribute {1} is not recognized on the element {0}",
            UnavailableElement => {
                "The element {0} requires one of the features {1}, none of which is enabled"
            }
        }
    }

    /// The camelCase template id.
    pub fn id(&self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A hint a quick-fix collaborator can act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QuickFix {
    /// Replace the offending name or value (comma-joined when tied)
    BestMatch { replacement: String },
    /// Add an ignore rule for the attribute
    IgnoreAttribute { element: String, attribute: String },
    /// Add an ignore rule for the element
    IgnoreElement { element: String },
    /// Declare the missing variable
    DeclareVariable { name: String },
}

/// One reported problem or notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub args: Vec<String>,
    pub file: NormalizedPath,
    /// 1-based line
    pub line: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_fixes: Vec<QuickFix>,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        severity: Severity,
        file: &NormalizedPath,
        line: u32,
        args: Vec<String>,
    ) -> Self {
        Self {
            message: render(kind.template(), &args),
            kind,
            severity,
            args,
            file: file.clone(),
            line,
            quick_fixes: Vec::new(),
        }
    }

    pub fn info(kind: DiagnosticKind, file: &NormalizedPath, line: u32, args: Vec<String>) -> Self {
        Self::new(kind, Severity::Info, file, line, args)
    }

    pub fn warning(kind: DiagnosticKind, file: &NormalizedPath, line: u32, args: Vec<String>) -> Self {
        Self::new(kind, Severity::Warning, file, line, args)
    }

    pub fn error(kind: DiagnosticKind, file: &NormalizedPath, line: u32, args: Vec<String>) -> Self {
        Self::new(kind, Severity::Error, file, line, args)
    }

    /// Builder: attach a quick-fix hint.
    pub fn with_fix(mut self, fix: QuickFix) -> Self {
        self.quick_fixes.push(fix);
        self
    }

    /// Builder: attach a best-match hint when one exists.
    pub fn with_best_match(self, suggestion: Option<String>) -> Self {
        match suggestion {
            Some(replacement) => self.with_fix(QuickFix::BestMatch { replacement }),
            None => self,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.line, self.severity, self.kind, self.message
        )
    }
}

/// Substitute `{n}` placeholders.
fn render(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}');
        let index = close.and_then(|c| after[..c].parse::<usize>().ok());
        match (close, index) {
            (Some(close), Some(index)) => {
                out.push_str(args.get(index).map(String::as_str).unwrap_or(""));
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Count diagnostics of a given severity.
pub fn count_severity(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}
