//! `<include>` and `<variable>` directives
//!
//! Only top-level children of the root element are directives; nested
//! elements with these names are ordinary configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::XmlElement;

pub const INCLUDE: &str = "include";
pub const VARIABLE: &str = "variable";

/// How an included file's top-level elements treat conflicting siblings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OnConflict {
    #[default]
    Merge,
    Ignore,
    Replace,
}

impl FromStr for OnConflict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MERGE" => Ok(OnConflict::Merge),
            "IGNORE" => Ok(OnConflict::Ignore),
            "REPLACE" => Ok(OnConflict::Replace),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for OnConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnConflict::Merge => write!(f, "MERGE"),
            OnConflict::Ignore => write!(f, "IGNORE"),
            OnConflict::Replace => write!(f, "REPLACE"),
        }
    }
}

/// An `<include location=... optional=... onConflict=...>` directive.
///
/// Attribute values are kept raw; interpretation (and reporting of bad
/// values) is left to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub location: Option<String>,
    pub optional: Option<String>,
    pub on_conflict: Option<String>,
    pub line: u32,
}

impl IncludeDirective {
    /// Parsed `optional`; absent means `false`, `Err` carries a bad value.
    pub fn optional(&self) -> Result<bool, &str> {
        match self.optional.as_deref() {
            None => Ok(false),
            Some(raw) if raw.trim().eq_ignore_ascii_case("true") => Ok(true),
            Some(raw) if raw.trim().eq_ignore_ascii_case("false") => Ok(false),
            Some(raw) => Err(raw),
        }
    }

    /// Parsed `onConflict`; absent means MERGE, `Err` carries a bad value.
    pub fn on_conflict(&self) -> Result<OnConflict, &str> {
        match self.on_conflict.as_deref() {
            None => Ok(OnConflict::Merge),
            Some(raw) => raw.parse().map_err(|_| raw),
        }
    }
}

/// A `<variable name=... value=... defaultValue=...>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDirective {
    pub name: Option<String>,
    pub value: Option<String>,
    pub default_value: Option<String>,
    pub line: u32,
}

/// A top-level directive in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Include(IncludeDirective),
    Variable(VariableDirective),
}

impl Directive {
    pub fn from_element(element: &XmlElement) -> Option<Self> {
        match element.name.as_str() {
            INCLUDE => Some(Directive::Include(IncludeDirective {
                location: element.attr("location").map(str::to_string),
                optional: element.attr("optional").map(str::to_string),
                on_conflict: element.attr("onConflict").map(str::to_string),
                line: element.line,
            })),
            VARIABLE => Some(Directive::Variable(VariableDirective {
                name: element.attr("name").map(str::to_string),
                value: element.attr("value").map(str::to_string),
                default_value: element.attr("defaultValue").map(str::to_string),
                line: element.line,
            })),
            _ => None,
        }
    }

    /// Whether an element name is a directive name.
    pub fn is_directive(name: &str) -> bool {
        name == INCLUDE || name == VARIABLE
    }
}
