//! Declared attribute types
//!
//! Types are written as compact strings in schema files:
//!
//! ```text
//! boolean | int | duration | string
//! enum(WARN, FAIL, IGNORE)
//! union(duration, int)
//! reference(keyStore)
//! list(int)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The declared type of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AttributeType {
    Boolean,
    Int,
    Duration,
    String,
    /// One of a fixed set of literals (case-sensitive)
    Enum(Vec<String>),
    /// Anonymous union; a value is valid if any alternative accepts it
    Union(Vec<AttributeType>),
    /// The `id` of a logical element of the named kind
    Reference(String),
    /// Comma-separated items of the inner type
    List(Box<AttributeType>),
}

impl AttributeType {
    /// Short human-readable name used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            AttributeType::Boolean => "boolean".to_string(),
            AttributeType::Int => "int".to_string(),
            AttributeType::Duration => "duration".to_string(),
            AttributeType::String => "string".to_string(),
            AttributeType::Enum(values) => format!("one of {}", values.join(", ")),
            AttributeType::Union(alternatives) => alternatives
                .iter()
                .map(AttributeType::describe)
                .collect::<Vec<_>>()
                .join(" or "),
            AttributeType::Reference(target) => format!("reference to {target}"),
            AttributeType::List(inner) => format!("list of {}", inner.describe()),
        }
    }
}

impl FromStr for AttributeType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let spec = s.trim();
        let invalid = |message: &str| Error::InvalidAttributeType {
            spec: spec.to_string(),
            message: message.to_string(),
        };

        match spec {
            "boolean" => return Ok(AttributeType::Boolean),
            "int" | "integer" | "long" => return Ok(AttributeType::Int),
            "duration" => return Ok(AttributeType::Duration),
            "string" | "password" | "location" => return Ok(AttributeType::String),
            _ => {}
        }

        let open = spec.find('(').ok_or_else(|| invalid("unknown type"))?;
        if !spec.ends_with(')') {
            return Err(invalid("missing closing parenthesis"));
        }
        let head = &spec[..open];
        let args = split_top_level(&spec[open + 1..spec.len() - 1])
            .ok_or_else(|| invalid("unbalanced parentheses"))?;
        if args.iter().any(|arg| arg.is_empty()) {
            return Err(invalid("empty argument"));
        }

        match head {
            "enum" => Ok(AttributeType::Enum(
                args.into_iter().map(str::to_string).collect(),
            )),
            "union" => {
                let alternatives = args
                    .into_iter()
                    .map(str::parse)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(AttributeType::Union(alternatives))
            }
            "reference" if args.len() == 1 => Ok(AttributeType::Reference(args[0].to_string())),
            "list" if args.len() == 1 => Ok(AttributeType::List(Box::new(args[0].parse()?))),
            "reference" | "list" => Err(invalid("expected exactly one argument")),
            _ => Err(invalid("unknown type")),
        }
    }
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(args: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in args.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(args[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(args[start..].trim());
    Some(parts)
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::Boolean => write!(f, "boolean"),
            AttributeType::Int => write!(f, "int"),
            AttributeType::Duration => write!(f, "duration"),
            AttributeType::String => write!(f, "string"),
            AttributeType::Enum(values) => write!(f, "enum({})", values.join(", ")),
            AttributeType::Union(alternatives) => {
                let inner: Vec<String> = alternatives.iter().map(|a| a.to_string()).collect();
                write!(f, "union({})", inner.join(", "))
            }
            AttributeType::Reference(target) => write!(f, "reference({target})"),
            AttributeType::List(inner) => write!(f, "list({inner})"),
        }
    }
}

impl TryFrom<String> for AttributeType {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AttributeType> for String {
    fn from(value: AttributeType) -> Self {
        value.to_string()
    }
}
