//! Element merge classification

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How instances of an element combine across files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    /// At most one logical instance; later declarations merge into it.
    Singleton,

    /// Instances are identified by `id`; equal ids merge, different ids
    /// never interact. An instance without an `id` stands alone.
    KeyedFactory,

    /// Every declared instance is a distinct logical element.
    UnkeyedFactory,
}

impl ElementKind {
    /// Classification for elements the schema does not know: an `id`
    /// makes the element keyed, otherwise it behaves as a singleton.
    pub fn infer(has_id: bool) -> Self {
        if has_id {
            ElementKind::KeyedFactory
        } else {
            ElementKind::Singleton
        }
    }

    /// Whether two instances of this kind may ever merge.
    pub fn merges(&self) -> bool {
        !matches!(self, ElementKind::UnkeyedFactory)
    }
}

impl FromStr for ElementKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" => Ok(ElementKind::Singleton),
            "keyed-factory" | "factory" => Ok(ElementKind::KeyedFactory),
            "unkeyed-factory" => Ok(ElementKind::UnkeyedFactory),
            _ => Err(Error::InvalidElementKind {
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Singleton => write!(f, "singleton"),
            ElementKind::KeyedFactory => write!(f, "keyed-factory"),
            ElementKind::UnkeyedFactory => write!(f, "unkeyed-factory"),
        }
    }
}
