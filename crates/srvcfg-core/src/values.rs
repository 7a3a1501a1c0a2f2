//! Attribute value checks against declared types

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use srvcfg_meta::AttributeType;

/// `d h m s ms`, in that order, each at most once.
static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)d)?(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?(?:(\d+)ms)?$").unwrap()
});

/// Whether `value` is a duration such as `1d13h15m30s500ms`.
pub fn is_duration(value: &str) -> bool {
    !value.is_empty() && DURATION_PATTERN.is_match(value)
}

pub fn is_boolean(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

pub fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Known ids per element name, used for `reference(...)` checks.
pub type IdIndex = BTreeMap<String, Vec<String>>;

/// Why a value does not fit its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Not a boolean or int; carries the type name
    Primitive(&'static str),
    Duration,
    Enum(Vec<String>),
    /// No union alternative accepted the value; carries their description
    Union(String),
    /// No element of the target kind has this id
    Reference { target: String, known: Vec<String> },
}

/// Check one value. Lists check every comma-separated item and report
/// the first offending one.
pub fn check(ty: &AttributeType, value: &str, ids: &IdIndex) -> Result<(), (String, Mismatch)> {
    match ty {
        AttributeType::List(inner) => {
            for item in split_list(value) {
                check(inner, item, ids)?;
            }
            Ok(())
        }
        _ => check_single(ty, value, ids).map_err(|m| (value.to_string(), m)),
    }
}

fn check_single(ty: &AttributeType, value: &str, ids: &IdIndex) -> Result<(), Mismatch> {
    match ty {
        AttributeType::String => Ok(()),
        AttributeType::Boolean if is_boolean(value.trim()) => Ok(()),
        AttributeType::Boolean => Err(Mismatch::Primitive("boolean")),
        AttributeType::Int if parse_int(value).is_some() => Ok(()),
        AttributeType::Int => Err(Mismatch::Primitive("int")),
        AttributeType::Duration if is_duration(value.trim()) => Ok(()),
        AttributeType::Duration => Err(Mismatch::Duration),
        AttributeType::Enum(allowed) if allowed.iter().any(|a| a == value) => Ok(()),
        AttributeType::Enum(allowed) => Err(Mismatch::Enum(allowed.clone())),
        AttributeType::Union(alternatives) => {
            if alternatives
                .iter()
                .any(|alt| check(alt, value, ids).is_ok())
            {
                Ok(())
            } else {
                Err(Mismatch::Union(ty.describe()))
            }
        }
        AttributeType::Reference(target) => {
            let known = ids.get(target).cloned().unwrap_or_default();
            if known.iter().any(|id| id == value) {
                Ok(())
            } else {
                Err(Mismatch::Reference {
                    target: target.clone(),
                    known,
                })
            }
        }
        AttributeType::List(_) => check(ty, value, ids).map_err(|(_, m)| m),
    }
}

/// Comma-separated items, trimmed, empty items dropped.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}
