//! `${...}` references and the one-operator arithmetic grammar
//!
//! An attribute value that is exactly one `${...}` is evaluated as:
//! - `list(name)`, the comma-separated items of variable `name`, or when
//!   no such variable exists the elements referring to the id `name`
//! - a defined variable name
//! - `<operand><op><operand>` with `op` in `+ - * /` and each operand an
//!   integer literal or a variable name
//!
//! Text that fits none of these shapes is kept as a literal. Embedded
//! references (`http://${host}:${port}/`) are plain variable
//! substitutions.

use std::collections::BTreeMap;

use crate::values::{parse_int, split_list};

use super::VariableTable;

/// Referenced id to the elements pointing at it through a
/// reference-typed attribute (the element's id, or its name when it has
/// none).
pub type Referrers = BTreeMap<String, Vec<String>>;

const OPERATORS: [char; 4] = ['+', '-', '*', '/'];

/// What went wrong while evaluating a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Undefined { name: String },
    Recursive { name: String },
    MissingLeftOperand,
    MissingRightOperand,
    UndefinedOperand { operand: String },
    InvalidOperand { operand: String, value: String },
    /// More than one operator
    InvalidExpression,
    DivisionByZero,
    Overflow,
}

/// A failure and the `${...}` text it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub expression: String,
}

/// Outcome of resolving an attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Substituted value; failed references stay literal
    pub value: String,
    /// Items of a `${list(...)}` reference
    pub items: Option<Vec<String>>,
    pub failures: Vec<Failure>,
}

impl Resolution {
    fn ok(value: String) -> Self {
        Self {
            value,
            items: None,
            failures: Vec::new(),
        }
    }

    fn failed(expression: &str, failures: Vec<Failure>) -> Self {
        Self {
            value: expression.to_string(),
            items: None,
            failures,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Evaluates references against a [`VariableTable`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    table: &'t VariableTable,
    referrers: Option<&'t Referrers>,
}

impl<'t> Resolver<'t> {
    pub fn new(table: &'t VariableTable) -> Self {
        Self {
            table,
            referrers: None,
        }
    }

    /// Let `${list(id)}` fall back to the elements referring to `id`.
    pub fn with_referrers(mut self, referrers: &'t Referrers) -> Self {
        self.referrers = Some(referrers);
        self
    }

    /// Resolve a raw attribute value.
    pub fn resolve(&self, raw: &str) -> Resolution {
        self.resolve_in(raw, &mut Vec::new())
    }

    /// Fully expanded effective value of a variable.
    pub fn variable(&self, name: &str) -> Resolution {
        let text = format!("${{{name}}}");
        match self.variable_in(name, &text, &mut Vec::new()) {
            Ok(value) => Resolution::ok(value),
            Err(failures) => Resolution::failed(&text, failures),
        }
    }

    fn resolve_in(&self, raw: &str, stack: &mut Vec<String>) -> Resolution {
        if let Some(inner) = single_reference(raw) {
            return self.evaluate(inner, raw, stack);
        }
        self.substitute(raw, stack)
    }

    fn substitute(&self, raw: &str, stack: &mut Vec<String>) -> Resolution {
        let mut value = String::with_capacity(raw.len());
        let mut failures = Vec::new();
        let mut rest = raw;
        while let Some(start) = rest.find("${") {
            value.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                value.push_str(&rest[start..]);
                rest = "";
                break;
            };
            let text = &rest[start..start + 2 + end + 1];
            let name = after[..end].trim();
            if self.table.contains(name) || is_name(name) {
                match self.variable_in(name, text, stack) {
                    Ok(resolved) => value.push_str(&resolved),
                    Err(errs) => {
                        failures.extend(errs);
                        value.push_str(text);
                    }
                }
            } else {
                value.push_str(text);
            }
            rest = &after[end + 1..];
        }
        value.push_str(rest);
        Resolution {
            value,
            items: None,
            failures,
        }
    }

    fn evaluate(&self, inner: &str, text: &str, stack: &mut Vec<String>) -> Resolution {
        let inner = inner.trim();

        if let Some(target) = list_target(inner) {
            let referring = self
                .referrers
                .filter(|_| !self.table.contains(target))
                .and_then(|referrers| referrers.get(target));
            if let Some(referring) = referring {
                return Resolution {
                    value: referring.join(","),
                    items: Some(referring.clone()),
                    failures: Vec::new(),
                };
            }
            return match self.variable_in(target, text, stack) {
                Ok(value) => Resolution {
                    items: Some(split_list(&value).map(str::to_string).collect()),
                    value,
                    failures: Vec::new(),
                },
                Err(failures) => Resolution::failed(text, failures),
            };
        }

        if self.table.contains(inner) {
            return match self.variable_in(inner, text, stack) {
                Ok(value) => Resolution::ok(value),
                Err(failures) => Resolution::failed(text, failures),
            };
        }

        let operators: Vec<(usize, char)> = inner
            .char_indices()
            .filter(|(_, c)| OPERATORS.contains(c))
            .collect();

        match operators.as_slice() {
            [] if is_name(inner) => Resolution::failed(
                text,
                vec![failure(FailureKind::Undefined { name: inner.to_string() }, text)],
            ),
            [] => Resolution::ok(text.to_string()),
            [operator] => self.arithmetic(inner, *operator, text, stack),
            _ => {
                let well_formed = inner
                    .split(|c| OPERATORS.contains(&c))
                    .map(str::trim)
                    .all(|operand| operand.is_empty() || is_int(operand) || is_name(operand));
                if well_formed {
                    Resolution::failed(text, vec![failure(FailureKind::InvalidExpression, text)])
                } else {
                    Resolution::ok(text.to_string())
                }
            }
        }
    }

    fn arithmetic(
        &self,
        inner: &str,
        (pos, op): (usize, char),
        text: &str,
        stack: &mut Vec<String>,
    ) -> Resolution {
        let left = inner[..pos].trim();
        let right = inner[pos + op.len_utf8()..].trim();
        if [left, right]
            .iter()
            .any(|side| !side.is_empty() && !is_int(side) && !is_name(side))
        {
            return Resolution::ok(text.to_string());
        }

        let mut failures = Vec::new();
        if left.is_empty() {
            failures.push(failure(FailureKind::MissingLeftOperand, text));
        }
        if right.is_empty() {
            failures.push(failure(FailureKind::MissingRightOperand, text));
        }
        let lhs = self.operand(left, text, stack, &mut failures);
        let rhs = self.operand(right, text, stack, &mut failures);

        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return Resolution::failed(text, failures);
        };
        if !failures.is_empty() {
            return Resolution::failed(text, failures);
        }

        let result = match op {
            '+' => lhs.checked_add(rhs),
            '-' => lhs.checked_sub(rhs),
            '*' => lhs.checked_mul(rhs),
            _ if rhs == 0 => {
                return Resolution::failed(text, vec![failure(FailureKind::DivisionByZero, text)]);
            }
            _ => lhs.checked_div(rhs),
        };
        match result {
            Some(value) => Resolution::ok(value.to_string()),
            None => Resolution::failed(text, vec![failure(FailureKind::Overflow, text)]),
        }
    }

    /// Numeric value of one operand; failures are appended.
    fn operand(
        &self,
        operand: &str,
        text: &str,
        stack: &mut Vec<String>,
        failures: &mut Vec<Failure>,
    ) -> Option<i64> {
        if operand.is_empty() {
            return None;
        }
        if is_int(operand) {
            let parsed = parse_int(operand);
            if parsed.is_none() {
                failures.push(failure(FailureKind::Overflow, text));
            }
            return parsed;
        }
        match self.variable_in(operand, text, stack) {
            Ok(value) => {
                let parsed = parse_int(&value);
                if parsed.is_none() {
                    failures.push(failure(
                        FailureKind::InvalidOperand {
                            operand: operand.to_string(),
                            value,
                        },
                        text,
                    ));
                }
                parsed
            }
            Err(errs) => {
                failures.extend(errs.into_iter().map(|f| match f.kind {
                    FailureKind::Undefined { name } if name == operand => {
                        failure(FailureKind::UndefinedOperand { operand: name }, text)
                    }
                    _ => f,
                }));
                None
            }
        }
    }

    /// Expanded effective value of `name`, following nested references.
    fn variable_in(
        &self,
        name: &str,
        text: &str,
        stack: &mut Vec<String>,
    ) -> Result<String, Vec<Failure>> {
        if stack.iter().any(|n| n == name) {
            return Err(vec![failure(
                FailureKind::Recursive {
                    name: name.to_string(),
                },
                text,
            )]);
        }
        let Some(raw) = self.table.effective(name) else {
            return Err(vec![failure(
                FailureKind::Undefined {
                    name: name.to_string(),
                },
                text,
            )]);
        };
        if !raw.contains("${") {
            return Ok(raw.to_string());
        }

        stack.push(name.to_string());
        let nested = self.resolve_in(raw, stack);
        stack.pop();
        if nested.is_ok() {
            Ok(nested.value)
        } else {
            Err(nested.failures)
        }
    }
}

fn failure(kind: FailureKind, text: &str) -> Failure {
    Failure {
        kind,
        expression: text.to_string(),
    }
}

/// Inner text when `raw` is exactly one `${...}`.
fn single_reference(raw: &str) -> Option<&str> {
    let inner = raw.strip_prefix("${")?.strip_suffix('}')?;
    if inner.contains('}') || inner.contains("${") {
        return None;
    }
    Some(inner)
}

fn list_target(inner: &str) -> Option<&str> {
    let target = inner.strip_prefix("list(")?.strip_suffix(')')?.trim();
    is_name(target).then_some(target)
}

fn is_int(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// A bare variable name: letter or `_`, then letters, digits, `_` or `.`.
pub(crate) fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
