//! Get command implementation

use colored::Colorize;

use crate::context::ServerContext;
use crate::error::{CliError, Result};

/// A parsed `element[id].attribute` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeQuery {
    pub element: String,
    pub id: Option<String>,
    pub attribute: String,
}

impl AttributeQuery {
    pub fn parse(query: &str) -> Result<Self> {
        let invalid = || {
            CliError::user(format!(
                "Invalid attribute path '{query}', expected element[id].attribute"
            ))
        };

        let (element, id, rest) = match query.find('[') {
            Some(open) => {
                let close = query[open..].find(']').map(|c| open + c).ok_or_else(invalid)?;
                let id = &query[open + 1..close];
                if id.is_empty() {
                    return Err(invalid());
                }
                (&query[..open], Some(id), &query[close + 1..])
            }
            None => {
                let dot = query.find('.').ok_or_else(invalid)?;
                (&query[..dot], None, &query[dot..])
            }
        };

        let attribute = rest.strip_prefix('.').ok_or_else(invalid)?;
        if element.is_empty() || attribute.is_empty() || attribute.contains(['.', '[', ']']) {
            return Err(invalid());
        }

        Ok(Self {
            element: element.to_string(),
            id: id.map(str::to_string),
            attribute: attribute.to_string(),
        })
    }
}

/// Run the get command
pub fn run_get(context: &ServerContext, query: &str, raw: bool) -> Result<()> {
    let query = AttributeQuery::parse(query)?;
    let config = context.resolve()?;

    let value = config
        .lookup(&query.element, query.id.as_deref(), &query.attribute)
        .ok_or_else(|| {
            CliError::user(format!(
                "No value for {}{}.{}",
                query.element,
                query.id.as_deref().map(|id| format!("[{id}]")).unwrap_or_default(),
                query.attribute
            ))
        })?;
    tracing::debug!(
        file = %value.location.file,
        line = value.location.line,
        "Effective value located"
    );

    match (raw, value.resolved) {
        (false, Some(resolved)) => println!("{resolved}"),
        (true, _) => println!("{}", value.raw),
        (false, None) => {
            eprintln!(
                "{}: {} could not be fully expanded, printing it as written",
                "warning".yellow().bold(),
                value.raw
            );
            println!("{}", value.raw);
        }
    }
    Ok(())
}
