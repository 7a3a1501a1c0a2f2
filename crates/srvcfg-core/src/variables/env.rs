//! `server.env` parsing

/// One `KEY=VALUE` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub key: String,
    pub value: String,
    pub line: u32,
}

/// Parse `KEY=VALUE` lines. Blank lines, `#` comments and lines without
/// `=` are skipped; keys and values are trimmed.
pub fn parse_env(content: &str) -> Vec<EnvEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line_text = line.trim();
            if line_text.is_empty() || line_text.starts_with('#') {
                return None;
            }
            let (key, value) = line_text.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(EnvEntry {
                key: key.to_string(),
                value: value.trim().to_string(),
                line: u32::try_from(idx + 1).unwrap_or(u32::MAX),
            })
        })
        .collect()
}
