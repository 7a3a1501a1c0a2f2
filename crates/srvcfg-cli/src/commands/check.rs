//! Check command implementation

use std::process::ExitCode;

use colored::Colorize;
use serde::Serialize;
use srvcfg_core::{Diagnostic, QuickFix, ResolvedConfiguration, Severity, count_severity};
use srvcfg_fs::NormalizedPath;

use super::EXIT_INVALID;
use crate::context::ServerContext;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    root: &'a NormalizedPath,
    files: Vec<&'a NormalizedPath>,
    errors: usize,
    warnings: usize,
    infos: usize,
    diagnostics: &'a [Diagnostic],
}

impl<'a> CheckReport<'a> {
    fn new(config: &'a ResolvedConfiguration) -> Self {
        Self {
            root: &config.root,
            files: config.chain_paths(),
            errors: count_severity(&config.diagnostics, Severity::Error),
            warnings: count_severity(&config.diagnostics, Severity::Warning),
            infos: count_severity(&config.diagnostics, Severity::Info),
            diagnostics: &config.diagnostics,
        }
    }
}

/// Run the check command
pub fn run_check(context: &ServerContext, json: bool) -> Result<ExitCode> {
    let config = context.resolve()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&CheckReport::new(&config))?);
    } else {
        println!(
            "{} Checking {} ({})",
            "=>".blue().bold(),
            config.root,
            counted(config.chain.len(), "file")
        );
        print!("{}", render_diagnostics(&config.diagnostics));
        print_summary(&config.diagnostics);
    }

    Ok(if config.has_errors() {
        ExitCode::from(EXIT_INVALID)
    } else {
        ExitCode::SUCCESS
    })
}

/// Diagnostics grouped by file, files in order of first report, lines
/// ascending within a file.
pub fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut groups: Vec<(&NormalizedPath, Vec<&Diagnostic>)> = Vec::new();
    for diagnostic in diagnostics {
        match groups.iter_mut().find(|(file, _)| *file == &diagnostic.file) {
            Some((_, group)) => group.push(diagnostic),
            None => groups.push((&diagnostic.file, vec![diagnostic])),
        }
    }

    let mut out = String::new();
    for (file, mut group) in groups {
        group.sort_by_key(|d| d.line);
        out.push_str(&format!("{}\n", file.as_str().bold()));
        for diagnostic in group {
            out.push_str(&format!(
                "   {:>4}  {} [{}] {}\n",
                diagnostic.line,
                severity_label(diagnostic.severity),
                diagnostic.kind,
                diagnostic.message
            ));
            for fix in &diagnostic.quick_fixes {
                out.push_str(&format!("         {} {}\n", "fix:".dimmed(), describe_fix(fix)));
            }
        }
    }
    out
}

pub fn print_summary(diagnostics: &[Diagnostic]) {
    let errors = count_severity(diagnostics, Severity::Error);
    let warnings = count_severity(diagnostics, Severity::Warning);
    let infos = count_severity(diagnostics, Severity::Info);

    if diagnostics.is_empty() {
        println!("{} No problems found", "OK".green().bold());
    } else if errors == 0 {
        println!(
            "{} {}, {}",
            "OK".green().bold(),
            counted(warnings, "warning"),
            counted(infos, "notice")
        );
    } else {
        println!(
            "{} {}, {}, {}",
            "FAILED".red().bold(),
            counted(errors, "error"),
            counted(warnings, "warning"),
            counted(infos, "notice")
        );
    }
}

fn counted(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow(),
        Severity::Info => "info".cyan(),
    }
}

fn describe_fix(fix: &QuickFix) -> String {
    match fix {
        QuickFix::BestMatch { replacement } => format!("did you mean {replacement}?"),
        QuickFix::IgnoreAttribute { element, attribute } => {
            format!("ignore attribute {element}.{attribute}")
        }
        QuickFix::IgnoreElement { element } => format!("ignore element {element}"),
        QuickFix::DeclareVariable { name } => format!("declare variable {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srvcfg_core::DiagnosticKind;

    fn diagnostic(file: &str, line: u32, kind: DiagnosticKind, args: &[&str]) -> Diagnostic {
        Diagnostic::warning(
            kind,
            &NormalizedPath::new(file),
            line,
            args.iter().map(|a| a.to_string()).collect(),
        )
    }

    #[test]
    fn groups_by_file_and_sorts_lines() {
        colored::control::set_override(false);
        let diagnostics = vec![
            diagnostic("/s/server.xml", 9, DiagnosticKind::UnrecognizedElement, &["b"]),
            diagnostic("/s/common.xml", 4, DiagnosticKind::UnrecognizedElement, &["c"]),
            diagnostic("/s/server.xml", 3, DiagnosticKind::UnrecognizedElement, &["a"]),
        ];

        let rendered = render_diagnostics(&diagnostics);
        let files: Vec<&str> = rendered.lines().filter(|l| l.starts_with('/')).collect();
        assert_eq!(files, vec!["/s/server.xml", "/s/common.xml"]);

        let a = rendered.find("  3  ").unwrap();
        let b = rendered.find("  9  ").unwrap();
        assert!(a < b);
    }

    #[test]
    fn quick_fixes_are_listed() {
        colored::control::set_override(false);
        let diagnostics = vec![
            diagnostic("/s/server.xml", 3, DiagnosticKind::UnrecognizedElement, &["logginx"])
                .with_best_match(Some("logging".to_string())),
        ];

        let rendered = render_diagnostics(&diagnostics);
        assert!(rendered.contains("fix: did you mean logging?"));
    }
}
