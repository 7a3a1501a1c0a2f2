//! Suggest command implementation

use std::process::ExitCode;

use colored::Colorize;
use srvcfg_core::{DEFAULT_THRESHOLD, best_match, similarity};

use crate::error::Result;

/// Run the suggest command
///
/// Prints the winning candidates, or exits with status 1 when none clears
/// the threshold.
pub fn run_suggest(
    target: &str,
    candidates: &[String],
    exclude: &[String],
    threshold: Option<u8>,
) -> Result<ExitCode> {
    let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);

    for candidate in candidates {
        tracing::debug!(
            candidate = %candidate,
            score = similarity(target, candidate),
            "Scored candidate"
        );
    }

    match best_match(candidates, target, exclude, threshold) {
        Some(found) => {
            println!("{found}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!(
                "{} no candidate is at least {}% similar to {}",
                "=>".blue().bold(),
                threshold,
                target.cyan()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
