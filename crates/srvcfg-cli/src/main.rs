//! Server configuration resolver CLI
//!
//! Resolves a server's `server.xml` with its includes, dropins and
//! variables, then reports diagnostics or effective values.

mod cli;
mod commands;
mod context;
mod error;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use context::ServerContext;
use error::Result;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!(
                "{} Server configuration resolver",
                "srvcfg".green().bold()
            );
            println!();
            println!("Run {} for available commands.", "srvcfg --help".cyan());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Verbose mode logs everything at DEBUG; otherwise `RUST_LOG` applies,
/// defaulting to warnings. Logs go to stderr so JSON output stays clean.
fn init_tracing(verbose: bool) {
    let installed = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    if let Err(e) = installed {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<ExitCode> {
    match cmd {
        Commands::Check { server, json } => {
            commands::run_check(&ServerContext::load(&server)?, json)
        }
        Commands::Dump { server, json } => {
            commands::run_dump(&ServerContext::load(&server)?, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Vars { server, json } => {
            commands::run_vars(&ServerContext::load(&server)?, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Get { server, query, raw } => {
            commands::run_get(&ServerContext::load(&server)?, &query, raw)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Suggest {
            target,
            candidates,
            exclude,
            threshold,
        } => commands::run_suggest(&target, &candidates, &exclude, threshold),
        Commands::Watch {
            server_dirs,
            schema,
        } => {
            commands::run_watch(&server_dirs, schema.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
