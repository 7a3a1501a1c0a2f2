//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Server configuration resolver - merge, expand and validate server.xml trees
#[derive(Parser, Debug)]
#[command(name = "srvcfg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where a server lives and how to interpret it.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServerArgs {
    /// Server directory containing server.xml
    pub server_dir: PathBuf,

    /// Extra element schema file (TOML, JSON or YAML)
    #[arg(long, env = "SRVCFG_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// User directory (defaults to the folder holding `servers/`)
    #[arg(long)]
    pub user_dir: Option<PathBuf>,

    /// Installation directory (defaults to the parent of the user directory)
    #[arg(long)]
    pub install_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a server and print its diagnostics grouped by file
    ///
    /// Exits with status 2 when any error-severity diagnostic is reported.
    Check {
        #[command(flatten)]
        server: ServerArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the merged logical element tree
    Dump {
        #[command(flatten)]
        server: ServerArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the effective variable table
    Vars {
        #[command(flatten)]
        server: ServerArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print one effective attribute value
    ///
    /// Examples:
    ///   srvcfg get wlp/usr/servers/app logging.maxFiles
    ///   srvcfg get wlp/usr/servers/app 'httpEndpoint[defaultHttpEndpoint].httpPort'
    Get {
        #[command(flatten)]
        server: ServerArgs,

        /// Attribute path: element[id].attribute
        query: String,

        /// Print the value as written instead of expanding variables
        #[arg(long)]
        raw: bool,
    },

    /// Find the closest candidate names for a misspelled name
    Suggest {
        /// Name to correct
        target: String,

        /// Names to choose from
        #[arg(required = true)]
        candidates: Vec<String>,

        /// Candidates to skip
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Minimum similarity percentage
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,
    },

    /// Revalidate servers whenever their configuration changes
    Watch {
        /// Server directories to watch
        #[arg(required = true)]
        server_dirs: Vec<PathBuf>,

        /// Extra element schema file (TOML, JSON or YAML)
        #[arg(long, env = "SRVCFG_SCHEMA")]
        schema: Option<PathBuf>,
    },
}
