//! Command implementations for srvcfg-cli

pub mod check;
pub mod dump;
pub mod get;
pub mod suggest;
pub mod vars;
pub mod watch;

pub use check::run_check;
pub use dump::run_dump;
pub use get::run_get;
pub use suggest::run_suggest;
pub use vars::run_vars;
pub use watch::run_watch;

/// Exit status when resolution reports error-severity diagnostics.
pub const EXIT_INVALID: u8 = 2;
