//! Filesystem abstraction for server configuration resolution
//!
//! Provides normalized path handling, the conventional server directory
//! layout, and the [`FileProvider`] seam through which the resolution
//! engine reads configuration files.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod layout;
pub mod path;
pub mod provider;

pub use checksum::ContentChecksum;
pub use config::{ConfigStore, Format};
pub use constants::ServerPath;
pub use error::{Error, Result};
pub use layout::ServerLayout;
pub use path::NormalizedPath;
pub use provider::{DiskProvider, FileProvider, MemoryProvider};
