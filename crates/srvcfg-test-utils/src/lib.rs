//! Shared test utilities for the server-config-resolver workspace.
//!
//! This crate provides standardised server fixtures so crate test suites
//! do not each hand-build directory trees. It is a dev-dependency only.
//!
//! # Modules
//!
//! - [`fixtures`]: copies of the checked-in sample installation
//! - [`memory`]: in-memory servers served by a `MemoryProvider`
//! - [`server`]: [`TestServer`] builder for on-disk server directories

pub mod fixtures;
pub mod memory;
pub mod server;

pub use fixtures::{FixtureInstall, fixtures_dir};
pub use memory::{MemoryServer, server_xml};
pub use server::TestServer;
