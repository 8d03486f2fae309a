//! Tooling & Integration Layer
//!
//! Command-line surface for driving sync runs.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
