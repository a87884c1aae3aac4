//! PolicyLens CLI library.
//!
//! Argument parsing, configuration resolution, command execution, and
//! output formatting for the `policylens` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Overrides;
pub use error::{CliError, Result};
pub use output::{Formatter, OutputFormat};
