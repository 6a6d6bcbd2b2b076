//! CLI module for agent-stream.
//!
//! This module provides:
//! - Argument parsing
//! - Version display
//! - The query command
//!
//! # Usage
//!
//! ```ignore
//! use agent_stream::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args()) {
//!     CliCommand::Query(args) => runtime.block_on(handle_query_command(args))?,
//!     ...
//! }
//! ```

pub mod args;
pub mod query;
pub mod version;

pub use args::{parse_args, CliCommand, QueryArgs, USAGE};
pub use query::{handle_query_command, render_message};
pub use version::{version_string, VERSION};
