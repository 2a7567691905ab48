//! CLI module for trackrate
//!
//! Provides the command-line interface for:
//! - serve: boot the HTTP server and run until stopped
//! - invoke: handle one JSON-encoded request from stdin and exit
//!
//! The two commands are the two hosting adapters over the same router.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{dispatch, invoke, run_command, serve};
pub use errors::{CliError, CliResult};
pub use io::{read_request, write_response, InvocationRequest, InvocationResponse};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}
