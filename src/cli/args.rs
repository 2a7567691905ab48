//! CLI argument definitions using clap
//!
//! Commands:
//! - trackrate serve [--port <port>] [--database <path>]
//! - trackrate invoke [--database <path>]

use clap::{Parser, Subcommand};

/// trackrate - a small self-hostable review service for audio items
#[derive(Parser, Debug)]
#[command(name = "trackrate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Listen port (overrides the PORT environment variable)
        #[arg(long)]
        port: Option<u16>,

        /// Database path (overrides the TRACKRATE_DB environment variable)
        #[arg(long)]
        database: Option<String>,
    },

    /// Handle a single request read from stdin, write the response to
    /// stdout, and exit
    Invoke {
        /// Database path (overrides the TRACKRATE_DB environment variable)
        #[arg(long)]
        database: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
