//! Music Provider - command-line client for Subsonic-compatible servers.
//!
//! Browses, searches and edits a remote library through the provider layer
//! in the `music_provider` library crate.

mod cli;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("music_provider=info".parse()?))
        .init();

    cli::run_command(&args)
}
