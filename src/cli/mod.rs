//! Command-line interface for music-provider.
//!
//! This module provides CLI commands for browsing, searching, rating and
//! inspecting a Subsonic server through the provider layer.

mod commands;

pub use commands::{Cli, run_command};
