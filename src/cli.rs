//! Command-line interface for renju_client.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::settings::Mode;

/// Renju client - play five-in-a-row against a remote game service
#[derive(Parser, Debug)]
#[command(name = "renju_client")]
#[command(about = "Terminal client for a remote Renju game service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = "renju_client.toml")]
    pub config: PathBuf,

    /// Log file (logs never go to the terminal)
    #[arg(long, global = true, default_value = "renju_client.log")]
    pub log_file: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play an interactive game in the terminal
    Play {
        /// Game service URL (overrides config and environment)
        #[arg(long)]
        server_url: Option<String>,

        /// Who plays each side
        #[arg(long, value_enum)]
        mode: Option<Mode>,

        /// Automated opponent strength (e.g. beginner, intermediate)
        #[arg(long)]
        difficulty: Option<String>,
    },

    /// Print the current state of an existing session
    Show {
        /// Session identifier returned by the service
        session_id: String,

        /// Game service URL (overrides config and environment)
        #[arg(long)]
        server_url: Option<String>,
    },
}
