//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the village monitor.

use clap::{Parser, Subcommand};

/// twb-monitor - Live village status for the tribal wars bot
///
/// Connects to the bot's push endpoint and redraws the state of every
/// village each time a new snapshot arrives.
#[derive(Parser, Debug)]
#[command(name = "twb-monitor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the live village state
    Watch {
        /// Path to configuration file
        #[arg(short, long, env = "TWB_CONFIG")]
        config: Option<String>,

        /// Endpoint URL, overriding host/path/secure (e.g. ws://127.0.0.1:8080/ws)
        #[arg(long)]
        url: Option<String>,
    },

    /// Render one snapshot document and exit
    Render {
        /// Snapshot file, or "-" for stdin
        input: String,

        /// Print the display model as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
