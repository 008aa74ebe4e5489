//! twb-monitor - live village status for the tribal wars bot
//!
//! Entry point for the monitor binary. `watch` keeps a WebSocket open to
//! the bot and redraws the terminal on every snapshot; `render` prints a
//! single snapshot document once.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use twb_monitor::cli::{Cli, Commands, ConfigSubcommand};
use twb_monitor::config::{self, MonitorConfig};
use twb_monitor::connection::WsTransport;
use twb_monitor::error::{Error, Result};
use twb_monitor::logging;
use twb_monitor::render::{RecordingSurface, Renderer, TerminalScreen};
use twb_monitor::snapshot::Snapshot;
use twb_monitor::version;
use twb_monitor::Monitor;

fn main() -> Result<()> {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            version::print_version();
            Ok(())
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::Render { input, json } => {
            logging::init_simple(if cli.quiet {
                tracing::Level::ERROR
            } else {
                tracing::Level::WARN
            })?;
            if let Err(e) = run_render(&input, json) {
                eprintln!("Error: {:#}", e);
                std::process::exit(e.downcast_ref::<Error>().map_or(1, Error::exit_code));
            }
            Ok(())
        }
        Commands::Watch { config, url } => {
            let mut config = load_config_or_exit(config.as_deref());

            if let Some(url) = url {
                config.endpoint.url = Some(url);
                if let Err(e) = config.validate() {
                    exit_with(e);
                }
            }

            // The guards must be kept alive for the lifetime of the program
            let log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)
                .unwrap_or_else(|e| exit_with(e));

            let build = version::build_info();
            info!(
                version = %build.full_version(),
                target = %build.target,
                profile = %build.profile,
                "Starting twb-monitor"
            );

            if let Err(e) = run_watch(config) {
                error!(error = %e.format_for_log(), "Monitor stopped");
                // Flush file logs; process::exit skips destructors
                drop(log_guards);
                exit_with(e);
            }
            Ok(())
        }
    }
}

fn load_config_or_exit(path: Option<&str>) -> MonitorConfig {
    match MonitorConfig::load(path) {
        Ok(cfg) => cfg,
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: Error) -> ! {
    eprint!("{}", e.format_for_terminal());
    std::process::exit(e.exit_code());
}

/// Run the live monitor until Ctrl+C
fn run_watch(config: MonitorConfig) -> Result<()> {
    info!(
        url = %config.endpoint.resolve_url()?,
        reconnect_delay_ms = config.endpoint.reconnect_delay_ms,
        "Configuration loaded"
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;

    rt.block_on(async {
        let screen = TerminalScreen::new(config.display.clone());
        let transport = WsTransport::new(config.endpoint.connect_timeout());
        let mut monitor = Monitor::new(&config, transport, screen.clone(), screen)?;
        monitor.run().await
    })
}

/// Render one snapshot document from a file or stdin
fn run_render(input: &str, json: bool) -> anyhow::Result<()> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read snapshot from stdin")?;
        buf
    } else {
        let path = Path::new(input);
        std::fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?
    };

    let snapshot = Snapshot::from_json(&text).with_context(|| format!("Invalid snapshot in {}", input))?;

    let mut renderer = Renderer::new(RecordingSurface::new());
    let model = renderer.render(&snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(model).map_err(Error::Encode)?);
    } else {
        print!("{}", model);
    }

    Ok(())
}

/// Handle config subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = MonitorConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate { config } => match MonitorConfig::load(config.as_deref()) {
            Ok(_) => {
                println!("Configuration is valid.");
            }
            Err(e) => exit_with(e),
        },
    }

    Ok(())
}
