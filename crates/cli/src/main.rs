//! alpsctl - ALPS touchpad diagnostics CLI
//!
//! Identifies ALPS touchpads from their PS/2 reports and replays raw packet
//! captures through the decoder and finger tracker.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod hexdump;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{IdentifyArgs, ReplayArgs};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "alpsctl")]
#[command(about = "ALPS touchpad diagnostics - identify devices and replay packet captures")]
#[command(version)]
#[command(long_about = "
alpsctl decodes ALPS touchpad traffic offline. It identifies a device from its
E7/EC reports and replays captured PS/2 byte streams through the same framing,
decoding and finger tracking a driver would use.

Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(long, global = true, help = "Output in JSON format for machine parsing")]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify a device from its E7 and EC reports
    Identify(IdentifyArgs),

    /// Replay a packet capture through a touchpad session
    Replay(ReplayArgs),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("alpsctl={log_level},alps_protocol={log_level},alps_tracker={log_level},alps_touchpad={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    match execute_command(&cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            std::process::exit(exit_code);
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Identify(args) => commands::identify::execute(args, cli.json),
        Commands::Replay(args) => commands::replay::execute(args, cli.json),
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}
