//! tini - Flytec and Bräuniger flight recorder downloader
//!
//! Lists and downloads tracklogs over the instrument's serial link.

mod commands;
mod settings;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::{Args, CliCommand, Settings};

/// Prefix of messages on stderr
pub const PROGRAM_NAME: &str = "tini";

fn main() -> ExitCode {
    let args = Args::parse();
    let (settings, command) = Settings::from_args(args);

    let default_level = if settings.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "tini={0},tini_serial={0},tini_protocol={0}",
                    default_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&settings, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", PROGRAM_NAME, e);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings, command: CliCommand) -> Result<()> {
    tracing::debug!("Running {:?} on {}", command, settings.device);
    let mut session = commands::open_session(settings)?;
    let mut stdout = io::stdout().lock();
    match command {
        CliCommand::Id => commands::id(&mut session, &mut stdout),
        CliCommand::List => commands::list(&mut session, settings, &mut stdout),
        CliCommand::Download { lists } => {
            commands::download(&mut session, settings, &lists).map(|_| ())
        }
        CliCommand::Igc => commands::igc(&mut session, &mut stdout),
    }
}
