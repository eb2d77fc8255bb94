//! Command-line arguments and the settings derived from them

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tini_protocol::FilenameFormat;
use tini_serial::SessionConfig;

/// Serial device used when neither `--device` nor `TINI_DEVICE` is given
pub const DEFAULT_DEVICE: &str = "/dev/ttyS0";

#[derive(Parser, Debug)]
#[command(name = "tini")]
#[command(about = "Download tracklogs from Flytec and Bräuniger flight recorders")]
#[command(version)]
pub struct Args {
    /// Serial device
    #[arg(short, long, env = "TINI_DEVICE", default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Download tracklogs into this directory
    #[arg(short = 'D', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Append the communication log to FILE, `-` for stdout
    #[arg(short, long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Override the three-letter manufacturer code in filenames
    #[arg(short, long, value_name = "CODE", value_parser = parse_manufacturer)]
    pub manufacturer: Option<String>,

    /// Use short (8.3) filenames
    #[arg(short, long)]
    pub short_filenames: bool,

    /// Overwrite existing tracklogs
    #[arg(short, long)]
    pub overwrite: bool,

    /// Suppress progress and summary output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log protocol activity to stderr
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show the instrument identity
    Id,
    /// List the tracklogs on the instrument
    #[command(visible_alias = "li")]
    List,
    /// Download tracklogs, e.g. `1,3-5,8-` (default: all)
    #[command(visible_alias = "do")]
    Download {
        #[arg(value_name = "LIST", allow_hyphen_values = true)]
        lists: Vec<String>,
    },
    /// Write the tracklog selected on the instrument to stdout
    #[command(visible_alias = "ig")]
    Igc,
}

/// Manufacturer codes name files, so they must be plain ASCII
fn parse_manufacturer(code: &str) -> Result<String, String> {
    if code.is_empty() {
        return Err("manufacturer code must not be empty".to_string());
    }
    if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(format!("{:?} is not an alphanumeric ASCII code", code));
    }
    Ok(code.to_string())
}

/// Where the communication log goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    File(PathBuf),
}

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub device: String,
    pub directory: PathBuf,
    pub log: Option<LogTarget>,
    pub session: SessionConfig,
    pub overwrite: bool,
    pub quiet: bool,
    pub verbose: bool,
}

impl Settings {
    /// Split parsed arguments into settings and the command to run
    pub fn from_args(args: Args) -> (Self, CliCommand) {
        let log = args.log.map(|path| {
            if path.as_os_str() == "-" {
                LogTarget::Stdout
            } else {
                LogTarget::File(path)
            }
        });
        let filename_format = if args.short_filenames {
            FilenameFormat::Short
        } else {
            FilenameFormat::Long
        };
        let settings = Self {
            device: args.device,
            directory: args.directory.unwrap_or_default(),
            log,
            session: SessionConfig {
                manufacturer: args.manufacturer,
                filename_format,
            },
            overwrite: args.overwrite,
            quiet: args.quiet,
            verbose: args.verbose,
        };
        let command = args
            .command
            .unwrap_or(CliCommand::Download { lists: Vec::new() });
        (settings, command)
    }
}
