pub mod devices;
pub mod reset;
pub mod status;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use inkpad_common::address::AddressList;
use inkpad_common::config::{Config, DetailLevel};
use inkpad_core::classifier::OverrideTable;
use inkpad_core::session::{DeviceSelector, Session};
use inkpad_core::snapshot::SnapshotProvider;
use tracing::debug;

pub const DEFAULT_CSV: &str = "waste_counters.csv";

#[derive(Parser)]
#[command(name = "inkpad", version)]
#[command(about = "Inspect and reset printer waste ink pad counters.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// EEPROM image file to use as a printer (repeatable)
    #[arg(long = "device-file", value_name = "PATH", global = true)]
    pub device_files: Vec<PathBuf>,

    /// Which printer to use when several are found
    #[arg(long = "device", value_name = "INDEX", global = true)]
    pub device_index: Option<usize>,

    /// JSON file with counter labels and capacities replacing the built-in ones
    #[arg(long, value_name = "PATH", global = true)]
    pub overrides: Option<PathBuf>,

    /// Less output (warnings and the report only)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show waste and platen pad counters
    #[command(alias = "s")]
    Status(StatusArgs),
    /// Zero waste counters
    #[command(alias = "r")]
    Reset(ResetArgs),
    /// List detected printers
    #[command(alias = "d")]
    Devices,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Include the diagnostic address set that often mirrors the main waste counter
    #[arg(long)]
    pub show_ambiguous: bool,

    /// Append one row per address to a CSV file
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = DEFAULT_CSV)]
    pub csv: Option<PathBuf>,

    /// One line per counter (default)
    #[arg(long, conflicts_with = "details")]
    pub summary: bool,

    /// List every address reading
    #[arg(long)]
    pub details: bool,

    /// Read these addresses when the model declares no counters (e.g. 0x2f,0x30)
    #[arg(long, value_name = "HEXLIST")]
    pub addresses: Option<AddressList>,

    /// Append a line per counter to a text status log
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["auto", "addresses", "from_log"])
))]
pub struct ResetArgs {
    /// Run the printer's own waste counter reset
    #[arg(long)]
    pub auto: bool,

    /// Zero these addresses (e.g. 0x2f,0x30)
    #[arg(long, value_name = "HEXLIST")]
    pub addresses: Option<AddressList>,

    /// Zero the counter addresses recorded in a status log
    #[arg(long, value_name = "PATH")]
    pub from_log: Option<PathBuf>,

    /// With --from-log, also use lines that do not mention waste, pad or counter
    #[arg(long, requires = "from_log")]
    pub all_lines: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> Config {
        let mut cfg = Config {
            overrides_path: self.overrides.clone(),
            device_files: self.device_files.clone(),
            device_index: self.device_index,
            quiet: self.quiet,
            ..Config::default()
        };

        match &self.command {
            Commands::Status(args) => {
                cfg.show_ambiguous = args.show_ambiguous;
                cfg.csv_path = args.csv.clone();
                cfg.status_log = args.log.clone();
                cfg.detail = if args.details {
                    DetailLevel::Detail
                } else {
                    DetailLevel::Summary
                };
            }
            Commands::Reset(args) => cfg.assume_yes = args.yes,
            Commands::Devices => {}
        }

        cfg
    }
}

pub fn load_overrides(cfg: &Config) -> anyhow::Result<OverrideTable> {
    let builtin = OverrideTable::builtin();
    let Some(path) = &cfg.overrides_path else {
        return Ok(builtin);
    };
    let custom = OverrideTable::load(path)?;
    debug!(path = %path.display(), families = custom.families.len(), "loaded counter overrides");
    Ok(builtin.merged_with(custom))
}

pub fn device_provider(cfg: &Config) -> SnapshotProvider {
    SnapshotProvider::new(cfg.device_files.clone())
}

/// Opens the one device this invocation works on.
pub fn open_session(cfg: &Config) -> anyhow::Result<Session> {
    let overrides = load_overrides(cfg)?;
    let selector = match cfg.device_index {
        Some(index) => DeviceSelector::Index(index),
        None => DeviceSelector::First,
    };
    let session = Session::open(&device_provider(cfg), &selector, overrides)
        .context("could not open a printer (pass --device-file PATH for an EEPROM image)")?;
    Ok(session)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
