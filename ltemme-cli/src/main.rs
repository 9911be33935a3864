//! nas-tool: decode, protect and inspect EPS NAS PDUs

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use ltemme_common::config::NasConfig;
use ltemme_common::logging::{init_logging_with_filter, LogLevel};
use ltemme_nas::enums::Direction;

#[derive(Parser, Debug)]
#[command(name = "nas-tool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a plain or secured NAS PDU
    Decode {
        /// PDU as hex
        #[arg(value_name = "HEX")]
        pdu: String,

        /// Authenticate and decipher with this context
        #[command(flatten)]
        security: SecurityArgs,

        /// Print an offset/hex/ASCII dump of the input
        #[arg(long)]
        dump: bool,
    },
    /// Secure a plain NAS PDU
    Encode {
        /// Plain PDU as hex (ignored for a SERVICE REQUEST)
        #[arg(value_name = "HEX", default_value = "")]
        plain: String,

        /// Security header type (1-4, or 12 for SERVICE REQUEST)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
        sht: u8,

        /// Key set identifier for a SERVICE REQUEST
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=7))]
        ksi: u8,

        #[command(flatten)]
        security: SecurityArgs,
    },
    /// Print the keys derived from KASME
    Derive {
        #[command(flatten)]
        security: SecurityArgs,
    },
}

/// Security context parameters shared by all subcommands
#[derive(Args, Debug, Clone)]
pub struct SecurityArgs {
    /// KASME as 64 hex digits
    #[arg(long, value_name = "HEX")]
    pub kasme: Option<String>,

    /// Integrity algorithm (defaults to the first configured one)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub eia: Option<u8>,

    /// Ciphering algorithm (defaults to the first configured one)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub eea: Option<u8>,

    /// Direction of the PDU
    #[arg(long, value_enum, default_value_t = DirectionArg::Dl)]
    pub direction: DirectionArg,

    /// NAS COUNT for the direction
    #[arg(long, default_value_t = 0)]
    pub count: u32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    Ul,
    Dl,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Ul => Direction::Uplink,
            DirectionArg::Dl => Direction::Downlink,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NasConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => NasConfig::default(),
    };

    match cli.log_level {
        Some(level) => init_logging_with_filter(&level.to_string()),
        None => init_logging_with_filter(config.logging_filter()),
    }

    match cli.command {
        Command::Decode { pdu, security, dump } => commands::decode(&config, &pdu, &security, dump),
        Command::Encode {
            plain,
            sht,
            ksi,
            security,
        } => commands::encode(&config, &plain, sht, ksi, &security),
        Command::Derive { security } => commands::derive(&config, &security),
    }
}
