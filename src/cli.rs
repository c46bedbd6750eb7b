//! CLI argument parsing

use crate::programmers;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wbspi_core::wp::LockdownMode;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    format!(
        "Programmer to use [available: {}]",
        programmers::programmer_names_short()
    )
}

#[derive(Parser)]
#[command(name = "wbspi")]
#[command(author, version, about = "Winbond SPI NOR flash tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe for flash chip
    Probe {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,
    },

    /// Show chip information
    Info {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,
    },

    /// Read flash contents to file
    Read {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write file to flash
    Write {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Flash address to write the file at (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        offset: u32,

        /// Don't erase before writing (target must already be erased)
        #[arg(long)]
        no_erase: bool,

        /// Skip read-back verification
        #[arg(long)]
        no_verify: bool,
    },

    /// Erase flash chip
    Erase {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,

        /// Start address for partial erase (hex, e.g., 0x10000)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Length of region to erase (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,
    },

    /// List supported programmers
    ListProgrammers,

    /// List supported chips
    ListChips,

    /// Write protection operations
    #[command(subcommand)]
    Wp(WpCommands),
}

/// Status register lock-down applied together with a protection range
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LockArg {
    /// Clear SRP0/SRP1, status register freely writable
    None,
    /// Locked while the WP# pin is asserted
    Pin,
    /// Locked until the next power cycle
    Reboot,
    /// Locked forever (cannot be undone)
    Permanent,
}

impl From<LockArg> for LockdownMode {
    fn from(arg: LockArg) -> Self {
        match arg {
            LockArg::None => LockdownMode::None,
            LockArg::Pin => LockdownMode::Pin,
            LockArg::Reboot => LockdownMode::Reboot,
            LockArg::Permanent => LockdownMode::Permanent,
        }
    }
}

/// Write protection subcommands
#[derive(Subcommand)]
pub enum WpCommands {
    /// Show current write protection status
    Status {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,
    },

    /// List available protection ranges
    List {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,
    },

    /// Protect a range at the bottom or top of the flash
    Set {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,

        /// Start address of the range (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        start: u32,

        /// Length of the range (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        length: u32,

        /// Use volatile status register write (lost on power cycle)
        #[arg(long)]
        temporary: bool,

        /// Status register lock-down (default: leave unchanged)
        #[arg(long, value_enum)]
        lock: Option<LockArg>,
    },

    /// Disable write protection
    Disable {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,

        /// Use volatile status register write (lost on power cycle)
        #[arg(long)]
        temporary: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0x10000"), Ok(0x10000));
        assert_eq!(parse_hex_u32("0X1f"), Ok(0x1F));
        assert_eq!(parse_hex_u32("4096"), Ok(4096));
        assert!(parse_hex_u32("0xZZ").is_err());
        assert!(parse_hex_u32("-1").is_err());
    }

    #[test]
    fn test_parse_wp_set() {
        let cli = Cli::try_parse_from([
            "wbspi", "wp", "set", "-p", "dummy", "--start", "0", "--length", "0x10000", "--lock",
            "pin",
        ])
        .unwrap();
        match cli.command {
            Commands::Wp(WpCommands::Set {
                start,
                length,
                temporary,
                lock,
                ..
            }) => {
                assert_eq!(start, 0);
                assert_eq!(length, 0x10000);
                assert!(!temporary);
                assert_eq!(lock.map(LockdownMode::from), Some(LockdownMode::Pin));
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
