//! wbspi - Winbond SPI NOR flash tool
//!
//! Identifies Winbond serial flash parts, reads, erases and programs them,
//! and manages their status-register block protection.
//!
//! # Architecture
//!
//! The chip logic lives in `wbspi-core` and only talks to a [`SpiBus`]
//! implementation. Programmers are selected by name on the command line;
//! each command receives the opened bus together with the handle returned
//! by probing.
//!
//! [`SpiBus`]: wbspi_core::programmer::SpiBus

mod cli;
mod commands;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands, WpCommands};
use programmers::with_flash;
use wbspi_core::wp::LockdownMode;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Probe { programmer } => {
            with_flash(&programmer, false, |_, handle| commands::probe::cmd_probe(handle))
        }
        Commands::Info { programmer } => {
            with_flash(&programmer, false, commands::probe::cmd_info)
        }
        Commands::Read { programmer, output } => with_flash(&programmer, false, |bus, handle| {
            commands::read::cmd_read(bus, handle, &output)
        }),
        Commands::Write {
            programmer,
            input,
            offset,
            no_erase,
            no_verify,
        } => with_flash(&programmer, true, |bus, handle| {
            commands::write::cmd_write(bus, handle, &input, offset, no_erase, no_verify)
        }),
        Commands::Erase {
            programmer,
            start,
            length,
        } => with_flash(&programmer, true, |bus, handle| {
            commands::erase::cmd_erase(bus, handle, start, length)
        }),
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
        Commands::ListChips => {
            commands::list_chips();
            Ok(())
        }
        Commands::Wp(wp_cmd) => run_wp(wp_cmd),
    }
}

fn run_wp(cmd: WpCommands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        WpCommands::Status { programmer } => {
            with_flash(&programmer, false, commands::wp::cmd_status)
        }
        WpCommands::List { programmer } => {
            with_flash(&programmer, false, |_, handle| commands::wp::cmd_list(handle))
        }
        WpCommands::Set {
            programmer,
            start,
            length,
            temporary,
            lock,
        } => {
            let mode = lock.map_or(LockdownMode::Preserve, LockdownMode::from);
            with_flash(&programmer, true, |bus, handle| {
                commands::wp::cmd_set(bus, handle, start, length, temporary, mode)
            })
        }
        WpCommands::Disable {
            programmer,
            temporary,
        } => with_flash(&programmer, true, |bus, handle| {
            commands::wp::cmd_disable(bus, handle, temporary)
        }),
    }
}
