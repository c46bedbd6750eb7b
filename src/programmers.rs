//! Programmer registration and dispatch
//!
//! This module provides a centralized registry for all programmers, with support
//! for feature-gated inclusion and dynamic help text generation.

use std::path::PathBuf;

use thiserror::Error;
use wbspi_core::chip::{find_chip_by_name, ChipDescriptor};
use wbspi_core::flash::{self, FlashHandle};
use wbspi_core::programmer::SpiBus;

/// Information about a programmer
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Errors raised while setting up a programmer
#[derive(Debug, Error)]
pub enum ProgrammerError {
    /// Programmer name not known
    #[error("Unknown programmer: {0}")]
    Unknown(String),

    /// Option key not understood by the programmer
    #[error("Unknown option '{key}' for programmer {programmer}")]
    UnknownOption { programmer: &'static str, key: String },

    /// Option value could not be parsed
    #[error("Invalid value '{value}' for option '{key}'")]
    InvalidValue { key: String, value: String },

    /// Chip name not in the table
    #[error("Unknown chip: {0} (see 'wbspi list-chips')")]
    UnknownChip(String),

    /// Backing image could not be loaded or stored
    #[error("Image file {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Chip identification failed
    #[error("Probe failed: {0}")]
    Probe(#[source] wbspi_core::Error),
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        description: "In-memory flash emulator (chip=<name>,image=<file>,lock=<0|1>)",
    });

    programmers
}

/// Generate help text listing all available programmers
pub fn programmer_help() -> String {
    let programmers = available_programmers();

    if programmers.is_empty() {
        return "No programmers available (recompile with programmer features enabled)".to_string();
    }

    let mut help = String::from("Available programmers:\n");
    for p in &programmers {
        help.push_str(&format!("  {:12} - {}\n", p.name, p.description));
    }

    help
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Parse a programmer string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_programmer_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Options of the dummy programmer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyOptions {
    /// Emulated part
    pub chip: &'static ChipDescriptor,
    /// File the flash contents are loaded from and saved to
    pub image: Option<PathBuf>,
    /// Emulate a status register that ignores writes
    pub locked: bool,
}

/// Parse the dummy programmer options
pub fn parse_dummy_options(options: &[(&str, &str)]) -> Result<DummyOptions, ProgrammerError> {
    let mut parsed = DummyOptions {
        chip: find_chip_by_name("W25Q128_V")
            .ok_or_else(|| ProgrammerError::UnknownChip("W25Q128_V".into()))?,
        image: None,
        locked: false,
    };

    for &(key, value) in options {
        match key {
            "chip" => {
                parsed.chip = find_chip_by_name(value)
                    .ok_or_else(|| ProgrammerError::UnknownChip(value.to_string()))?;
            }
            "image" => parsed.image = Some(PathBuf::from(value)),
            "lock" => {
                parsed.locked = match value {
                    "1" | "yes" | "true" => true,
                    "0" | "no" | "false" => false,
                    _ => {
                        return Err(ProgrammerError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        })
                    }
                }
            }
            _ => {
                return Err(ProgrammerError::UnknownOption {
                    programmer: "dummy",
                    key: key.to_string(),
                })
            }
        }
    }

    Ok(parsed)
}

/// Open the programmer, probe the chip and run `f` with both
///
/// The programmer string can be just the name (e.g., "dummy") or include
/// parameters (e.g., "dummy:chip=W25Q64_V,image=flash.bin"). With
/// `persist` set, a dummy image file is written back after `f` succeeds.
#[allow(unused_variables)]
pub fn with_flash<F>(programmer: &str, persist: bool, f: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut dyn SpiBus, &FlashHandle) -> Result<(), Box<dyn std::error::Error>>,
{
    let (name, options) = parse_programmer_string(programmer);

    match name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            use wbspi_dummy::{DummyConfig, DummyFlash};

            let opts = parse_dummy_options(&options)?;
            let mut config = DummyConfig::for_chip(opts.chip);
            config.status_locked = opts.locked;

            let mut master = match &opts.image {
                Some(path) if path.exists() => {
                    let data = std::fs::read(path).map_err(|source| ProgrammerError::Image {
                        path: path.clone(),
                        source,
                    })?;
                    log::info!("Loaded {} bytes from {}", data.len(), path.display());
                    DummyFlash::with_data(config, &data)
                }
                _ => DummyFlash::new(config),
            };

            let handle = flash::probe_spi(&mut master).map_err(ProgrammerError::Probe)?;
            f(&mut master, &handle)?;

            if let (true, Some(path)) = (persist, &opts.image) {
                std::fs::write(path, master.data()).map_err(|source| ProgrammerError::Image {
                    path: path.clone(),
                    source,
                })?;
                log::info!("Saved flash contents to {}", path.display());
            }
            Ok(())
        }

        _ => Err(unknown_programmer_error(name)),
    }
}

fn unknown_programmer_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("{}\n\n", ProgrammerError::Unknown(name.to_string()));
    msg.push_str(&programmer_help());
    msg.push_str("\nUse 'wbspi list-programmers' for more details");
    msg.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_programmer_string() {
        assert_eq!(parse_programmer_string("dummy"), ("dummy", vec![]));
        assert_eq!(
            parse_programmer_string("dummy:chip=W25Q64_V,image=a.bin"),
            ("dummy", vec![("chip", "W25Q64_V"), ("image", "a.bin")])
        );
    }

    #[test]
    fn test_parse_dummy_options() {
        let opts = parse_dummy_options(&[("chip", "w25q32dw"), ("lock", "1")]).unwrap();
        assert_eq!(opts.chip.name, "W25Q32DW");
        assert!(opts.locked);
        assert_eq!(opts.image, None);

        let defaults = parse_dummy_options(&[]).unwrap();
        assert_eq!(defaults.chip.name, "W25Q128_V");
        assert!(!defaults.locked);
    }

    #[test]
    fn test_parse_dummy_options_errors() {
        assert!(matches!(
            parse_dummy_options(&[("chip", "MX25L6405")]),
            Err(ProgrammerError::UnknownChip(_))
        ));
        assert!(matches!(
            parse_dummy_options(&[("lock", "maybe")]),
            Err(ProgrammerError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_dummy_options(&[("speed", "1")]),
            Err(ProgrammerError::UnknownOption { .. })
        ));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_with_flash_dummy() {
        let mut name = None;
        with_flash("dummy:chip=W25Q16_V", false, |_, handle| {
            name = Some(handle.name());
            Ok(())
        })
        .unwrap();
        assert_eq!(name, Some("W25Q16_V"));
    }

    #[test]
    fn test_unknown_programmer() {
        assert!(with_flash("ch341a", false, |_, _| Ok(())).is_err());
    }
}
