//! Board configuration
//!
//! A board file describes which part is fitted, how the driver should talk
//! to it and how the emulated chip behaves. Example:
//!
//! ```ron
//! (
//!     chip: Some(Gd25wb256e),
//!     driver: (
//!         frequency_hz: Some(4000000),
//!         ident: (attempts: 200, delay_us: 50),
//!     ),
//!     image: Some("scratchpad.bin"), // relative to the board file
//!     emulator: (busy_polls: 4),
//! )
//! ```

use extflash_core::chip::ChipVariant;
use extflash_core::flash::DriverConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a board file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("Cannot read board file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed RON
    #[error("Invalid board file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Behaviour of the emulated chip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorSettings {
    /// Part the emulator answers as (defaults to the board chip)
    pub chip: Option<ChipVariant>,
    /// Status reads reporting WIP after each program or erase
    pub busy_polls: u32,
    /// RDID attempts answered with an idle line
    pub ident_delay: u32,
    /// Largest single SPI exchange
    pub max_transfer_len: usize,
}

impl Default for EmulatorSettings {
    fn default() -> Self {
        Self {
            chip: None,
            busy_polls: 2,
            ident_delay: 0,
            max_transfer_len: 255,
        }
    }
}

/// Board description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Fitted part
    pub chip: Option<ChipVariant>,
    /// Parts `probe` considers; empty means every supported part
    pub candidates: Vec<ChipVariant>,
    /// Driver settings
    pub driver: DriverConfig,
    /// Image file backing the emulated chip
    pub image: Option<PathBuf>,
    /// Emulated chip behaviour
    pub emulator: EmulatorSettings,
}

impl BoardConfig {
    /// Load a board file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded board configuration from {}", path.display());
        Ok(match path.parent() {
            Some(dir) => config.relative_to(dir),
            None => config,
        })
    }

    /// Anchor a relative image path at `dir`
    pub fn relative_to(mut self, dir: &Path) -> Self {
        if let Some(image) = self.image.as_mut() {
            if image.is_relative() {
                *image = dir.join(&*image);
            }
        }
        self
    }

    /// The part the driver is built for
    pub fn chip(&self) -> ChipVariant {
        self.chip.unwrap_or(ChipVariant::Gd25wb256e)
    }

    /// The part the emulator answers as
    pub fn attached_chip(&self) -> ChipVariant {
        self.emulator.chip.unwrap_or_else(|| self.chip())
    }

    /// Candidate parts for `probe`
    pub fn candidates(&self) -> Vec<ChipVariant> {
        if self.candidates.is_empty() {
            ChipVariant::ALL.to_vec()
        } else {
            self.candidates.clone()
        }
    }
}
