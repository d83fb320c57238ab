//! Flash image files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::DummyFlash;

/// Errors loading or saving an image
#[derive(Debug, Error)]
pub enum ImageError {
    /// I/O error
    #[error("Cannot access image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Image does not fit the emulated chip
    #[error("Image is {actual} bytes but the chip holds {capacity}")]
    TooLarge { actual: usize, capacity: usize },
}

/// Result type for image operations
pub type Result<T> = std::result::Result<T, ImageError>;

impl DummyFlash {
    /// Copy an image file into the array, starting at offset 0
    ///
    /// A shorter image leaves the rest of the array untouched. Returns the
    /// number of bytes loaded.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let image = fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if image.len() > self.data().len() {
            return Err(ImageError::TooLarge {
                actual: image.len(),
                capacity: self.data().len(),
            });
        }
        self.data_mut()[..image.len()].copy_from_slice(&image);
        log::debug!("Loaded {} bytes from {}", image.len(), path.display());
        Ok(image.len())
    }

    /// Write the whole array to an image file
    pub fn save_image(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.data()).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Saved {} bytes to {}", self.data().len(), path.display());
        Ok(())
    }
}
