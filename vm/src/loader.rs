use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::ram::{RAMError, RAM};
use thiserror::Error;

/// Images are copied verbatim to the start of memory.
pub const LOAD_ADDRESS: u32 = 0;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Image of {size} bytes does not fit into {available} bytes of memory")]
    TooLarge { size: usize, available: usize },
    #[error(transparent)]
    RAMError(#[from] RAMError),
}

/// What to do with an image that is larger than the memory it is loaded into.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ImagePolicy {
    /// Fail with [LoadError::TooLarge].
    #[default]
    Reject,
    /// Keep the bytes that fit and drop the rest.
    Truncate,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Loader {
    pub policy: ImagePolicy,
}

impl Loader {
    pub fn new(policy: ImagePolicy) -> Self {
        Self { policy }
    }

    /// Returns the number of bytes copied into `ram`.
    pub fn load_bytes(&self, ram: &mut RAM, bytes: &[u8]) -> Result<usize, LoadError> {
        let available = ram.size().saturating_sub(LOAD_ADDRESS as usize);

        let image = if bytes.len() <= available {
            bytes
        } else {
            match self.policy {
                ImagePolicy::Reject => {
                    return Err(LoadError::TooLarge {
                        size: bytes.len(),
                        available,
                    })
                }
                ImagePolicy::Truncate => {
                    tracing::warn!(
                        size = bytes.len(),
                        available,
                        "image does not fit into memory, truncating"
                    );

                    &bytes[..available]
                }
            }
        };

        ram.write_bytes(image, LOAD_ADDRESS)?;

        tracing::debug!(bytes = image.len(), address = LOAD_ADDRESS, "image loaded");

        Ok(image.len())
    }

    pub fn load_file(&self, ram: &mut RAM, path: &Path) -> Result<usize, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.load_bytes(ram, &bytes)
    }
}
