use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FimgError {
    #[error("Couldn't open {}: {source}", .path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Couldn't mmap FIMG registers: {0}")]
    MappingFailure(#[source] io::Error),

    #[error("I/O Error: {0}")]
    Io(#[from] io::Error),

    #[error("3D device is not open")]
    DeviceClosed,

    #[error("Out of 3D memory (requested {requested} bytes)")]
    OutOfMemory { requested: usize },

    #[error("Invalid allocation size: {0}")]
    InvalidSize(usize),

    #[error("Invalid block address: 0x{0:x}")]
    InvalidAddress(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FimgError {
    /// The errno behind this error, when a system call produced it.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::ResourceUnavailable { source, .. } => source.raw_os_error(),
            Self::MappingFailure(e) | Self::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

// A convenient alias
pub type FimgResult<T> = Result<T, FimgError>;
