use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a single file from being renamed.
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("unsupported file format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    /// The probe binary could not be started at all. The only error that
    /// aborts a batch.
    #[error("could not run {}: not found", .tool.display())]
    ExternalToolMissing { tool: PathBuf },

    #[error("no known date format matches {value:?}")]
    InvalidTimestamp { value: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),

    #[error("no free name left for {}", .path.display())]
    SuffixExhausted { path: PathBuf },
}

impl RenameError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenameError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the environment is broken rather than the file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenameError::ExternalToolMissing { .. })
    }
}

pub type Result<T> = std::result::Result<T, RenameError>;
