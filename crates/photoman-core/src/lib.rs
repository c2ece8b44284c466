pub mod date;
pub mod error;
pub mod media;
pub mod mover;
pub mod resolver;
pub mod tools;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use date::CaptureMetadata;
pub use error::RenameError;
pub use media::{MediaFamily, MediaFile};
use mover::Resolution;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameOptions {
    /// Root the renamed files are moved under
    pub output: PathBuf,
    /// Place files under a per-day (or per-day+camera) directory
    #[serde(default)]
    pub group_by_directory: bool,
    /// Delete sources whose content already exists at the destination
    #[serde(default)]
    pub remove_duplicates: bool,
    /// Date-only labels, without the camera model
    #[serde(default)]
    pub short_names: bool,
    /// Explicit probe binary; see [`tools::ffprobe_path`] for the fallback
    #[serde(default)]
    pub ffprobe: Option<PathBuf>,
}

impl RenameOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            group_by_directory: false,
            remove_duplicates: false,
            short_names: false,
            ffprobe: None,
        }
    }

    fn ffprobe_path(&self) -> PathBuf {
        self.ffprobe.clone().unwrap_or_else(tools::ffprobe_path)
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Moved {
        from: PathBuf,
        to: PathBuf,
    },
    SkippedDuplicate {
        path: PathBuf,
        duplicate_of: PathBuf,
        removed: bool,
    },
    SkippedError {
        path: PathBuf,
        cause: String,
    },
}

impl Outcome {
    pub fn source(&self) -> &Path {
        match self {
            Outcome::Moved { from, .. } => from,
            Outcome::SkippedDuplicate { path, .. } | Outcome::SkippedError { path, .. } => path,
        }
    }

    /// Where the file ended up, if it was moved.
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Outcome::Moved { to, .. } => Some(to),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Progress<'a> {
    /// Files completed before this one
    pub current: usize,
    pub total: usize,
    pub percent: f64,
    pub outcome: &'a Outcome,
}

/// Type alias for progress callback; it may borrow from the caller.
pub type ProgressCallback<'a> = dyn Fn(&Progress<'_>) + Send + Sync + 'a;

/// A batch stopped early because the environment is unusable.
#[derive(Error, Debug)]
#[error("batch aborted after {} of {total} file(s): {source}", .outcomes.len())]
pub struct BatchAborted {
    /// Outcomes of the files handled before the abort
    pub outcomes: Vec<Outcome>,
    pub total: usize,
    #[source]
    pub source: RenameError,
}

fn percent(current: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    current as f64 * 100.0 / total as f64
}

/// Rename every file in `paths`, in order.
///
/// Per-file failures become [`Outcome::SkippedError`] and the batch goes on.
/// Only a missing probe tool stops it, returning what was done so far.
pub fn process(
    paths: &[PathBuf],
    options: &RenameOptions,
    progress_callback: &ProgressCallback<'_>,
) -> std::result::Result<Vec<Outcome>, BatchAborted> {
    let ffprobe = options.ffprobe_path();
    let total = paths.len();
    let mut outcomes = Vec::with_capacity(total);

    for (current, path) in paths.iter().enumerate() {
        let outcome = match rename_file(path, options, &ffprobe) {
            Ok(outcome) => outcome,
            Err(source) if source.is_fatal() => {
                return Err(BatchAborted {
                    outcomes,
                    total,
                    source,
                })
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                Outcome::SkippedError {
                    path: path.clone(),
                    cause: e.to_string(),
                }
            }
        };

        progress_callback(&Progress {
            current,
            total,
            percent: percent(current, total),
            outcome: &outcome,
        });
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Extract, name and move a single file.
pub fn rename_file(path: &Path, options: &RenameOptions, ffprobe: &Path) -> error::Result<Outcome> {
    let file = MediaFile::new(path)?;
    let metadata = date::extract(&file, options.short_names, ffprobe)?;

    let outcome = match mover::resolve_and_move(&file.path, &metadata, &file.extension, options)? {
        Resolution::Moved(to) => Outcome::Moved { from: file.path, to },
        Resolution::Duplicate { existing, removed } => Outcome::SkippedDuplicate {
            path: file.path,
            duplicate_of: existing,
            removed,
        },
    };
    Ok(outcome)
}
