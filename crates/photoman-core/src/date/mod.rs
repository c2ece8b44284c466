pub mod exif;
pub mod raw;
pub mod video;

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{RenameError, Result};
use crate::media::{MediaFamily, MediaFile};

/// Used when a file carries no usable capture time, so it still gets a
/// deterministic name instead of being skipped.
pub const DEFAULT_DATE_STR: &str = "1970:01:01 00:00:00";

/// Tried in order, first match wins.
const DATE_FORMATS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S ",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.fZ",
];

/// Capture time plus the label used for grouping directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    pub timestamp: NaiveDateTime,
    pub label: String,
}

impl CaptureMetadata {
    /// `YYYYMMDD_HHMMSS`
    pub fn base_name(&self) -> String {
        self.timestamp.format("%Y%m%d_%H%M%S").to_string()
    }
}

/// Parse metadata date text against the known formats.
pub fn parse_date_str(value: &str) -> Result<NaiveDateTime> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| RenameError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// `YYYY-MM-DD`, the leading part of every label.
pub(crate) fn day_label(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// Extract capture metadata using the strategy for the file's format family.
pub fn extract(file: &MediaFile, short_names: bool, ffprobe: &Path) -> Result<CaptureMetadata> {
    match file.family {
        MediaFamily::Image => exif::extract_image(&file.path, short_names),
        MediaFamily::Video => video::extract_video(&file.path, ffprobe),
        MediaFamily::Raw => raw::extract_rw2(&file.path),
    }
}
