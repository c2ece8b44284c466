use std::path::PathBuf;

use crate::error::{RenameError, Result};

const IMAGE_EXTENSIONS: &[&str] = &["JPG", "JPEG", "CR2", "DNG"];
const VIDEO_EXTENSIONS: &[&str] = &["AVI", "MP4", "MOV", "3GP", "M4V", "MPG"];
const RAW_EXTENSIONS: &[&str] = &["RW2"];

/// How capture metadata is read for a given extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFamily {
    /// Embedded EXIF tags
    Image,
    /// Container creation time, via the external probe
    Video,
    /// Fixed-offset date string (Panasonic RW2)
    Raw,
}

impl MediaFamily {
    /// Classify an upper-cased extension (without the dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        if IMAGE_EXTENSIONS.contains(&extension) {
            Some(MediaFamily::Image)
        } else if VIDEO_EXTENSIONS.contains(&extension) {
            Some(MediaFamily::Video)
        } else if RAW_EXTENSIONS.contains(&extension) {
            Some(MediaFamily::Raw)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Absolute source path
    pub path: PathBuf,
    /// Upper-cased extension without the leading dot
    pub extension: String,
    pub family: MediaFamily,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_uppercase())
            .unwrap_or_default();

        let Some(family) = MediaFamily::from_extension(&extension) else {
            return Err(RenameError::UnsupportedFormat { path });
        };

        Ok(Self {
            path,
            extension,
            family,
        })
    }
}
