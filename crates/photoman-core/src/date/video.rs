use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use super::{day_label, parse_date_str, CaptureMetadata, DEFAULT_DATE_STR};
use crate::error::{RenameError, Result};

const CREATION_TIME_MARKER: &str = "creation_time";
const VIDEO_LABEL: &str = "video";

/// Read the container creation time by running the probe on `path`.
///
/// A probe that cannot be started is reported as
/// [`RenameError::ExternalToolMissing`]. A probe that runs but prints no
/// creation time yields the epoch default.
pub fn extract_video(path: &Path, ffprobe: &Path) -> Result<CaptureMetadata> {
    let output = match Command::new(ffprobe).arg(path).output() {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(RenameError::ExternalToolMissing {
                tool: ffprobe.to_path_buf(),
            })
        }
        Err(e) => return Err(RenameError::io(ffprobe, e)),
    };

    if !output.status.success() {
        log::debug!(
            "{} exited with {} for {}",
            ffprobe.display(),
            output.status,
            path.display()
        );
    }

    // ffprobe prints stream info on stderr
    let text = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    let date_str = match find_creation_time(&text) {
        Some(value) => value,
        None => {
            log::debug!("No creation_time for {}, using default", path.display());
            DEFAULT_DATE_STR
        }
    };

    let timestamp = parse_date_str(date_str)?;
    Ok(CaptureMetadata {
        label: format!("{}-{}", day_label(&timestamp), VIDEO_LABEL),
        timestamp,
    })
}

/// Value of the first `creation_time` line: everything after its first colon.
pub fn find_creation_time(probe_output: &str) -> Option<&str> {
    probe_output
        .lines()
        .find(|line| line.contains(CREATION_TIME_MARKER))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim())
}
