use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Exif, In, Reader, Tag, Value};

use super::{day_label, parse_date_str, CaptureMetadata, DEFAULT_DATE_STR};
use crate::error::{RenameError, Result};

/// Placeholder when the camera model tag is absent.
pub const UNKNOWN_MODEL: &str = "UNKNOWN";

/// Read capture time and camera model from the EXIF block of an image.
/// EXIF datetimes have no timezone info - they are local time as-is.
pub fn extract_image(path: &Path, short_names: bool) -> Result<CaptureMetadata> {
    let file = File::open(path).map_err(|e| RenameError::io(path, e))?;
    let tags = match Reader::new().read_from_container(&mut BufReader::new(file)) {
        Ok(tags) => Some(tags),
        Err(exif::Error::Io(e)) => return Err(RenameError::io(path, e)),
        Err(e @ (exif::Error::NotFound(_) | exif::Error::InvalidFormat(_))) => {
            log::debug!("No EXIF data in {}: {}", path.display(), e);
            None
        }
        Err(e) => return Err(e.into()),
    };

    let date_str = tags
        .as_ref()
        .and_then(|tags| ascii_field(tags, Tag::DateTimeOriginal))
        .unwrap_or_else(|| DEFAULT_DATE_STR.to_string());
    let model = tags
        .as_ref()
        .and_then(|tags| ascii_field(tags, Tag::Model))
        .unwrap_or_else(|| UNKNOWN_MODEL.to_string());

    let timestamp = parse_date_str(&date_str)?;
    let label = if short_names {
        day_label(&timestamp)
    } else {
        format!("{}-{}", day_label(&timestamp), sanitize_model(&model))
    };

    Ok(CaptureMetadata { timestamp, label })
}

/// First ASCII value of a primary-image tag, NUL padding removed.
fn ascii_field(tags: &Exif, tag: Tag) -> Option<String> {
    let field = tags.get_field(tag, In::PRIMARY)?;
    let Value::Ascii(ref values) = field.value else {
        return None;
    };
    let text = String::from_utf8_lossy(values.first()?)
        .trim_end_matches('\0')
        .to_string();
    (!text.trim().is_empty()).then_some(text)
}

/// Make a camera model usable as a path segment.
pub fn sanitize_model(model: &str) -> String {
    model
        .trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '\\' | '/'))
        .collect()
}
