//! Destination naming. Pure: nothing in here touches the filesystem.

use std::path::{Path, PathBuf};

use crate::date::CaptureMetadata;

/// One proposed destination for a file, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationCandidate {
    /// Grouping directory (the metadata label), if grouping is enabled
    pub directory: Option<String>,
    /// `YYYYMMDD_HHMMSS`
    pub base_name: String,
    /// Upper-cased, without the dot
    pub extension: String,
    /// 0 for the plain name, otherwise appended as `_<n>`
    pub suffix: u32,
}

impl DestinationCandidate {
    pub fn new(
        metadata: &CaptureMetadata,
        extension: &str,
        group_by_directory: bool,
        suffix: u32,
    ) -> Self {
        Self {
            directory: group_by_directory.then(|| metadata.label.clone()),
            base_name: metadata.base_name(),
            extension: extension.to_ascii_uppercase(),
            suffix,
        }
    }

    pub fn file_name(&self) -> String {
        if self.suffix > 0 {
            format!("{}_{}.{}", self.base_name, self.suffix, self.extension)
        } else {
            format!("{}.{}", self.base_name, self.extension)
        }
    }

    pub fn to_path(&self, output_root: &Path) -> PathBuf {
        let dir = match &self.directory {
            Some(label) => output_root.join(label),
            None => output_root.to_path_buf(),
        };
        dir.join(self.file_name())
    }
}

/// Destination path for `metadata` at collision counter `suffix`.
pub fn build_candidate(
    output_root: &Path,
    metadata: &CaptureMetadata,
    extension: &str,
    group_by_directory: bool,
    suffix: u32,
) -> PathBuf {
    DestinationCandidate::new(metadata, extension, group_by_directory, suffix).to_path(output_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_date_str;

    fn meta(date: &str, label: &str) -> CaptureMetadata {
        CaptureMetadata {
            timestamp: parse_date_str(date).unwrap(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_flat_name() {
        let m = meta("2016:09:22 10:12:13", "2016-09-22-Canon_EOS_5D");
        assert_eq!(
            build_candidate(Path::new("/out"), &m, "jpg", false, 0),
            PathBuf::from("/out/20160922_101213.JPG")
        );
    }

    #[test]
    fn test_grouped_name_with_suffix() {
        let m = meta("2016:09:22 10:12:13", "2016-09-22-Canon_EOS_5D");
        assert_eq!(
            build_candidate(Path::new("/out"), &m, "Cr2", true, 3),
            PathBuf::from("/out/2016-09-22-Canon_EOS_5D/20160922_101213_3.CR2")
        );
    }

    #[test]
    fn test_extension_round_trip_and_determinism() {
        let m = meta("2022-01-05T10:00:00.000000Z", "2022-01-05-video");
        for ext in ["mp4", "MP4", "m4V"] {
            let first = build_candidate(Path::new("/out"), &m, ext, true, 1);
            let second = build_candidate(Path::new("/out"), &m, ext, true, 1);
            assert_eq!(first, second);
            assert_eq!(
                first.extension().and_then(|e| e.to_str()),
                Some(ext.to_ascii_uppercase().as_str())
            );
        }
    }

    #[test]
    fn test_candidate_fields() {
        let m = meta("2019:07:14 08:30:05", "2019-07-14");
        let c = DestinationCandidate::new(&m, "rw2", false, 0);
        assert_eq!(c.directory, None);
        assert_eq!(c.file_name(), "20190714_083005.RW2");
    }
}
