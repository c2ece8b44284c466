use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use super::{day_label, parse_date_str, CaptureMetadata};
use crate::error::{RenameError, Result};

/// Panasonic RW2 files store the capture time as plain text at this offset.
const RW2_DATE_OFFSET: u64 = 0x0E46;
/// `YYYY:MM:DD HH:MM:SS`
const RW2_DATE_LEN: usize = 19;

pub fn extract_rw2(path: &Path) -> Result<CaptureMetadata> {
    let mut file = File::open(path).map_err(|e| RenameError::io(path, e))?;
    let mut buf = [0u8; RW2_DATE_LEN];
    file.seek(SeekFrom::Start(RW2_DATE_OFFSET))
        .and_then(|_| file.read_exact(&mut buf))
        .map_err(|e| RenameError::io(path, e))?;

    let text = std::str::from_utf8(&buf).map_err(|_| RenameError::InvalidTimestamp {
        value: String::from_utf8_lossy(&buf).into_owned(),
    })?;
    let timestamp = parse_date_str(text)?;

    Ok(CaptureMetadata {
        label: day_label(&timestamp),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rw2_with(date: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; RW2_DATE_OFFSET as usize];
        bytes.extend_from_slice(date);
        bytes.extend_from_slice(&[0u8; 64]);
        bytes
    }

    #[test]
    fn test_reads_date_at_offset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("P1000123.RW2");
        std::fs::write(&path, rw2_with(b"2019:07:14 08:30:05")).unwrap();

        let meta = extract_rw2(&path).unwrap();
        assert_eq!(meta.base_name(), "20190714_083005");
        assert_eq!(meta.label, "2019-07-14");
    }

    #[test]
    fn test_truncated_file_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.RW2");
        std::fs::write(&path, [0u8; 128]).unwrap();

        assert!(matches!(extract_rw2(&path), Err(RenameError::Io { .. })));
    }

    #[test]
    fn test_binary_garbage_is_invalid_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.RW2");
        std::fs::write(&path, rw2_with(&[0xFFu8; RW2_DATE_LEN])).unwrap();

        assert!(matches!(
            extract_rw2(&path),
            Err(RenameError::InvalidTimestamp { .. })
        ));
    }
}
