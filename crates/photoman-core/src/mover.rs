use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::date::CaptureMetadata;
use crate::error::{RenameError, Result};
use crate::resolver::build_candidate;
use crate::RenameOptions;

/// Upper bound on collision suffixes tried for a single file.
const MAX_SUFFIX: u32 = 100_000;

const COMPARE_CHUNK: usize = 64 * 1024;

/// How a file's destination was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The file now lives at this path (or already did).
    Moved(PathBuf),
    /// An identical file already sits at `existing`; the source was deleted
    /// only if `removed` is set.
    Duplicate { existing: PathBuf, removed: bool },
}

enum State {
    Trying(u32),
    Moved(PathBuf),
    DuplicateDetected(PathBuf),
}

/// Move `source` to the first free candidate name, stepping the suffix past
/// collisions, or stop at a byte-identical duplicate.
pub fn resolve_and_move(
    source: &Path,
    metadata: &CaptureMetadata,
    extension: &str,
    options: &RenameOptions,
) -> Result<Resolution> {
    let mut state = State::Trying(0);
    loop {
        state = match state {
            State::Trying(suffix) if suffix > MAX_SUFFIX => {
                return Err(RenameError::SuffixExhausted {
                    path: source.to_path_buf(),
                })
            }
            State::Trying(suffix) => {
                let dest = build_candidate(
                    &options.output,
                    metadata,
                    extension,
                    options.group_by_directory,
                    suffix,
                );
                attempt(source, dest, suffix)?
            }
            State::Moved(dest) => return Ok(Resolution::Moved(dest)),
            State::DuplicateDetected(existing) => {
                if options.remove_duplicates {
                    log::error!("deleting {} ...", source.display());
                    fs::remove_file(source).map_err(|e| RenameError::io(source, e))?;
                }
                return Ok(Resolution::Duplicate {
                    existing,
                    removed: options.remove_duplicates,
                });
            }
        };
    }
}

fn attempt(source: &Path, dest: PathBuf, suffix: u32) -> Result<State> {
    // symlink_metadata so a dangling link still counts as taken
    let existing = match fs::symlink_metadata(&dest) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Will move file {} to {}", source.display(), dest.display());
            move_file(source, &dest)?;
            return Ok(State::Moved(dest));
        }
        Err(e) => return Err(RenameError::io(&dest, e)),
    };

    if source == dest || same_file(source, &dest) {
        return Ok(State::Moved(dest));
    }

    if existing.is_file() && files_identical(source, &dest)? {
        log::warn!("File {} is a duplicate.", source.display());
        return Ok(State::DuplicateDetected(dest));
    }

    Ok(State::Trying(suffix + 1))
}

/// Whether both paths reach the same file on disk, e.g. through a linked
/// output directory.
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(s), Ok(d)) => s.dev() == d.dev() && s.ino() == d.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(s), Ok(d)) => s == d,
        _ => false,
    }
}

/// Rename, falling back to copy + delete when the rename fails
/// (e.g. across filesystems). Parent directories are created as needed.
pub fn move_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| RenameError::io(parent, e))?;
    }

    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::debug!(
                "rename {} failed ({}), copying instead",
                source.display(),
                e
            );
            copy_then_remove(source, dest)
        }
    }
}

fn copy_then_remove(source: &Path, dest: &Path) -> Result<()> {
    if let Err(e) = fs::copy(source, dest) {
        let _ = fs::remove_file(dest);
        return Err(RenameError::io(dest, e));
    }

    if let Ok(meta) = fs::metadata(source) {
        let mtime = FileTime::from_last_modification_time(&meta);
        filetime::set_file_mtime(dest, mtime).ok();
    }

    fs::remove_file(source).map_err(|e| RenameError::io(source, e))
}

/// Full byte-for-byte comparison.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let len_a = fs::metadata(a).map_err(|e| RenameError::io(a, e))?.len();
    let len_b = fs::metadata(b).map_err(|e| RenameError::io(b, e))?.len();
    if len_a != len_b {
        return Ok(false);
    }

    let mut file_a = File::open(a).map_err(|e| RenameError::io(a, e))?;
    let mut file_b = File::open(b).map_err(|e| RenameError::io(b, e))?;
    let mut buf_a = vec![0u8; COMPARE_CHUNK];
    let mut buf_b = vec![0u8; COMPARE_CHUNK];

    loop {
        let n_a = read_chunk(&mut file_a, &mut buf_a).map_err(|e| RenameError::io(a, e))?;
        let n_b = read_chunk(&mut file_b, &mut buf_b).map_err(|e| RenameError::io(b, e))?;
        if buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; short only at end of file.
fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
