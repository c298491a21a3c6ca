use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{trace, warn};

use crate::errors::{ScanError, ScanResult};

const BUFFER_CAPACITY: usize = 65536;
pub(crate) const SMALL_FILE_THRESHOLD: u64 = 32 * 1024; // 32KB
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Reads a file into a string, choosing a strategy by size: whole read for
/// small files, buffered read for medium, memory mapping for large ones.
pub fn read_file(path: &Path) -> ScanResult<String> {
    trace!("Reading file: {}", path.display());

    match path.metadata() {
        Ok(metadata) => {
            let size = metadata.len();
            if size < SMALL_FILE_THRESHOLD {
                read_small(path)
            } else if size >= LARGE_FILE_THRESHOLD {
                read_mmap(path)
            } else {
                read_buffered(path)
            }
        }
        Err(e) => {
            warn!("Failed to get metadata for {}: {}", path.display(), e);
            read_buffered(path)
        }
    }
}

fn read_small(path: &Path) -> ScanResult<String> {
    let bytes = std::fs::read(path).map_err(|e| map_open_error(e, path))?;
    Ok(decode(&bytes, path))
}

fn read_buffered(path: &Path) -> ScanResult<String> {
    let file = open(path)?;
    let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(ScanError::Io)?;
    Ok(decode(&bytes, path))
}

fn read_mmap(path: &Path) -> ScanResult<String> {
    let file = open(path)?;
    let mmap = unsafe { Mmap::map(&file) }.map_err(ScanError::Io)?;
    Ok(decode(&mmap, path))
}

fn open(path: &Path) -> ScanResult<File> {
    File::open(path).map_err(|e| map_open_error(e, path))
}

fn map_open_error(e: std::io::Error, path: &Path) -> ScanError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::file_not_found(path),
        std::io::ErrorKind::PermissionDenied => ScanError::permission_denied(path),
        _ => ScanError::Io(e),
    }
}

/// Lossy UTF-8 decode: a search tool keeps going past stray bytes, it just
/// reports that they were replaced.
fn decode(bytes: &[u8], path: &Path) -> String {
    let cow = String::from_utf8_lossy(bytes);
    if let std::borrow::Cow::Owned(_) = cow {
        warn!("Invalid UTF-8 replaced in file: {}", path.display());
    }
    cow.into_owned()
}
