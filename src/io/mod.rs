//! Scoped file access for resolution strategies.
//!
//! Every strategy that goes back to disk opens its own [`MappedFile`]. The
//! descriptor is closed as soon as the mapping exists, and the mapping is
//! released when the value is dropped, so no exit path leaks a handle.

use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

/// A read-only memory map of a whole file.
pub struct MappedFile {
    // None when the file size is zero; memmap cannot map empty files.
    mmap: Option<Mmap>,
}

impl MappedFile {
    /// Opens and maps `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(path = %path.display(), size = file_size, "Mapping file");

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: read-only map of a regular file; the map never outlives `self`.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self { mmap })
    }

    /// The mapped bytes.
    pub fn data(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}

/// Reads at most `limit` bytes from the start of `path`.
///
/// A file shorter than `limit` is returned whole.
pub fn read_prefix<P: AsRef<Path>>(path: P, limit: usize) -> std::io::Result<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buf)?;

    trace!(path = %path.display(), len = buf.len(), "Read file prefix");

    Ok(buf)
}
