//! Content fingerprint of the executable code section.

use object::{Object, ObjectSection};
use std::path::Path;
use tracing::trace;

use crate::config::ResolverConfig;
use crate::error::{BuildIdError, Result, Stage};
use crate::hashing::{xxh64_digest, xxh64_zeroed};
use crate::io::MappedFile;

use super::CODE_SECTION;

/// Largest uninitialized `.text` hashed as zeros.
const MAX_ZEROED_SECTION: u64 = 1 << 30;

/// XXH64 digest of the `.text` section of the file at `path`.
///
/// The section is hashed straight out of the mapping in
/// `config.hash_chunk_size` pieces. A `.text` without file contents, as in
/// split debug files, hashes as `sh_size` zero bytes.
pub fn text_fingerprint(path: &Path, config: &ResolverConfig) -> Result<[u8; 8]> {
    let mapped =
        MappedFile::open(path).map_err(|e| BuildIdError::io(Stage::Fingerprint, path, e))?;
    let file = object::File::parse(mapped.data())
        .map_err(|e| BuildIdError::parse(Stage::Fingerprint, e))?;

    let section = file
        .section_by_name(CODE_SECTION)
        .ok_or_else(|| BuildIdError::NoCodeSection {
            section: CODE_SECTION.to_string(),
        })?;
    if section.file_range().is_none() {
        let size = section.size();
        if size > MAX_ZEROED_SECTION {
            return Err(BuildIdError::parse(
                Stage::Fingerprint,
                format!("uninitialized {} section too large ({} bytes)", CODE_SECTION, size),
            ));
        }
        trace!(len = size, "Hashing uninitialized code section");
        return Ok(xxh64_zeroed(size, config.hash_chunk_size));
    }

    let code = section
        .data()
        .map_err(|e| BuildIdError::parse(Stage::Fingerprint, e))?;

    trace!(len = code.len(), chunk = config.hash_chunk_size, "Hashing code section");

    Ok(xxh64_digest(code, config.hash_chunk_size))
}
