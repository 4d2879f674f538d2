//! Non-cryptographic content hashing.
//!
//! Fingerprints only need to be fast and stable across runs and platforms, so
//! they use XXH64 with a zero seed. The digest is rendered as the 8 big-endian
//! bytes of the 64-bit value, which makes the hex form 16 characters long.

use std::hash::Hasher;
use twox_hash::XxHash64;

/// Default number of bytes fed to the hasher per update.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Streams `data` through XXH64 in `chunk_size` pieces and returns the digest bytes.
pub fn xxh64_digest(data: &[u8], chunk_size: usize) -> [u8; 8] {
    let mut hasher = XxHash64::with_seed(0);
    for chunk in data.chunks(chunk_size.max(1)) {
        hasher.write(chunk);
    }
    hasher.finish().to_be_bytes()
}

/// Digest of `len` zero bytes, fed `chunk_size` at a time.
///
/// Sections without file contents (`SHT_NOBITS`) read as zeros.
pub fn xxh64_zeroed(len: u64, chunk_size: usize) -> [u8; 8] {
    let chunk = usize::try_from(len).map_or(chunk_size, |len| len.min(chunk_size));
    let zeros = vec![0u8; chunk.max(1)];

    let mut hasher = XxHash64::with_seed(0);
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(zeros.len() as u64) as usize;
        hasher.write(&zeros[..n]);
        remaining -= n as u64;
    }
    hasher.finish().to_be_bytes()
}

/// Computes the XXH64 digest of the given data and returns it as a hex string.
pub fn xxh64_hex(data: &[u8]) -> String {
    hex::encode(xxh64_digest(data, DEFAULT_CHUNK_SIZE))
}
