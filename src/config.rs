//! Configuration for build ID resolution.
//!
//! Every field has a default matching the conventions of the Go toolchain and
//! the GNU linker, so `ResolverConfig::default()` is what almost every caller
//! wants.

use serde::{Deserialize, Serialize};

use crate::error::{BuildIdError, Result};
use crate::formats::elf::notes::MAX_NOTE_SIZE;
use crate::hashing::DEFAULT_CHUNK_SIZE;

/// Bytes read from the start of a file when scanning for a Go build ID.
pub const DEFAULT_GO_SCAN_LIMIT: usize = 32 * 1024;

/// Tunables for the resolver and its strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Prefix length scanned by the Go build ID reader.
    pub go_scan_limit: usize,
    /// Largest note name or descriptor accepted.
    pub max_note_size: u32,
    /// Bytes fed to the hasher per update when fingerprinting code.
    pub hash_chunk_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            go_scan_limit: DEFAULT_GO_SCAN_LIMIT,
            max_note_size: MAX_NOTE_SIZE,
            hash_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ResolverConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BuildIdError::InvalidConfig(e.to_string()))?;
        Ok(config.normalized())
    }

    /// Replace zero sizes with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.hash_chunk_size == 0 {
            self.hash_chunk_size = DEFAULT_CHUNK_SIZE;
        }
        if self.go_scan_limit == 0 {
            self.go_scan_limit = DEFAULT_GO_SCAN_LIMIT;
        }
        self
    }
}
