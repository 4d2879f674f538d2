//! Build ID resolution.
//!
//! A binary can be identified in several ways, and not every binary carries
//! every kind of identifier. [`Resolver`] runs an ordered plan of
//! [`Strategy`] values and stops at the first one that produces an
//! identifier:
//!
//! | Image has `.note.go.buildid` | Plan |
//! |---|---|
//! | yes | `GoNote`, `GoReader`, `Container`, `Fingerprint` |
//! | no  | `GnuNote`, `Container`, `Fingerprint` |
//!
//! Strategies that do not apply to a binary are skipped. The Go reader never
//! stops resolution: whatever it fails on, the container lookup runs next.
//! I/O and container failures elsewhere stop resolution. Whatever strategy succeeds, the caller
//! only ever sees lowercase hex.

pub mod container;
pub mod fingerprint;
pub mod gobuildid;
pub mod notes;
pub mod presence;

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info_span, warn};

use crate::config::ResolverConfig;
use crate::error::{BuildIdError, Result, Stage};
use crate::formats::elf::ElfParser;
use crate::io::MappedFile;

/// Section holding the Go toolchain's build ID note.
pub const GO_BUILD_ID_SECTION: &str = ".note.go.buildid";
/// Section holding the GNU linker's build ID note.
pub const GNU_BUILD_ID_SECTION: &str = ".note.gnu.build-id";
/// Executable code section hashed when no identifier is embedded.
pub const CODE_SECTION: &str = ".text";

/// A parsed ELF image together with the path it was read from.
///
/// Strategies that need more than the parsed view reopen the file by path.
pub struct BinaryImage<'data> {
    path: PathBuf,
    elf: ElfParser<'data>,
}

impl<'data> BinaryImage<'data> {
    pub fn new(path: impl Into<PathBuf>, elf: ElfParser<'data>) -> Self {
        Self {
            path: path.into(),
            elf,
        }
    }

    /// Parses `data` as the contents of the file at `path`.
    pub fn parse(path: impl Into<PathBuf>, data: &'data [u8]) -> Result<Self> {
        Ok(Self::new(path, ElfParser::parse(data)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn elf(&self) -> &ElfParser<'data> {
        &self.elf
    }
}

/// Raw identifier bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildId(Vec<u8>);

impl BuildId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex with no separators.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for BuildId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// What a single strategy concluded.
#[derive(Debug)]
pub enum Outcome {
    Found(BuildId),
    /// The strategy does not apply to this binary; the reason is kept for logging.
    Skipped(BuildIdError),
}

/// One way of obtaining a build ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Single Go note in `.note.go.buildid`.
    GoNote,
    /// Single GNU note in `.note.gnu.build-id`.
    GnuNote,
    /// Go build ID located anywhere in the file prefix.
    GoReader,
    /// The container parser's own build ID accessor.
    Container,
    /// XXH64 of the `.text` section.
    Fingerprint,
}

const GO_PLAN: &[Strategy] = &[
    Strategy::GoNote,
    Strategy::GoReader,
    Strategy::Container,
    Strategy::Fingerprint,
];

// Without the Go section the GNU note is the only fast path
const GNU_PLAN: &[Strategy] = &[Strategy::GnuNote, Strategy::Container, Strategy::Fingerprint];

impl Strategy {
    /// Ordered strategies for an image with or without the Go build ID section.
    pub fn plan(has_go_section: bool) -> &'static [Strategy] {
        if has_go_section {
            GO_PLAN
        } else {
            GNU_PLAN
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::GoNote => "go_note",
            Strategy::GnuNote => "gnu_note",
            Strategy::GoReader => "go_reader",
            Strategy::Container => "container",
            Strategy::Fingerprint => "fingerprint",
        }
    }

    /// Runs this strategy against `image`.
    pub fn run(&self, image: &BinaryImage<'_>, config: &ResolverConfig) -> Result<Outcome> {
        match self {
            Strategy::GoNote => classify(notes::go_build_id(image.elf(), config)),
            Strategy::GnuNote => classify(notes::gnu_build_id(image.elf(), config)),
            Strategy::GoReader => match gobuildid::read_file(image.path(), config) {
                Err(e) => Ok(Outcome::Skipped(e)),
                found => classify(found),
            },
            Strategy::Container => match container::build_id(image.path())? {
                Some(id) => Ok(Outcome::Found(BuildId(id))),
                None => Ok(Outcome::Skipped(BuildIdError::IdentifierNotFound {
                    section: "container".to_string(),
                })),
            },
            Strategy::Fingerprint => {
                let digest = fingerprint::text_fingerprint(image.path(), config)?;
                Ok(Outcome::Found(BuildId(digest.to_vec())))
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Turns a lookup result into an outcome: soft errors and empty payloads skip.
fn classify(result: Result<Vec<u8>>) -> Result<Outcome> {
    match result {
        Ok(bytes) if bytes.is_empty() => Ok(Outcome::Skipped(BuildIdError::EmptyIdentifier)),
        Ok(bytes) => Ok(Outcome::Found(BuildId(bytes))),
        Err(e) if e.is_soft() => Ok(Outcome::Skipped(e)),
        Err(e) => Err(e),
    }
}

/// A resolved identifier and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub build_id: BuildId,
    pub strategy: Strategy,
}

/// Runs the strategy plan for one image at a time. Holds no per-image state.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves the build ID of `image`.
    pub fn resolve(&self, image: &BinaryImage<'_>) -> Result<Resolution> {
        let span = info_span!("build_id", path = %image.path().display());
        let _guard = span.enter();

        let plan = Strategy::plan(presence::has_go_build_id_section(image.elf()));
        for &strategy in plan {
            debug!(%strategy, "Trying strategy");
            match strategy.run(image, &self.config)? {
                Outcome::Found(build_id) => {
                    debug!(%strategy, build_id = %build_id, "Resolved build id");
                    return Ok(Resolution { build_id, strategy });
                }
                Outcome::Skipped(reason @ BuildIdError::AmbiguousIdentifier { .. }) => {
                    warn!(%strategy, %reason, "Ignoring ambiguous build id");
                }
                Outcome::Skipped(reason) => {
                    debug!(%strategy, %reason, "Strategy skipped");
                }
            }
        }

        // Fingerprint ends every plan and never skips
        Err(BuildIdError::Internal(
            "no strategy produced a build id".to_string(),
        ))
    }

    /// Maps and parses the file at `path`, then resolves it.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> Result<Resolution> {
        let path = path.as_ref();
        let mapped = MappedFile::open(path).map_err(|e| BuildIdError::io(Stage::Image, path, e))?;
        let image = BinaryImage::parse(path, mapped.data())?;
        self.resolve(&image)
    }
}

/// Lowercase hex build ID of `image` using the default configuration.
pub fn build_id(image: &BinaryImage<'_>) -> Result<String> {
    Resolver::default()
        .resolve(image)
        .map(|r| r.build_id.to_hex())
}

/// Lowercase hex build ID of the ELF file at `path`.
pub fn build_id_from_path(path: impl AsRef<Path>) -> Result<String> {
    Resolver::default()
        .resolve_path(path)
        .map(|r| r.build_id.to_hex())
}
