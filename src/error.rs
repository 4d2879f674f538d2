//! Error types for build identifier resolution.
//!
//! Errors fall into two groups. Soft errors mean "this strategy does not apply
//! to this binary" and only advance the resolution chain. Hard errors (I/O,
//! container parsing, a missing code section) are surfaced to the caller.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::formats::elf::ElfError;

/// The step of resolution that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening or mapping the binary handed to the resolver.
    Image,
    /// The specialized Go build ID reader.
    GoReader,
    /// The container-level build ID accessor.
    Container,
    /// Hashing the executable code section.
    Fingerprint,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Image => "image",
            Stage::GoReader => "go build id reader",
            Stage::Container => "container build id",
            Stage::Fingerprint => "code fingerprint",
        };
        f.write_str(name)
    }
}

/// Main error type for build ID resolution.
#[derive(Debug, Error)]
pub enum BuildIdError {
    /// A named metadata section does not exist
    #[error("failed to find {section} section")]
    SectionNotFound { section: String },

    /// A section was scanned but no record matched
    #[error("failed to find build id in {section}")]
    IdentifierNotFound { section: String },

    /// More than one matching record; the resolver refuses to pick one
    #[error("multiple build ids found in {section} ({count}), don't know which to use")]
    AmbiguousIdentifier { section: String, count: usize },

    /// An identifier was present but zero-length
    #[error("build id is empty")]
    EmptyIdentifier,

    /// Note records could not be decoded
    #[error("malformed notes: {0}")]
    MalformedNotes(String),

    /// A runtime-embedded identifier was found but could not be decoded
    #[error("malformed build id: {0}")]
    MalformedIdentifier(String),

    /// The hashing fallback found no executable code section
    #[error("could not find {section} section")]
    NoCodeSection { section: String },

    /// File I/O errors, tagged with the stage that hit them
    #[error("{stage}: {}: {source}", .path.display())]
    Io {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Container parsing errors
    #[error("{stage}: parse error: {message}")]
    Parse { stage: Stage, message: String },

    /// Resolver configuration could not be read
    #[error("invalid resolver config: {0}")]
    InvalidConfig(String),

    /// Resolution exceeded an external deadline
    #[error("build id resolution timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl BuildIdError {
    pub(crate) fn io(stage: Stage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildIdError::Io {
            stage,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(stage: Stage, message: impl fmt::Display) -> Self {
        BuildIdError::Parse {
            stage,
            message: message.to_string(),
        }
    }

    /// Whether this error only means "strategy not applicable".
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            BuildIdError::SectionNotFound { .. }
                | BuildIdError::IdentifierNotFound { .. }
                | BuildIdError::AmbiguousIdentifier { .. }
                | BuildIdError::EmptyIdentifier
                | BuildIdError::MalformedNotes(_)
                | BuildIdError::MalformedIdentifier(_)
        )
    }
}

impl From<ElfError> for BuildIdError {
    fn from(err: ElfError) -> Self {
        BuildIdError::parse(Stage::Image, err)
    }
}

/// Result type alias for build ID operations
pub type Result<T> = std::result::Result<T, BuildIdError>;

/// Convert build ID errors to PyO3 exceptions
#[cfg(feature = "python-ext")]
impl From<BuildIdError> for pyo3::PyErr {
    fn from(err: BuildIdError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyIOError, PyTimeoutError, PyValueError};

        match err {
            BuildIdError::Io { .. } => PyIOError::new_err(err.to_string()),
            BuildIdError::Timeout { seconds } => {
                PyTimeoutError::new_err(format!("Operation timed out after {}s", seconds))
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}
