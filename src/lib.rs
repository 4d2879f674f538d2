//! Stable build identifiers for ELF executables and shared libraries.
//!
//! ```no_run
//! let id = buildid::build_id_from_path("/usr/bin/true")?;
//! println!("{id}");
//! # Ok::<(), buildid::BuildIdError>(())
//! ```

pub mod buildid;
pub mod config;
pub mod error;
pub mod formats;
pub mod hashing;
pub mod io;
pub mod logging;
pub mod timeout;

#[cfg(feature = "python-ext")]
pub mod python_bindings;

pub use crate::buildid::{
    build_id, build_id_from_path, BinaryImage, BuildId, Outcome, Resolution, Resolver, Strategy,
};
pub use crate::config::ResolverConfig;
pub use crate::error::{BuildIdError, Result, Stage};

#[cfg(feature = "python-ext")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python-ext")]
#[pymodule]
#[pyo3(name = "buildid")]
fn buildid_ext(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python_bindings::register_python_bindings(m.py(), m)
}
