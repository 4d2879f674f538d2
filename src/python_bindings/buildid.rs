//! Python bindings for build ID resolution.

use pyo3::prelude::*;

use crate::buildid::Resolver;
use crate::config::ResolverConfig;

/// Register build ID functions with the Python module.
pub fn register_buildid_bindings(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(build_id_py, m)?)?;
    m.add_function(wrap_pyfunction!(resolve_py, m)?)?;
    Ok(())
}

/// Lowercase hex build ID of the ELF file at `path`.
#[pyfunction]
#[pyo3(name = "build_id")]
fn build_id_py(path: String) -> PyResult<String> {
    Ok(crate::buildid::build_id_from_path(path)?)
}

/// Resolve a build ID, returning `(hex, strategy)`.
///
/// `config_json` overrides the default resolver configuration.
#[pyfunction]
#[pyo3(name = "resolve")]
#[pyo3(signature = (path, config_json=None))]
fn resolve_py(path: String, config_json: Option<&str>) -> PyResult<(String, String)> {
    let config = match config_json {
        Some(json) => ResolverConfig::from_json(json)?,
        None => ResolverConfig::default(),
    };
    let resolution = Resolver::new(config).resolve_path(path)?;
    Ok((resolution.build_id.to_hex(), resolution.strategy.to_string()))
}
