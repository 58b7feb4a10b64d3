//! DXT manifest validation.
//!
//! Only the presence of the top-level keys is checked. Value types and nested
//! structure are left to the desktop application that installs the package.

use crate::error::{BuildError, Result};
use camino::Utf8Path;
use serde_json::{Map, Value};
use std::fs;

/// Top-level keys every DXT manifest must declare, in reporting order.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "dxt_version",
    "name",
    "version",
    "description",
    "author",
    "server",
];

/// A manifest whose required keys are all present.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    fields: Map<String, Value>,
}

impl Manifest {
    /// Validates an already-parsed JSON value.
    ///
    /// Reports the first missing key in [`REQUIRED_FIELDS`] order; missing
    /// keys are not aggregated.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ManifestNotObject`] for non-object values and
    /// [`BuildError::ManifestMissingField`] for the first absent key.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use dxt_bundler::manifest::Manifest;
    /// use serde_json::json;
    ///
    /// let value = json!({
    ///     "dxt_version": "0.1",
    ///     "name": "libralm",
    ///     "version": "1.0.0",
    ///     "description": "Book search",
    ///     "author": { "name": "LibraLM" },
    ///     "server": { "type": "node" }
    /// });
    /// let manifest = Manifest::from_value(Utf8Path::new("manifest.json"), value)?;
    /// assert_eq!(manifest.name(), Some("libralm"));
    /// # Ok::<(), dxt_bundler::error::BuildError>(())
    /// ```
    pub fn from_value(path: &Utf8Path, value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(BuildError::ManifestNotObject {
                path: path.to_owned(),
            });
        };

        if let Some(field) = REQUIRED_FIELDS
            .into_iter()
            .find(|field| !fields.contains_key(*field))
        {
            return Err(BuildError::ManifestMissingField { field });
        }

        Ok(Self { fields })
    }

    /// The package name, when it is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// The package version, when it is a string.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.fields.get("version").and_then(Value::as_str)
    }
}

/// Reads and validates the manifest at `path`.
///
/// # Errors
///
/// Returns [`BuildError::ManifestUnreadable`] when the file cannot be read,
/// [`BuildError::ManifestMalformed`] when it is not JSON, and the errors of
/// [`Manifest::from_value`] otherwise.
pub fn validate_manifest(path: &Utf8Path) -> Result<Manifest> {
    let contents = fs::read_to_string(path).map_err(|source| BuildError::ManifestUnreadable {
        path: path.to_owned(),
        source,
    })?;
    let value: Value =
        serde_json::from_str(&contents).map_err(|source| BuildError::ManifestMalformed {
            path: path.to_owned(),
            source,
        })?;
    Manifest::from_value(path, value)
}
