//! Contract manifest (`main.json`)
//!
//! The manifest is a JSON object mapping project names to contract source
//! paths. Entries keep the order they have in the file. Referenced contracts
//! are not checked here; a missing contract is a per-project failure.

use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default manifest file name
pub const MANIFEST_FILE_NAME: &str = "main.json";

/// Manifest loading errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("manifest must be a JSON object mapping project names to contract paths, got {found}")]
    NotAnObject { found: &'static str },

    #[error("contract path for project {project:?} must be a string, got {found}")]
    InvalidPath { project: String, found: &'static str },
}

/// One project to check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Project name (manifest key)
    pub project: String,

    /// Contract source path as written in the manifest
    pub contract: PathBuf,
}

/// Parsed manifest, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Load and parse a manifest file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ManifestError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ManifestError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json(&raw)
    }

    /// Parse manifest JSON text
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(json)?;
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ManifestError::NotAnObject {
                    found: json_kind(&other),
                })
            }
        };

        let entries = map
            .into_iter()
            .map(|(project, value)| match value {
                Value::String(path) => Ok(ManifestEntry {
                    project,
                    contract: PathBuf::from(path),
                }),
                other => Err(ManifestError::InvalidPath {
                    project,
                    found: json_kind(&other),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
