//! Compiler discovery
//!
//! Scans one directory (non-recursively) for executable files whose names
//! match the configured patterns and orders them newest version first.

use globset::{Glob, GlobSet, GlobSetBuilder};
use solc_version::{order_by_preference, Version, VersionKey};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::EffectiveConfig;

/// Discovery errors
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("no usable solc compiler found in {dir}")]
    NoCompilers { dir: PathBuf },

    #[error("cannot scan compiler directory {dir}: {source}")]
    Io {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid compiler pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// A compiler binary eligible to attempt a compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path used to invoke the binary
    pub path: PathBuf,

    /// Sort key derived from the file name
    pub key: VersionKey,
}

impl Candidate {
    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn version(&self) -> Option<&Version> {
        self.key.version.as_ref()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Finds compiler candidates in a directory
#[derive(Debug, Clone)]
pub struct CompilerDiscovery {
    patterns: GlobSet,
    default_binary: String,
    default_version: Version,
}

impl CompilerDiscovery {
    pub fn new(
        patterns: &[String],
        default_binary: impl Into<String>,
        default_version: Version,
    ) -> Result<Self, DiscoveryError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|source| DiscoveryError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let patterns = builder.build().map_err(|source| DiscoveryError::Pattern {
            pattern: patterns.join(","),
            source,
        })?;

        Ok(Self {
            patterns,
            default_binary: default_binary.into(),
            default_version,
        })
    }

    pub fn from_config(config: &EffectiveConfig) -> Result<Self, DiscoveryError> {
        Self::new(
            &config.compiler_patterns,
            config.default_binary.clone(),
            config.default_version.clone(),
        )
    }

    /// Find and order all candidates in `dir`.
    ///
    /// Fails with [`DiscoveryError::NoCompilers`] when nothing usable is found.
    pub fn discover(&self, dir: &Path) -> Result<Vec<Candidate>, DiscoveryError> {
        let meta = fs::metadata(dir).map_err(|source| DiscoveryError::Io {
            dir: dir.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(DiscoveryError::Io {
                dir: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let mut candidates = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if !self.patterns.is_match(name) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!("skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            if !metadata.is_file() || !is_executable(&metadata) {
                tracing::debug!("skipping non-executable {}", entry.path().display());
                continue;
            }

            candidates.push(Candidate {
                path: entry.path().to_path_buf(),
                key: VersionKey::for_binary(name, &self.default_binary, &self.default_version),
            });
        }

        if candidates.is_empty() {
            return Err(DiscoveryError::NoCompilers {
                dir: dir.to_path_buf(),
            });
        }

        order_by_preference(&mut candidates, |c| &c.key);
        Ok(candidates)
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}
