//! Effective configuration with provenance
//!
//! Merges built-in defaults, the optional `solc-check.toml` file and CLI
//! overrides (highest precedence) into one validated configuration.

use globset::Glob;
use serde::Deserialize;
use solc_version::Version;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::defaults::BuiltinDefaults;

/// Config file looked up in the root directory when none is given
pub const CONFIG_FILE_NAME: &str = "solc-check.toml";

/// Upper bound for the per-invocation timeout
const MAX_TIMEOUT_SECONDS: u64 = 3600;

/// Where a configuration layer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Builtin,
    File(PathBuf),
    Cli,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("timeout_seconds must be in (0, 3600], got {value}")]
    TimeoutOutOfBounds { value: u64 },

    #[error("compiler_patterns must not be empty")]
    NoPatterns,

    #[error("invalid compiler pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("default_binary must not be empty")]
    EmptyDefaultBinary,

    #[error("reason_limit must be greater than 0")]
    ReasonLimitZero,
}

/// Optional settings shared by the config file and the command line.
///
/// Relative paths from the file are resolved against the root directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub manifest: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub compilers_dir: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
    pub compiler_patterns: Option<Vec<String>>,
    pub default_binary: Option<String>,
    pub default_version: Option<Version>,
    pub reason_limit: Option<usize>,
}

impl ConfigFile {
    /// Parse TOML text
    pub fn from_toml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_toml(&raw, path)
    }

    fn resolve_paths(mut self, root: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_relative() { root.join(p) } else { p };
        self.manifest = self.manifest.map(resolve);
        self.output = self.output.map(resolve);
        self.compilers_dir = self.compilers_dir.map(resolve);
        self
    }

    /// Overlay `other` on top of `self`; set fields in `other` win
    fn overlay(self, other: ConfigFile) -> ConfigFile {
        ConfigFile {
            manifest: other.manifest.or(self.manifest),
            output: other.output.or(self.output),
            compilers_dir: other.compilers_dir.or(self.compilers_dir),
            timeout_seconds: other.timeout_seconds.or(self.timeout_seconds),
            compiler_patterns: other.compiler_patterns.or(self.compiler_patterns),
            default_binary: other.default_binary.or(self.default_binary),
            default_version: other.default_version.or(self.default_version),
            reason_limit: other.reason_limit.or(self.reason_limit),
        }
    }
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// Directory contract paths are resolved against
    pub root: PathBuf,

    /// Manifest file
    pub manifest_path: PathBuf,

    /// Directory scanned for compiler binaries
    pub compilers_dir: PathBuf,

    /// Report file
    pub output_path: PathBuf,

    /// Per-invocation compiler timeout
    pub timeout_seconds: u64,

    /// File name globs identifying compilers
    pub compiler_patterns: Vec<String>,

    /// Bare default binary name
    pub default_binary: String,

    /// Version assumed for the bare default binary
    pub default_version: Version,

    /// Maximum characters kept from a compiler error
    pub reason_limit: usize,

    /// Contributing layers, lowest precedence first
    pub sources: Vec<ConfigOrigin>,
}

impl EffectiveConfig {
    /// Built-in defaults rooted at `root`
    pub fn defaults(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let defaults = BuiltinDefaults::default();
        Self {
            manifest_path: root.join(&defaults.manifest_file),
            compilers_dir: root.clone(),
            output_path: root.join(&defaults.output_file),
            timeout_seconds: defaults.timeout_seconds,
            compiler_patterns: defaults.compiler_patterns,
            default_binary: defaults.default_binary,
            default_version: defaults.default_version,
            reason_limit: defaults.reason_limit,
            sources: vec![ConfigOrigin::Builtin],
            root,
        }
    }

    /// Build from all layers.
    ///
    /// `config_path` names an explicit config file, which must exist. Without
    /// one, `<root>/solc-check.toml` is used when present.
    pub fn build(
        root: impl Into<PathBuf>,
        config_path: Option<&Path>,
        cli: ConfigFile,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::defaults(root);
        let mut layered = ConfigFile::default();

        let file_path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = config.root.join(CONFIG_FILE_NAME);
                candidate.is_file().then_some(candidate)
            }
        };

        if let Some(path) = file_path {
            let file = ConfigFile::load(&path)?.resolve_paths(&config.root);
            layered = layered.overlay(file);
            config.sources.push(ConfigOrigin::File(path));
        }

        let cli_set = cli.manifest.is_some()
            || cli.output.is_some()
            || cli.compilers_dir.is_some()
            || cli.timeout_seconds.is_some()
            || cli.compiler_patterns.is_some()
            || cli.default_binary.is_some()
            || cli.default_version.is_some()
            || cli.reason_limit.is_some();
        if cli_set {
            layered = layered.overlay(cli);
            config.sources.push(ConfigOrigin::Cli);
        }

        config.apply(layered);
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, layer: ConfigFile) {
        if let Some(v) = layer.manifest {
            self.manifest_path = v;
        }
        if let Some(v) = layer.output {
            self.output_path = v;
        }
        if let Some(v) = layer.compilers_dir {
            self.compilers_dir = v;
        }
        if let Some(v) = layer.timeout_seconds {
            self.timeout_seconds = v;
        }
        if let Some(v) = layer.compiler_patterns {
            self.compiler_patterns = v;
        }
        if let Some(v) = layer.default_binary {
            self.default_binary = v;
        }
        if let Some(v) = layer.default_version {
            self.default_version = v;
        }
        if let Some(v) = layer.reason_limit {
            self.reason_limit = v;
        }
    }

    /// Check value bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 || self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(ConfigError::TimeoutOutOfBounds {
                value: self.timeout_seconds,
            });
        }

        if self.compiler_patterns.is_empty() {
            return Err(ConfigError::NoPatterns);
        }
        for pattern in &self.compiler_patterns {
            Glob::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        if self.default_binary.is_empty() {
            return Err(ConfigError::EmptyDefaultBinary);
        }

        if self.reason_limit == 0 {
            return Err(ConfigError::ReasonLimitZero);
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_rooted() {
        let config = EffectiveConfig::defaults("/work");
        assert_eq!(config.manifest_path, PathBuf::from("/work/main.json"));
        assert_eq!(config.output_path, PathBuf::from("/work/compile_check_result.json"));
        assert_eq!(config.compilers_dir, PathBuf::from("/work"));
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_without_file_or_flags() {
        let dir = TempDir::new().unwrap();
        let config = EffectiveConfig::build(dir.path(), None, ConfigFile::default()).unwrap();
        assert_eq!(config.sources, vec![ConfigOrigin::Builtin]);
        assert_eq!(config.default_version.to_string(), "0.8.19");
    }

    #[test]
    fn test_file_layer_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "compilers_dir = \"bin\"\ntimeout_seconds = 30\ndefault_version = \"0.8.24\"\n",
        )
        .unwrap();

        let config = EffectiveConfig::build(dir.path(), None, ConfigFile::default()).unwrap();
        assert_eq!(config.compilers_dir, dir.path().join("bin"));
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.default_version.to_string(), "0.8.24");
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "timeout_seconds = 30\nreason_limit = 50\n").unwrap();

        let cli = ConfigFile {
            timeout_seconds: Some(5),
            ..Default::default()
        };
        let config = EffectiveConfig::build(dir.path(), None, cli).unwrap();
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.reason_limit, 50);
        assert_eq!(config.sources.last(), Some(&ConfigOrigin::Cli));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = EffectiveConfig::build(dir.path(), Some(&missing), ConfigFile::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ConfigFile::from_toml("timeout = 3\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn test_bad_default_version_rejected() {
        let err = ConfigFile::from_toml("default_version = \"latest\"\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn test_validation_bounds() {
        let mut config = EffectiveConfig::defaults(".");
        config.timeout_seconds = 0;
        assert!(matches!(config.validate(), Err(ConfigError::TimeoutOutOfBounds { value: 0 })));

        let mut config = EffectiveConfig::defaults(".");
        config.timeout_seconds = MAX_TIMEOUT_SECONDS + 1;
        assert!(matches!(config.validate(), Err(ConfigError::TimeoutOutOfBounds { .. })));

        let mut config = EffectiveConfig::defaults(".");
        config.compiler_patterns.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoPatterns)));

        let mut config = EffectiveConfig::defaults(".");
        config.compiler_patterns = vec!["solc-[".to_string()];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPattern { .. })));

        let mut config = EffectiveConfig::defaults(".");
        config.reason_limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ReasonLimitZero)));

        let mut config = EffectiveConfig::defaults(".");
        config.default_binary.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyDefaultBinary)));
    }
}
