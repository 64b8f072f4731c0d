//! Layered configuration
//!
//! 1. Built-in defaults
//! 2. Config file (`<root>/solc-check.toml` or `--config`)
//! 3. CLI flags

mod defaults;
mod effective;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigFile, ConfigOrigin, EffectiveConfig, CONFIG_FILE_NAME};
