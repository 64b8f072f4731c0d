//! Built-in defaults (layer 1)

use solc_version::{default_solc_version, Version, DEFAULT_SOLC_NAME};

use crate::manifest::MANIFEST_FILE_NAME;
use crate::report::REPORT_FILE_NAME;

/// Built-in default configuration values
#[derive(Debug, Clone)]
pub struct BuiltinDefaults {
    /// Manifest file name, relative to the root (default: "main.json")
    pub manifest_file: String,

    /// Report file name, relative to the root (default: "compile_check_result.json")
    pub output_file: String,

    /// Per-invocation compiler timeout (default: 10)
    pub timeout_seconds: u64,

    /// File name patterns that identify compilers (default: "solc", "solc-*")
    pub compiler_patterns: Vec<String>,

    /// Name of the bare default binary (default: "solc")
    pub default_binary: String,

    /// Version assumed for the bare default binary (default: 0.8.19)
    pub default_version: Version,

    /// Maximum characters kept from a compiler error (default: 200)
    pub reason_limit: usize,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            manifest_file: MANIFEST_FILE_NAME.to_string(),
            output_file: REPORT_FILE_NAME.to_string(),
            timeout_seconds: 10,
            compiler_patterns: vec![
                DEFAULT_SOLC_NAME.to_string(),
                format!("{}-*", DEFAULT_SOLC_NAME),
            ],
            default_binary: DEFAULT_SOLC_NAME.to_string(),
            default_version: default_solc_version(),
            reason_limit: 200,
        }
    }
}
