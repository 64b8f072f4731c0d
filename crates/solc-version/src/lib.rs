//! Version keys for solc compiler binaries.
//!
//! Compiler binaries are named `solc` or `solc-<version>`. This crate derives
//! a best-effort version from such a name and orders binaries newest first.
//! It is not a semver implementation: pre-release and build metadata are
//! ignored and names without a dotted numeric run sort after all others.

mod key;
mod version;

pub use key::{extract_version, order_by_preference, VersionKey};
pub use version::{Version, VersionError};

/// Version assumed for a bare `solc` binary.
pub const DEFAULT_SOLC_VERSION: &str = "0.8.19";

/// [`DEFAULT_SOLC_VERSION`] as a [`Version`].
pub fn default_solc_version() -> Version {
    Version::from_components([0, 8, 19])
}

/// File name of the bare default binary.
pub const DEFAULT_SOLC_NAME: &str = "solc";
