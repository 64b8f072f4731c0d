//! solc-check - which contracts compile with the local solc binaries
//!
//! Reads a manifest of project names and contract paths, tries each
//! contract against every discovered `solc`/`solc-*` binary (newest first)
//! and records which projects compile, with the first error for those that
//! do not.

pub mod config;
pub mod discovery;
pub mod manifest;
pub mod pipeline;
pub mod report;
pub mod runner;

pub use config::{ConfigError, ConfigFile, EffectiveConfig};
pub use discovery::{Candidate, CompilerDiscovery, DiscoveryError};
pub use manifest::{Manifest, ManifestEntry, ManifestError};
pub use pipeline::{run_check, run_check_with, CheckError, CheckRun};
pub use report::{Report, ReportError};
pub use runner::{AttemptError, CompileRunner, CompilerInvoker, Outcome, ProcessInvoker};
