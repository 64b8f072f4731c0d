//! Check pipeline
//!
//! One linear pass:
//! - Load the manifest
//! - Discover compilers
//! - Try every project against the candidates
//! - Print the summary and write the report
//!
//! Manifest, discovery and report-write errors abort the run before a
//! report is written. Per-project failures never do, and neither does a
//! console that stops accepting output.

use std::io::{self, Write};

use thiserror::Error;

use crate::config::{ConfigError, EffectiveConfig};
use crate::discovery::{Candidate, CompilerDiscovery, DiscoveryError};
use crate::manifest::{Manifest, ManifestError};
use crate::report::{print_header, print_saved, print_summary, Console, Report, ReportError};
use crate::runner::{CompileRunner, CompilerInvoker, ProcessInvoker, ProjectOutcome};

/// Fatal errors
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Manifest(#[from] ManifestError),

    #[error("{0}")]
    Discovery(#[from] DiscoveryError),

    #[error("{0}")]
    Report(#[from] ReportError),

    #[error("console output failed: {0}")]
    Console(#[from] io::Error),
}

impl CheckError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckError::Config(_) => 2,
            _ => 1,
        }
    }
}

/// Result type for pipeline operations
pub type CheckResult<T> = Result<T, CheckError>;

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct CheckRun {
    /// Candidates in the order they were tried
    pub candidates: Vec<Candidate>,

    /// Per-project outcomes in manifest order
    pub outcomes: Vec<ProjectOutcome>,

    /// The report that was written
    pub report: Report,
}

/// Run the check with real subprocess invocation
pub fn run_check<W: Write>(config: &EffectiveConfig, out: &mut W) -> CheckResult<CheckRun> {
    let invoker = ProcessInvoker::new(config.timeout());
    run_check_with(config, invoker, out)
}

/// Run the check with a caller-supplied invoker
pub fn run_check_with<I, W>(config: &EffectiveConfig, invoker: I, out: &mut W) -> CheckResult<CheckRun>
where
    I: CompilerInvoker,
    W: Write,
{
    let manifest = Manifest::load(&config.manifest_path)?;
    tracing::debug!(
        path = %config.manifest_path.display(),
        entries = manifest.len(),
        "manifest loaded"
    );

    let discovery = CompilerDiscovery::from_config(config)?;
    let candidates = discovery.discover(&config.compilers_dir)?;
    tracing::debug!(
        dir = %config.compilers_dir.display(),
        count = candidates.len(),
        "compilers discovered"
    );

    let mut console = Console::new(out);
    print_header(&mut console, &candidates, manifest.len())?;

    let runner = CompileRunner::new(invoker, &candidates, &config.root, config.reason_limit);
    let outcomes = runner.run(&manifest, &mut console)?;

    let report = Report::from_outcomes(&outcomes);
    print_summary(&mut console, &report)?;

    report.write_to_file(&config.output_path)?;
    print_saved(&mut console, &config.output_path)?;

    Ok(CheckRun {
        candidates,
        outcomes,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::Candidate;
    use crate::runner::AttemptError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Compiles only contracts whose source contains "ok"
    struct ContentInvoker;

    impl CompilerInvoker for ContentInvoker {
        fn compile(&self, _compiler: &Candidate, contract: &Path) -> Result<(), AttemptError> {
            let source = fs::read_to_string(contract).unwrap_or_default();
            if source.contains("ok") {
                Ok(())
            } else {
                Err(AttemptError::NonZeroExit {
                    code: Some(1),
                    stderr: "Error: broken".to_string(),
                })
            }
        }
    }

    fn setup(manifest: &str, files: &[(&str, &str)], compilers: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.json"), manifest).unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        for name in compilers {
            let path = dir.path().join(name);
            fs::write(&path, "").unwrap();
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            }
        }
        dir
    }

    #[test]
    fn test_end_to_end_scenario() {
        let dir = setup(r#"{"A": "a.sol", "B": "missing.sol"}"#, &[("a.sol", "ok")], &["solc"]);
        let config = EffectiveConfig::defaults(dir.path());

        let mut out = Vec::new();
        let run = run_check_with(&config, ContentInvoker, &mut out).unwrap();

        let written = Report::from_file(&config.output_path).unwrap();
        assert_eq!(written, run.report);
        assert_eq!(written.can_compile, vec!["A"]);
        assert_eq!(written.cannot_compile[0].project, "B");
        assert_eq!(written.cannot_compile[0].reason, "file not found");
        assert_eq!((written.summary.total, written.summary.success, written.summary.failed), (2, 1, 1));
    }

    #[test]
    fn test_compile_failure_reason_in_report() {
        let dir = setup(r#"{"Bad": "bad.sol"}"#, &[("bad.sol", "nope")], &["solc-0.8.20", "solc"]);
        let config = EffectiveConfig::defaults(dir.path());

        let run = run_check_with(&config, ContentInvoker, &mut io::sink()).unwrap();
        assert_eq!(run.report.cannot_compile[0].reason, "Error: broken");
        assert_eq!(run.candidates[0].name(), "solc-0.8.20");
    }

    #[test]
    fn test_missing_manifest_is_fatal_and_writes_nothing() {
        let dir = setup("{}", &[], &["solc"]);
        fs::remove_file(dir.path().join("main.json")).unwrap();
        let config = EffectiveConfig::defaults(dir.path());

        let err = run_check_with(&config, ContentInvoker, &mut io::sink()).unwrap_err();
        assert!(matches!(err, CheckError::Manifest(ManifestError::NotFound { .. })));
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_no_compilers_is_fatal_and_writes_nothing() {
        let dir = setup(r#"{"A": "a.sol"}"#, &[("a.sol", "ok")], &[]);
        let config = EffectiveConfig::defaults(dir.path());

        let err = run_check_with(&config, ContentInvoker, &mut io::sink()).unwrap_err();
        assert!(matches!(err, CheckError::Discovery(DiscoveryError::NoCompilers { .. })));
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_empty_manifest_still_writes_report() {
        let dir = setup("{}", &[], &["solc"]);
        let config = EffectiveConfig::defaults(dir.path());

        let run = run_check_with(&config, ContentInvoker, &mut io::sink()).unwrap();
        assert_eq!(run.report.summary.total, 0);
        assert!(config.output_path.exists());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = setup(
            r#"{"A": "a.sol", "B": "b.sol", "C": "missing.sol"}"#,
            &[("a.sol", "ok"), ("b.sol", "bad")],
            &["solc"],
        );
        let config = EffectiveConfig::defaults(dir.path());

        run_check_with(&config, ContentInvoker, &mut io::sink()).unwrap();
        let first = fs::read(&config.output_path).unwrap();
        run_check_with(&config, ContentInvoker, &mut io::sink()).unwrap();
        let second = fs::read(&config.output_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_console_output_sections() {
        let dir = setup(r#"{"A": "a.sol", "B": "missing.sol"}"#, &[("a.sol", "ok")], &["solc"]);
        let config = EffectiveConfig::defaults(dir.path());

        let mut out = Vec::new();
        run_check_with(&config, ContentInvoker, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Using compilers: "));
        assert!(text.contains("Checking 2 contracts..."));
        assert!(text.contains("Checking A... ✅ can compile"));
        assert!(text.contains("Checking B... ❌ file not found"));
        assert!(text.contains("Total: 2 contracts"));
        assert!(text.trim_end().ends_with("compile_check_result.json"));
    }

    struct ClosedStdout;

    impl Write for ClosedStdout {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }
    }

    #[test]
    fn test_closed_console_still_writes_report() {
        let dir = setup(r#"{"A": "a.sol", "B": "missing.sol"}"#, &[("a.sol", "ok")], &["solc"]);
        let config = EffectiveConfig::defaults(dir.path());

        let run = run_check_with(&config, ContentInvoker, &mut ClosedStdout).unwrap();
        let written = Report::from_file(&config.output_path).unwrap();
        assert_eq!(written, run.report);
        assert_eq!(written.summary.total, 2);
    }

    #[test]
    fn test_exit_codes() {
        let err = CheckError::Discovery(DiscoveryError::NoCompilers { dir: ".".into() });
        assert_eq!(err.exit_code(), 1);
        let err = CheckError::Config(ConfigError::NoPatterns);
        assert_eq!(err.exit_code(), 2);
    }
}
