//! Per-project outcomes and failure taxonomy

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Report text for a contract path that does not exist
pub const FILE_NOT_FOUND: &str = "file not found";

/// Report text when there was no compiler to try
pub const NO_COMPILER: &str = "no compiler available";

/// Report text for a non-zero exit with nothing on stderr
pub const COMPILATION_FAILED: &str = "compilation failed";

/// Why a single compiler attempt failed
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("command `{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("compiler exited with {}", exit_label(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

impl AttemptError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AttemptError::Timeout { .. } => FailureKind::Timeout,
            AttemptError::NonZeroExit { .. } => FailureKind::NonZeroExit,
            AttemptError::Spawn { .. } | AttemptError::Wait { .. } => FailureKind::Spawn,
        }
    }

    /// Text surfaced in the report: compiler stderr for a failed compile,
    /// the error message otherwise
    pub fn reason(&self) -> String {
        match self {
            AttemptError::NonZeroExit { stderr, .. } if stderr.is_empty() => {
                COMPILATION_FAILED.to_string()
            }
            AttemptError::NonZeroExit { stderr, .. } => stderr.clone(),
            other => other.to_string(),
        }
    }
}

/// Failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Contract path does not exist; no compiler was run
    FileNotFound,
    /// Compiler exceeded the timeout
    Timeout,
    /// Compiler ran and exited non-zero
    NonZeroExit,
    /// Compiler could not be started or waited on
    Spawn,
    /// The candidate list was empty
    NoCompiler,
}

/// Recorded failure for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub message: String,
}

impl FailureReason {
    pub fn file_not_found() -> Self {
        Self {
            kind: FailureKind::FileNotFound,
            message: FILE_NOT_FOUND.to_string(),
        }
    }

    pub fn no_compiler() -> Self {
        Self {
            kind: FailureKind::NoCompiler,
            message: NO_COMPILER.to_string(),
        }
    }

    /// Failure from a compiler attempt, message truncated to `limit` characters
    pub fn from_attempt(err: &AttemptError, limit: usize) -> Self {
        Self {
            kind: err.kind(),
            message: truncate_chars(&err.reason(), limit),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of checking one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Compiled; `compiler` is the file name of the binary that succeeded
    Success { compiler: String },
    Failure(FailureReason),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Outcome tagged with its manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutcome {
    pub project: String,
    pub contract: PathBuf,
    pub outcome: Outcome,
}

/// First `limit` Unicode scalar values of `text`
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
