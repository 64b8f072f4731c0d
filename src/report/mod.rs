//! Compile check report (compile_check_result.json)

mod console;

pub use console::{print_header, print_saved, print_summary, Console};

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::runner::{Outcome, ProjectOutcome};

/// Default report file name
pub const REPORT_FILE_NAME: &str = "compile_check_result.json";

/// Report errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A project that no compiler could build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedProject {
    pub project: String,
    pub reason: String,
}

/// Aggregate counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// The persisted result of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Projects that compiled, in manifest order
    pub can_compile: Vec<String>,

    /// Projects that did not, in manifest order
    pub cannot_compile: Vec<FailedProject>,

    pub summary: Summary,
}

impl Report {
    /// Aggregate outcomes; `success + failed == total` by construction
    pub fn from_outcomes(outcomes: &[ProjectOutcome]) -> Self {
        let mut can_compile = Vec::new();
        let mut cannot_compile = Vec::new();

        for outcome in outcomes {
            match &outcome.outcome {
                Outcome::Success { .. } => can_compile.push(outcome.project.clone()),
                Outcome::Failure(reason) => cannot_compile.push(FailedProject {
                    project: outcome.project.clone(),
                    reason: reason.message.clone(),
                }),
            }
        }

        let summary = Summary {
            total: outcomes.len(),
            success: can_compile.len(),
            failed: cannot_compile.len(),
        };

        Self {
            can_compile,
            cannot_compile,
            summary,
        }
    }

    /// Pretty JSON, two-space indent, non-ASCII left unescaped
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write to `path`, replacing any previous report
    pub fn write_to_file(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e)))
    }
}
