//! Compile runner
//!
//! Checks each manifest entry in order. A missing contract is recorded
//! without invoking anything; otherwise candidates are tried in discovery
//! order until one exits zero. When every candidate fails, the first
//! failure is the one reported.

mod invoker;
mod outcome;

pub use invoker::{CompilerInvoker, ProcessInvoker};
pub use outcome::{
    truncate_chars, AttemptError, FailureKind, FailureReason, Outcome, ProjectOutcome,
    COMPILATION_FAILED, FILE_NOT_FOUND, NO_COMPILER,
};

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::discovery::Candidate;
use crate::manifest::{Manifest, ManifestEntry};

/// Drives compile attempts for a manifest
pub struct CompileRunner<'a, I> {
    invoker: I,
    candidates: &'a [Candidate],
    root: PathBuf,
    reason_limit: usize,
}

impl<'a, I: CompilerInvoker> CompileRunner<'a, I> {
    pub fn new(invoker: I, candidates: &'a [Candidate], root: impl Into<PathBuf>, reason_limit: usize) -> Self {
        Self {
            invoker,
            candidates,
            root: root.into(),
            reason_limit,
        }
    }

    fn resolve(&self, contract: &Path) -> PathBuf {
        if contract.is_absolute() {
            contract.to_path_buf()
        } else {
            self.root.join(contract)
        }
    }

    /// Check one entry without writing progress
    pub fn check(&self, entry: &ManifestEntry) -> ProjectOutcome {
        let contract = self.resolve(&entry.contract);
        let outcome = if !contract.exists() {
            tracing::debug!(project = %entry.project, contract = %contract.display(), "contract missing");
            Outcome::Failure(FailureReason::file_not_found())
        } else {
            self.try_candidates(&entry.project, &contract)
        };

        ProjectOutcome {
            project: entry.project.clone(),
            contract: entry.contract.clone(),
            outcome,
        }
    }

    fn try_candidates(&self, project: &str, contract: &Path) -> Outcome {
        let mut first_failure: Option<FailureReason> = None;

        for candidate in self.candidates {
            match self.invoker.compile(candidate, contract) {
                Ok(()) => {
                    return Outcome::Success {
                        compiler: candidate.name().to_string(),
                    }
                }
                Err(err) => {
                    tracing::debug!(project, compiler = candidate.name(), error = %err, "attempt failed");
                    if first_failure.is_none() {
                        first_failure = Some(FailureReason::from_attempt(&err, self.reason_limit));
                    }
                }
            }
        }

        // Discovery never hands the pipeline an empty list.
        Outcome::Failure(first_failure.unwrap_or_else(FailureReason::no_compiler))
    }

    /// Check every entry in manifest order, writing one progress line each
    pub fn run<W: Write>(&self, manifest: &Manifest, out: &mut W) -> io::Result<Vec<ProjectOutcome>> {
        let mut outcomes = Vec::with_capacity(manifest.len());
        for entry in manifest.entries() {
            write!(out, "Checking {}... ", entry.project)?;
            out.flush()?;

            let result = self.check(entry);
            match &result.outcome {
                Outcome::Success { .. } => writeln!(out, "✅ can compile")?,
                Outcome::Failure(reason) if reason.kind == FailureKind::FileNotFound => {
                    writeln!(out, "❌ file not found")?
                }
                Outcome::Failure(_) => writeln!(out, "❌ cannot compile")?,
            }
            outcomes.push(result);
        }
        Ok(outcomes)
    }
}
