//! Human-readable console output

use std::io::{self, Write};
use std::path::Path;

use super::Report;
use crate::discovery::Candidate;

const RULE_WIDTH: usize = 50;

/// Console writer that stops writing after the first failure.
///
/// The error is logged once and later output is discarded, so a closed
/// stdout never stops the report from being written.
pub struct Console<W> {
    inner: W,
    failed: bool,
}

impl<W: Write> Console<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, failed: false }
    }

    /// Whether a write has failed and output is being discarded
    pub fn failed(&self) -> bool {
        self.failed
    }

    fn absorb(&mut self, err: io::Error) -> io::Result<()> {
        if err.kind() == io::ErrorKind::Interrupted {
            return Err(err);
        }
        tracing::warn!(error = %err, "console output failed; continuing without it");
        self.failed = true;
        Ok(())
    }
}

impl<W: Write> Write for Console<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.failed {
            return Ok(buf.len());
        }
        match self.inner.write(buf) {
            Ok(n) => Ok(n),
            Err(e) => self.absorb(e).map(|()| buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.failed {
            return Ok(());
        }
        match self.inner.flush() {
            Ok(()) => Ok(()),
            Err(e) => self.absorb(e),
        }
    }
}

/// Compilers in use and the number of contracts, then a rule
pub fn print_header<W: Write>(out: &mut W, candidates: &[Candidate], contracts: usize) -> io::Result<()> {
    let names: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
    writeln!(out, "Using compilers: {}", names.join(", "))?;
    writeln!(out, "Checking {} contracts...", contracts)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

/// Totals and the enumerated success and failure lists
pub fn print_summary<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "📊 Compile check results:")?;
    writeln!(out, "Total: {} contracts", report.summary.total)?;
    writeln!(out, "✅ Can compile: {}", report.summary.success)?;
    writeln!(out, "❌ Cannot compile: {}", report.summary.failed)?;

    if !report.can_compile.is_empty() {
        writeln!(out)?;
        writeln!(out, "✅ Contracts that compile ({}):", report.can_compile.len())?;
        for (i, project) in report.can_compile.iter().enumerate() {
            writeln!(out, "  {:2}. {}", i + 1, project)?;
        }
    }

    if !report.cannot_compile.is_empty() {
        writeln!(out)?;
        writeln!(out, "❌ Contracts that fail ({}):", report.cannot_compile.len())?;
        for (i, failed) in report.cannot_compile.iter().enumerate() {
            writeln!(out, "  {:2}. {} ({})", i + 1, failed.project, failed.reason)?;
        }
    }

    Ok(())
}

/// Final line naming the report file
pub fn print_saved<W: Write>(out: &mut W, path: &Path) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "📄 Results saved to {}", path.display())
}
