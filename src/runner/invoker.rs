//! Running a compiler binary against one contract

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use super::outcome::AttemptError;
use crate::discovery::Candidate;

/// Interval between exit checks while a compiler runs
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs one compile attempt
pub trait CompilerInvoker {
    /// Compile `contract` with `compiler`; `Ok` means exit status zero.
    fn compile(&self, compiler: &Candidate, contract: &Path) -> Result<(), AttemptError>;
}

/// Runs `<compiler> --bin <contract>` as a subprocess with a timeout
///
/// The timeout covers the whole attempt: waiting for exit and reading both
/// pipes to EOF. A background process that inherits a pipe and outlives the
/// compiler cannot stall the run past the deadline.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    timeout: Duration,
}

impl ProcessInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn timed_out(&self, command: &str) -> AttemptError {
        AttemptError::Timeout {
            command: command.to_string(),
            timeout: self.timeout,
        }
    }

    /// Poll until the child exits or `deadline` passes.
    ///
    /// On timeout the child is killed and reaped before returning.
    fn wait_until(
        &self,
        child: &mut Child,
        deadline: Instant,
        command: &str,
        program: &str,
    ) -> Result<ExitStatus, AttemptError> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(self.timed_out(command));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(AttemptError::Wait {
                        program: program.to_string(),
                        source,
                    });
                }
            }
        }
    }
}

impl CompilerInvoker for ProcessInvoker {
    fn compile(&self, compiler: &Candidate, contract: &Path) -> Result<(), AttemptError> {
        let program = compiler.path.display().to_string();
        let command = format!("{} --bin {}", program, contract.display());

        let started = Instant::now();
        let deadline = started + self.timeout;

        let mut child = Command::new(&compiler.path)
            .arg("--bin")
            .arg(contract)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AttemptError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Both pipes are drained so a chatty compiler cannot block on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait_until(&mut child, deadline, &command, &program)?;
        tracing::debug!(
            compiler = compiler.name(),
            contract = %contract.display(),
            status = ?status.code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "compiler finished"
        );

        // A reader still blocked at the deadline is left detached; it ends
        // when the last holder of the pipe exits.
        collect(stdout, deadline).ok_or_else(|| self.timed_out(&command))?;
        let stderr = collect(stderr, deadline).ok_or_else(|| self.timed_out(&command))?;

        if status.success() {
            return Ok(());
        }

        Err(AttemptError::NonZeroExit {
            code: status.code(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    pipe.map(|mut reader| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    })
}

/// Output of one reader, or `None` if it had not reached EOF by `deadline`
fn collect(output: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<Vec<u8>> {
    let Some(rx) = output else {
        return Some(Vec::new());
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(buf) => Some(buf),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Vec::new()),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use solc_version::VersionKey;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Writing a script while another test forks can leave the write fd open
    // in the child and fail our exec with ETXTBSY.
    static EXEC_LOCK: Mutex<()> = Mutex::new(());

    fn exec_lock() -> std::sync::MutexGuard<'static, ()> {
        EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn script(dir: &Path, name: &str, body: &str) -> Candidate {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        Candidate {
            path,
            key: VersionKey {
                name: name.to_string(),
                version: None,
            },
        }
    }

    #[test]
    fn test_zero_exit_is_ok() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let solc = script(dir.path(), "solc", "echo binary; exit 0");
        let invoker = ProcessInvoker::new(Duration::from_secs(5));
        assert!(invoker.compile(&solc, Path::new("a.sol")).is_ok());
    }

    #[test]
    fn test_nonzero_exit_captures_stderr() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let solc = script(dir.path(), "solc", "echo \"Error: bad $2\" >&2; exit 1");
        let invoker = ProcessInvoker::new(Duration::from_secs(5));
        match invoker.compile(&solc, Path::new("a.sol")) {
            Err(AttemptError::NonZeroExit { code, stderr }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "Error: bad a.sol\n");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_timeout_kills_compiler() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let solc = script(dir.path(), "solc", "exec sleep 5");
        let invoker = ProcessInvoker::new(Duration::from_millis(200));
        let start = Instant::now();
        let err = invoker.compile(&solc, Path::new("a.sol")).unwrap_err();
        assert!(matches!(err, AttemptError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_timeout_covers_background_process_holding_pipes() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let solc = script(dir.path(), "solc", "sleep 6 &\nexit 1");
        let invoker = ProcessInvoker::new(Duration::from_secs(1));
        let start = Instant::now();
        let err = invoker.compile(&solc, Path::new("a.sol")).unwrap_err();
        assert!(matches!(err, AttemptError::Timeout { .. }), "unexpected error: {:?}", err);
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let candidate = Candidate {
            path: PathBuf::from("/nonexistent/solc-0.8.20"),
            key: VersionKey {
                name: "solc-0.8.20".to_string(),
                version: None,
            },
        };
        let invoker = ProcessInvoker::new(Duration::from_secs(1));
        let err = invoker.compile(&candidate, Path::new("a.sol")).unwrap_err();
        assert!(matches!(err, AttemptError::Spawn { .. }));
    }
}
