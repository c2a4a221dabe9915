//! Graceful termination of processes holding the port.

use super::discovery::ConflictingProcess;

/// Sends a graceful termination request to a process.
pub trait Terminate {
    /// Returns whether the request was delivered.
    fn terminate(&self, process: ConflictingProcess) -> bool;
}

/// `SIGTERM` on Unix, `taskkill` on Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalTerminator;

#[cfg(unix)]
impl Terminate for SignalTerminator {
    fn terminate(&self, process: ConflictingProcess) -> bool {
        let Ok(pid) = libc::pid_t::try_from(process.pid) else {
            return false;
        };
        // pid 0 and negative pids address process groups
        if pid <= 0 {
            return false;
        }
        // SAFETY: kill has no memory-safety preconditions
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc != 0 {
            tracing::debug!(
                "kill({}, SIGTERM) failed: {}",
                pid,
                std::io::Error::last_os_error()
            );
        }
        rc == 0
    }
}

#[cfg(windows)]
impl Terminate for SignalTerminator {
    fn terminate(&self, process: ConflictingProcess) -> bool {
        use crate::util::process::ProcessBuilder;

        let builder = ProcessBuilder::new("taskkill").args(["/PID", &process.pid.to_string()]);
        match builder.exec() {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!("{:#}", e);
                false
            }
        }
    }
}
