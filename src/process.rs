//! Shared subprocess primitive: spawn + capture + timeout.
//!
//! Both the run controller and the capability probe sit on top of this
//! module. It provides a polling wait with a hard deadline and a
//! kill-the-whole-tree escalation so an overrunning child (and anything it
//! spawned) cannot outlive the controlling call.
//!
//! On Unix, children are placed in their own process group at spawn time and
//! the whole group receives SIGKILL on timeout. Elsewhere only the direct
//! child is killed.

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// How often the watchdog polls the child for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a short-lived subprocess.
#[derive(Debug, Clone)]
pub struct Captured {
    /// Exit code of the process (None if killed or didn't exit normally).
    pub exit_code: Option<i32>,
    /// Whether the process was killed due to timeout.
    pub timed_out: bool,
    /// Wall-clock duration of the execution.
    pub duration: Duration,
    /// Captured stdout content.
    pub stdout: String,
    /// Captured stderr content.
    pub stderr: String,
}

impl Captured {
    /// True when the process exited normally with code zero.
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Place the child in its own process group so a timeout kill reaches its
/// descendants too.
#[cfg(unix)]
pub fn configure_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
pub fn configure_process_group(_command: &mut Command) {}

/// Run a command with piped output and a hard deadline.
///
/// Stdout and stderr are read back after the child exits (or is killed), so
/// this is only suitable for short-lived processes with small output — probe
/// checks and version queries. A child that writes more than the OS pipe
/// buffer (64 KiB on Linux, as little as 16 KiB elsewhere) before exiting
/// blocks on the full pipe until the deadline kills it and is reported as
/// timed out. The run controller streams to a log file instead and never
/// goes through pipes.
///
/// A spawn failure surfaces as the `Err` case; callers decide whether that
/// is fatal (it never is for probe entries).
pub fn run_captured(command: &mut Command, timeout: Duration) -> io::Result<Captured> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    configure_process_group(command);

    let start = Instant::now();
    let mut child = command.spawn()?;
    let (exit_code, timed_out) = wait_with_timeout(&mut child, Some(timeout))?;
    let duration = start.elapsed();

    // The pipes are at EOF once the child (and its group) is gone.
    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        let mut buf = Vec::new();
        let _ = out.read_to_end(&mut buf);
        stdout = String::from_utf8_lossy(&buf).into_owned();
    }
    let mut stderr = String::new();
    if let Some(mut err) = child.stderr.take() {
        let mut buf = Vec::new();
        let _ = err.read_to_end(&mut buf);
        stderr = String::from_utf8_lossy(&buf).into_owned();
    }

    Ok(Captured {
        exit_code,
        timed_out,
        duration,
        stdout,
        stderr,
    })
}

/// Wait for a child process with an optional timeout.
///
/// Returns (exit_code, timed_out). On expiry the child's process tree is
/// forcibly terminated and reaped before returning, so the child never
/// outlives this call by more than the poll granularity plus reap time.
pub fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> io::Result<(Option<i32>, bool)> {
    let start = Instant::now();

    loop {
        match child.try_wait()? {
            Some(status) => return Ok((status.code(), false)),
            None => {
                if let Some(limit) = timeout
                    && start.elapsed() >= limit
                {
                    kill_tree(child);
                    return Ok((None, true));
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

/// Kill a process (and on Unix its whole process group) and reap it.
#[cfg(unix)]
pub fn kill_tree(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    // The child was spawned with process_group(0), so its pid is the pgid.
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(not(unix))]
pub fn kill_tree(child: &mut Child) {
    // On Windows this is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", script]);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", script]);
            cmd
        }
    }

    #[test]
    fn captures_stdout_of_quick_command() {
        let captured = run_captured(&mut sh("echo hello"), Duration::from_secs(10)).unwrap();
        assert!(captured.is_success());
        assert_eq!(captured.exit_code, Some(0));
        assert!(captured.stdout.contains("hello"));
        assert!(!captured.timed_out);
    }

    #[test]
    fn reports_nonzero_exit_code() {
        let captured = run_captured(&mut sh("exit 3"), Duration::from_secs(10)).unwrap();
        assert!(!captured.is_success());
        assert_eq!(captured.exit_code, Some(3));
        assert!(!captured.timed_out);
    }

    #[test]
    fn kills_overrunning_process() {
        #[cfg(windows)]
        let script = "ping -n 30 127.0.0.1";
        #[cfg(not(windows))]
        let script = "sleep 30";

        let start = Instant::now();
        let captured = run_captured(&mut sh(script), Duration::from_millis(300)).unwrap();
        assert!(captured.timed_out);
        assert_eq!(captured.exit_code, None);
        // Kill must happen promptly, not after the sleep finishes.
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn preserves_output_produced_before_timeout() {
        #[cfg(not(windows))]
        {
            let captured =
                run_captured(&mut sh("echo early; sleep 30"), Duration::from_millis(300)).unwrap();
            assert!(captured.timed_out);
            assert!(captured.stdout.contains("early"));
        }
    }

    #[test]
    fn spawn_failure_is_an_error_not_a_panic() {
        let mut cmd = Command::new("runlet-definitely-not-a-real-binary");
        let result = run_captured(&mut cmd, Duration::from_secs(1));
        assert!(result.is_err());
    }
}
