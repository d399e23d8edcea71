//! Process runner: spawns the interpreter and supervises it.
//!
//! The payload is always delivered via a file (a staged temp file for inline
//! and encoded payloads), never embedded in the command line, so quoting can
//! never corrupt it. The child's stdout and stderr are redirected straight to
//! the run's log file as it executes, which means partial output survives a
//! timeout kill. The watchdog and capture are internal to a run; the caller
//! blocks until the run reaches a terminal state.

use crate::config::{self, Config};
use crate::error::{Result, RunletError};
use crate::process;
use crate::run::context::RunContext;
use crate::run::manifest::OutputDescriptor;
use crate::run::request::{ExecMode, PayloadSource, RunRequest};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Upper bound on how much of the log is read back into the outcome.
const CAPTURE_EXCERPT_LIMIT: u64 = 64 * 1024;

/// Environment variables exposed to the executed script.
pub const ENV_RUN_ID: &str = "RUNLET_RUN_ID";
pub const ENV_OUTPUT_DIR: &str = "RUNLET_OUTPUT_DIR";
pub const ENV_OUTPUT_PATH: &str = "RUNLET_OUTPUT_PATH";
pub const ENV_LOG_PATH: &str = "RUNLET_LOG_PATH";
pub const ENV_INPUT_PATH: &str = "RUNLET_INPUT_PATH";

/// Terminal classification of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// The script exited with code zero.
    Success,
    /// The script ran and exited nonzero (faithfully reported, not a
    /// controller error). `-1` means the child died to a signal other than
    /// the watchdog's.
    NonZeroExit(i32),
    /// The watchdog killed the script after its deadline.
    TimedOut,
    /// The interpreter could not be started at all.
    SpawnFailed(String),
}

/// Result of executing a run. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Terminal status of the run.
    pub status: RunStatus,
    /// Bounded excerpt of the combined stdout/stderr log (the full content
    /// lives only in the log file).
    pub captured: String,
    /// Wall-clock duration of the execution.
    pub duration: Duration,
    /// Files this run produced, in manifest order.
    pub outputs: Vec<OutputDescriptor>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Execute a validated request within its resolved context.
///
/// Only precondition failures (unreadable payload, bad working directory,
/// unwritable log) return `Err`. Spawn failures, timeouts, and nonzero exits
/// are captured into the outcome.
pub fn execute(request: &RunRequest, ctx: &RunContext, config: &Config) -> Result<RunOutcome> {
    let staged = stage_payload(request, ctx)?;

    let cwd = resolve_cwd(request, &staged)?;

    // One log file for both streams; the handles are duplicated so the OS
    // interleaves writes as they happen.
    let log_file = File::create(&ctx.log_path).map_err(|e| {
        RunletError::UserError(format!(
            "failed to create log file '{}': {}",
            ctx.log_path.display(),
            e
        ))
    })?;
    let log_for_stderr = log_file.try_clone().map_err(|e| {
        RunletError::UserError(format!("failed to duplicate log handle: {}", e))
    })?;

    let interpreter = config.interpreter_command();
    let mut command = build_command(&interpreter, &staged, request, ctx, &cwd);
    command
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(log_for_stderr));
    process::configure_process_group(&mut command);

    let start = Instant::now();
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound && !config.has_interpreter_override() => {
            // `python3` missing; some platforms only install `python`.
            match respawn_with_fallback(&staged, request, ctx, &cwd) {
                Ok(child) => child,
                Err(e) => return Ok(spawn_failed_outcome(ctx, e, start)),
            }
        }
        Err(e) => return Ok(spawn_failed_outcome(ctx, e, start)),
    };

    let timeout = request.timeout_secs.map(Duration::from_secs_f64);
    let (exit_code, timed_out) = process::wait_with_timeout(&mut child, timeout)
        .map_err(|e| RunletError::UserError(format!("failed to wait for child process: {}", e)))?;
    let duration = start.elapsed();

    let status = if timed_out {
        RunStatus::TimedOut
    } else {
        match exit_code {
            Some(0) => RunStatus::Success,
            Some(code) => RunStatus::NonZeroExit(code),
            None => RunStatus::NonZeroExit(-1),
        }
    };

    Ok(RunOutcome {
        status,
        captured: read_log_excerpt(&ctx.log_path),
        duration,
        outputs: vec![OutputDescriptor::log(&ctx.log_path)],
    })
}

/// A payload ready to hand to the interpreter.
struct StagedPayload {
    /// Path passed to the interpreter.
    script_path: PathBuf,
    /// For file payloads, the original script location (drives cwd default).
    source_file: Option<PathBuf>,
    /// Keeps the staging directory alive until the run finishes.
    _staging: Option<tempfile::TempDir>,
}

/// Write the payload to disk if it isn't a plain file already.
fn stage_payload(request: &RunRequest, ctx: &RunContext) -> Result<StagedPayload> {
    let code = match (&request.payload, request.mode) {
        (PayloadSource::File(path), ExecMode::Sync) => {
            // Already a file on disk; execute in place so relative imports
            // and __file__ behave normally.
            return Ok(StagedPayload {
                script_path: path.clone(),
                source_file: Some(path.clone()),
                _staging: None,
            });
        }
        (PayloadSource::File(path), ExecMode::AsyncAware) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                RunletError::UserError(format!(
                    "failed to read script file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            wrap_async(&text)
        }
        (PayloadSource::Inline(code) | PayloadSource::Encoded(code), ExecMode::Sync) => {
            code.clone()
        }
        (PayloadSource::Inline(code) | PayloadSource::Encoded(code), ExecMode::AsyncAware) => {
            wrap_async(code)
        }
    };

    let staging = tempfile::Builder::new()
        .prefix("runlet-")
        .tempdir()
        .map_err(|e| RunletError::UserError(format!("failed to create staging directory: {}", e)))?;
    let script_path = staging.path().join(format!("{}.py", ctx.base));
    std::fs::write(&script_path, code)
        .map_err(|e| RunletError::UserError(format!("failed to stage payload: {}", e)))?;

    let source_file = match &request.payload {
        PayloadSource::File(path) => Some(path.clone()),
        _ => None,
    };

    Ok(StagedPayload {
        script_path,
        source_file,
        _staging: Some(staging),
    })
}

/// Wrap code so top-level `await` works: the body runs inside an async main
/// driven by `asyncio.run`.
fn wrap_async(code: &str) -> String {
    let mut wrapped = String::with_capacity(code.len() + 128);
    wrapped.push_str("import asyncio\n\nasync def __runlet_main__():\n");
    let mut empty = true;
    for line in code.lines() {
        wrapped.push_str("    ");
        wrapped.push_str(line);
        wrapped.push('\n');
        empty = false;
    }
    if empty {
        wrapped.push_str("    pass\n");
    }
    wrapped.push_str("\nasyncio.run(__runlet_main__())\n");
    wrapped
}

/// Working directory: explicit request override, else the script's own
/// directory for file payloads, else the caller's current directory.
fn resolve_cwd(request: &RunRequest, staged: &StagedPayload) -> Result<PathBuf> {
    if let Some(cwd) = &request.cwd {
        if !cwd.is_dir() {
            return Err(RunletError::UserError(format!(
                "working directory does not exist: {}",
                cwd.display()
            )));
        }
        return Ok(cwd.clone());
    }
    if let Some(source) = &staged.source_file
        && let Some(parent) = source.parent()
        && !parent.as_os_str().is_empty()
    {
        return Ok(parent.to_path_buf());
    }
    std::env::current_dir()
        .map_err(|e| RunletError::UserError(format!("failed to get current directory: {}", e)))
}

fn build_command(
    interpreter: &[String],
    staged: &StagedPayload,
    request: &RunRequest,
    ctx: &RunContext,
    cwd: &PathBuf,
) -> Command {
    let mut command = Command::new(&interpreter[0]);
    command
        .args(&interpreter[1..])
        .arg(&staged.script_path)
        .args(&request.script_args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .env(ENV_RUN_ID, &ctx.run_id)
        .env(ENV_OUTPUT_DIR, &ctx.output_dir)
        .env(ENV_OUTPUT_PATH, &ctx.manifest_path)
        .env(ENV_LOG_PATH, &ctx.log_path);
    if let Some(input) = &ctx.input_path {
        command.env(ENV_INPUT_PATH, input);
    }
    command
}

/// Retry the spawn with the fallback interpreter, reusing the same log file
/// handles by reopening in append mode.
fn respawn_with_fallback(
    staged: &StagedPayload,
    request: &RunRequest,
    ctx: &RunContext,
    cwd: &PathBuf,
) -> io::Result<std::process::Child> {
    let log_file = std::fs::OpenOptions::new()
        .append(true)
        .open(&ctx.log_path)?;
    let log_for_stderr = log_file.try_clone()?;

    let interpreter = vec![config::fallback_interpreter().to_string()];
    let mut command = build_command(&interpreter, staged, request, ctx, cwd);
    command
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(log_for_stderr));
    process::configure_process_group(&mut command);
    command.spawn()
}

fn spawn_failed_outcome(ctx: &RunContext, error: io::Error, start: Instant) -> RunOutcome {
    RunOutcome {
        status: RunStatus::SpawnFailed(error.to_string()),
        captured: String::new(),
        duration: start.elapsed(),
        outputs: vec![OutputDescriptor::log(&ctx.log_path)],
    }
}

/// Read at most `CAPTURE_EXCERPT_LIMIT` bytes back from the log.
fn read_log_excerpt(log_path: &std::path::Path) -> String {
    let Ok(mut file) = File::open(log_path) else {
        return String::new();
    };
    if file.seek(SeekFrom::Start(0)).is_err() {
        return String::new();
    }
    let mut buf = Vec::new();
    let _ = file.take(CAPTURE_EXCERPT_LIMIT).read_to_end(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
