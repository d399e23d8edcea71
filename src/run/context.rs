//! Run identity and path resolution.
//!
//! Given a validated `RunRequest`, this module computes the immutable
//! `RunContext` that owns the run: a unique run id plus the resolved output
//! directory, manifest path, and log path. The output directory is created
//! here, before anything is spawned; failure to create it is a fatal
//! precondition error.

use crate::config::Config;
use crate::error::{Result, RunletError};
use crate::run::request::{PayloadSource, RunRequest};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default output directory when nothing else resolves.
pub const DEFAULT_OUTPUT_DIR: &str = "temp";

/// Per-process run sequence number.
///
/// Combined with the pid this makes run ids unique even when several runs
/// start within the same second; a collision would silently overwrite
/// another run's manifest and log.
static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a unique run id: `YYYYmmdd_HHMMSS_<pid>_<seq>`.
pub fn generate_run_id() -> String {
    let seq = RUN_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
    format!(
        "{}_{}_{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        std::process::id(),
        seq
    )
}

/// Resolved identity and paths for one run.
///
/// Created once per request, immutable after creation, owned exclusively by
/// the run. The log and manifest names are always derived from the output
/// directory and run id; only the manifest path can be overridden as a whole.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Unique run identifier.
    pub run_id: String,
    /// Base name for derived artifact file names.
    pub base: String,
    /// Absolute path of the resolved output directory (exists on success).
    pub output_dir: PathBuf,
    /// Absolute path the manifest will be written to.
    pub manifest_path: PathBuf,
    /// Absolute path of the combined stdout/stderr log.
    pub log_path: PathBuf,
    /// Absolute path of the structured input file, when supplied.
    pub input_path: Option<PathBuf>,
}

impl RunContext {
    /// Resolve a context for the request, checking preconditions and
    /// creating the output directory.
    pub fn resolve(request: &RunRequest, config: &Config) -> Result<Self> {
        // Preconditions that must fail before any path is created.
        if let PayloadSource::File(path) = &request.payload {
            if !path.exists() {
                return Err(RunletError::UserError(format!(
                    "script file not found: {}",
                    path.display()
                )));
            }
            if !path.is_file() {
                return Err(RunletError::UserError(format!(
                    "not a file: {}",
                    path.display()
                )));
            }
        }

        let input_path = match &request.input_path {
            Some(path) => {
                if !path.exists() {
                    return Err(RunletError::UserError(format!(
                        "input file not found: {}",
                        path.display()
                    )));
                }
                Some(absolute(path)?)
            }
            None => None,
        };

        let run_id = generate_run_id();
        let base = request.payload.base_name();

        let output_dir = absolute(&resolve_output_dir(request, config))?;
        std::fs::create_dir_all(&output_dir).map_err(|e| {
            RunletError::UserError(format!(
                "failed to create output directory '{}': {}",
                output_dir.display(),
                e
            ))
        })?;

        // An explicit manifest path may point outside the output directory;
        // its parent must exist before the run starts, or the manifest write
        // would fail after the script already ran to completion.
        let manifest_path = match &request.output_path {
            Some(path) => {
                let path = absolute(path)?;
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        RunletError::UserError(format!(
                            "failed to create manifest directory '{}': {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
                path
            }
            None => output_dir.join(format!("{}.{}.manifest.json", base, run_id)),
        };
        let log_path = output_dir.join(format!("{}.{}.log.txt", base, run_id));

        Ok(Self {
            run_id,
            base,
            output_dir,
            manifest_path,
            log_path,
            input_path,
        })
    }
}

/// Output directory precedence: explicit override, then the input file's
/// directory, then the script file's directory, then the configured default,
/// then `temp/` under the current directory.
fn resolve_output_dir(request: &RunRequest, config: &Config) -> PathBuf {
    if let Some(dir) = &request.output_dir {
        return dir.clone();
    }
    if let Some(input) = &request.input_path
        && let Some(parent) = input.parent()
        && !parent.as_os_str().is_empty()
    {
        return parent.to_path_buf();
    }
    if let PayloadSource::File(path) = &request.payload
        && let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        return parent.to_path_buf();
    }
    if let Some(dir) = &config.output_dir {
        return dir.clone();
    }
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        RunletError::UserError(format!(
            "failed to resolve path '{}': {}",
            path.display(),
            e
        ))
    })
}
