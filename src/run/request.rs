//! Run request model.
//!
//! The three mutually exclusive payload origins are a tagged variant, so a
//! request with zero or multiple sources cannot be constructed. All request
//! validation happens here, before any filesystem or process side effect.

use crate::error::{Result, RunletError};
use std::path::PathBuf;

/// Where the code to execute comes from.
///
/// Exactly one origin per run. `Encoded` carries already-decoded text; the
/// base64 decoding and the interactive confirmation gate live in the command
/// layer so the core never depends on interactive I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// Inline code text supplied directly by the caller.
    Inline(String),
    /// Path to a script file on disk.
    File(PathBuf),
    /// Code that arrived base64-encoded (legacy delivery, confirm-gated).
    Encoded(String),
}

impl PayloadSource {
    /// Base name used for derived artifact file names.
    pub fn base_name(&self) -> String {
        match self {
            PayloadSource::Inline(_) => "inline".to_string(),
            PayloadSource::Encoded(_) => "base64".to_string(),
            PayloadSource::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "run".to_string()),
        }
    }
}

/// Execution mode for the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Plain synchronous execution.
    #[default]
    Sync,
    /// The payload may contain top-level `await`; it is wrapped so the
    /// interpreter drives an event loop around it. The controller still
    /// blocks until completion or timeout.
    AsyncAware,
}

/// A validated request for one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// The code payload and its origin.
    pub payload: PayloadSource,
    /// Working directory for the child process, if overridden.
    pub cwd: Option<PathBuf>,
    /// Optional structured input file exposed to the script.
    pub input_path: Option<PathBuf>,
    /// Explicit manifest path override.
    pub output_path: Option<PathBuf>,
    /// Output directory override for auto-generated artifacts.
    pub output_dir: Option<PathBuf>,
    /// Maximum execution time in seconds.
    pub timeout_secs: Option<f64>,
    /// Sync or async-aware execution.
    pub mode: ExecMode,
    /// Trailing arguments passed to the script.
    pub script_args: Vec<String>,
}

impl RunRequest {
    /// Build a validated request.
    ///
    /// Rejects a non-positive timeout. The payload is already unambiguous by
    /// construction of `PayloadSource`.
    pub fn new(payload: PayloadSource, timeout_secs: Option<f64>) -> Result<Self> {
        if let Some(secs) = timeout_secs
            && (!secs.is_finite() || secs <= 0.0)
        {
            return Err(RunletError::UserError(format!(
                "timeout must be a positive number of seconds, got {}",
                secs
            )));
        }

        Ok(Self {
            payload,
            cwd: None,
            input_path: None,
            output_path: None,
            output_dir: None,
            timeout_secs,
            mode: ExecMode::Sync,
            script_args: Vec::new(),
        })
    }

    pub fn with_cwd(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn with_input_path(mut self, input_path: Option<PathBuf>) -> Self {
        self.input_path = input_path;
        self
    }

    pub fn with_output_path(mut self, output_path: Option<PathBuf>) -> Self {
        self.output_path = output_path;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_mode(mut self, mode: ExecMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_script_args(mut self, script_args: Vec<String>) -> Self {
        self.script_args = script_args;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_positive_timeout() {
        let req = RunRequest::new(PayloadSource::Inline("print(1)".into()), Some(5.0)).unwrap();
        assert_eq!(req.timeout_secs, Some(5.0));
        assert_eq!(req.mode, ExecMode::Sync);
    }

    #[test]
    fn new_accepts_no_timeout() {
        let req = RunRequest::new(PayloadSource::Inline("print(1)".into()), None).unwrap();
        assert!(req.timeout_secs.is_none());
    }

    #[test]
    fn new_rejects_zero_timeout() {
        let result = RunRequest::new(PayloadSource::Inline("print(1)".into()), Some(0.0));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("positive"));
    }

    #[test]
    fn new_rejects_negative_timeout() {
        let result = RunRequest::new(PayloadSource::Inline("print(1)".into()), Some(-1.0));
        assert!(result.is_err());
    }

    #[test]
    fn new_rejects_nan_timeout() {
        let result = RunRequest::new(PayloadSource::Inline("print(1)".into()), Some(f64::NAN));
        assert!(result.is_err());
    }

    #[test]
    fn base_name_for_inline_and_encoded() {
        assert_eq!(PayloadSource::Inline("x".into()).base_name(), "inline");
        assert_eq!(PayloadSource::Encoded("x".into()).base_name(), "base64");
    }

    #[test]
    fn base_name_for_file_uses_stem() {
        let src = PayloadSource::File(PathBuf::from("/some/dir/analysis.py"));
        assert_eq!(src.base_name(), "analysis");
    }

    #[test]
    fn builder_methods_set_fields() {
        let req = RunRequest::new(PayloadSource::Inline("print(1)".into()), None)
            .unwrap()
            .with_cwd(Some(PathBuf::from("/tmp")))
            .with_input_path(Some(PathBuf::from("/tmp/in.json")))
            .with_mode(ExecMode::AsyncAware)
            .with_script_args(vec!["--flag".to_string()]);

        assert_eq!(req.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(req.input_path, Some(PathBuf::from("/tmp/in.json")));
        assert_eq!(req.mode, ExecMode::AsyncAware);
        assert_eq!(req.script_args, vec!["--flag"]);
    }
}
