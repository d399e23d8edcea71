//! Run manifest: the structured record of what a run produced.
//!
//! The contract with callers is "facts, not content": the manifest names the
//! files a run produced, and the console summary reports paths and sizes with
//! at most a short preview. Full output lives only in the files themselves.
//!
//! A script may write its own manifest to the path announced in its
//! environment; the controller only writes the minimal fallback when that
//! path is still absent after termination. The check and write are a single
//! `create_new` open, so a script-authored manifest is never clobbered.

use crate::error::{Result, RunletError};
use crate::run::context::RunContext;
use crate::run::runner::RunOutcome;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Maximum preview lines shown in the console summary.
const PREVIEW_MAX_LINES: usize = 5;
/// Maximum characters per preview line.
const PREVIEW_MAX_LINE_CHARS: usize = 200;

/// One file a run produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputDescriptor {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// What the file is to the run ("log", "result", ...).
    pub role: String,
    /// Broad content category ("stdout_stderr", "data", ...).
    pub category: String,
    /// Serialization format ("text", "json", ...).
    pub format: String,
}

impl OutputDescriptor {
    /// Descriptor for the run's combined stdout/stderr log.
    pub fn log(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            role: "log".to_string(),
            category: "stdout_stderr".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Structured record of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Run identifier the record belongs to.
    pub run_id: String,
    /// Whether the script exited with code zero.
    pub success: bool,
    /// Output directory the artifacts live in.
    pub output_dir: PathBuf,
    /// Structured input file the run consumed, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<PathBuf>,
    /// Files the run produced.
    pub outputs: Vec<OutputDescriptor>,
}

impl Manifest {
    /// Minimal fallback manifest for a run that didn't write its own.
    pub fn minimal(ctx: &RunContext, outcome: &RunOutcome) -> Self {
        Self {
            run_id: ctx.run_id.clone(),
            success: outcome.is_success(),
            output_dir: ctx.output_dir.clone(),
            input_path: ctx.input_path.clone(),
            outputs: outcome.outputs.clone(),
        }
    }

    /// Write the manifest to `path` only if nothing exists there yet.
    ///
    /// Returns true when this call created the file. Runs only after the
    /// child has fully terminated, so there is no race with the script.
    pub fn write_if_absent(&self, path: &Path) -> Result<bool> {
        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => {
                return Err(RunletError::UserError(format!(
                    "failed to write manifest '{}': {}",
                    path.display(),
                    e
                )));
            }
        };

        let json = serde_json::to_string_pretty(self).map_err(|e| {
            RunletError::UserError(format!("failed to serialize manifest: {}", e))
        })?;
        file.write_all(json.as_bytes()).map_err(|e| {
            RunletError::UserError(format!(
                "failed to write manifest '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(true)
    }
}

/// Render the bounded console summary for a finished run.
///
/// Reports the manifest and log locations with byte sizes, plus a short
/// preview of the log. Never dumps raw output.
pub fn render_summary(ctx: &RunContext, outcome: &RunOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("run id:   {}\n", ctx.run_id));
    out.push_str(&format!(
        "manifest: {} ({})\n",
        ctx.manifest_path.display(),
        describe_size(&ctx.manifest_path)
    ));
    out.push_str(&format!(
        "log:      {} ({})\n",
        ctx.log_path.display(),
        describe_size(&ctx.log_path)
    ));

    let preview = preview_lines(&outcome.captured);
    if !preview.is_empty() {
        out.push_str("log preview:\n");
        for line in preview {
            out.push_str("  ");
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

fn describe_size(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => format!("{} bytes", meta.len()),
        Err(_) => "missing".to_string(),
    }
}

/// First few lines of the captured output, each clipped to a fixed width.
fn preview_lines(captured: &str) -> Vec<String> {
    captured
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(PREVIEW_MAX_LINES)
        .map(|line| {
            if line.chars().count() > PREVIEW_MAX_LINE_CHARS {
                let clipped: String = line.chars().take(PREVIEW_MAX_LINE_CHARS).collect();
                format!("{}...", clipped)
            } else {
                line.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::runner::RunStatus;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sample_context(dir: &Path) -> RunContext {
        RunContext {
            run_id: "20260830_120000_42_1".to_string(),
            base: "inline".to_string(),
            output_dir: dir.to_path_buf(),
            manifest_path: dir.join("inline.20260830_120000_42_1.manifest.json"),
            log_path: dir.join("inline.20260830_120000_42_1.log.txt"),
            input_path: None,
        }
    }

    fn sample_outcome(ctx: &RunContext, status: RunStatus) -> RunOutcome {
        RunOutcome {
            status,
            captured: "hello\n".to_string(),
            duration: Duration::from_millis(5),
            outputs: vec![OutputDescriptor::log(&ctx.log_path)],
        }
    }

    #[test]
    fn minimal_manifest_lists_the_log() {
        let dir = TempDir::new().unwrap();
        let ctx = sample_context(dir.path());
        let outcome = sample_outcome(&ctx, RunStatus::Success);

        let manifest = Manifest::minimal(&ctx, &outcome);
        assert_eq!(manifest.run_id, ctx.run_id);
        assert!(manifest.success);
        assert_eq!(manifest.outputs.len(), 1);
        assert_eq!(manifest.outputs[0].role, "log");
        assert_eq!(manifest.outputs[0].category, "stdout_stderr");
        assert_eq!(manifest.outputs[0].format, "text");
    }

    #[test]
    fn failed_run_manifest_reports_failure() {
        let dir = TempDir::new().unwrap();
        let ctx = sample_context(dir.path());
        let outcome = sample_outcome(&ctx, RunStatus::NonZeroExit(2));

        let manifest = Manifest::minimal(&ctx, &outcome);
        assert!(!manifest.success);
    }

    #[test]
    fn write_if_absent_creates_valid_json() {
        let dir = TempDir::new().unwrap();
        let ctx = sample_context(dir.path());
        let outcome = sample_outcome(&ctx, RunStatus::Success);
        let manifest = Manifest::minimal(&ctx, &outcome);

        let created = manifest.write_if_absent(&ctx.manifest_path).unwrap();
        assert!(created);

        let text = std::fs::read_to_string(&ctx.manifest_path).unwrap();
        let parsed: Manifest = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.run_id, manifest.run_id);
        assert_eq!(parsed.outputs, manifest.outputs);
    }

    #[test]
    fn write_if_absent_never_clobbers_existing_manifest() {
        let dir = TempDir::new().unwrap();
        let ctx = sample_context(dir.path());
        std::fs::write(&ctx.manifest_path, r#"{"from":"the script"}"#).unwrap();

        let outcome = sample_outcome(&ctx, RunStatus::Success);
        let manifest = Manifest::minimal(&ctx, &outcome);
        let created = manifest.write_if_absent(&ctx.manifest_path).unwrap();

        assert!(!created);
        let text = std::fs::read_to_string(&ctx.manifest_path).unwrap();
        assert!(text.contains("from"));
    }

    #[test]
    fn input_path_omitted_from_json_when_absent() {
        let dir = TempDir::new().unwrap();
        let ctx = sample_context(dir.path());
        let outcome = sample_outcome(&ctx, RunStatus::Success);
        let manifest = Manifest::minimal(&ctx, &outcome);

        let json = serde_json::to_string(&manifest).unwrap();
        assert!(!json.contains("input_path"));
    }

    #[test]
    fn summary_reports_paths_and_sizes_not_content() {
        let dir = TempDir::new().unwrap();
        let ctx = sample_context(dir.path());
        std::fs::write(&ctx.log_path, "hello\n").unwrap();
        std::fs::write(&ctx.manifest_path, "{}").unwrap();
        let outcome = sample_outcome(&ctx, RunStatus::Success);

        let summary = render_summary(&ctx, &outcome);
        assert!(summary.contains(&ctx.run_id));
        assert!(summary.contains("6 bytes"));
        assert!(summary.contains("2 bytes"));
    }

    #[test]
    fn preview_is_bounded() {
        let long_line = "x".repeat(500);
        let many = (0..20)
            .map(|i| format!("line-{i}"))
            .collect::<Vec<_>>()
            .join("\n");

        let lines = preview_lines(&many);
        assert_eq!(lines.len(), PREVIEW_MAX_LINES);

        let clipped = preview_lines(&long_line);
        assert_eq!(clipped.len(), 1);
        assert!(clipped[0].chars().count() <= PREVIEW_MAX_LINE_CHARS + 3);
        assert!(clipped[0].ends_with("..."));
    }
}
