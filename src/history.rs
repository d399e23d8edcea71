//! Run history log.
//!
//! Every run appends one NDJSON line (one JSON object per line) to
//! `.history.jsonl` inside the run's output directory, recording who ran
//! what, when, and how it ended. The history is advisory: append failures
//! are swallowed so a read-only history file can never break a run.

use crate::run::context::RunContext;
use crate::run::request::{PayloadSource, RunRequest};
use crate::run::runner::{RunOutcome, RunStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// File name of the history log inside an output directory.
pub const HISTORY_FILE: &str = ".history.jsonl";

/// Maximum length of the derived summary line.
const SUMMARY_MAX_CHARS: usize = 120;

/// How the payload was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Code,
    File,
    Base64,
}

impl From<&PayloadSource> for PayloadKind {
    fn from(source: &PayloadSource) -> Self {
        match source {
            PayloadSource::Inline(_) => PayloadKind::Code,
            PayloadSource::File(_) => PayloadKind::File,
            PayloadSource::Encoded(_) => PayloadKind::Base64,
        }
    }
}

/// One history record, serialized as a single NDJSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// RFC3339 timestamp when the run finished.
    pub ts: DateTime<Utc>,

    /// Run identifier.
    pub run_id: String,

    /// Who ran it (`user@HOST`).
    pub actor: String,

    /// How the payload was delivered.
    pub kind: PayloadKind,

    /// Short human summary of what the payload was.
    pub summary: String,

    /// Terminal status as a short string ("success", "exit:7", "timeout",
    /// "spawn_failed").
    pub status: String,

    /// Manifest path for the run.
    pub manifest: PathBuf,

    /// Log path for the run.
    pub log: PathBuf,
}

impl HistoryEntry {
    pub fn new(request: &RunRequest, ctx: &RunContext, outcome: &RunOutcome) -> Self {
        Self {
            ts: Utc::now(),
            run_id: ctx.run_id.clone(),
            actor: actor_string(),
            kind: PayloadKind::from(&request.payload),
            summary: summarize_payload(&request.payload),
            status: status_string(&outcome.status),
            manifest: ctx.manifest_path.clone(),
            log: ctx.log_path.clone(),
        }
    }

    fn to_ndjson_line(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// Append an entry to the history log in the run's output directory.
///
/// Best-effort: any failure is ignored, the run's result stands on its own.
pub fn append(ctx: &RunContext, entry: &HistoryEntry) {
    let Some(line) = entry.to_ndjson_line() else {
        return;
    };
    let path = ctx.output_dir.join(HISTORY_FILE);
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = writeln!(file, "{}", line);
    }
}

fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{}@{}", user, host)
}

fn status_string(status: &RunStatus) -> String {
    match status {
        RunStatus::Success => "success".to_string(),
        RunStatus::NonZeroExit(code) => format!("exit:{}", code),
        RunStatus::TimedOut => "timeout".to_string(),
        RunStatus::SpawnFailed(_) => "spawn_failed".to_string(),
    }
}

/// Derive a one-line summary from the payload: file name for file payloads,
/// else the docstring or first meaningful comment, else the first code line.
fn summarize_payload(payload: &PayloadSource) -> String {
    match payload {
        PayloadSource::File(path) => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "script file".to_string()),
        PayloadSource::Inline(code) | PayloadSource::Encoded(code) => summarize_code(code),
    }
}

fn summarize_code(code: &str) -> String {
    let trimmed = code.trim_start();

    // Leading docstring.
    for quote in ["\"\"\"", "'''"] {
        if let Some(rest) = trimmed.strip_prefix(quote) {
            let body = match rest.find(quote) {
                Some(end) => &rest[..end],
                None => rest,
            };
            if let Some(line) = first_nonempty_line(body) {
                return clip(line);
            }
        }
    }

    // First comment, else first code line.
    for line in code.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            let comment = comment.trim();
            if !comment.is_empty() {
                return clip(comment);
            }
            continue;
        }
        return clip(line);
    }
    "(empty)".to_string()
}

fn first_nonempty_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}

fn clip(line: &str) -> String {
    if line.chars().count() > SUMMARY_MAX_CHARS {
        let clipped: String = line.chars().take(SUMMARY_MAX_CHARS).collect();
        format!("{}...", clipped)
    } else {
        line.to_string()
    }
}
