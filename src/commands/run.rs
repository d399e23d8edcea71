//! Implementation of the `runlet run` command.
//!
//! Builds a validated request from the CLI arguments, drives one execution
//! through the run controller, records the manifest and history, prints the
//! summary, and maps the outcome onto the exit-code taxonomy.

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{Result, RunletError};
use crate::history::{self, HistoryEntry};
use crate::run::{
    ExecMode, Manifest, PayloadSource, RunContext, RunRequest, RunStatus, execute, manifest,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::io::{BufRead, Write};

pub fn cmd_run(args: RunArgs) -> Result<()> {
    if args.yes && args.base64.is_some() {
        return Err(RunletError::UserError(
            "-y/--yes is not allowed with --base64 (confirmation is required)".to_string(),
        ));
    }

    let payload = resolve_payload(&args)?;

    // The legacy base64 delivery is always confirm-gated: show the decoded
    // code and require an explicit go-ahead.
    if let PayloadSource::Encoded(code) = &payload
        && !confirm_code(code)?
    {
        println!("Cancelled.");
        return Ok(());
    }

    let mode = if args.async_mode {
        ExecMode::AsyncAware
    } else {
        ExecMode::Sync
    };

    let request = RunRequest::new(payload, args.timeout)?
        .with_cwd(args.cwd)
        .with_input_path(args.input_path)
        .with_output_path(args.output_path)
        .with_output_dir(args.output_dir)
        .with_mode(mode)
        .with_script_args(args.script_args);

    let config = Config::load();
    let ctx = RunContext::resolve(&request, &config)?;
    let outcome = execute(&request, &ctx, &config)?;

    // The script may have written its own manifest; ours is the fallback.
    Manifest::minimal(&ctx, &outcome).write_if_absent(&ctx.manifest_path)?;
    history::append(&ctx, &HistoryEntry::new(&request, &ctx, &outcome));

    print!("{}", manifest::render_summary(&ctx, &outcome));

    match outcome.status {
        RunStatus::Success => Ok(()),
        RunStatus::NonZeroExit(code) => Err(RunletError::ScriptFailure(code)),
        RunStatus::TimedOut => Err(RunletError::Timeout(request.timeout_secs.unwrap_or(0.0))),
        RunStatus::SpawnFailed(reason) => Err(RunletError::SpawnFailure(reason)),
    }
}

/// Pick the single payload source. The CLI arg group already guarantees
/// exactly one is present; the final `else` is unreachable through clap.
fn resolve_payload(args: &RunArgs) -> Result<PayloadSource> {
    if let Some(code) = &args.code {
        Ok(PayloadSource::Inline(code.clone()))
    } else if let Some(file) = &args.file {
        Ok(PayloadSource::File(file.clone()))
    } else if let Some(encoded) = &args.base64 {
        Ok(PayloadSource::Encoded(decode_base64(encoded)?))
    } else {
        Err(RunletError::UserError(
            "one of --code, --file, or --base64 is required".to_string(),
        ))
    }
}

fn decode_base64(encoded: &str) -> Result<String> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| RunletError::UserError(format!("invalid base64 payload: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| RunletError::UserError(format!("base64 payload is not UTF-8: {}", e)))
}

/// Show the decoded code and ask for confirmation on stdin.
///
/// An empty answer counts as "yes" (the code was already displayed); a
/// closed or non-interactive stdin counts as "no".
fn confirm_code(code: &str) -> Result<bool> {
    eprintln!("Decoded code:");
    eprintln!("---");
    for line in code.lines() {
        eprintln!("{}", line);
    }
    eprintln!("---");
    eprint!("Execute this code? [Y/n] ");
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| RunletError::UserError(format!("failed to read confirmation: {}", e)))?;
    if read == 0 {
        return Ok(false);
    }
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer.is_empty() || answer == "y" || answer == "yes")
}
