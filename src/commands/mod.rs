//! Command implementations for runlet.
//!
//! The dispatcher routes parsed CLI commands to their handlers. Handlers own
//! all console I/O; the core modules under `run` and `probe` never print.

mod probe;
mod run;

use crate::cli::{Command, EnsureDirArgs};
use crate::error::{Result, RunletError};

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run::cmd_run(args),
        Command::Probe(args) => probe::cmd_probe(args),
        Command::EnsureDir(args) => cmd_ensure_dir(args),
    }
}

/// Create the directory (with parents) and print its absolute path, so
/// callers can pass a relative path and get back something durable.
fn cmd_ensure_dir(args: EnsureDirArgs) -> Result<()> {
    std::fs::create_dir_all(&args.dir).map_err(|e| {
        RunletError::UserError(format!(
            "failed to create directory '{}': {}",
            args.dir.display(),
            e
        ))
    })?;
    let absolute = std::path::absolute(&args.dir).map_err(|e| {
        RunletError::UserError(format!(
            "failed to resolve path '{}': {}",
            args.dir.display(),
            e
        ))
    })?;
    println!("{}", absolute.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("a").join("b").join("c");

        cmd_ensure_dir(EnsureDirArgs {
            dir: target.clone(),
        })
        .unwrap();
        assert!(target.is_dir());

        // Idempotent.
        cmd_ensure_dir(EnsureDirArgs { dir: target }).unwrap();
    }

    #[test]
    fn ensure_dir_fails_on_file_collision() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("occupied");
        std::fs::write(&file, "x").unwrap();

        let result = cmd_ensure_dir(EnsureDirArgs { dir: file });
        assert!(result.is_err());
    }
}
