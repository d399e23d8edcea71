//! CLI argument parsing for runlet.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Runlet: run scripts with timeout enforcement and structured results.
///
/// Executes a code payload (inline, file, or base64), streams its output to
/// a log file, and reports facts — paths, sizes, exit codes — instead of raw
/// output, so results stay small and auditable.
#[derive(Parser, Debug)]
#[command(name = "runlet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for runlet.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a code payload.
    ///
    /// Exactly one payload source is required: --code, --file, or --base64.
    /// The run's stdout/stderr goes to a log file; the console gets a short
    /// summary with paths and sizes.
    Run(RunArgs),

    /// Probe the environment for shell syntax and command availability.
    ///
    /// Empirically tests a fixed catalog of syntax patterns and external
    /// commands against the live machine. With no section flags, all
    /// sections are reported.
    Probe(ProbeArgs),

    /// Create a directory (and parents) and print its absolute path.
    EnsureDir(EnsureDirArgs),
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
#[command(group = ArgGroup::new("payload").required(true).args(["code", "file", "base64"]))]
pub struct RunArgs {
    /// Inline code to execute.
    #[arg(short, long)]
    pub code: Option<String>,

    /// Path to a script file to execute.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Base64-encoded code to execute (asks for confirmation).
    #[arg(short, long)]
    pub base64: Option<String>,

    /// Timeout in seconds; the process tree is killed on expiry.
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// Working directory for the script.
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Structured input file exposed to the script.
    #[arg(short, long)]
    pub input_path: Option<PathBuf>,

    /// Explicit manifest path (defaults next to the log).
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// Directory for auto-generated run artifacts.
    #[arg(short = 'd', long)]
    pub output_dir: Option<PathBuf>,

    /// Allow top-level await by wrapping the code in an async main.
    #[arg(short = 'a', long = "async")]
    pub async_mode: bool,

    /// (Deprecated) Not allowed with --base64; kept for compatibility.
    #[arg(short, long)]
    pub yes: bool,

    /// Arguments passed through to the script.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub script_args: Vec<String>,
}

/// Arguments for the `probe` command.
#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Report only the system section.
    #[arg(long)]
    pub system: bool,

    /// Report only shell syntax support.
    #[arg(long)]
    pub syntax: bool,

    /// Report only command availability.
    #[arg(long)]
    pub commands: bool,

    /// Emit the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Probe this shell dialect instead of the detected one.
    #[arg(long)]
    pub shell: Option<String>,
}

/// Arguments for the `ensure-dir` command.
#[derive(Parser, Debug)]
pub struct EnsureDirArgs {
    /// Directory to create.
    #[arg(short, long, default_value = "temp")]
    pub dir: PathBuf,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_with_inline_code() {
        let cli = Cli::try_parse_from(["runlet", "run", "-c", "print(1)"]).unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.code.as_deref(), Some("print(1)"));
                assert!(args.file.is_none());
                assert!(args.base64.is_none());
                assert!(args.timeout.is_none());
                assert!(!args.async_mode);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn run_with_file_and_options() {
        let cli = Cli::try_parse_from([
            "runlet",
            "run",
            "--file",
            "job.py",
            "--timeout",
            "30",
            "--cwd",
            "/work",
            "--input-path",
            "in.json",
            "--output-dir",
            "out",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.file, Some(PathBuf::from("job.py")));
                assert_eq!(args.timeout, Some(30.0));
                assert_eq!(args.cwd, Some(PathBuf::from("/work")));
                assert_eq!(args.input_path, Some(PathBuf::from("in.json")));
                assert_eq!(args.output_dir, Some(PathBuf::from("out")));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn run_requires_exactly_one_payload() {
        assert!(Cli::try_parse_from(["runlet", "run"]).is_err());
        assert!(Cli::try_parse_from(["runlet", "run", "-c", "x", "-f", "job.py"]).is_err());
        assert!(Cli::try_parse_from(["runlet", "run", "-c", "x", "-b", "eA=="]).is_err());
    }

    #[test]
    fn run_with_base64_and_yes() {
        let cli = Cli::try_parse_from(["runlet", "run", "-b", "cHJpbnQoMSk=", "--yes"]).unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.base64.as_deref(), Some("cHJpbnQoMSk="));
                assert!(args.yes);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn run_async_flag() {
        let cli = Cli::try_parse_from(["runlet", "run", "-c", "await f()", "--async"]).unwrap();
        match cli.command {
            Command::Run(args) => assert!(args.async_mode),
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn run_collects_trailing_script_args() {
        let cli =
            Cli::try_parse_from(["runlet", "run", "-f", "job.py", "alpha", "--beta", "-x"])
                .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.script_args, vec!["alpha", "--beta", "-x"]);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn probe_defaults_to_no_section_flags() {
        let cli = Cli::try_parse_from(["runlet", "probe"]).unwrap();
        match cli.command {
            Command::Probe(args) => {
                assert!(!args.system);
                assert!(!args.syntax);
                assert!(!args.commands);
                assert!(!args.json);
                assert!(args.shell.is_none());
            }
            _ => panic!("expected probe command"),
        }
    }

    #[test]
    fn probe_with_sections_and_json() {
        let cli =
            Cli::try_parse_from(["runlet", "probe", "--syntax", "--json", "--shell", "zsh"])
                .unwrap();
        match cli.command {
            Command::Probe(args) => {
                assert!(args.syntax);
                assert!(!args.commands);
                assert!(args.json);
                assert_eq!(args.shell.as_deref(), Some("zsh"));
            }
            _ => panic!("expected probe command"),
        }
    }

    #[test]
    fn ensure_dir_defaults_to_temp() {
        let cli = Cli::try_parse_from(["runlet", "ensure-dir"]).unwrap();
        match cli.command {
            Command::EnsureDir(args) => {
                assert_eq!(args.dir, PathBuf::from("temp"));
            }
            _ => panic!("expected ensure-dir command"),
        }

        let cli = Cli::try_parse_from(["runlet", "ensure-dir", "--dir", "out/data"]).unwrap();
        match cli.command {
            Command::EnsureDir(args) => {
                assert_eq!(args.dir, PathBuf::from("out/data"));
            }
            _ => panic!("expected ensure-dir command"),
        }
    }

    #[test]
    fn unknown_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["runlet", "frobnicate"]).is_err());
    }
}
