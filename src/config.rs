//! Configuration loading for runlet.
//!
//! Configuration is read from `.env` files and the process environment, never
//! written. Two files are consulted:
//!
//! 1. User config: `$XDG_CONFIG_HOME/runlet/.env` (Unix) or
//!    `%APPDATA%\runlet\.env` (Windows) — loaded without overriding
//!    variables already present in the environment.
//! 2. Local `./.env` in the current working directory — loaded with
//!    override, so per-project settings win over user config.
//!
//! Recognized keys:
//! - `RUNLET_INTERPRETER`: interpreter command line (split shell-style)
//! - `RUNLET_OUTPUT_DIR`: default directory for auto-generated outputs
//! - `RUNLET_SHELL`: shell name override for the capability probe

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the interpreter command.
pub const ENV_INTERPRETER: &str = "RUNLET_INTERPRETER";

/// Environment variable naming the default output directory.
pub const ENV_OUTPUT_DIR: &str = "RUNLET_OUTPUT_DIR";

/// Environment variable overriding shell detection for the probe.
pub const ENV_SHELL_OVERRIDE: &str = "RUNLET_SHELL";

/// Read-only configuration snapshot for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Interpreter command line override (e.g. `"uv run python"`).
    pub interpreter: Option<String>,

    /// Default output directory for auto-generated run artifacts.
    pub output_dir: Option<PathBuf>,

    /// Shell name override for the capability probe.
    pub shell: Option<String>,
}

impl Config {
    /// Load `.env` files and snapshot the recognized variables.
    pub fn load() -> Self {
        if let Some(user_env) = user_env_path()
            && user_env.exists()
        {
            // User config never overrides variables the caller already set.
            let _ = dotenvy::from_path(&user_env);
        }

        let local_env = Path::new(".env");
        if local_env.exists() {
            // Local .env wins over user config.
            let _ = dotenvy::from_path_override(local_env);
        }

        Self::from_env()
    }

    /// Snapshot the current process environment without touching .env files.
    pub fn from_env() -> Self {
        Self {
            interpreter: env_nonempty(ENV_INTERPRETER),
            output_dir: env_nonempty(ENV_OUTPUT_DIR).map(PathBuf::from),
            shell: env_nonempty(ENV_SHELL_OVERRIDE),
        }
    }

    /// Resolve the interpreter command as (program, leading args).
    ///
    /// The configured command is split shell-style so multi-word commands
    /// like `uv run python` work. Without configuration the platform default
    /// is used.
    pub fn interpreter_command(&self) -> Vec<String> {
        if let Some(raw) = &self.interpreter
            && let Ok(words) = shell_words::split(raw)
            && !words.is_empty()
        {
            return words;
        }
        vec![default_interpreter().to_string()]
    }

    /// Whether the interpreter came from configuration rather than defaults.
    pub fn has_interpreter_override(&self) -> bool {
        self.interpreter.is_some()
    }
}

/// Platform-default interpreter program name.
pub fn default_interpreter() -> &'static str {
    if cfg!(windows) { "python" } else { "python3" }
}

/// Fallback interpreter tried when the default fails to spawn.
pub fn fallback_interpreter() -> &'static str {
    "python"
}

/// Path to the user-level config `.env`, if a config root can be determined.
pub fn user_env_path() -> Option<PathBuf> {
    let root = if cfg!(windows) {
        env::var_os("APPDATA").map(PathBuf::from)?
    } else {
        match env::var_os("XDG_CONFIG_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(env::var_os("HOME")?).join(".config"),
        }
    };
    Some(root.join("runlet").join(".env"))
}

fn env_nonempty(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_vars() {
        unsafe {
            env::remove_var(ENV_INTERPRETER);
            env::remove_var(ENV_OUTPUT_DIR);
            env::remove_var(ENV_SHELL_OVERRIDE);
        }
    }

    #[test]
    #[serial]
    fn from_env_reads_recognized_keys() {
        clear_vars();
        unsafe {
            env::set_var(ENV_INTERPRETER, "uv run python");
            env::set_var(ENV_OUTPUT_DIR, "/tmp/runlet-out");
            env::set_var(ENV_SHELL_OVERRIDE, "zsh");
        }

        let config = Config::from_env();
        assert_eq!(config.interpreter.as_deref(), Some("uv run python"));
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/runlet-out")));
        assert_eq!(config.shell.as_deref(), Some("zsh"));

        clear_vars();
    }

    #[test]
    #[serial]
    fn from_env_treats_empty_as_unset() {
        clear_vars();
        unsafe {
            env::set_var(ENV_INTERPRETER, "  ");
        }

        let config = Config::from_env();
        assert!(config.interpreter.is_none());

        clear_vars();
    }

    #[test]
    #[serial]
    fn interpreter_command_splits_shell_style() {
        clear_vars();
        let config = Config {
            interpreter: Some("uv run python".to_string()),
            ..Default::default()
        };
        let cmd = config.interpreter_command();
        assert_eq!(cmd, vec!["uv", "run", "python"]);
    }

    #[test]
    #[serial]
    fn interpreter_command_defaults_when_unset() {
        clear_vars();
        let config = Config::default();
        let cmd = config.interpreter_command();
        assert_eq!(cmd, vec![default_interpreter().to_string()]);
        assert!(!config.has_interpreter_override());
    }

    #[test]
    fn user_env_path_ends_with_runlet_env() {
        if let Some(path) = user_env_path() {
            assert!(path.ends_with(Path::new("runlet").join(".env")));
        }
    }
}
