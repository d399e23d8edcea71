//! Shell identity detection.
//!
//! Shell identity is detected from the controlling environment, not assumed
//! from the OS: on Windows a PowerShell module path distinguishes PowerShell
//! from CMD, and on Unix the `SHELL` variable names the login shell. A
//! configured override always wins, so the probe can be pointed at a specific
//! shell dialect.

use crate::config::Config;
use serde::Serialize;
use std::process::Command;

/// Number of distinct shell dialects in the catalogs.
pub const SHELL_COUNT: usize = 5;

/// Shell dialect the probe tests against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellKind {
    Bash,
    Zsh,
    Sh,
    PowerShell,
    Cmd,
}

impl ShellKind {
    /// Index into per-shell catalog tables.
    pub(crate) fn index(self) -> usize {
        match self {
            ShellKind::Bash => 0,
            ShellKind::Zsh => 1,
            ShellKind::Sh => 2,
            ShellKind::PowerShell => 3,
            ShellKind::Cmd => 4,
        }
    }

    /// Parse a shell name, as found in `$SHELL` or a config override.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bash" => Some(ShellKind::Bash),
            "zsh" => Some(ShellKind::Zsh),
            "sh" | "dash" | "ash" => Some(ShellKind::Sh),
            "powershell" | "pwsh" => Some(ShellKind::PowerShell),
            "cmd" => Some(ShellKind::Cmd),
            _ => None,
        }
    }

    /// Command that runs a test string under this shell.
    pub fn invocation(self, test: &str) -> Command {
        match self {
            ShellKind::Bash => {
                let mut cmd = Command::new("bash");
                cmd.args(["-c", test]);
                cmd
            }
            ShellKind::Zsh => {
                let mut cmd = Command::new("zsh");
                cmd.args(["-c", test]);
                cmd
            }
            ShellKind::Sh => {
                let mut cmd = Command::new("sh");
                cmd.args(["-c", test]);
                cmd
            }
            ShellKind::PowerShell => {
                let mut cmd = Command::new(if which_exists("pwsh") {
                    "pwsh"
                } else {
                    "powershell"
                });
                cmd.args(["-NoProfile", "-Command", test]);
                cmd
            }
            ShellKind::Cmd => {
                let mut cmd = Command::new("cmd");
                cmd.args(["/C", test]);
                cmd
            }
        }
    }
}

impl std::fmt::Display for ShellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellKind::Bash => write!(f, "bash"),
            ShellKind::Zsh => write!(f, "zsh"),
            ShellKind::Sh => write!(f, "sh"),
            ShellKind::PowerShell => write!(f, "powershell"),
            ShellKind::Cmd => write!(f, "cmd"),
        }
    }
}

/// Detected shell dialect plus where it lives.
#[derive(Debug, Clone, Serialize)]
pub struct ShellInfo {
    pub kind: ShellKind,
    /// Path of the shell binary, when known.
    pub path: String,
}

impl ShellInfo {
    /// Detect the controlling shell, honoring a configured override.
    pub fn detect(config: &Config) -> Self {
        if let Some(name) = &config.shell
            && let Some(kind) = ShellKind::from_name(name)
        {
            return Self {
                kind,
                path: name.clone(),
            };
        }
        Self::detect_native()
    }

    #[cfg(windows)]
    fn detect_native() -> Self {
        let psmodulepath = std::env::var("PSModulePath").unwrap_or_default();
        if psmodulepath.contains("PowerShell") {
            return Self {
                kind: ShellKind::PowerShell,
                path: "powershell".to_string(),
            };
        }
        Self {
            kind: ShellKind::Cmd,
            path: std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string()),
        }
    }

    #[cfg(not(windows))]
    fn detect_native() -> Self {
        let shell_path = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        let name = std::path::Path::new(&shell_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Unknown shells (fish, etc.) are probed with bash syntax.
        let kind = ShellKind::from_name(&name).unwrap_or(ShellKind::Bash);
        Self {
            kind,
            path: shell_path,
        }
    }
}

fn which_exists(program: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(program).is_file())
}
