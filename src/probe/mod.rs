//! Environment capability probe.
//!
//! Answers "what does this machine actually support" by empirically running
//! short test commands instead of assuming from the OS name. The probe is
//! read-only and idempotent: every invocation recomputes a fresh snapshot
//! from fixed catalogs, and nothing is cached between invocations.

pub mod commands;
pub mod display;
pub mod shell;
pub mod syntax;

use crate::config::Config;
use serde::Serialize;

pub use commands::{CommandEntry, detect_commands};
pub use shell::{ShellInfo, ShellKind};
pub use syntax::{CapabilityEntry, detect_shell_syntax};

/// Which report sections to compute.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSections {
    pub system: bool,
    pub syntax: bool,
    pub commands: bool,
}

impl Default for ProbeSections {
    fn default() -> Self {
        Self {
            system: true,
            syntax: true,
            commands: true,
        }
    }
}

/// Immutable snapshot of the probed environment.
///
/// Computed once per probe invocation and handed to consumers as a value;
/// there is no ambient "current environment" state to go stale.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentReport {
    /// OS family name (`linux`, `macos`, `windows`, ...).
    pub os: String,
    /// CPU architecture.
    pub arch: String,
    /// Host name.
    pub host: String,
    /// Detected (or overridden) shell.
    pub shell: ShellInfo,
    /// This binary's version.
    pub runlet_version: String,
    /// Syntax pattern support, in catalog order. Empty if not requested.
    pub syntax: Vec<CapabilityEntry>,
    /// Command availability, in catalog order. Empty if not requested.
    pub commands: Vec<CommandEntry>,
}

impl EnvironmentReport {
    /// Probe the live environment.
    pub fn collect(config: &Config, sections: ProbeSections) -> Self {
        let shell = ShellInfo::detect(config);

        let syntax = if sections.syntax {
            detect_shell_syntax(shell.kind)
        } else {
            Vec::new()
        };
        let commands = if sections.commands {
            detect_commands()
        } else {
            Vec::new()
        };

        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            host: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            shell,
            runlet_version: env!("CARGO_PKG_VERSION").to_string(),
            syntax,
            commands,
        }
    }
}
