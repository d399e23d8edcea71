//! External command availability catalog and detection.
//!
//! Availability is established empirically: a command is available when one
//! of its version flags runs and exits zero within the deadline. A non-zero
//! exit or spawn failure marks the entry unavailable with an empty version;
//! either way the probe carries on with the next entry. Version strings are
//! extracted verbatim (first `x.y` or `x.y.z` on the first output line),
//! never parsed into components.

use crate::process;
use regex::Regex;
use serde::Serialize;
use std::process::Command;
use std::time::Duration;

/// Hard deadline for a single version query.
const COMMAND_TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Version flags tried in order; different tools answer to different ones.
const VERSION_FLAGS: &[&str] = &["--version", "-version", "-v", "version"];

/// Known external tools grouped by category. Flattened (order-preserving,
/// name-unique) for probing; the grouping only drives documentation.
pub const COMMAND_CATALOG: &[(&str, &[&str])] = &[
    ("vcs", &["git", "svn", "hg"]),
    (
        "pkg_lang",
        &[
            "npm", "npx", "yarn", "pnpm", "pip", "uv", "pipx", "conda", "poetry", "pipenv",
            "cargo", "rustup", "go", "composer", "gem", "bundle", "maven", "gradle", "nuget",
        ],
    ),
    (
        "pkg_system",
        &[
            "brew", "apt", "apt-get", "dpkg", "yum", "dnf", "rpm", "pacman", "choco", "scoop",
            "winget",
        ],
    ),
    (
        "cloud",
        &[
            "docker", "podman", "kubectl", "helm", "terraform", "aws", "az", "gcloud",
        ],
    ),
    (
        "languages",
        &[
            "python", "python3", "py", "node", "java", "javac", "go", "rustc", "ruby", "php",
            "perl", "dotnet",
        ],
    ),
    (
        "python_tools",
        &["pytest", "tox", "ruff", "black", "isort", "mypy"],
    ),
    (
        "build",
        &[
            "make", "cmake", "ninja", "msbuild", "gcc", "g++", "clang", "clang++",
        ],
    ),
    (
        "network",
        &[
            "curl", "wget", "ssh", "scp", "rsync", "nc", "netcat", "ping", "traceroute", "nmap",
        ],
    ),
    (
        "database",
        &["mysql", "psql", "sqlite3", "mongosh", "mongo", "redis-cli"],
    ),
    (
        "text",
        &[
            "grep", "sed", "awk", "jq", "yq", "rg", "fd", "cat", "head", "tail", "sort", "uniq",
            "wc",
        ],
    ),
    (
        "file",
        &["tar", "zip", "unzip", "7z", "7za", "gzip", "gunzip", "xz"],
    ),
    ("editors", &["code", "vim", "nvim", "nano", "emacs"]),
    (
        "utils",
        &[
            "pwsh", "powershell", "ffmpeg", "convert", "pandoc", "gh", "htop", "top", "tree",
            "watch", "xargs", "find", "which", "whereis",
        ],
    ),
];

/// Catalog flattened into a name-unique list, preserving first-seen order.
pub fn catalog_commands() -> Vec<&'static str> {
    let mut names = Vec::new();
    for (_, commands) in COMMAND_CATALOG {
        for name in *commands {
            if !names.contains(name) {
                names.push(*name);
            }
        }
    }
    names
}

/// Availability of one external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandEntry {
    pub name: String,
    pub available: bool,
    /// Verbatim version number, empty when none was found.
    pub version: String,
}

/// Probe every catalog command, in catalog order.
///
/// The final entry is always this binary itself: it is running, so it is
/// available even when not discoverable on PATH.
pub fn detect_commands() -> Vec<CommandEntry> {
    // Only fails on a malformed literal.
    let version_re = Regex::new(r"\d+\.\d+(\.\d+)?").ok();

    let mut entries: Vec<CommandEntry> = catalog_commands()
        .into_iter()
        .map(|name| check_command(name, version_re.as_ref()))
        .collect();

    entries.push(CommandEntry {
        name: "runlet".to_string(),
        available: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    });
    entries
}

fn check_command(name: &str, version_re: Option<&Regex>) -> CommandEntry {
    for flag in VERSION_FLAGS {
        let mut command = Command::new(name);
        command.arg(flag);
        match process::run_captured(&mut command, COMMAND_TEST_TIMEOUT) {
            Ok(captured) if captured.is_success() => {
                return CommandEntry {
                    name: name.to_string(),
                    available: true,
                    version: extract_version(&captured.stdout, version_re),
                };
            }
            // Wrong flag for this tool; try the next one.
            Ok(_) => continue,
            // Not on PATH (or unexecutable): no point trying other flags.
            Err(_) => break,
        }
    }
    CommandEntry {
        name: name.to_string(),
        available: false,
        version: String::new(),
    }
}

/// First `x.y` or `x.y.z` on the first line of output, verbatim.
fn extract_version(stdout: &str, version_re: Option<&Regex>) -> String {
    let first_line = stdout.lines().next().unwrap_or("");
    version_re
        .and_then(|re| re.find(first_line))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_flattened_unique_and_large() {
        let names = catalog_commands();
        assert!(names.len() >= 100);

        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());

        // "go" appears in two categories; first occurrence wins.
        assert_eq!(names.iter().filter(|n| **n == "go").count(), 1);
        assert_eq!(names[0], "git");
    }

    #[test]
    fn extract_version_takes_first_match_on_first_line() {
        let re = Regex::new(r"\d+\.\d+(\.\d+)?").unwrap();
        assert_eq!(extract_version("git version 2.43.0", Some(&re)), "2.43.0");
        assert_eq!(extract_version("Python 3.12", Some(&re)), "3.12");
        assert_eq!(
            extract_version("tool 1.2.3\nother 9.9.9", Some(&re)),
            "1.2.3"
        );
        assert_eq!(extract_version("no digits here", Some(&re)), "");
        assert_eq!(extract_version("", Some(&re)), "");
    }

    #[test]
    fn missing_command_is_unavailable_not_an_error() {
        let re = Regex::new(r"\d+\.\d+(\.\d+)?").unwrap();
        let entry = check_command("runlet-definitely-not-a-real-binary", Some(&re));
        assert!(!entry.available);
        assert!(entry.version.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn tar_is_detected_with_a_version() {
        // tar ships on effectively every Unix and answers --version.
        let re = Regex::new(r"\d+\.\d+(\.\d+)?").unwrap();
        let entry = check_command("tar", Some(&re));
        assert!(entry.available);
    }

    #[test]
    fn report_always_includes_self() {
        let entries = detect_commands();
        let last = entries.last().unwrap();
        assert_eq!(last.name, "runlet");
        assert!(last.available);
        assert_eq!(last.version, env!("CARGO_PKG_VERSION"));
    }
}
