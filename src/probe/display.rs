//! Human-readable rendering of the environment report.

use crate::probe::{EnvironmentReport, ProbeSections};

/// Render the report sections that were requested.
pub fn render_report(report: &EnvironmentReport, sections: ProbeSections) -> String {
    let mut lines: Vec<String> = Vec::new();

    if sections.system {
        lines.push("=== System ===".to_string());
        lines.push(format!("OS: {} ({})", report.os, report.arch));
        lines.push(format!("Host: {}", report.host));
        lines.push(format!(
            "Shell: {} ({})",
            report.shell.kind, report.shell.path
        ));
        lines.push(format!("runlet: {}", report.runlet_version));
        lines.push(String::new());
    }

    if sections.syntax && !report.syntax.is_empty() {
        lines.push(format!("=== Shell Syntax ({}) ===", report.shell.kind));
        render_syntax_table(report, &mut lines);
        lines.push(String::new());
    }

    if sections.commands && !report.commands.is_empty() {
        lines.push("=== Available Commands ===".to_string());
        render_command_columns(report, &mut lines);
    }

    let mut out = lines.join("\n");
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

fn render_syntax_table(report: &EnvironmentReport, lines: &mut Vec<String>) {
    let label_width = report
        .syntax
        .iter()
        .map(|e| e.label.len())
        .max()
        .unwrap_or(0)
        .max(25);
    let syntax_width = report
        .syntax
        .iter()
        .map(|e| e.syntax.len())
        .max()
        .unwrap_or(0)
        .max(20);

    lines.push(format!(
        "  {:<label_width$} | {:<3} | {:<syntax_width$} | Alternative",
        "Pattern", "OK", "Syntax"
    ));
    lines.push(format!(
        "  {}-+-----+-{}-+-{}",
        "-".repeat(label_width),
        "-".repeat(syntax_width),
        "-".repeat(25)
    ));

    for entry in &report.syntax {
        let ok = if entry.supported { "yes" } else { "no" };
        lines.push(format!(
            "  {:<label_width$} | {:<3} | {:<syntax_width$} | {}",
            entry.label, ok, entry.syntax, entry.alternative
        ));
    }
}

fn render_command_columns(report: &EnvironmentReport, lines: &mut Vec<String>) {
    let items: Vec<String> = report
        .commands
        .iter()
        .map(|entry| {
            if entry.available {
                if entry.version.is_empty() {
                    format!("[x] {}", entry.name)
                } else {
                    format!("[x] {} ({})", entry.name, entry.version)
                }
            } else {
                format!("[ ] {}", entry.name)
            }
        })
        .collect();

    let col_width = items.iter().map(|i| i.len()).max().unwrap_or(18) + 2;
    for row in items.chunks(3) {
        let mut line = String::from("  ");
        for item in row {
            line.push_str(&format!("{:<col_width$}", item));
        }
        lines.push(line.trim_end().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::commands::CommandEntry;
    use crate::probe::shell::{ShellInfo, ShellKind};
    use crate::probe::syntax::CapabilityEntry;

    fn sample_report() -> EnvironmentReport {
        EnvironmentReport {
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            host: "box".to_string(),
            shell: ShellInfo {
                kind: ShellKind::Bash,
                path: "/bin/bash".to_string(),
            },
            runlet_version: "0.1.0".to_string(),
            syntax: vec![
                CapabilityEntry {
                    id: "pipe".to_string(),
                    label: "Pipe output to another command".to_string(),
                    syntax: "cmd1 | cmd2".to_string(),
                    supported: true,
                    alternative: "subprocess.PIPE".to_string(),
                },
                CapabilityEntry {
                    id: "here_string".to_string(),
                    label: "Multi-line string input".to_string(),
                    syntax: "<<< 'string'".to_string(),
                    supported: false,
                    alternative: "'''multi-line'''".to_string(),
                },
            ],
            commands: vec![
                CommandEntry {
                    name: "git".to_string(),
                    available: true,
                    version: "2.43.0".to_string(),
                },
                CommandEntry {
                    name: "hg".to_string(),
                    available: false,
                    version: String::new(),
                },
                CommandEntry {
                    name: "tar".to_string(),
                    available: true,
                    version: String::new(),
                },
                CommandEntry {
                    name: "jq".to_string(),
                    available: false,
                    version: String::new(),
                },
            ],
        }
    }

    #[test]
    fn renders_all_sections() {
        let out = render_report(&sample_report(), ProbeSections::default());
        assert!(out.contains("=== System ==="));
        assert!(out.contains("Shell: bash (/bin/bash)"));
        assert!(out.contains("=== Shell Syntax (bash) ==="));
        assert!(out.contains("subprocess.PIPE"));
        assert!(out.contains("=== Available Commands ==="));
        assert!(out.contains("[x] git (2.43.0)"));
        assert!(out.contains("[ ] hg"));
    }

    #[test]
    fn sections_can_be_disabled() {
        let sections = ProbeSections {
            system: false,
            syntax: true,
            commands: false,
        };
        let out = render_report(&sample_report(), sections);
        assert!(!out.contains("=== System ==="));
        assert!(out.contains("=== Shell Syntax"));
        assert!(!out.contains("=== Available Commands ==="));
    }

    #[test]
    fn supported_and_unsupported_rows_are_marked() {
        let out = render_report(&sample_report(), ProbeSections::default());
        let pipe_row = out
            .lines()
            .find(|l| l.contains("Pipe output"))
            .unwrap();
        assert!(pipe_row.contains("| yes"));
        let here_row = out
            .lines()
            .find(|l| l.contains("Multi-line string input"))
            .unwrap();
        assert!(here_row.contains("| no"));
    }

    #[test]
    fn commands_are_laid_out_three_per_row() {
        let out = render_report(&sample_report(), ProbeSections::default());
        let first_row = out.lines().find(|l| l.contains("git")).unwrap();
        assert!(first_row.contains("hg"));
        assert!(first_row.contains("tar"));
        assert!(!first_row.contains("jq"));
    }
}
