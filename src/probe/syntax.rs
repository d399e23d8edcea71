//! Shell syntax pattern catalog and dynamic testing.
//!
//! Each pattern carries a tiny, side-effect-free test command per shell
//! dialect. A test proves support by exiting zero AND printing the marker
//! token; an ambiguous result (clean exit, no marker) counts as unsupported,
//! because guidance built on this report must never claim syntax works when
//! it doesn't. A missing test (dialect can't express the pattern) or a spawn
//! failure likewise records unsupported and never aborts the probe.

use crate::probe::shell::{SHELL_COUNT, ShellKind};
use crate::process;
use serde::Serialize;
use std::time::Duration;

/// Marker token a passing test must print.
pub const MARKER: &str = "runlet-ok";

/// Hard deadline for a single syntax test.
const SYNTAX_TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// One catalog pattern. Tables are indexed by `ShellKind::index()`:
/// bash, zsh, sh, powershell, cmd.
pub struct SyntaxPattern {
    pub id: &'static str,
    pub label: &'static str,
    /// Equivalent idiom in the script runtime.
    pub alternative: &'static str,
    tests: [Option<&'static str>; SHELL_COUNT],
    syntax: [&'static str; SHELL_COUNT],
}

impl SyntaxPattern {
    pub fn test_for(&self, shell: ShellKind) -> Option<&'static str> {
        self.tests[shell.index()]
    }

    pub fn syntax_for(&self, shell: ShellKind) -> &'static str {
        self.syntax[shell.index()]
    }
}

/// Support status of one pattern, as reported to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityEntry {
    /// Stable pattern identifier.
    pub id: String,
    /// Human label.
    pub label: String,
    /// Example syntax for the probed shell.
    pub syntax: String,
    /// Whether the live test passed.
    pub supported: bool,
    /// Equivalent idiom in the script runtime.
    pub alternative: String,
}

/// The fixed, ordered syntax catalog. Order is part of the report contract.
pub const SYNTAX_CATALOG: &[SyntaxPattern] = &[
    SyntaxPattern {
        id: "variable",
        label: "Environment variable",
        alternative: "os.environ['VAR']",
        tests: [
            Some(r#"test -n "$PATH" && echo runlet-ok"#),
            Some(r#"test -n "$PATH" && echo runlet-ok"#),
            Some(r#"test -n "$PATH" && echo runlet-ok"#),
            Some("if ($env:PATH) { echo runlet-ok }"),
            Some("if defined PATH echo runlet-ok"),
        ],
        syntax: ["$VAR", "$VAR", "$VAR", "$env:VAR", "%VAR%"],
    },
    SyntaxPattern {
        id: "chaining_and",
        label: "Chain commands (on success)",
        alternative: "cmd1(); cmd2()",
        tests: [
            Some("true && echo runlet-ok"),
            Some("true && echo runlet-ok"),
            Some("true && echo runlet-ok"),
            Some("echo start > $null && echo runlet-ok"),
            Some("echo start > NUL && echo runlet-ok"),
        ],
        syntax: [
            "cmd1 && cmd2",
            "cmd1 && cmd2",
            "cmd1 && cmd2",
            "cmd1 && cmd2",
            "cmd1 && cmd2",
        ],
    },
    SyntaxPattern {
        id: "chaining_or",
        label: "Chain commands (on failure)",
        alternative: "try: cmd1() except: cmd2()",
        tests: [
            Some("false || echo runlet-ok"),
            Some("false || echo runlet-ok"),
            Some("false || echo runlet-ok"),
            Some("Get-ChildItem runlet-no-such-path 2> $null || echo runlet-ok"),
            Some("cmd /c exit 1 || echo runlet-ok"),
        ],
        syntax: [
            "cmd1 || cmd2",
            "cmd1 || cmd2",
            "cmd1 || cmd2",
            "cmd1 || cmd2",
            "cmd1 || cmd2",
        ],
    },
    SyntaxPattern {
        id: "chaining_seq",
        label: "Chain commands (always)",
        alternative: "cmd1(); cmd2()",
        tests: [
            Some("true; echo runlet-ok"),
            Some("true; echo runlet-ok"),
            Some("true; echo runlet-ok"),
            Some("echo start > $null; echo runlet-ok"),
            Some("echo start > NUL & echo runlet-ok"),
        ],
        syntax: [
            "cmd1; cmd2",
            "cmd1; cmd2",
            "cmd1; cmd2",
            "cmd1; cmd2",
            "cmd1 & cmd2",
        ],
    },
    SyntaxPattern {
        id: "pipe",
        label: "Pipe output to another command",
        alternative: "subprocess.PIPE",
        tests: [
            Some("echo runlet-ok | grep runlet-ok"),
            Some("echo runlet-ok | grep runlet-ok"),
            Some("echo runlet-ok | grep runlet-ok"),
            Some("echo runlet-ok | Select-String runlet-ok"),
            Some("echo runlet-ok | findstr runlet-ok"),
        ],
        syntax: [
            "cmd1 | cmd2",
            "cmd1 | cmd2",
            "cmd1 | cmd2",
            "cmd1 | cmd2",
            "cmd1 | cmd2",
        ],
    },
    SyntaxPattern {
        id: "redirect_stdout",
        label: "Redirect stdout to file",
        alternative: "open('f', 'w').write(...)",
        tests: [
            Some("echo discard > /dev/null && echo runlet-ok"),
            Some("echo discard > /dev/null && echo runlet-ok"),
            Some("echo discard > /dev/null && echo runlet-ok"),
            Some("echo discard > $null; echo runlet-ok"),
            Some("echo discard > NUL && echo runlet-ok"),
        ],
        syntax: ["> file", "> file", "> file", "> file", "> file"],
    },
    SyntaxPattern {
        id: "redirect_stderr",
        label: "Redirect stderr to file",
        alternative: "stderr=open('f', 'w')",
        tests: [
            Some("ls /nonexistent 2> /dev/null; echo runlet-ok"),
            Some("ls /nonexistent 2> /dev/null; echo runlet-ok"),
            Some("ls /nonexistent 2> /dev/null; echo runlet-ok"),
            Some("Write-Error oops 2> $null; echo runlet-ok"),
            Some("dir runlet-no-such-path 2> NUL & echo runlet-ok"),
        ],
        syntax: ["2> file", "2> file", "2> file", "2> file", "2> file"],
    },
    SyntaxPattern {
        id: "redirect_both",
        label: "Redirect stdout and stderr",
        alternative: "capture_output=True",
        tests: [
            Some("echo discard &> /dev/null && echo runlet-ok"),
            Some("echo discard &> /dev/null && echo runlet-ok"),
            Some("echo discard > /dev/null 2>&1 && echo runlet-ok"),
            Some("echo discard *> $null; echo runlet-ok"),
            Some("echo discard > NUL 2>&1 && echo runlet-ok"),
        ],
        syntax: ["&> file", "&> file", "> file 2>&1", "*> file", "> file 2>&1"],
    },
    SyntaxPattern {
        id: "append",
        label: "Append output to file",
        alternative: "open('f', 'a').write(...)",
        tests: [
            Some("echo discard >> /dev/null && echo runlet-ok"),
            Some("echo discard >> /dev/null && echo runlet-ok"),
            Some("echo discard >> /dev/null && echo runlet-ok"),
            Some("echo discard >> $null; echo runlet-ok"),
            Some("echo discard >> NUL && echo runlet-ok"),
        ],
        syntax: [">> file", ">> file", ">> file", ">> file", ">> file"],
    },
    SyntaxPattern {
        id: "glob_star",
        label: "Wildcard file matching (*)",
        alternative: "Path.glob('*.py')",
        tests: [
            Some("ls /* > /dev/null 2>&1 && echo runlet-ok"),
            Some("ls /* > /dev/null 2>&1 && echo runlet-ok"),
            Some("ls /* > /dev/null 2>&1 && echo runlet-ok"),
            Some("Get-ChildItem * -ErrorAction SilentlyContinue > $null; echo runlet-ok"),
            Some("dir /b * > NUL 2>&1 & echo runlet-ok"),
        ],
        syntax: [
            "*.ext",
            "*.ext",
            "*.ext",
            "*.ext",
            "*.ext",
        ],
    },
    SyntaxPattern {
        id: "glob_recursive",
        label: "Recursive wildcard (**)",
        alternative: "Path.rglob('*.py')",
        tests: [
            Some("shopt -s globstar && echo runlet-ok"),
            Some("print /dev/**/null > /dev/null 2>&1 && echo runlet-ok"),
            None,
            Some("Get-ChildItem -Recurse $PSHOME -ErrorAction SilentlyContinue > $null; echo runlet-ok"),
            Some("dir /s /b %TEMP% > NUL 2>&1 & echo runlet-ok"),
        ],
        syntax: [
            "**/*.ext",
            "**/*.ext",
            "N/A",
            "Get-ChildItem -Recurse",
            "dir /s",
        ],
    },
    SyntaxPattern {
        id: "command_subst",
        label: "Capture command output inline",
        alternative: "subprocess.check_output()",
        tests: [
            Some(r#"echo "$(echo runlet-ok)""#),
            Some(r#"echo "$(echo runlet-ok)""#),
            Some(r#"echo "$(echo runlet-ok)""#),
            Some(r#"echo "$(echo runlet-ok)""#),
            Some("for /f %i in ('echo runlet-ok') do @echo %i"),
        ],
        syntax: [
            "$(cmd)",
            "$(cmd)",
            "$(cmd)",
            "$(cmd)",
            "for /f %i in ('cmd') do",
        ],
    },
    SyntaxPattern {
        id: "arithmetic",
        label: "Arithmetic expansion",
        alternative: "1 + 1",
        tests: [
            Some(r#"test "$((1+1))" = "2" && echo runlet-ok"#),
            Some(r#"test "$((1+1))" = "2" && echo runlet-ok"#),
            Some(r#"test "$((1+1))" = "2" && echo runlet-ok"#),
            Some("if ((1+1) -eq 2) { echo runlet-ok }"),
            Some("set /a 1+1 > NUL 2>&1 && echo runlet-ok"),
        ],
        syntax: ["$((expr))", "$((expr))", "$((expr))", "$(1+1)", "set /a expr"],
    },
    SyntaxPattern {
        id: "exit_code",
        label: "Check last exit code",
        alternative: "result.returncode",
        tests: [
            Some(r#"true; test "$?" = "0" && echo runlet-ok"#),
            Some(r#"true; test "$?" = "0" && echo runlet-ok"#),
            Some(r#"true; test "$?" = "0" && echo runlet-ok"#),
            Some("echo start > $null; if ($?) { echo runlet-ok }"),
            Some("cmd /c exit 0 & if %ERRORLEVEL%==0 echo runlet-ok"),
        ],
        syntax: ["$?", "$?", "$?", "$LASTEXITCODE", "%ERRORLEVEL%"],
    },
    SyntaxPattern {
        id: "background",
        label: "Run command in background",
        alternative: "subprocess.Popen() or --async",
        tests: [
            Some("echo runlet-ok & wait"),
            Some("echo runlet-ok & wait"),
            Some("echo runlet-ok & wait"),
            Some("if (Get-Command Start-Process -ErrorAction SilentlyContinue) { echo runlet-ok }"),
            Some(r#"start /b cmd /c "echo discard" > NUL 2>&1 && echo runlet-ok"#),
        ],
        syntax: ["cmd &", "cmd &", "cmd &", "Start-Process", "start /b"],
    },
    SyntaxPattern {
        id: "test_file",
        label: "Test if file exists",
        alternative: "Path('f').exists()",
        tests: [
            Some("test -f /bin/sh && echo runlet-ok"),
            Some("test -f /bin/sh && echo runlet-ok"),
            Some("test -f /bin/sh && echo runlet-ok"),
            Some("if (Test-Path $PSHOME) { echo runlet-ok }"),
            Some("if exist %COMSPEC% echo runlet-ok"),
        ],
        syntax: [
            "test -f file",
            "test -f file",
            "test -f file",
            "Test-Path file",
            "if exist file",
        ],
    },
    SyntaxPattern {
        id: "test_dir",
        label: "Test if directory exists",
        alternative: "Path('d').is_dir()",
        tests: [
            Some("test -d /tmp && echo runlet-ok"),
            Some("test -d /tmp && echo runlet-ok"),
            Some("test -d /tmp && echo runlet-ok"),
            Some("if (Test-Path $PSHOME -PathType Container) { echo runlet-ok }"),
            Some(r#"if exist %TEMP%\NUL echo runlet-ok"#),
        ],
        syntax: [
            "test -d dir",
            "test -d dir",
            "test -d dir",
            "Test-Path -PathType Container",
            r#"if exist dir\NUL"#,
        ],
    },
    SyntaxPattern {
        id: "string_interp",
        label: "Variable in string",
        alternative: "f'hello {var}'",
        tests: [
            Some(r#"x=runlet; echo "${x}-ok""#),
            Some(r#"x=runlet; echo "${x}-ok""#),
            Some(r#"x=runlet; echo "${x}-ok""#),
            Some(r#"$x='runlet'; echo "$x-ok""#),
            Some(r#"cmd /v:on /c "set x=runlet& echo !x!-ok""#),
        ],
        syntax: [
            r#""hello $var""#,
            r#""hello $var""#,
            r#""hello $var""#,
            r#""hello $var""#,
            r#""hello %var%""#,
        ],
    },
    SyntaxPattern {
        id: "here_string",
        label: "Multi-line string input",
        alternative: "'''multi-line'''",
        tests: [
            Some("cat <<< runlet-ok"),
            Some("cat <<< runlet-ok"),
            None,
            Some("@'\nrunlet-ok\n'@"),
            None,
        ],
        syntax: [
            "<<< 'string' or <<EOF",
            "<<< 'string' or <<EOF",
            "N/A",
            "@'...'@",
            "N/A",
        ],
    },
    SyntaxPattern {
        id: "null_device",
        label: "Discard output (null device)",
        alternative: "subprocess.DEVNULL",
        tests: [
            Some("echo discard > /dev/null && echo runlet-ok"),
            Some("echo discard > /dev/null && echo runlet-ok"),
            Some("echo discard > /dev/null && echo runlet-ok"),
            Some("echo discard > $null; echo runlet-ok"),
            Some("echo discard > NUL && echo runlet-ok"),
        ],
        syntax: ["/dev/null", "/dev/null", "/dev/null", "$null", "NUL"],
    },
];

/// Test every catalog pattern against the given shell, in catalog order.
pub fn detect_shell_syntax(shell: ShellKind) -> Vec<CapabilityEntry> {
    SYNTAX_CATALOG
        .iter()
        .map(|pattern| CapabilityEntry {
            id: pattern.id.to_string(),
            label: pattern.label.to_string(),
            syntax: pattern.syntax_for(shell).to_string(),
            supported: test_pattern(pattern, shell),
            alternative: pattern.alternative.to_string(),
        })
        .collect()
}

fn test_pattern(pattern: &SyntaxPattern, shell: ShellKind) -> bool {
    let Some(test) = pattern.test_for(shell) else {
        return false;
    };
    let mut command = shell.invocation(test);
    match process::run_captured(&mut command, SYNTAX_TEST_TIMEOUT) {
        Ok(captured) => passed(&captured),
        // Spawn failure (shell binary missing) is unsupported, never fatal.
        Err(_) => false,
    }
}

/// A test passes only on clean exit with the marker present; a clean exit
/// without the marker is unsupported.
fn passed(captured: &process::Captured) -> bool {
    captured.is_success() && captured.stdout.contains(MARKER)
}
