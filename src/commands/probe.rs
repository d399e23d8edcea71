//! Implementation of the `runlet probe` command.

use crate::cli::ProbeArgs;
use crate::config::Config;
use crate::error::{Result, RunletError};
use crate::probe::{EnvironmentReport, ProbeSections, display};

pub fn cmd_probe(args: ProbeArgs) -> Result<()> {
    let sections = sections_from(&args);

    let mut config = Config::load();
    if args.shell.is_some() {
        config.shell = args.shell.clone();
    }

    let report = EnvironmentReport::collect(&config, sections);

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| RunletError::UserError(format!("failed to serialize report: {}", e)))?;
        println!("{}", json);
    } else {
        println!("{}", display::render_report(&report, sections));
    }
    Ok(())
}

/// No section flags means everything; any flag narrows to just the named
/// sections.
fn sections_from(args: &ProbeArgs) -> ProbeSections {
    if !args.system && !args.syntax && !args.commands {
        return ProbeSections::default();
    }
    ProbeSections {
        system: args.system,
        syntax: args.syntax,
        commands: args.commands,
    }
}
