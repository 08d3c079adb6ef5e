//! Argument parsing and subcommand dispatch.

use crate::commands;
use crate::logging::{LogConfig, LogFormat};
use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exit code when validation finds issues
pub const EXIT_ISSUES: i32 = 1;

/// Exit code for usage, I/O and decode errors
pub const EXIT_ERROR: i32 = 2;

/// The `sia` command tree
#[must_use]
pub fn build() -> Command {
    Command::new("sia")
        .version(crate::VERSION)
        .about("SIA report state engine: replay, numbering and validation")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .default_value("pretty")
                .value_parser(LogFormat::NAMES)
                .global(true)
                .help("Log output format"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Store configuration (TOML): section order and validation rules"),
        )
        .subcommand(
            Command::new("replay")
                .about("Apply a command log to a snapshot")
                .arg(
                    Arg::new("commands")
                        .long("commands")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Command log: JSON array or one command per line"),
                )
                .arg(
                    Arg::new("snapshot")
                        .long("snapshot")
                        .value_parser(value_parser!(PathBuf))
                        .help("Starting snapshot; empty report when omitted"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Where to write the resulting snapshot; stdout when omitted"),
                )
                .arg(
                    Arg::new("atomic")
                        .long("atomic")
                        .action(ArgAction::SetTrue)
                        .help("Apply the whole log as one batch"),
                ),
        )
        .subcommand(
            Command::new("numbering")
                .about("Print global figure and table numbers of a content tree")
                .arg(
                    Arg::new("content")
                        .long("content")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Section-content tree (JSON)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check table references against the registries")
                .arg(
                    Arg::new("snapshot")
                        .long("snapshot")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Snapshot to check (JSON)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

/// Logging settings from the global flags
#[must_use]
pub fn log_config(matches: &ArgMatches) -> LogConfig {
    let matches = leaf(matches);
    let format = matches
        .get_one::<String>("log-format")
        .and_then(|name| name.parse().ok())
        .unwrap_or_default();
    LogConfig::from_verbosity(matches.get_count("verbose")).with_format(format)
}

/// Run the selected subcommand, writing results to `out`; returns the exit code
///
/// # Errors
/// Returns error if an input cannot be read or decoded, or output fails.
pub fn run(matches: &ArgMatches, out: &mut impl Write) -> Result<i32> {
    let config_path = leaf(matches).get_one::<PathBuf>("config");
    let config = commands::load_config(config_path.map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("replay", args)) => {
            let snapshot = args
                .get_one::<PathBuf>("snapshot")
                .map(|path| commands::read_snapshot(path))
                .transpose()?;
            let entries = commands::read_command_log(required(args, "commands")?)?;
            let store = commands::project_store(snapshot, config);
            let summary = commands::replay(&store, entries, args.get_flag("atomic"))?;
            let output = args.get_one::<PathBuf>("output");
            commands::write_json(out, &*store.get_snapshot(), output.map(PathBuf::as_path))?;
            if output.is_some() {
                commands::write_json(out, &summary, None)?;
            }
            Ok(0)
        }
        Some(("numbering", args)) => {
            let tree = commands::read_content_tree(required(args, "content")?)?;
            let items = commands::numbering(tree, config);
            if args.get_flag("json") {
                commands::write_json(out, &items, None)?;
            } else {
                commands::print_numbering(out, &items)?;
            }
            Ok(0)
        }
        Some(("validate", args)) => {
            let snapshot = commands::read_snapshot(required(args, "snapshot")?)?;
            let issues = commands::validate(snapshot, config);
            if args.get_flag("json") {
                commands::write_json(out, &issues, None)?;
            } else {
                commands::print_issues(out, &issues)?;
            }
            Ok(if issues.is_empty() { 0 } else { EXIT_ISSUES })
        }
        _ => Ok(EXIT_ERROR),
    }
}

// Globals are always visible on the innermost matches.
fn leaf(matches: &ArgMatches) -> &ArgMatches {
    matches.subcommand().map_or(matches, |(_, sub)| sub)
}

fn required<'a>(args: &'a ArgMatches, id: &str) -> Result<&'a Path> {
    args.get_one::<PathBuf>(id)
        .map(PathBuf::as_path)
        .with_context(|| format!("missing --{id}"))
}
