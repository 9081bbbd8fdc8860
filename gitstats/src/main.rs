//! # gitstats
//!
//! A CLI tool that answers "who wrote this code, and when?" for git
//! repositories.
//!
//! ## Overview
//!
//! gitstats is built on top of gitstatslib. Every tracked file with a known
//! language is blamed at HEAD, each line is classified as code, comment or
//! empty, and the result is rolled up by author, language, month or file.
//!
//! ## Features
//!
//! - **Multi-language**: comment syntax for about sixty file types
//! - **Parallel blame**: one worker per CPU by default (`--threads`)
//! - **Author aliases**: merge logins with `--author login=Name`
//! - **Ignore revisions**: drop bulk reformatting commits with `--ignore-rev`
//! - **Snapshots**: save to CSV and merge snapshots of several repositories
//!
//! ## Usage
//!
//! ```bash
//! # Lines per author in the current repository
//! gitstats
//!
//! # Lines per language, skipping vendored code
//! gitstats --by language --exclude-path vendor
//!
//! # Save a snapshot, then merge snapshots of two repositories
//! gitstats ../api --output api.csv
//! gitstats api.csv web.csv --by month
//!
//! # JSON output
//! gitstats --output json
//! ```

mod render;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console::Term;
use gitstatslib::columns::{self, AUTHOR, MONTH};
use gitstatslib::table::snapshot::{save_csv, SaveMode};
use gitstatslib::{collect_all, MemoryTable, Ordering, Progress, Report, StatsOptions, Summary};
use serde::Serialize;

/// JSON output document
#[derive(Debug, Serialize)]
struct JsonOutput {
    summary: Summary,
    report: Report,
    months: Vec<(String, f64)>,
}

/// Where a result is written
#[derive(Debug, Clone, PartialEq)]
enum OutputTarget {
    Console,
    Json,
    Csv(PathBuf),
}

impl OutputTarget {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_lowercase().as_str() {
            "console" | "table" => Ok(OutputTarget::Console),
            "json" => Ok(OutputTarget::Json),
            lower if lower.ends_with(".csv") => Ok(OutputTarget::Csv(PathBuf::from(value))),
            _ => bail!(
                "Unknown output '{}': expected console, json or a .csv file",
                value
            ),
        }
    }
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("gitstats")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Line statistics from git blame: who wrote what, in which language, and when")
        .arg(
            Arg::new("paths")
                .help("Repositories or CSV snapshots to analyze")
                .num_args(1..)
                .default_value("."),
        )
        .arg(
            Arg::new("by")
                .long("by")
                .short('b')
                .help("Dimension to report on")
                .value_parser(["author", "language", "month", "file"])
                .default_value("author"),
        )
        .arg(
            Arg::new("sort")
                .long("sort")
                .short('s')
                .help("Sort rows by total lines or by label")
                .value_parser(["total", "label"])
                .default_value("total"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output: console, json, or a .csv file to save a snapshot to (can be repeated)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('t')
                .help("Number of blame workers (0 = automatic)")
                .value_parser(value_parser!(usize))
                .default_value("0"),
        )
        .arg(
            Arg::new("ignore-rev")
                .long("ignore-rev")
                .short('i')
                .help("Drop lines last changed by this revision (can be repeated)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("author")
                .long("author")
                .short('a')
                .help("Rename an author, as login=Full Name (can be repeated)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("exclude-path")
                .long("exclude-path")
                .short('e')
                .help("Exclude a directory or glob pattern (can be repeated)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .help("Only count files matching this glob pattern (can be repeated)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("add-language")
                .long("add-language")
                .help("Map an extension to a language, as ext=Language (can be repeated)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("cache-dir")
                .long("cache-dir")
                .help("Cache results per HEAD commit in this directory")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Do not report progress")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log verbosity (-v info, -vv debug)")
                .action(ArgAction::Count),
        )
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn strings<'a>(matches: &'a ArgMatches, id: &str) -> impl Iterator<Item = &'a String> {
    matches.get_many::<String>(id).into_iter().flatten()
}

/// Build StatsOptions from command line arguments
fn build_options(matches: &ArgMatches) -> anyhow::Result<StatsOptions> {
    let threads = matches.get_one::<usize>("threads").copied().unwrap_or(0);
    let mut options = StatsOptions::new().threads(threads);

    for rev in strings(matches, "ignore-rev") {
        options = options.ignore_revision(rev.as_str());
    }
    for mapping in strings(matches, "author") {
        options = options
            .author_mapping(mapping)
            .with_context(|| format!("Invalid --author '{}'", mapping))?;
    }
    for mapping in strings(matches, "add-language") {
        options = options
            .language_mapping(mapping)
            .with_context(|| format!("Invalid --add-language '{}'", mapping))?;
    }
    for pattern in strings(matches, "exclude-path") {
        options = options.exclude(pattern)?;
    }
    let mut filter = options.file_filter.clone();
    for pattern in strings(matches, "include") {
        filter = filter.include(pattern)?;
    }
    options = options.filter(filter);

    if let Some(dir) = matches.get_one::<PathBuf>("cache-dir") {
        options = options.cache_dir(dir);
    }
    Ok(options)
}

fn build_outputs(matches: &ArgMatches) -> anyhow::Result<Vec<OutputTarget>> {
    let outputs = strings(matches, "output")
        .map(|o| OutputTarget::parse(o))
        .collect::<anyhow::Result<Vec<_>>>()?;
    if outputs.is_empty() {
        Ok(vec![OutputTarget::Console])
    } else {
        Ok(outputs)
    }
}

/// Progress on stderr, only when stderr is a terminal
fn progress_for(quiet: bool) -> impl Fn(usize) -> Progress {
    let term = Term::stderr();
    let interactive = !quiet && term.is_term();
    move |total| {
        let progress = Progress::new(total);
        if !interactive {
            return progress;
        }
        let term = term.clone();
        progress.with_reporter(move |done, total| {
            let _ = term.clear_line();
            let _ = term.write_str(&format!("Processing {}/{} files", done, total));
            if done == total {
                let _ = term.write_line("");
            }
        })
    }
}

fn write_outputs(
    table: &MemoryTable,
    outputs: &[OutputTarget],
    column: usize,
    ordering: Ordering,
) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();

    for output in outputs {
        match output {
            OutputTarget::Console => {
                let report = Report::by(table, column, ordering);
                write!(stdout, "{}", render::render_summary(&Summary::from_table(table)))?;
                writeln!(stdout)?;
                write!(stdout, "{}", render::render_report(&report))?;
                if column != MONTH {
                    let activity = render::render_activity(&Report::monthly_series(table));
                    if !activity.is_empty() {
                        writeln!(stdout)?;
                        write!(stdout, "{}", activity)?;
                    }
                }
            }
            OutputTarget::Json => {
                let doc = JsonOutput {
                    summary: Summary::from_table(table),
                    report: Report::by(table, column, ordering),
                    months: Report::monthly_series(table),
                };
                writeln!(stdout, "{}", serde_json::to_string_pretty(&doc)?)?;
            }
            OutputTarget::Csv(path) => {
                save_csv(table, path, SaveMode::Truncate)?;
                log::info!("saved {} rows to {}", table.len(), path.display());
            }
        }
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let paths: Vec<PathBuf> = strings(matches, "paths").map(PathBuf::from).collect();
    let column = matches
        .get_one::<String>("by")
        .and_then(|by| columns::from_name(by))
        .unwrap_or(AUTHOR);
    let ordering = matches
        .get_one::<String>("sort")
        .map(|s| s.parse::<Ordering>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();

    let options = build_options(matches)?;
    let outputs = build_outputs(matches)?;

    let table = collect_all(&paths, &options, progress_for(matches.get_flag("quiet")))?;
    write_outputs(&table, &outputs, column, ordering)
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(matches.get_count("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
