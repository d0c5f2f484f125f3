//! dashmig - bring saved dashboards up to the current schema version

mod document_io;
mod telemetry;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use dashmig_document::read_schema_version;
use dashmig_engine::{MigrationReport, Migrator, MigratorConfig, StepRegistry};
use rayon::prelude::*;
use serde_json::Value;

use crate::document_io::Format;

fn config_args() -> [Arg; 2] {
    [
        Arg::new("config")
            .long("config")
            .value_name("TOML")
            .value_parser(value_parser!(PathBuf))
            .help("Migrator configuration (datasources, target version, plugins)"),
        Arg::new("target")
            .long("target")
            .value_name("N")
            .value_parser(value_parser!(u32))
            .help("Stop at this schema version instead of the latest"),
    ]
}

fn cli() -> Command {
    Command::new("dashmig")
        .version(dashmig_engine::VERSION)
        .about("Dashboard schema migration")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log to stderr as JSON lines"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Migrate dashboard files (JSON, or YAML by extension)")
                .arg(
                    Arg::new("files")
                        .value_name("FILE")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf))
                        .help("Dashboards to migrate"),
                )
                .args(config_args())
                .arg(
                    Arg::new("in-place")
                        .long("in-place")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite the files instead of printing to stdout"),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print JSON output"),
                ),
        )
        .subcommand(Command::new("versions").about("List registered schema versions"))
        .subcommand(
            Command::new("inspect")
                .about("Show a dashboard's schema version and pending steps")
                .arg(
                    Arg::new("file")
                        .value_name("FILE")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .args(config_args()),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    telemetry::init(matches.get_flag("json-logs"));

    let outcome = match matches.subcommand() {
        Some(("migrate", args)) => run_migrate(args),
        Some(("versions", _)) => {
            run_versions();
            Ok(())
        }
        Some(("inspect", args)) => run_inspect(args),
        _ => Ok(()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &ArgMatches) -> Result<MigratorConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => MigratorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MigratorConfig::default(),
    };
    if let Some(target) = args.get_one::<u32>("target") {
        config = config.with_target_version(*target);
    }
    Ok(config)
}

#[derive(Debug)]
struct FileOutcome {
    report: MigrationReport,
    rendered: String,
}

/// Load, migrate and render one file; with `in_place`, write it back when
/// any step ran
fn process_file(
    migrator: &Migrator,
    path: &Path,
    in_place: bool,
    pretty: bool,
) -> Result<FileOutcome> {
    let mut value = document_io::load(path)?;
    let report = migrator
        .migrate_value(&mut value)
        .with_context(|| format!("migrating {}", path.display()))?;
    let rendered = document_io::render(&value, Format::from_path(path), pretty)?;

    if in_place && !report.is_noop() {
        document_io::store(path, &rendered)?;
    }
    Ok(FileOutcome { report, rendered })
}

fn run_migrate(args: &ArgMatches) -> Result<()> {
    let files: Vec<PathBuf> = args
        .get_many::<PathBuf>("files")
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    let in_place = args.get_flag("in-place");
    let pretty = args.get_flag("pretty");

    if files.len() > 1 && !in_place {
        bail!("migrating several files requires --in-place");
    }

    let migrator = Migrator::with_config(load_config(args)?);
    let results: Vec<(&PathBuf, Result<FileOutcome>)> = files
        .par_iter()
        .map(|path| (path, process_file(&migrator, path, in_place, pretty)))
        .collect();

    let mut failed = 0usize;
    for (path, result) in results {
        match result {
            Ok(outcome) => {
                tracing::info!(
                    file = %path.display(),
                    from = outcome.report.from,
                    to = outcome.report.to,
                    steps = outcome.report.applied.len(),
                    "processed"
                );
                if !in_place {
                    print!("{}", outcome.rendered);
                }
            }
            Err(err) => {
                failed += 1;
                eprintln!("{}: {err:#}", path.display());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed", files.len());
    }
    Ok(())
}

fn run_versions() {
    for step in StepRegistry::builtin().iter() {
        println!("{:>3}  {}", step.version, step.description);
    }
}

fn run_inspect(args: &ArgMatches) -> Result<()> {
    let path = args.get_one::<PathBuf>("file").context("missing FILE")?;
    let value = document_io::load(path)?;
    let Value::Object(doc) = &value else {
        bail!("{} does not hold a dashboard object", path.display());
    };

    let migrator = Migrator::with_config(load_config(args)?);
    let plan = migrator.plan(doc)?;

    println!("file:          {}", path.display());
    println!("schemaVersion: {}", read_schema_version(doc));
    println!("target:        {}", migrator.target_version());
    if plan.is_empty() {
        println!("pending:       none");
    } else {
        let pending: Vec<String> = plan.iter().map(u32::to_string).collect();
        println!("pending:       {}", pending.join(", "));
    }
    Ok(())
}
