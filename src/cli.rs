use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use ministry_planner::config::AppConfig;
use ministry_planner::error::AppError;
use ministry_planner::telemetry;
use ministry_planner::workflows::scheduling::{
    write_findings_csv, InMemoryPlanStore, ProgramId, SchedulingEngine,
};
use tracing::info;

use crate::infra::{open_store, parse_date, MissingSnapshot};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "ministry-planner",
    about = "Fill and audit weekly programme assignments from the command line",
    version
)]
struct Cli {
    /// Plan snapshot to read and write (overrides PLANNER_SNAPSHOT)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Fill every open slot of a program's upcoming active weeks
    AutoAssign(AutoAssignArgs),
    /// Audit committed assignments for duplicates, cooldown and eligibility problems
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
struct AutoAssignArgs {
    /// Program whose weeks are filled
    #[arg(long)]
    program: String,
    /// First week start considered (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    reference_date: Option<NaiveDate>,
    /// Print the report without writing the snapshot back
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// First week start included (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    start: NaiveDate,
    /// Last week start included (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    end: NaiveDate,
    /// Emit CSV instead of JSON
    #[arg(long)]
    csv: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(path) = cli.snapshot {
        config.storage.snapshot_path = path;
    }
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args, config).await,
        Command::AutoAssign(args) => {
            let path = config.storage.snapshot_path;
            let store = Arc::new(open_store(&path, MissingSnapshot::Fail)?);
            run_auto_assign(&store, &args, &mut std::io::stdout().lock())?;
            if !args.dry_run {
                store.save_json(&path)?;
                info!(snapshot = %path.display(), "plan snapshot updated");
            }
            Ok(())
        }
        Command::Validate(args) => {
            let store = open_store(&config.storage.snapshot_path, MissingSnapshot::Fail)?;
            run_validate(Arc::new(store), &args, &mut std::io::stdout().lock())
        }
    }
}

fn run_auto_assign<W: Write>(
    store: &Arc<InMemoryPlanStore>,
    args: &AutoAssignArgs,
    out: &mut W,
) -> Result<(), AppError> {
    let engine = SchedulingEngine::new(Arc::clone(store));
    let reference_date = args
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive());

    let report = engine.auto_assign(&ProgramId::new(args.program.as_str()), reference_date)?;
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn run_validate<W: Write>(
    store: Arc<InMemoryPlanStore>,
    args: &ValidateArgs,
    out: &mut W,
) -> Result<(), AppError> {
    let engine = SchedulingEngine::new(store);
    let findings = engine.validate(args.start, args.end)?;

    if args.csv {
        write_findings_csv(&findings, &mut *out)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, &findings)?;
        writeln!(out)?;
    }
    Ok(())
}
