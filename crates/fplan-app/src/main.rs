// Squad planner entry point.
//
// Startup sequence:
// 1. Initialize tracing (one log file per run; stdout carries only the JSON)
// 2. Load config (copying defaults on first run)
// 3. Load the score table
// 4. Run one optimization over the configured horizon
// 5. Print the plan as JSON; exit non-zero when no plan was found

mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::{DateTime, Utc};
use fplan_core::config;
use fplan_core::ScoreTable;
use fplan_solver::{SolveOptions, SquadOptimizer};
use tracing::{info, warn};

/// Used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "fplan=info,warn";

fn main() -> anyhow::Result<ExitCode> {
    // 1. Initialize tracing
    let started = Utc::now();
    let log_path = init_tracing(started)?;
    info!("Squad planner starting up, logging to {}", log_path.display());

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: budget {}, {} gameweeks, {} squad rules",
        config.optimizer.budget,
        config.optimizer.horizon.gameweeks,
        config.optimizer.rules.len()
    );

    // 3. Load the score table
    let scores_path = Path::new(&config.data_paths.scores);
    let table = ScoreTable::load_csv(scores_path)
        .with_context(|| format!("failed to load score table {}", scores_path.display()))?;
    info!("Loaded {} players from {}", table.len(), scores_path.display());

    // 4. Optimize
    let options = SolveOptions {
        time_limit: config.solver.time_limit(),
        threads: config.solver.threads,
    };
    let mut optimizer = SquadOptimizer::new().with_options(options);
    let found = optimizer
        .solve(&table, &config.optimizer)
        .context("failed to build the optimization model")?;

    let Some(outcome) = optimizer.into_outcome() else {
        anyhow::bail!("optimizer finished without an outcome");
    };
    for d in &outcome.diagnostics {
        warn!("Squad rule '{}' not applied as written: {}", d.rule, d.message);
    }

    // 5. Report
    let json = report::render(&outcome, started).context("failed to serialize plan")?;
    println!("{json}");

    if found {
        info!("Plan written: {:.2} projected points", outcome.history.total_points());
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("No plan found (status {:?})", outcome.status);
        Ok(ExitCode::FAILURE)
    }
}

/// Route tracing to a per-run file under `logs/`, named after the run's start
/// time so successive plans keep separate logs. Returns the file path.
fn init_tracing(started: DateTime<Utc>) -> anyhow::Result<PathBuf> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join(run_log_name(started));
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(log_path)
}

fn run_log_name(started: DateTime<Utc>) -> String {
    format!("fplan-{}.log", started.format("%Y%m%dT%H%M%SZ"))
}
