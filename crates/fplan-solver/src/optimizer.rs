// One build -> solve -> extract pass, plus the stateful `SquadOptimizer`
// façade that keeps the last result for callers.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use fplan_core::player::Cost;
use fplan_core::{OptimizerConfig, ScoreTable};
use serde::Serialize;
use tracing::{info, warn};

use crate::backend::{solve_guarded, BackendError, SolveOptions, SolveStatus, SolverBackend};
use crate::builder::{build_model, BuildError};
use crate::extract::extract;
use crate::history::{ChipUsage, RosterHistory};
use crate::microlp::MicroLpBackend;
use crate::rules::Diagnostic;

/// Slack allowed when checking a returned assignment against the model.
const FEASIBILITY_TOL: f64 = 1e-5;

/// Result of one optimization call. `history` is empty unless `status` carries
/// a solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub history: RosterHistory,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SolveOutcome {
    pub fn is_success(&self) -> bool {
        self.status.has_solution()
    }
}

/// Build the model, solve it with `backend`, and extract the plan.
///
/// Input problems are returned as `BuildError`. Every solver-side outcome
/// (infeasible, unknown, backend failure) is a `SolveOutcome` with an empty
/// history.
pub fn optimize<B: SolverBackend>(
    backend: &B,
    table: &ScoreTable,
    config: &OptimizerConfig,
    options: &SolveOptions,
) -> Result<SolveOutcome, BuildError> {
    let built = build_model(table, config)?;
    let started = Instant::now();

    let expected = built.model.num_vars();
    let raw = solve_guarded(backend, &built.model, options).and_then(|raw| {
        if !raw.status.has_solution() {
            return Ok(raw);
        }
        if raw.values.len() != expected {
            return Err(BackendError::ValueCount {
                expected,
                got: raw.values.len(),
            });
        }
        let violated = built.model.violated_constraints(&raw.values, FEASIBILITY_TOL);
        if let Some(first) = violated.first() {
            return Err(BackendError::Violated {
                count: violated.len(),
                first: first.to_string(),
            });
        }
        Ok(raw)
    });
    let elapsed = started.elapsed();

    let (status, history) = match raw {
        Ok(raw) if raw.status.has_solution() => (raw.status, extract(&built, table, &raw.values)),
        Ok(raw) => (raw.status, RosterHistory::default()),
        Err(e) => {
            warn!("{} backend error: {}", backend.name(), e);
            (SolveStatus::Unknown, RosterHistory::default())
        }
    };

    info!(
        "Solve finished with status {:?} in {:.2?} ({} backend): {:.2} points, {} hits",
        status,
        elapsed,
        backend.name(),
        history.total_points(),
        history.total_hits()
    );

    Ok(SolveOutcome {
        status,
        history,
        diagnostics: built.diagnostics,
        elapsed,
    })
}

// ---------------------------------------------------------------------------
// Stateful façade
// ---------------------------------------------------------------------------

/// Holds a backend and the most recent solve result. A failed solve clears
/// every previous result, so accessors never mix runs.
pub struct SquadOptimizer<B = MicroLpBackend> {
    backend: B,
    options: SolveOptions,
    last: Option<SolveOutcome>,
}

impl SquadOptimizer<MicroLpBackend> {
    pub fn new() -> Self {
        Self::with_backend(MicroLpBackend)
    }
}

impl Default for SquadOptimizer<MicroLpBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: SolverBackend> SquadOptimizer<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            options: SolveOptions::default(),
            last: None,
        }
    }

    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one optimization. Returns `Ok(true)` when a plan was found and
    /// `Ok(false)` when the solver produced none; in both cases the previous
    /// result is replaced.
    pub fn solve(&mut self, table: &ScoreTable, config: &OptimizerConfig) -> Result<bool, BuildError> {
        self.last = None;
        let outcome = optimize(&self.backend, table, config, &self.options)?;
        let success = outcome.is_success();
        self.last = Some(outcome);
        Ok(success)
    }

    pub fn outcome(&self) -> Option<&SolveOutcome> {
        self.last.as_ref()
    }

    pub fn status(&self) -> Option<SolveStatus> {
        self.last.as_ref().map(|o| o.status)
    }

    pub fn history(&self) -> Option<&RosterHistory> {
        self.last
            .as_ref()
            .filter(|o| o.is_success())
            .map(|o| &o.history)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.last
            .as_ref()
            .map(|o| o.diagnostics.as_slice())
            .unwrap_or_default()
    }

    pub fn total_cost(&self) -> Cost {
        self.history().map_or(Cost(0), RosterHistory::total_cost)
    }

    pub fn total_points(&self) -> f64 {
        self.history().map_or(0.0, RosterHistory::total_points)
    }

    pub fn total_hits(&self) -> u32 {
        self.history().map_or(0, RosterHistory::total_hits)
    }

    pub fn chip_usage(&self) -> BTreeMap<u32, ChipUsage> {
        self.history().map(RosterHistory::chip_usage).unwrap_or_default()
    }

    pub fn into_outcome(self) -> Option<SolveOutcome> {
        self.last
    }
}
