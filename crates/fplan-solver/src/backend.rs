// Solver backend seam. The optimizer hands a finished `Model` to a backend
// and gets back a status plus one value per declared variable.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::model::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    /// A valid but possibly suboptimal assignment (e.g. stopped by a time limit).
    Feasible,
    Infeasible,
    /// No usable answer: timed out without an incumbent, or the backend failed.
    Unknown,
}

impl SolveStatus {
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Hints forwarded to the backend. Backends may ignore either.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveOptions {
    pub time_limit: Option<Duration>,
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    pub status: SolveStatus,
    /// Indexed by `VarId`; empty unless `status.has_solution()`.
    pub values: Vec<f64>,
}

impl RawSolution {
    pub fn without_values(status: SolveStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
        }
    }
}

/// Unexpected backend failure. Never leaves the optimizer: it is logged and
/// reported as a failed solve.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("solver failed: {0}")]
    Failed(String),

    #[error("solver panicked: {0}")]
    Panicked(String),

    #[error("solver returned {got} values for {expected} variables")]
    ValueCount { expected: usize, got: usize },

    #[error("solver assignment violates {count} constraints (first: {first})")]
    Violated { count: usize, first: String },
}

pub trait SolverBackend {
    fn name(&self) -> &str;

    fn solve(&self, model: &Model, options: &SolveOptions) -> Result<RawSolution, BackendError>;
}

impl<B: SolverBackend + ?Sized> SolverBackend for &B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, model: &Model, options: &SolveOptions) -> Result<RawSolution, BackendError> {
        (**self).solve(model, options)
    }
}

impl<B: SolverBackend + ?Sized> SolverBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, model: &Model, options: &SolveOptions) -> Result<RawSolution, BackendError> {
        (**self).solve(model, options)
    }
}

/// Run `backend` on `model`, converting a panic inside the backend into a
/// `BackendError` so it cannot unwind through the optimizer.
pub fn solve_guarded<B: SolverBackend + ?Sized>(
    backend: &B,
    model: &Model,
    options: &SolveOptions,
) -> Result<RawSolution, BackendError> {
    panic::catch_unwind(AssertUnwindSafe(|| backend.solve(model, options)))
        .unwrap_or_else(|payload| Err(BackendError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_optimal_and_feasible_carry_solutions() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::Unknown.has_solution());
    }

    struct Exploding;

    impl SolverBackend for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn solve(&self, _: &Model, _: &SolveOptions) -> Result<RawSolution, BackendError> {
            panic!("pivot table corrupted");
        }
    }

    #[test]
    fn panics_become_backend_errors() {
        let err = solve_guarded(&Exploding, &Model::new(), &SolveOptions::default()).unwrap_err();
        match err {
            BackendError::Panicked(msg) => assert_eq!(msg, "pivot table corrupted"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&SolveStatus::Infeasible).unwrap();
        assert_eq!(json, "\"infeasible\"");
    }
}
