// `good_lp` adapter using the pure-Rust `microlp` branch-and-bound solver.

use good_lp::{
    variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
};
use tracing::debug;

use crate::backend::{BackendError, RawSolution, SolveOptions, SolveStatus, SolverBackend};
use crate::model::{LinearExpr, Model, Sense, VarKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpBackend;

impl SolverBackend for MicroLpBackend {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: &Model, options: &SolveOptions) -> Result<RawSolution, BackendError> {
        if let Some(limit) = options.time_limit {
            debug!("microlp does not support time limits; ignoring {:?}", limit);
        }
        if let Some(threads) = options.threads {
            debug!("microlp is single-threaded; ignoring threads = {}", threads);
        }

        solve_model(model)
    }
}

fn solve_model(model: &Model) -> Result<RawSolution, BackendError> {
    let mut problem_vars = ProblemVariables::new();
    let handles: Vec<Variable> = model
        .vars()
        .iter()
        .map(|def| {
            let named = variable().name(def.name.clone());
            let v = match (def.kind, def.upper) {
                (VarKind::Binary, _) => named.binary(),
                (VarKind::Integer, Some(upper)) => named.integer().min(def.lower).max(upper),
                (VarKind::Integer, None) => named.integer().min(def.lower),
                (VarKind::Continuous, Some(upper)) => named.min(def.lower).max(upper),
                (VarKind::Continuous, None) => named.min(def.lower),
            };
            problem_vars.add(v)
        })
        .collect();

    let objective = to_expression(model.objective(), &handles);
    let mut problem = problem_vars.maximise(objective).using(good_lp::microlp);
    for constraint in model.constraints() {
        let body = &constraint.body;
        let lhs = to_expression(&body.expr, &handles);
        problem = match body.sense {
            Sense::Le => problem.with(lhs.leq(body.rhs)),
            Sense::Ge => problem.with(lhs.geq(body.rhs)),
            Sense::Eq => problem.with(lhs.eq(body.rhs)),
        };
    }

    match problem.solve() {
        Ok(solution) => {
            let values = handles.iter().map(|&h| solution.value(h)).collect();
            Ok(RawSolution {
                status: SolveStatus::Optimal,
                values,
            })
        }
        Err(ResolutionError::Infeasible) => Ok(RawSolution::without_values(SolveStatus::Infeasible)),
        Err(ResolutionError::Unbounded) => Ok(RawSolution::without_values(SolveStatus::Unknown)),
        Err(other) => Err(BackendError::Failed(other.to_string())),
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::with_capacity(expr.terms.len());
    for &(var, coef) in &expr.terms {
        out.add_mul(coef, handles[var.index()]);
    }
    out
}
