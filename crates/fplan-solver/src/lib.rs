pub mod backend;
pub mod builder;
pub mod extract;
pub mod history;
pub mod microlp;
pub mod model;
pub mod objective;
pub mod optimizer;
pub mod rules;
pub mod vars;

pub use backend::{BackendError, RawSolution, SolveOptions, SolveStatus, SolverBackend};
pub use builder::{build_model, BuildError, BuiltModel};
pub use history::{ChipUsage, GameweekPlan, PointsBreakdown, RosterHistory, SquadSlot};
pub use microlp::MicroLpBackend;
pub use optimizer::{optimize, SolveOutcome, SquadOptimizer};
pub use rules::Diagnostic;
