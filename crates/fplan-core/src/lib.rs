// Shared data model for the squad planner: players and the score table,
// configuration, and the declarative squad-rule list.

pub mod config;
pub mod player;
pub mod rules;
pub mod score_table;

pub use config::{Config, ConfigError, OptimizerConfig};
pub use player::{Cost, Player, PlayerId, Position};
pub use rules::SquadRule;
pub use score_table::{ScoreTable, ScoreTableError};
