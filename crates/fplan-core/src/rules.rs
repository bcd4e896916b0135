// Declarative squad rules: players or team/position groups the caller wants
// forced into, or kept out of, every gameweek's squad.

use crate::player::{PlayerId, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single caller-supplied squad constraint request. Every variant is
/// resolved against the score table by the model builder; a request that
/// matches nothing is reported as a diagnostic and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SquadRule {
    ForcePlayerId(PlayerId),
    ForcePlayerName(String),
    /// At least `min_players` from `team` at `position` in every gameweek.
    ForceTeamPosition {
        team: String,
        position: Position,
        min_players: usize,
    },
    ExcludePlayerId(PlayerId),
    ExcludePlayerName(String),
    ExcludeTeamPosition {
        team: String,
        position: Position,
    },
}

impl fmt::Display for SquadRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquadRule::ForcePlayerId(id) => write!(f, "force player id {id}"),
            SquadRule::ForcePlayerName(name) => write!(f, "force player '{name}'"),
            SquadRule::ForceTeamPosition {
                team,
                position,
                min_players,
            } => write!(f, "force at least {min_players} {position} from {team}"),
            SquadRule::ExcludePlayerId(id) => write!(f, "exclude player id {id}"),
            SquadRule::ExcludePlayerName(name) => write!(f, "exclude player '{name}'"),
            SquadRule::ExcludeTeamPosition { team, position } => {
                write!(f, "exclude every {position} from {team}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        let rule = SquadRule::ForceTeamPosition {
            team: "Liverpool".into(),
            position: Position::Defender,
            min_players: 2,
        };
        assert_eq!(rule.to_string(), "force at least 2 DEF from Liverpool");
        assert_eq!(
            SquadRule::ExcludePlayerName("Kepa".into()).to_string(),
            "exclude player 'Kepa'"
        );
    }
}
