// Resolution of declarative squad rules against the score table.
//
// Each rule becomes either a set of squad constraints over concrete player
// indices or a diagnostic explaining why nothing could be matched.

use fplan_core::player::Position;
use fplan_core::{ScoreTable, SquadRule};
use serde::Serialize;
use tracing::warn;

/// Caller-visible warning about a rule that was dropped or weakened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub rule: SquadRule,
    pub message: String,
}

impl Diagnostic {
    fn new(rule: &SquadRule, message: impl Into<String>) -> Self {
        Self {
            rule: rule.clone(),
            message: message.into(),
        }
    }
}

/// Constraint shape produced by a resolved rule; applied to every gameweek.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Each listed player must be in the squad.
    Include(Vec<usize>),
    /// At least `min` of the listed players must be in the squad.
    AtLeast { players: Vec<usize>, min: usize },
    /// None of the listed players may be in the squad.
    Exclude(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRule {
    pub rule: SquadRule,
    pub requirement: Requirement,
}

/// Resolve every rule, returning the usable requirements and a diagnostic for
/// each rule that matched nothing (or matched ambiguously).
pub fn resolve_rules(rules: &[SquadRule], table: &ScoreTable) -> (Vec<ResolvedRule>, Vec<Diagnostic>) {
    let mut resolved = Vec::with_capacity(rules.len());
    let mut diagnostics = Vec::new();

    for rule in rules {
        let (requirement, diagnostic) = resolve_one(rule, table);
        if let Some(d) = diagnostic {
            warn!("squad rule '{}': {}", d.rule, d.message);
            diagnostics.push(d);
        }
        if let Some(requirement) = requirement {
            resolved.push(ResolvedRule {
                rule: rule.clone(),
                requirement,
            });
        }
    }

    (resolved, diagnostics)
}

fn resolve_one(rule: &SquadRule, table: &ScoreTable) -> (Option<Requirement>, Option<Diagnostic>) {
    match rule {
        SquadRule::ForcePlayerId(id) => match table.index_of(*id) {
            Some(idx) => (Some(Requirement::Include(vec![idx])), None),
            None => (None, Some(Diagnostic::new(rule, format!("no player with id {id}")))),
        },
        SquadRule::ExcludePlayerId(id) => match table.index_of(*id) {
            Some(idx) => (Some(Requirement::Exclude(vec![idx])), None),
            None => (None, Some(Diagnostic::new(rule, format!("no player with id {id}")))),
        },
        SquadRule::ForcePlayerName(name) => {
            let matches = table.indices_named(name);
            match matches.len() {
                0 => (None, Some(Diagnostic::new(rule, format!("no player named '{name}'")))),
                1 => (Some(Requirement::Include(matches)), None),
                n => (
                    Some(Requirement::AtLeast {
                        players: matches,
                        min: 1,
                    }),
                    Some(Diagnostic::new(
                        rule,
                        format!("name matches {n} players; requiring at least one of them"),
                    )),
                ),
            }
        }
        SquadRule::ExcludePlayerName(name) => {
            let matches = table.indices_named(name);
            if matches.is_empty() {
                (None, Some(Diagnostic::new(rule, format!("no player named '{name}'"))))
            } else {
                (Some(Requirement::Exclude(matches)), None)
            }
        }
        SquadRule::ForceTeamPosition {
            team,
            position,
            min_players,
        } => match team_position_matches(table, team, *position) {
            Err(message) => (None, Some(Diagnostic::new(rule, message))),
            Ok(players) if players.len() < *min_players => {
                let available = players.len();
                (
                    Some(Requirement::AtLeast {
                        players,
                        min: available,
                    }),
                    Some(Diagnostic::new(
                        rule,
                        format!(
                            "only {available} {position} from {team} in the data; requiring all of them"
                        ),
                    )),
                )
            }
            Ok(players) => (
                Some(Requirement::AtLeast {
                    players,
                    min: *min_players,
                }),
                None,
            ),
        },
        SquadRule::ExcludeTeamPosition { team, position } => {
            match team_position_matches(table, team, *position) {
                Ok(players) => (Some(Requirement::Exclude(players)), None),
                Err(message) => (None, Some(Diagnostic::new(rule, message))),
            }
        }
    }
}

fn team_position_matches(table: &ScoreTable, team: &str, position: Position) -> Result<Vec<usize>, String> {
    let by_team = table.players_by_team();
    let Some(members) = by_team.get(team) else {
        return Err(format!("team '{team}' not found in the score table"));
    };
    let players: Vec<usize> = members
        .iter()
        .copied()
        .filter(|&idx| table.player(idx).position == position)
        .collect();
    if players.is_empty() {
        return Err(format!("team '{team}' has no {position} players"));
    }
    Ok(players)
}
