// Shared player-pool builders for the solver integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use fplan_core::player::{Cost, Player, PlayerId, Position};
use fplan_core::{OptimizerConfig, ScoreTable};

pub fn player(id: u32, position: Position, team: &str, cost: u32, points: &[(u32, f64)]) -> Player {
    Player {
        id: PlayerId(id),
        name: format!("Player {id}"),
        team: team.to_string(),
        position,
        cost: Cost(cost),
        expected_points: points.iter().copied().collect::<BTreeMap<_, _>>(),
    }
}

/// Position of the `id`-th player (1-based) in the minimal 2/5/5/3 layout.
pub fn minimal_position(id: u32) -> Position {
    match id {
        1..=2 => Position::Goalkeeper,
        3..=7 => Position::Defender,
        8..=12 => Position::Midfielder,
        _ => Position::Forward,
    }
}

/// Exactly one legal squad: 2 GK (ids 1-2), 5 DEF (3-7), 5 MID (8-12),
/// 3 FWD (13-15), every player £5.0m, three players per team. `points`
/// gives each player's projection per gameweek.
pub fn minimal_pool(gameweeks: &[u32], points: impl Fn(u32, u32) -> f64) -> Vec<Player> {
    (1..=15)
        .map(|id| {
            let pts: Vec<(u32, f64)> = gameweeks.iter().map(|&gw| (gw, points(id, gw))).collect();
            player(id, minimal_position(id), &format!("T{}", (id - 1) % 5), 50, &pts)
        })
        .collect()
}

pub fn table(players: Vec<Player>) -> ScoreTable {
    ScoreTable::new(players).expect("valid test pool")
}

pub fn config(gameweeks: usize) -> OptimizerConfig {
    let mut c = OptimizerConfig::default();
    c.horizon.gameweeks = gameweeks;
    c
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
