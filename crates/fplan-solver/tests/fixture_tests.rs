// Full pipeline over the shared fixture files: config -> score table ->
// model -> microlp -> roster history.

use std::path::{Path, PathBuf};

use fplan_core::config::{load_config_from, Config};
use fplan_core::player::{PlayerId, Position};
use fplan_core::ScoreTable;
use fplan_solver::{BuildError, SquadOptimizer};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../fplan-core/tests/fixtures")
}

fn load() -> (Config, ScoreTable) {
    let config = load_config_from(&fixtures()).expect("fixture config");
    let table = ScoreTable::load_csv(&fixtures().join(&config.data_paths.scores)).expect("fixture scores");
    (config, table)
}

#[test]
fn blank_projection_inside_horizon_stops_the_build() {
    let (config, table) = load();
    let mut opt = SquadOptimizer::new();
    let err = opt.solve(&table, &config.optimizer).unwrap_err();
    assert!(
        matches!(err, BuildError::HorizonNotCovered { player: PlayerId(30), gameweek: 2 }),
        "unexpected error: {err}"
    );
}

#[test]
fn single_week_plan_honours_configured_rules() {
    let (mut config, table) = load();
    config.optimizer.horizon.gameweeks = 1;

    let mut opt = SquadOptimizer::new();
    assert!(opt.solve(&table, &config.optimizer).unwrap());
    assert!(opt.diagnostics().is_empty());

    let history = opt.history().unwrap();
    let plan = history.plan(1).unwrap();
    let ids: Vec<u32> = plan.squad.iter().map(|s| s.player.id.0).collect();

    assert!(ids.contains(&17), "Saka is forced");
    assert!(ids.contains(&8) && ids.contains(&12), "both NFO defenders are forced");
    assert!(!ids.contains(&25), "Haaland is excluded");
    assert!(plan.squad_cost <= config.optimizer.budget);

    let nfo = plan.squad.iter().filter(|s| s.player.team == "NFO").count();
    assert!(nfo <= config.optimizer.max_players_per_team);
    let keepers = plan
        .starting_xi()
        .filter(|s| s.player.position == Position::Goalkeeper)
        .count();
    assert_eq!(keepers, 1);
    assert!(history.total_points() > 0.0);
}
