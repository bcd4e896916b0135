// Configuration loading and parsing (config/fplan.toml).

use crate::player::{Cost, PlayerId, Position};
use crate::rules::SquadRule;
use serde::Deserialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name of the single configuration file under `config/`.
pub const CONFIG_FILE: &str = "fplan.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("cannot seed config/ from defaults/: {message}")]
    Bootstrap { message: String },
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub optimizer: OptimizerConfig,
    pub solver: SolverSettings,
    pub data_paths: DataPaths,
}

/// Every scalar the optimizer needs for one solve call.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub budget: Cost,
    pub max_players_per_team: usize,
    pub horizon: HorizonConfig,
    pub transfers: TransferRules,
    pub chips: ChipAllowances,
    pub scoring: ScoringRules,
    pub rules: Vec<SquadRule>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            budget: Cost(1000),
            max_players_per_team: 3,
            horizon: HorizonConfig::default(),
            transfers: TransferRules::default(),
            chips: ChipAllowances::default(),
            scoring: ScoringRules::default(),
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HorizonConfig {
    /// Number of consecutive gameweeks optimized jointly.
    pub gameweeks: usize,
    /// Calendar number of the first gameweek. When omitted, the earliest
    /// gameweek present in the score table is used.
    #[serde(default)]
    pub start_gameweek: Option<u32>,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            gameweeks: 5,
            start_gameweek: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferRules {
    pub initial_free_transfers: u32,
    pub max_free_transfers_saved: u32,
    pub points_per_hit: f64,
}

impl TransferRules {
    /// Upper bound on the free-transfer balance entering any gameweek.
    pub fn balance_cap(&self) -> u32 {
        self.max_free_transfers_saved + 1
    }
}

impl Default for TransferRules {
    fn default() -> Self {
        Self {
            initial_free_transfers: 1,
            max_free_transfers_saved: 5,
            points_per_hit: 4.0,
        }
    }
}

/// Total uses of each chip permitted across the whole horizon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChipAllowances {
    pub bench_boost: u32,
    pub triple_captain: u32,
    /// Accepted for config compatibility; must be 0.
    pub free_hit: u32,
    /// Accepted for config compatibility; must be 0.
    pub wildcard: u32,
}

/// Extra full shares of a player's projection awarded on top of the base
/// starting-XI share. The defaults give 2x for a captain and 3x for a
/// triple-captained captain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub captain_extra_shares: f64,
    pub triple_captain_extra_shares: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            captain_extra_shares: 1.0,
            triple_captain_extra_shares: 1.0,
        }
    }
}

/// Hints forwarded to the solver backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub time_limit_secs: Option<f64>,
    pub threads: Option<usize>,
}

impl SolverSettings {
    /// `None` when unset or not representable as a `Duration`; the loader
    /// rejects the latter.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataPaths {
    pub scores: String,
}

// ---------------------------------------------------------------------------
// fplan.toml raw structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ConfigFile {
    squad: SquadSection,
    horizon: HorizonConfig,
    #[serde(default)]
    transfers: TransferRules,
    #[serde(default)]
    chips: ChipAllowances,
    #[serde(default)]
    scoring: ScoringRules,
    #[serde(default)]
    solver: SolverSettings,
    #[serde(default)]
    enforce: Vec<RawRule>,
    #[serde(default)]
    exclude: Vec<RawRule>,
    data_paths: DataPaths,
}

#[derive(Debug, Deserialize)]
struct SquadSection {
    /// Budget in millions (e.g. 100.0).
    budget: f64,
    max_players_per_team: usize,
}

/// One `[[enforce]]` / `[[exclude]]` table. The variant is picked by which
/// keys are present.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRule {
    Id {
        player_id: u32,
    },
    Name {
        name: String,
    },
    TeamPosition {
        team: String,
        position: String,
        #[serde(default)]
        min_players: Option<usize>,
    },
}

fn convert_rule(raw: RawRule, exclude: bool, field: &str) -> Result<SquadRule, ConfigError> {
    let rule = match raw {
        RawRule::Id { player_id } if exclude => SquadRule::ExcludePlayerId(PlayerId(player_id)),
        RawRule::Id { player_id } => SquadRule::ForcePlayerId(PlayerId(player_id)),
        RawRule::Name { name } if exclude => SquadRule::ExcludePlayerName(name),
        RawRule::Name { name } => SquadRule::ForcePlayerName(name),
        RawRule::TeamPosition {
            team,
            position,
            min_players,
        } => {
            let position = Position::from_str_pos(&position).ok_or_else(|| {
                invalid(
                    &format!("{field}.position"),
                    format!("unknown position '{position}' (expected GK, DEF, MID or FWD)"),
                )
            })?;
            if exclude {
                SquadRule::ExcludeTeamPosition { team, position }
            } else {
                let min_players = min_players.unwrap_or(1);
                if min_players == 0 || min_players > position.squad_quota() {
                    return Err(invalid(
                        &format!("{field}.min_players"),
                        format!(
                            "must be between 1 and {} for {position}, got {min_players}",
                            position.squad_quota()
                        ),
                    ));
                }
                SquadRule::ForceTeamPosition {
                    team,
                    position,
                    min_players,
                }
            }
        }
    };
    Ok(rule)
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/fplan.toml` relative to the
/// given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text).map_err(|e| match e {
        ParseFailure::Toml(source) => ConfigError::ParseError { path, source },
        ParseFailure::Invalid(err) => err,
    })
}

enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(ConfigError),
}

fn parse_config(text: &str) -> Result<Config, ParseFailure> {
    let file: ConfigFile = toml::from_str(text).map_err(ParseFailure::Toml)?;

    let budget = Cost::from_millions(file.squad.budget)
        .filter(|b| b.tenths() > 0)
        .ok_or_else(|| {
            ParseFailure::Invalid(invalid(
                "squad.budget",
                format!("must be a positive amount in millions, got {}", file.squad.budget),
            ))
        })?;

    let mut rules = Vec::with_capacity(file.enforce.len() + file.exclude.len());
    for (i, raw) in file.enforce.into_iter().enumerate() {
        rules.push(convert_rule(raw, false, &format!("enforce[{i}]")).map_err(ParseFailure::Invalid)?);
    }
    for (i, raw) in file.exclude.into_iter().enumerate() {
        rules.push(convert_rule(raw, true, &format!("exclude[{i}]")).map_err(ParseFailure::Invalid)?);
    }

    let config = Config {
        optimizer: OptimizerConfig {
            budget,
            max_players_per_team: file.squad.max_players_per_team,
            horizon: file.horizon,
            transfers: file.transfers,
            chips: file.chips,
            scoring: file.scoring,
            rules,
        },
        solver: file.solver,
        data_paths: file.data_paths,
    };

    validate_optimizer(&config.optimizer).map_err(ParseFailure::Invalid)?;
    validate_solver(&config.solver).map_err(ParseFailure::Invalid)?;

    Ok(config)
}

/// Seed `config/` from `defaults/`, never overwriting a file the user already
/// has. Returns the paths written. `.example` files are left alone.
pub fn install_defaults(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        return if config_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(bootstrap(format!(
                "no defaults/ or config/ under {}; start fplan from the project root",
                base_dir.display()
            )))
        };
    }

    fs::create_dir_all(&config_dir)
        .map_err(|e| bootstrap(format!("cannot create {}: {e}", config_dir.display())))?;

    let entries = fs::read_dir(&defaults_dir)
        .map_err(|e| bootstrap(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut written = Vec::new();
    for entry in entries {
        let source = entry.map_err(|e| bootstrap(e.to_string()))?.path();
        let Some(name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        if Path::new(name).extension().is_some_and(|ext| ext == "example") {
            continue;
        }
        let target = config_dir.join(name);
        if install_one(&source, &target)? {
            written.push(target);
        }
    }
    Ok(written)
}

/// Copy `source` to `target` unless `target` exists. `create_new` makes the
/// existence check and the create a single step.
fn install_one(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(bootstrap(format!("cannot create {}: {e}", target.display()))),
    };
    let bytes = fs::read(source).map_err(|e| bootstrap(format!("cannot read {}: {e}", source.display())))?;
    dest.write_all(&bytes)
        .map_err(|e| bootstrap(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

fn bootstrap(message: String) -> ConfigError {
    ConfigError::Bootstrap { message }
}

/// Load `config/fplan.toml` from the working directory, seeding it from
/// `defaults/` on first run.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    install_defaults(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check every optimizer scalar. Called by the loader and again by the model
/// builder, since `OptimizerConfig` can also be assembled in code.
pub fn validate_optimizer(config: &OptimizerConfig) -> Result<(), ConfigError> {
    if config.budget.tenths() == 0 {
        return Err(invalid("squad.budget", "must be greater than 0"));
    }
    if config.max_players_per_team == 0 {
        return Err(invalid("squad.max_players_per_team", "must be greater than 0"));
    }
    if config.horizon.gameweeks == 0 {
        return Err(invalid("horizon.gameweeks", "must be greater than 0"));
    }

    let t = &config.transfers;
    if t.initial_free_transfers > t.balance_cap() {
        return Err(invalid(
            "transfers.initial_free_transfers",
            format!(
                "must not exceed max_free_transfers_saved + 1 ({}), got {}",
                t.balance_cap(),
                t.initial_free_transfers
            ),
        ));
    }
    if !t.points_per_hit.is_finite() || t.points_per_hit < 0.0 {
        return Err(invalid(
            "transfers.points_per_hit",
            format!("must be a finite value >= 0, got {}", t.points_per_hit),
        ));
    }

    if config.chips.free_hit != 0 {
        return Err(invalid("chips.free_hit", "free hit is not supported; must be 0"));
    }
    if config.chips.wildcard != 0 {
        return Err(invalid("chips.wildcard", "wildcard is not supported; must be 0"));
    }

    let s = &config.scoring;
    let share_fields: &[(&str, f64)] = &[
        ("scoring.captain_extra_shares", s.captain_extra_shares),
        ("scoring.triple_captain_extra_shares", s.triple_captain_extra_shares),
    ];
    for (name, val) in share_fields {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(name, format!("must be a finite value >= 0, got {val}")));
        }
    }

    Ok(())
}

fn validate_solver(settings: &SolverSettings) -> Result<(), ConfigError> {
    if let Some(secs) = settings.time_limit_secs {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(invalid(
                "solver.time_limit_secs",
                format!("must be > 0, got {secs}"),
            ));
        }
        if let Err(e) = Duration::try_from_secs_f64(secs) {
            return Err(invalid(
                "solver.time_limit_secs",
                format!("{secs} is not a usable duration: {e}"),
            ));
        }
    }
    if settings.threads == Some(0) {
        return Err(invalid("solver.threads", "must be > 0"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[squad]
budget = 100.0
max_players_per_team = 3

[horizon]
gameweeks = 5

[data_paths]
scores = "data/scores.csv"
"#;

    /// Path to the repository's shipped defaults/ directory.
    fn repo_defaults() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../defaults")
    }

    fn write_config(dir_name: &str, text: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(dir_name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), text).unwrap();
        tmp
    }

    fn expect_validation_field(text: &str, expected: &str) {
        match parse_config(text) {
            Err(ParseFailure::Invalid(ConfigError::ValidationError { field, .. })) => {
                assert_eq!(field, expected);
            }
            Err(ParseFailure::Invalid(other)) => panic!("expected ValidationError, got: {other}"),
            Err(ParseFailure::Toml(e)) => panic!("expected ValidationError, got TOML error: {e}"),
            Ok(_) => panic!("expected ValidationError for {expected}, got Ok"),
        }
    }

    #[test]
    fn load_shipped_defaults() {
        let tmp = std::env::temp_dir().join("fplan_config_shipped_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::copy(
            repo_defaults().join(CONFIG_FILE),
            tmp.join("config").join(CONFIG_FILE),
        )
        .unwrap();

        let config = load_config_from(&tmp).expect("shipped defaults should load");
        assert_eq!(config.optimizer.budget, Cost(1000));
        assert_eq!(config.optimizer.max_players_per_team, 3);
        assert_eq!(config.optimizer.horizon.gameweeks, 5);
        assert_eq!(config.optimizer.transfers.initial_free_transfers, 1);
        assert_eq!(config.optimizer.transfers.max_free_transfers_saved, 5);
        assert!((config.optimizer.transfers.points_per_hit - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.optimizer.chips.bench_boost, 0);
        assert_eq!(config.data_paths.scores, "data/scores.csv");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config = match parse_config(MINIMAL) {
            Ok(c) => c,
            Err(_) => panic!("minimal config should parse"),
        };
        let opt = &config.optimizer;
        assert_eq!(opt.budget, Cost(1000));
        assert_eq!(opt.horizon.start_gameweek, None);
        assert_eq!(opt.transfers, TransferRules::default());
        assert_eq!(opt.chips, ChipAllowances::default());
        assert_eq!(opt.scoring, ScoringRules::default());
        assert!(opt.rules.is_empty());
        assert_eq!(config.solver.time_limit(), None);
    }

    #[test]
    fn parses_enforce_and_exclude_rules() {
        let text = format!(
            "{MINIMAL}\n{}",
            r#"
[[enforce]]
player_id = 328

[[enforce]]
name = "Erling Haaland"

[[enforce]]
team = "Liverpool"
position = "DEF"
min_players = 2

[[exclude]]
name = "Kepa Arrizabalaga Revuelta"

[[exclude]]
team = "Man City"
position = "gk"
"#
        );
        let config = match parse_config(&text) {
            Ok(c) => c,
            Err(_) => panic!("rules should parse"),
        };
        assert_eq!(
            config.optimizer.rules,
            vec![
                SquadRule::ForcePlayerId(PlayerId(328)),
                SquadRule::ForcePlayerName("Erling Haaland".into()),
                SquadRule::ForceTeamPosition {
                    team: "Liverpool".into(),
                    position: Position::Defender,
                    min_players: 2,
                },
                SquadRule::ExcludePlayerName("Kepa Arrizabalaga Revuelta".into()),
                SquadRule::ExcludeTeamPosition {
                    team: "Man City".into(),
                    position: Position::Goalkeeper,
                },
            ]
        );
    }

    #[test]
    fn team_position_rule_defaults_to_one_player() {
        let text = format!(
            "{MINIMAL}\n[[enforce]]\nteam = \"Arsenal\"\nposition = \"FWD\"\n"
        );
        let config = match parse_config(&text) {
            Ok(c) => c,
            Err(_) => panic!("rule should parse"),
        };
        assert_eq!(
            config.optimizer.rules,
            vec![SquadRule::ForceTeamPosition {
                team: "Arsenal".into(),
                position: Position::Forward,
                min_players: 1,
            }]
        );
    }

    #[test]
    fn rejects_unknown_rule_position() {
        let text = format!("{MINIMAL}\n[[enforce]]\nteam = \"Arsenal\"\nposition = \"ST\"\n");
        expect_validation_field(&text, "enforce[0].position");
    }

    #[test]
    fn rejects_min_players_above_quota() {
        let text = format!(
            "{MINIMAL}\n[[enforce]]\nteam = \"Arsenal\"\nposition = \"GK\"\nmin_players = 3\n"
        );
        expect_validation_field(&text, "enforce[0].min_players");
    }

    #[test]
    fn rejects_zero_budget() {
        expect_validation_field(&MINIMAL.replace("budget = 100.0", "budget = 0.0"), "squad.budget");
    }

    #[test]
    fn rejects_negative_budget() {
        expect_validation_field(&MINIMAL.replace("budget = 100.0", "budget = -5.0"), "squad.budget");
    }

    #[test]
    fn rejects_zero_team_cap() {
        expect_validation_field(
            &MINIMAL.replace("max_players_per_team = 3", "max_players_per_team = 0"),
            "squad.max_players_per_team",
        );
    }

    #[test]
    fn rejects_zero_gameweeks() {
        expect_validation_field(
            &MINIMAL.replace("gameweeks = 5", "gameweeks = 0"),
            "horizon.gameweeks",
        );
    }

    #[test]
    fn rejects_initial_free_transfers_above_cap() {
        let text = format!(
            "{MINIMAL}\n[transfers]\ninitial_free_transfers = 4\nmax_free_transfers_saved = 2\npoints_per_hit = 4.0\n"
        );
        expect_validation_field(&text, "transfers.initial_free_transfers");
    }

    #[test]
    fn rejects_negative_hit_cost() {
        let text = format!(
            "{MINIMAL}\n[transfers]\ninitial_free_transfers = 1\nmax_free_transfers_saved = 5\npoints_per_hit = -4.0\n"
        );
        expect_validation_field(&text, "transfers.points_per_hit");
    }

    #[test]
    fn rejects_unsupported_chips() {
        expect_validation_field(&format!("{MINIMAL}\n[chips]\nwildcard = 1\n"), "chips.wildcard");
        expect_validation_field(&format!("{MINIMAL}\n[chips]\nfree_hit = 1\n"), "chips.free_hit");
    }

    #[test]
    fn rejects_negative_captain_shares() {
        expect_validation_field(
            &format!("{MINIMAL}\n[scoring]\ncaptain_extra_shares = -1.0\n"),
            "scoring.captain_extra_shares",
        );
    }

    #[test]
    fn rejects_zero_time_limit() {
        expect_validation_field(
            &format!("{MINIMAL}\n[solver]\ntime_limit_secs = 0.0\n"),
            "solver.time_limit_secs",
        );
    }

    #[test]
    fn rejects_overflowing_time_limit() {
        expect_validation_field(
            &format!("{MINIMAL}\n[solver]\ntime_limit_secs = 1e20\n"),
            "solver.time_limit_secs",
        );
        let settings = SolverSettings {
            time_limit_secs: Some(1e20),
            threads: None,
        };
        assert_eq!(settings.time_limit(), None);
    }

    #[test]
    fn solver_settings_convert_time_limit() {
        let config = match parse_config(&format!("{MINIMAL}\n[solver]\ntime_limit_secs = 2.5\nthreads = 4\n")) {
            Ok(c) => c,
            Err(_) => panic!("solver section should parse"),
        };
        assert_eq!(config.solver.time_limit(), Some(Duration::from_millis(2500)));
        assert_eq!(config.solver.threads, Some(4));
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = write_config("fplan_config_invalid_toml", "this is not valid [[[ toml");
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_config() {
        let tmp = std::env::temp_dir().join("fplan_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn validation_error_surfaces_from_file() {
        let tmp = write_config(
            "fplan_config_validation",
            &MINIMAL.replace("gameweeks = 5", "gameweeks = 0"),
        );
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "horizon.gameweeks"));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn first_run_seeds_config_but_not_examples() {
        let tmp = scratch("fplan_seed_first_run");
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), MINIMAL).unwrap();
        fs::write(tmp.join("defaults/fplan.toml.example"), "# template\n").unwrap();

        let written = install_defaults(&tmp).unwrap();
        assert_eq!(written, vec![tmp.join("config").join(CONFIG_FILE)]);
        assert!(!tmp.join("config/fplan.toml.example").exists());
        assert!(load_config_from(&tmp).is_ok());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn user_edits_survive_reseeding() {
        let tmp = scratch("fplan_seed_keeps_user_file");
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), MINIMAL).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), "# mine\n").unwrap();

        assert!(install_defaults(&tmp).unwrap().is_empty());
        assert_eq!(fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap(), "# mine\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn seeding_outside_project_root_fails() {
        let tmp = scratch("fplan_seed_no_dirs");
        fs::create_dir_all(&tmp).unwrap();

        let err = install_defaults(&tmp).unwrap_err();
        assert!(
            matches!(&err, ConfigError::Bootstrap { message } if message.contains("project root")),
            "unexpected error: {err}"
        );
        let _ = fs::remove_dir_all(&tmp);
    }

    fn scratch(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        tmp
    }

    #[test]
    fn default_optimizer_config_is_valid() {
        validate_optimizer(&OptimizerConfig::default()).expect("defaults should validate");
    }
}
