// Model Builder: turns a score table and optimizer configuration into one
// integer program covering every gameweek of the horizon.
//
// Inputs are validated before any variable is declared. Constraint families:
//   - squad composition, budget and per-team caps
//   - starting XI formation and captaincy
//   - chip bonus linearization and horizon-wide chip allowances
//   - squad continuity, transfer counting and the free-transfer ledger
//   - caller-supplied squad rules

use fplan_core::config::{validate_optimizer, ConfigError, OptimizerConfig};
use fplan_core::player::{PlayerId, Position, SQUAD_SIZE, STARTING_XI_SIZE};
use fplan_core::ScoreTable;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{LinearExpr, Model, VarId};
use crate::objective::{self, Projections, WeekTerms};
use crate::rules::{resolve_rules, Diagnostic, Requirement, ResolvedRule};
use crate::vars::{Horizon, SquadVars};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid optimizer configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("cannot determine the first gameweek: score table has no gameweek projections")]
    NoStartGameweek,

    #[error("player {player} has no projection for gameweek {gameweek}")]
    HorizonNotCovered { player: PlayerId, gameweek: u32 },

    #[error("player {player} has invalid projection {value} for gameweek {gameweek}")]
    InvalidProjection {
        player: PlayerId,
        gameweek: u32,
        value: f64,
    },
}

/// A fully assembled model plus everything needed to read a solution back.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub model: Model,
    pub vars: SquadVars,
    pub horizon: Horizon,
    pub projections: Projections,
    pub week_terms: Vec<WeekTerms>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validate inputs and build the complete model.
pub fn build_model(table: &ScoreTable, config: &OptimizerConfig) -> Result<BuiltModel, BuildError> {
    validate_optimizer(config)?;

    let start = match config.horizon.start_gameweek {
        Some(gw) => gw,
        None => table.first_gameweek().ok_or(BuildError::NoStartGameweek)?,
    };
    let horizon = Horizon::new(start, config.horizon.gameweeks);
    let projections = collect_projections(table, &horizon)?;

    let (resolved, diagnostics) = resolve_rules(&config.rules, table);

    let mut model = Model::new();
    let vars = SquadVars::declare(
        &mut model,
        table.len(),
        &horizon,
        config.transfers.balance_cap(),
    );

    let mut builder = ModelBuilder {
        table,
        config,
        horizon,
        xp: &projections,
        vars: &vars,
        model: &mut model,
    };
    builder.add_squad_composition();
    builder.add_budget();
    builder.add_team_caps();
    builder.add_formation();
    builder.add_captaincy();
    builder.add_bench_indicator();
    builder.add_chip_bonuses();
    builder.add_chip_allowances();
    builder.add_transfers();
    builder.add_free_transfer_ledger();
    builder.add_rules(&resolved);

    let week_terms = objective::week_terms(
        &vars,
        &projections,
        &horizon,
        &config.scoring,
        &config.transfers,
    );
    model.set_objective(objective::assemble(&week_terms));

    info!(
        "Built model for gameweeks {}..={}: {} players, {} variables, {} constraints",
        horizon.first_gameweek(),
        horizon.last_gameweek(),
        table.len(),
        model.num_vars(),
        model.num_constraints()
    );

    Ok(BuiltModel {
        model,
        vars,
        horizon,
        projections,
        week_terms,
        diagnostics,
    })
}

/// Every player must carry a finite, non-negative projection for every week
/// of the horizon.
fn collect_projections(table: &ScoreTable, horizon: &Horizon) -> Result<Projections, BuildError> {
    let mut rows = Vec::with_capacity(table.len());
    for player in table.players() {
        let mut row = Vec::with_capacity(horizon.len());
        for w in horizon.weeks() {
            let gameweek = horizon.gameweek(w);
            let value = player
                .points_for(gameweek)
                .ok_or(BuildError::HorizonNotCovered {
                    player: player.id,
                    gameweek,
                })?;
            if !value.is_finite() || value < 0.0 {
                return Err(BuildError::InvalidProjection {
                    player: player.id,
                    gameweek,
                    value,
                });
            }
            row.push(value);
        }
        rows.push(row);
    }
    Ok(Projections::from_rows(rows, horizon.len()))
}

// ---------------------------------------------------------------------------
// Constraint families
// ---------------------------------------------------------------------------

struct ModelBuilder<'a> {
    table: &'a ScoreTable,
    config: &'a OptimizerConfig,
    horizon: Horizon,
    xp: &'a Projections,
    vars: &'a SquadVars,
    model: &'a mut Model,
}

impl ModelBuilder<'_> {
    fn n_players(&self) -> usize {
        self.table.len()
    }

    fn add_squad_composition(&mut self) {
        let by_position: Vec<(Position, Vec<usize>)> = Position::ALL
            .iter()
            .map(|&pos| (pos, self.table.indices_at(pos)))
            .collect();

        for w in self.horizon.weeks() {
            self.model.add_constraint(
                format!("squad_size[{w}]"),
                LinearExpr::sum(self.vars.squad.week(w)).equals(SQUAD_SIZE as f64),
            );
            for (pos, players) in &by_position {
                self.model.add_constraint(
                    format!("squad_{pos}[{w}]"),
                    LinearExpr::sum(self.vars.squad.select(players, w))
                        .equals(pos.squad_quota() as f64),
                );
            }
        }
    }

    fn add_budget(&mut self) {
        let budget = self.config.budget.tenths() as f64;
        for w in self.horizon.weeks() {
            let mut cost = LinearExpr::with_capacity(self.n_players());
            for p in 0..self.n_players() {
                cost.add_term(
                    self.table.player(p).cost.tenths() as f64,
                    self.vars.squad.get(p, w),
                );
            }
            self.model.add_constraint(format!("budget[{w}]"), cost.leq(budget));
        }
    }

    fn add_team_caps(&mut self) {
        let cap = self.config.max_players_per_team as f64;
        let teams = self.table.players_by_team();
        for w in self.horizon.weeks() {
            for (team, players) in &teams {
                if players.len() <= self.config.max_players_per_team {
                    continue;
                }
                self.model.add_constraint(
                    format!("team_cap[{team},{w}]"),
                    LinearExpr::sum(self.vars.squad.select(players, w)).leq(cap),
                );
            }
        }
        debug!("Team caps applied to {} teams", teams.len());
    }

    fn add_formation(&mut self) {
        let by_position: Vec<(Position, Vec<usize>)> = Position::ALL
            .iter()
            .map(|&pos| (pos, self.table.indices_at(pos)))
            .collect();

        for w in self.horizon.weeks() {
            self.model.add_constraint(
                format!("xi_size[{w}]"),
                LinearExpr::sum(self.vars.starter.week(w)).equals(STARTING_XI_SIZE as f64),
            );
            for p in 0..self.n_players() {
                self.model.add_constraint(
                    format!("starter_in_squad[{p},{w}]"),
                    LinearExpr::var(self.vars.starter.get(p, w))
                        .term(-1.0, self.vars.squad.get(p, w))
                        .leq(0.0),
                );
            }
            for (pos, players) in &by_position {
                let starters = LinearExpr::sum(self.vars.starter.select(players, w));
                let min = pos.min_starters() as f64;
                let body = if *pos == Position::Goalkeeper {
                    starters.equals(min)
                } else {
                    starters.geq(min)
                };
                self.model.add_constraint(format!("xi_{pos}[{w}]"), body);
            }
        }
    }

    fn add_captaincy(&mut self) {
        for w in self.horizon.weeks() {
            self.model.add_constraint(
                format!("one_captain[{w}]"),
                LinearExpr::sum(self.vars.captain.week(w)).equals(1.0),
            );
            for p in 0..self.n_players() {
                self.model.add_constraint(
                    format!("captain_starts[{p},{w}]"),
                    LinearExpr::var(self.vars.captain.get(p, w))
                        .term(-1.0, self.vars.starter.get(p, w))
                        .leq(0.0),
                );
            }
        }
    }

    /// `is_bench = squad AND NOT starter`.
    fn add_bench_indicator(&mut self) {
        for w in self.horizon.weeks() {
            for p in 0..self.n_players() {
                let bench = self.vars.is_bench.get(p, w);
                let squad = self.vars.squad.get(p, w);
                let starter = self.vars.starter.get(p, w);
                self.model.add_constraint(
                    format!("bench_le_squad[{p},{w}]"),
                    LinearExpr::var(bench).term(-1.0, squad).leq(0.0),
                );
                self.model.add_constraint(
                    format!("bench_le_not_starter[{p},{w}]"),
                    LinearExpr::var(bench).term(1.0, starter).leq(1.0),
                );
                self.model.add_constraint(
                    format!("bench_ge[{p},{w}]"),
                    LinearExpr::var(bench)
                        .term(-1.0, squad)
                        .term(1.0, starter)
                        .geq(0.0),
                );
            }
        }
    }

    fn add_chip_bonuses(&mut self) {
        let tc_shares = self.config.scoring.triple_captain_extra_shares;
        for w in self.horizon.weeks() {
            for p in 0..self.n_players() {
                let v = self.xp.get(p, w);
                mccormick(
                    self.model,
                    &format!("bb_pts[{p},{w}]"),
                    self.vars.bench_boost_pts.get(p, w),
                    self.vars.is_bench.get(p, w),
                    self.vars.bench_boost.get(w),
                    v,
                );
                mccormick(
                    self.model,
                    &format!("tc_pts[{p},{w}]"),
                    self.vars.triple_captain_pts.get(p, w),
                    self.vars.captain.get(p, w),
                    self.vars.triple_captain.get(w),
                    v * tc_shares,
                );
            }
        }
    }

    fn add_chip_allowances(&mut self) {
        let chips = &self.config.chips;
        self.model.add_constraint(
            "bench_boost_allowance",
            LinearExpr::sum(self.vars.bench_boost.all()).leq(chips.bench_boost as f64),
        );
        self.model.add_constraint(
            "triple_captain_allowance",
            LinearExpr::sum(self.vars.triple_captain.all()).leq(chips.triple_captain as f64),
        );
    }

    fn add_transfers(&mut self) {
        for w in self.horizon.transfer_weeks() {
            let ins = LinearExpr::sum(self.vars.transfer_in.week(w));
            let outs = LinearExpr::sum(self.vars.transfer_out.week(w));

            self.model.add_constraint(
                format!("transfers_made[{w}]"),
                ins.clone()
                    .term(-1.0, self.vars.transfers_made.get(w))
                    .equals(0.0),
            );
            let mut balance = ins;
            balance.add_expr(&outs.scaled(-1.0));
            self.model
                .add_constraint(format!("transfer_balance[{w}]"), balance.equals(0.0));

            for p in 0..self.n_players() {
                let t_in = self.vars.transfer_in.get(p, w);
                let t_out = self.vars.transfer_out.get(p, w);
                self.model.add_constraint(
                    format!("continuity[{p},{w}]"),
                    LinearExpr::var(self.vars.squad.get(p, w))
                        .term(-1.0, self.vars.squad.get(p, w - 1))
                        .term(1.0, t_out)
                        .term(-1.0, t_in)
                        .equals(0.0),
                );
                self.model.add_constraint(
                    format!("in_or_out[{p},{w}]"),
                    LinearExpr::sum([t_in, t_out]).leq(1.0),
                );
            }
        }
    }

    /// Free-transfer ledger. With `prev = free_transfers[w-1]`:
    ///
    /// - `hits = max(0, made - prev)`
    /// - `free_transfers[w] = min(prev - made + 1, cap)`, never negative
    ///
    /// The zero floor caps a week at `prev + 1` transfers. `hit_taken` forces
    /// `hits = 0` or `prev - made + hits = 0`; `balance_capped` selects which
    /// side of the `min` is binding.
    fn add_free_transfer_ledger(&mut self) {
        let cap = self.config.transfers.balance_cap() as f64;
        let max_moves = SQUAD_SIZE as f64;
        let ft = &self.vars.free_transfers;

        self.model.add_constraint(
            "initial_free_transfers",
            LinearExpr::var(ft.get(0)).equals(self.config.transfers.initial_free_transfers as f64),
        );

        for w in self.horizon.transfer_weeks() {
            let prev = ft.get(w - 1);
            let made = self.vars.transfers_made.get(w);
            let hits = self.vars.hits.get(w);
            let hit_taken = self.vars.hit_taken.get(w);
            let capped = self.vars.balance_capped.get(w);
            let unused = LinearExpr::var(prev).term(-1.0, made).term(1.0, hits);

            self.model.add_constraint(
                format!("hits_cover_deficit[{w}]"),
                LinearExpr::var(hits).term(-1.0, made).term(1.0, prev).geq(0.0),
            );
            self.model
                .add_constraint(format!("unused_nonneg[{w}]"), unused.clone().geq(0.0));
            self.model.add_constraint(
                format!("hits_only_if_taken[{w}]"),
                LinearExpr::var(hits).term(-max_moves, hit_taken).leq(0.0),
            );
            self.model.add_constraint(
                format!("unused_only_if_no_hit[{w}]"),
                unused.clone().term(cap, hit_taken).leq(cap),
            );

            let next = LinearExpr::var(ft.get(w));
            self.model.add_constraint(
                format!("ft_le_rollover[{w}]"),
                next.clone().term(-1.0, prev).term(1.0, made).leq(1.0),
            );
            self.model.add_constraint(
                format!("ft_le_cap[{w}]"),
                next.clone().leq(cap),
            );
            self.model.add_constraint(
                format!("ft_ge_rollover[{w}]"),
                next.clone()
                    .term(-1.0, prev)
                    .term(1.0, made)
                    .term(cap + 1.0, capped)
                    .geq(1.0),
            );
            self.model.add_constraint(
                format!("ft_ge_cap[{w}]"),
                next.term(-cap, capped).geq(0.0),
            );
        }
    }

    fn add_rules(&mut self, resolved: &[ResolvedRule]) {
        for (i, rule) in resolved.iter().enumerate() {
            for w in self.horizon.weeks() {
                match &rule.requirement {
                    Requirement::Include(players) => {
                        for &p in players {
                            self.model.add_constraint(
                                format!("rule{i}_include[{p},{w}]"),
                                LinearExpr::var(self.vars.squad.get(p, w)).equals(1.0),
                            );
                        }
                    }
                    Requirement::AtLeast { players, min } => {
                        self.model.add_constraint(
                            format!("rule{i}_at_least[{w}]"),
                            LinearExpr::sum(self.vars.squad.select(players, w)).geq(*min as f64),
                        );
                    }
                    Requirement::Exclude(players) => {
                        for &p in players {
                            self.model.add_constraint(
                                format!("rule{i}_exclude[{p},{w}]"),
                                LinearExpr::var(self.vars.squad.get(p, w)).equals(0.0),
                            );
                        }
                    }
                }
            }
            debug!("Applied squad rule '{}'", rule.rule);
        }
    }
}

/// Pin `bonus = value` iff `indicator = 1` and `active = 1`, else 0:
/// `B <= v*I`, `B <= v*A`, `B >= v*(I + A - 1)`. `B >= 0` is the variable's
/// lower bound.
fn mccormick(
    model: &mut Model,
    name: &str,
    bonus: VarId,
    indicator: VarId,
    active: VarId,
    value: f64,
) {
    model.add_constraint(
        format!("{name}_le_indicator"),
        LinearExpr::var(bonus).term(-value, indicator).leq(0.0),
    );
    model.add_constraint(
        format!("{name}_le_active"),
        LinearExpr::var(bonus).term(-value, active).leq(0.0),
    );
    model.add_constraint(
        format!("{name}_ge_both"),
        LinearExpr::var(bonus)
            .term(-value, indicator)
            .term(-value, active)
            .geq(-value),
    );
}
