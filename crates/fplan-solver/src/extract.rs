// Solution Extractor: a pure function from a solved assignment to a
// `RosterHistory`.

use fplan_core::player::Cost;
use fplan_core::ScoreTable;

use crate::builder::BuiltModel;
use crate::history::{
    ChipUsage, GameweekPlan, PlayerRef, PointsBreakdown, RosterHistory, SquadSlot, TransferLedger,
};
use crate::model::VarId;
use crate::vars::PlayerWeekTable;

/// Binary variables are read as set above this threshold.
const BOOL_THRESHOLD: f64 = 0.5;

struct Reader<'a> {
    values: &'a [f64],
}

impl Reader<'_> {
    fn flag(&self, v: VarId) -> bool {
        self.values[v.index()] > BOOL_THRESHOLD
    }

    fn count(&self, v: VarId) -> u32 {
        self.values[v.index()].round().max(0.0) as u32
    }
}

/// Build the history for `values`, which must hold one entry per model
/// variable.
pub fn extract(built: &BuiltModel, table: &ScoreTable, values: &[f64]) -> RosterHistory {
    let read = Reader { values };
    let vars = &built.vars;
    let n = table.len();

    let plans = built
        .horizon
        .weeks()
        .map(|w| {
            let mut squad: Vec<SquadSlot> = (0..n)
                .filter(|&p| read.flag(vars.squad.get(p, w)))
                .map(|p| SquadSlot {
                    player: PlayerRef::from(table.player(p)),
                    expected_points: built.projections.get(p, w),
                    starter: read.flag(vars.starter.get(p, w)),
                    captain: read.flag(vars.captain.get(p, w)),
                })
                .collect();
            squad.sort_by_key(|s| (s.player.position, s.player.id));
            let squad_cost: Cost = squad.iter().map(|s| s.player.cost).sum();

            let transfers = (w >= 1).then(|| {
                let moved = |table_vars: &PlayerWeekTable| -> Vec<PlayerRef> {
                    (0..n)
                        .filter(|&p| read.flag(table_vars.get(p, w)))
                        .map(|p| PlayerRef::from(table.player(p)))
                        .collect()
                };
                TransferLedger {
                    transfers_in: moved(&vars.transfer_in),
                    transfers_out: moved(&vars.transfer_out),
                    transfers_made: read.count(vars.transfers_made.get(w)),
                    free_transfers_available: read.count(vars.free_transfers.get(w - 1)),
                    hits: read.count(vars.hits.get(w)),
                }
            });

            let terms = &built.week_terms[w];
            GameweekPlan {
                gameweek: built.horizon.gameweek(w),
                squad,
                transfers,
                free_transfers_banked: read.count(vars.free_transfers.get(w)),
                chips: ChipUsage {
                    bench_boost: read.flag(vars.bench_boost.get(w)),
                    triple_captain: read.flag(vars.triple_captain.get(w)),
                },
                squad_cost,
                points: PointsBreakdown {
                    starting_xi: terms.starting_xi.evaluate(values),
                    captain_bonus: terms.captain_bonus.evaluate(values),
                    bench_boost: terms.bench_boost.evaluate(values),
                    triple_captain_bonus: terms.triple_captain_bonus.evaluate(values),
                    hit_penalty: terms.hit_penalty.evaluate(values),
                },
            }
        })
        .collect();

    RosterHistory::from_plans(plans, built.model.objective().evaluate(values))
}
