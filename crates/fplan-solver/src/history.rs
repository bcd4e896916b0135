// Roster History: the immutable, per-gameweek record of one solved plan.

use std::collections::BTreeMap;

use fplan_core::player::{Cost, Player, PlayerId, Position};
use serde::Serialize;

/// Static identity of a player as it appears in a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: Position,
    pub cost: Cost,
}

impl From<&Player> for PlayerRef {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            team: p.team.clone(),
            position: p.position,
            cost: p.cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadSlot {
    #[serde(flatten)]
    pub player: PlayerRef,
    pub expected_points: f64,
    pub starter: bool,
    pub captain: bool,
}

/// Transfers made going into a gameweek. Absent for the first week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferLedger {
    pub transfers_in: Vec<PlayerRef>,
    pub transfers_out: Vec<PlayerRef>,
    pub transfers_made: u32,
    /// Free transfers available for this week's moves.
    pub free_transfers_available: u32,
    pub hits: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChipUsage {
    pub bench_boost: bool,
    pub triple_captain: bool,
}

impl ChipUsage {
    pub fn any(&self) -> bool {
        self.bench_boost || self.triple_captain
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PointsBreakdown {
    pub starting_xi: f64,
    pub captain_bonus: f64,
    pub bench_boost: f64,
    pub triple_captain_bonus: f64,
    pub hit_penalty: f64,
}

impl PointsBreakdown {
    pub fn total(&self) -> f64 {
        self.starting_xi + self.captain_bonus + self.bench_boost + self.triple_captain_bonus
            - self.hit_penalty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameweekPlan {
    pub gameweek: u32,
    /// Sorted by position, then by player id.
    pub squad: Vec<SquadSlot>,
    pub transfers: Option<TransferLedger>,
    /// Balance carried into the next gameweek.
    pub free_transfers_banked: u32,
    pub chips: ChipUsage,
    pub squad_cost: Cost,
    pub points: PointsBreakdown,
}

impl GameweekPlan {
    pub fn starting_xi(&self) -> impl Iterator<Item = &SquadSlot> {
        self.squad.iter().filter(|s| s.starter)
    }

    pub fn bench(&self) -> impl Iterator<Item = &SquadSlot> {
        self.squad.iter().filter(|s| !s.starter)
    }

    pub fn captain(&self) -> Option<&SquadSlot> {
        self.squad.iter().find(|s| s.captain)
    }

    pub fn hits(&self) -> u32 {
        self.transfers.as_ref().map_or(0, |t| t.hits)
    }
}

/// One record per gameweek plus horizon totals. Empty when no solution exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RosterHistory {
    plans: Vec<GameweekPlan>,
    total_cost: Cost,
    total_points: f64,
    total_hits: u32,
}

impl RosterHistory {
    /// Assemble a history; totals are derived here, once, from the finished
    /// weekly records and the solved objective value.
    pub(crate) fn from_plans(plans: Vec<GameweekPlan>, total_points: f64) -> Self {
        let total_cost = plans.last().map(|p| p.squad_cost).unwrap_or_default();
        let total_hits = plans.iter().map(GameweekPlan::hits).sum();
        Self {
            plans,
            total_cost,
            total_points,
            total_hits,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn plans(&self) -> &[GameweekPlan] {
        &self.plans
    }

    pub fn gameweeks(&self) -> impl Iterator<Item = u32> + '_ {
        self.plans.iter().map(|p| p.gameweek)
    }

    pub fn plan(&self, gameweek: u32) -> Option<&GameweekPlan> {
        self.plans.iter().find(|p| p.gameweek == gameweek)
    }

    pub fn final_plan(&self) -> Option<&GameweekPlan> {
        self.plans.last()
    }

    pub fn squad(&self, gameweek: u32) -> Option<&[SquadSlot]> {
        self.plan(gameweek).map(|p| p.squad.as_slice())
    }

    pub fn final_squad(&self) -> Option<&[SquadSlot]> {
        self.final_plan().map(|p| p.squad.as_slice())
    }

    pub fn squad_cost(&self, gameweek: u32) -> Option<Cost> {
        self.plan(gameweek).map(|p| p.squad_cost)
    }

    /// Cost of the final week's squad.
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    /// The solved objective value.
    pub fn total_points(&self) -> f64 {
        self.total_points
    }

    pub fn total_hits(&self) -> u32 {
        self.total_hits
    }

    pub fn chip_usage(&self) -> BTreeMap<u32, ChipUsage> {
        self.plans.iter().map(|p| (p.gameweek, p.chips)).collect()
    }

    pub fn transfers_in(&self, gameweek: u32) -> Option<&[PlayerRef]> {
        self.ledger(gameweek).map(|t| t.transfers_in.as_slice())
    }

    pub fn transfers_out(&self, gameweek: u32) -> Option<&[PlayerRef]> {
        self.ledger(gameweek).map(|t| t.transfers_out.as_slice())
    }

    pub fn transfer_count(&self, gameweek: u32) -> Option<u32> {
        self.ledger(gameweek).map(|t| t.transfers_made)
    }

    /// `None` for the first gameweek, which has no transfers.
    pub fn free_transfers_available(&self, gameweek: u32) -> Option<u32> {
        self.ledger(gameweek).map(|t| t.free_transfers_available)
    }

    pub fn free_transfers_banked(&self, gameweek: u32) -> Option<u32> {
        self.plan(gameweek).map(|p| p.free_transfers_banked)
    }

    pub fn hits(&self, gameweek: u32) -> Option<u32> {
        self.plan(gameweek).map(GameweekPlan::hits)
    }

    pub fn breakdown(&self, gameweek: u32) -> Option<&PointsBreakdown> {
        self.plan(gameweek).map(|p| &p.points)
    }

    fn ledger(&self, gameweek: u32) -> Option<&TransferLedger> {
        self.plan(gameweek).and_then(|p| p.transfers.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: u32, starter: bool, captain: bool) -> SquadSlot {
        SquadSlot {
            player: PlayerRef {
                id: PlayerId(id),
                name: format!("P{id}"),
                team: "T".into(),
                position: Position::Midfielder,
                cost: Cost(60),
            },
            expected_points: 2.0,
            starter,
            captain,
        }
    }

    fn plan(gameweek: u32, hits: Option<u32>, cost: u32) -> GameweekPlan {
        GameweekPlan {
            gameweek,
            squad: vec![slot(1, true, true), slot(2, false, false)],
            transfers: hits.map(|hits| TransferLedger {
                transfers_in: vec![slot(2, false, false).player],
                transfers_out: vec![slot(3, false, false).player],
                transfers_made: hits + 1,
                free_transfers_available: 1,
                hits,
            }),
            free_transfers_banked: 1,
            chips: ChipUsage {
                bench_boost: gameweek == 2,
                triple_captain: false,
            },
            squad_cost: Cost(cost),
            points: PointsBreakdown {
                starting_xi: 10.0,
                captain_bonus: 4.0,
                bench_boost: 0.0,
                triple_captain_bonus: 0.0,
                hit_penalty: 4.0 * hits.unwrap_or(0) as f64,
            },
        }
    }

    #[test]
    fn totals_come_from_final_week_and_sum_of_hits() {
        let h = RosterHistory::from_plans(
            vec![plan(1, None, 990), plan(2, Some(1), 1000), plan(3, Some(2), 985)],
            30.0,
        );
        assert_eq!(h.total_cost(), Cost(985));
        assert_eq!(h.total_hits(), 3);
        assert_eq!(h.total_points(), 30.0);
        assert_eq!(h.gameweeks().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn per_week_accessors() {
        let h = RosterHistory::from_plans(vec![plan(1, None, 990), plan(2, Some(1), 1000)], 20.0);

        assert!(h.plan(3).is_none());
        assert_eq!(h.squad(1).map(<[SquadSlot]>::len), Some(2));
        assert_eq!(h.final_squad().map(<[SquadSlot]>::len), Some(2));
        assert_eq!(h.squad_cost(1), Some(Cost(990)));
        assert_eq!(h.transfers_in(1), None);
        assert_eq!(h.free_transfers_available(1), None);
        assert_eq!(h.free_transfers_available(2), Some(1));
        assert_eq!(h.free_transfers_banked(1), Some(1));
        assert_eq!(h.transfer_count(2), Some(2));
        assert_eq!(h.transfers_out(2).unwrap()[0].id, PlayerId(3));
        assert_eq!(h.hits(2), Some(1));
        assert_eq!(h.breakdown(2).unwrap().total(), 10.0);

        let chips = h.chip_usage();
        assert!(!chips[&1].any());
        assert!(chips[&2].bench_boost);

        let p = h.plan(1).unwrap();
        assert_eq!(p.captain().unwrap().player.id, PlayerId(1));
        assert_eq!(p.starting_xi().count(), 1);
        assert_eq!(p.bench().count(), 1);
    }

    #[test]
    fn empty_history_reports_zeros() {
        let h = RosterHistory::default();
        assert!(h.is_empty());
        assert_eq!(h.total_cost(), Cost(0));
        assert_eq!(h.total_points(), 0.0);
        assert_eq!(h.total_hits(), 0);
        assert!(h.chip_usage().is_empty());
        assert!(h.final_squad().is_none());
    }

    #[test]
    fn squad_slot_flattens_player_fields() {
        let json = serde_json::to_value(slot(7, true, false)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["position"], "MID");
        assert_eq!(json["starter"], true);
    }
}
