// Decision-variable tables with a fixed (player, week) shape.
//
// Week indices are horizon-relative (`w = 0..N`); `Horizon` maps them to
// calendar gameweeks. Transfer-related tables only exist for `w >= 1`.

use std::ops::Range;

use fplan_core::player::SQUAD_SIZE;

use crate::model::{Model, VarId, VarKind};

/// The ordered run of gameweeks being optimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    start: u32,
    len: usize,
}

impl Horizon {
    pub fn new(start: u32, len: usize) -> Self {
        Self { start, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Calendar gameweek number for horizon week `w`.
    pub fn gameweek(&self, w: usize) -> u32 {
        self.start + w as u32
    }

    pub fn first_gameweek(&self) -> u32 {
        self.start
    }

    pub fn last_gameweek(&self) -> u32 {
        self.gameweek(self.len.saturating_sub(1))
    }

    pub fn weeks(&self) -> Range<usize> {
        0..self.len
    }

    /// Weeks in which transfers can be made (every week after the first).
    pub fn transfer_weeks(&self) -> Range<usize> {
        1.min(self.len)..self.len
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Dense `players x weeks` block of variables, row-major by player.
#[derive(Debug, Clone)]
pub struct PlayerWeekTable {
    weeks: Range<usize>,
    ids: Vec<VarId>,
}

impl PlayerWeekTable {
    fn declare(
        model: &mut Model,
        prefix: &str,
        n_players: usize,
        weeks: Range<usize>,
        kind: VarKind,
        upper: Option<f64>,
    ) -> Self {
        let mut ids = Vec::with_capacity(n_players * weeks.len());
        for p in 0..n_players {
            for w in weeks.clone() {
                ids.push(model.add_var(format!("{prefix}[{p},{w}]"), kind, 0.0, upper));
            }
        }
        Self { weeks, ids }
    }

    pub fn get(&self, p: usize, w: usize) -> VarId {
        debug_assert!(self.weeks.contains(&w), "week {w} outside {:?}", self.weeks);
        self.ids[p * self.weeks.len() + (w - self.weeks.start)]
    }

    pub fn n_players(&self) -> usize {
        if self.weeks.is_empty() {
            0
        } else {
            self.ids.len() / self.weeks.len()
        }
    }

    /// Every player's variable for week `w`, in player order.
    pub fn week(&self, w: usize) -> impl Iterator<Item = VarId> + '_ {
        (0..self.n_players()).map(move |p| self.get(p, w))
    }

    /// The variables of the listed players for week `w`.
    pub fn select<'a>(&'a self, players: &'a [usize], w: usize) -> impl Iterator<Item = VarId> + 'a {
        players.iter().map(move |&p| self.get(p, w))
    }
}

/// One variable per week over a range of weeks.
#[derive(Debug, Clone)]
pub struct WeekTable {
    weeks: Range<usize>,
    ids: Vec<VarId>,
}

impl WeekTable {
    fn declare(
        model: &mut Model,
        prefix: &str,
        weeks: Range<usize>,
        kind: VarKind,
        upper: Option<f64>,
    ) -> Self {
        let ids = weeks
            .clone()
            .map(|w| model.add_var(format!("{prefix}[{w}]"), kind, 0.0, upper))
            .collect();
        Self { weeks, ids }
    }

    pub fn get(&self, w: usize) -> VarId {
        debug_assert!(self.weeks.contains(&w), "week {w} outside {:?}", self.weeks);
        self.ids[w - self.weeks.start]
    }

    pub fn all(&self) -> impl Iterator<Item = VarId> + '_ {
        self.ids.iter().copied()
    }
}

// ---------------------------------------------------------------------------
// Full variable set
// ---------------------------------------------------------------------------

/// Every decision variable of one squad model.
#[derive(Debug, Clone)]
pub struct SquadVars {
    pub squad: PlayerWeekTable,
    pub starter: PlayerWeekTable,
    pub captain: PlayerWeekTable,
    /// 1 iff in the squad but not starting.
    pub is_bench: PlayerWeekTable,
    /// Points a bench player adds when bench boost is active.
    pub bench_boost_pts: PlayerWeekTable,
    /// Extra points the captain adds when triple captain is active.
    pub triple_captain_pts: PlayerWeekTable,
    pub bench_boost: WeekTable,
    pub triple_captain: WeekTable,

    pub transfer_in: PlayerWeekTable,
    pub transfer_out: PlayerWeekTable,
    pub transfers_made: WeekTable,
    pub hits: WeekTable,
    /// Balance entering the following week; `free_transfers[0]` is the initial balance.
    pub free_transfers: WeekTable,
    /// 1 iff week `w` took at least one hit (complementarity selector).
    pub hit_taken: WeekTable,
    /// 1 iff `free_transfers[w]` sits at the balance cap (min selector).
    pub balance_capped: WeekTable,
}

impl SquadVars {
    pub fn declare(model: &mut Model, n_players: usize, horizon: &Horizon, balance_cap: u32) -> Self {
        let all = horizon.weeks();
        let later = horizon.transfer_weeks();
        let one = Some(1.0);
        let max_moves = Some(SQUAD_SIZE as f64);

        let pw = |model: &mut Model, prefix: &str, weeks: Range<usize>, kind: VarKind, upper| {
            PlayerWeekTable::declare(model, prefix, n_players, weeks, kind, upper)
        };

        Self {
            squad: pw(model, "squad", all.clone(), VarKind::Binary, one),
            starter: pw(model, "starter", all.clone(), VarKind::Binary, one),
            captain: pw(model, "captain", all.clone(), VarKind::Binary, one),
            is_bench: pw(model, "is_bench", all.clone(), VarKind::Binary, one),
            bench_boost_pts: pw(model, "bench_boost_pts", all.clone(), VarKind::Continuous, None),
            triple_captain_pts: pw(model, "triple_capt_pts", all.clone(), VarKind::Continuous, None),
            bench_boost: WeekTable::declare(model, "bench_boost", all.clone(), VarKind::Binary, one),
            triple_captain: WeekTable::declare(model, "triple_captain", all.clone(), VarKind::Binary, one),

            transfer_in: pw(model, "transfer_in", later.clone(), VarKind::Binary, one),
            transfer_out: pw(model, "transfer_out", later.clone(), VarKind::Binary, one),
            transfers_made: WeekTable::declare(model, "transfers_made", later.clone(), VarKind::Integer, max_moves),
            hits: WeekTable::declare(model, "hits", later.clone(), VarKind::Integer, max_moves),
            free_transfers: WeekTable::declare(
                model,
                "free_transfers",
                all,
                VarKind::Integer,
                Some(balance_cap as f64),
            ),
            hit_taken: WeekTable::declare(model, "hit_taken", later.clone(), VarKind::Binary, one),
            balance_capped: WeekTable::declare(model, "balance_capped", later, VarKind::Binary, one),
        }
    }
}
