// Objective assembly: per-week scoring terms minus transfer-hit penalties.

use fplan_core::config::{ScoringRules, TransferRules};

use crate::model::LinearExpr;
use crate::vars::{Horizon, SquadVars};

/// Validated projected points, dense `players x weeks`.
#[derive(Debug, Clone, PartialEq)]
pub struct Projections {
    n_weeks: usize,
    values: Vec<f64>,
}

impl Projections {
    /// `rows[p][w]` is player `p`'s projection for horizon week `w`.
    pub fn from_rows(rows: Vec<Vec<f64>>, n_weeks: usize) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == n_weeks));
        Self {
            n_weeks,
            values: rows.into_iter().flatten().collect(),
        }
    }

    pub fn get(&self, p: usize, w: usize) -> f64 {
        self.values[p * self.n_weeks + w]
    }

    pub fn n_players(&self) -> usize {
        if self.n_weeks == 0 {
            0
        } else {
            self.values.len() / self.n_weeks
        }
    }
}

/// The scoring components of one gameweek, each a linear expression over the
/// model's variables. Evaluating a component against a solution yields that
/// week's contribution to the objective.
#[derive(Debug, Clone, Default)]
pub struct WeekTerms {
    pub starting_xi: LinearExpr,
    pub captain_bonus: LinearExpr,
    pub bench_boost: LinearExpr,
    pub triple_captain_bonus: LinearExpr,
    /// Points lost to hits, as a positive quantity (subtracted in `total`).
    pub hit_penalty: LinearExpr,
}

impl WeekTerms {
    pub fn total(&self) -> LinearExpr {
        let mut e = LinearExpr::with_capacity(
            self.starting_xi.terms.len() * 2
                + self.bench_boost.terms.len()
                + self.triple_captain_bonus.terms.len()
                + self.hit_penalty.terms.len(),
        );
        e.add_expr(&self.starting_xi);
        e.add_expr(&self.captain_bonus);
        e.add_expr(&self.bench_boost);
        e.add_expr(&self.triple_captain_bonus);
        e.add_expr(&self.hit_penalty.scaled(-1.0));
        e
    }
}

/// Build the scoring terms of every week in the horizon.
pub fn week_terms(
    vars: &SquadVars,
    xp: &Projections,
    horizon: &Horizon,
    scoring: &ScoringRules,
    transfers: &TransferRules,
) -> Vec<WeekTerms> {
    let n = xp.n_players();
    horizon
        .weeks()
        .map(|w| {
            let mut terms = WeekTerms::default();
            for p in 0..n {
                let v = xp.get(p, w);
                terms.starting_xi.add_term(v, vars.starter.get(p, w));
                terms
                    .captain_bonus
                    .add_term(scoring.captain_extra_shares * v, vars.captain.get(p, w));
                terms.bench_boost.add_term(1.0, vars.bench_boost_pts.get(p, w));
                terms
                    .triple_captain_bonus
                    .add_term(1.0, vars.triple_captain_pts.get(p, w));
            }
            if w >= 1 {
                terms
                    .hit_penalty
                    .add_term(transfers.points_per_hit, vars.hits.get(w));
            }
            terms
        })
        .collect()
}

/// The full maximization objective: the sum of every week's total.
pub fn assemble(terms: &[WeekTerms]) -> LinearExpr {
    let mut objective = LinearExpr::new();
    for week in terms {
        objective.add_expr(&week.total());
    }
    objective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    #[test]
    fn projections_are_row_major() {
        let xp = Projections::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2);
        assert_eq!(xp.get(1, 0), 3.0);
        assert_eq!(xp.get(0, 1), 2.0);
        assert_eq!(xp.n_players(), 2);
    }

    #[test]
    fn objective_weights_starters_captain_and_hits() {
        let mut model = Model::new();
        let horizon = Horizon::new(1, 2);
        let vars = SquadVars::declare(&mut model, 2, &horizon, 2);
        let xp = Projections::from_rows(vec![vec![5.0, 0.0], vec![2.0, 3.0]], 2);
        let scoring = ScoringRules::default();
        let transfers = TransferRules::default();

        let terms = week_terms(&vars, &xp, &horizon, &scoring, &transfers);
        let objective = assemble(&terms);

        let mut values = vec![0.0; model.num_vars()];
        // Week 0: both start, player 0 captains. Week 1: player 1 starts and
        // captains, one hit taken.
        values[vars.starter.get(0, 0).index()] = 1.0;
        values[vars.starter.get(1, 0).index()] = 1.0;
        values[vars.captain.get(0, 0).index()] = 1.0;
        values[vars.starter.get(1, 1).index()] = 1.0;
        values[vars.captain.get(1, 1).index()] = 1.0;
        values[vars.hits.get(1).index()] = 1.0;

        assert_eq!(terms[0].starting_xi.evaluate(&values), 7.0);
        assert_eq!(terms[0].captain_bonus.evaluate(&values), 5.0);
        assert_eq!(terms[1].hit_penalty.evaluate(&values), 4.0);
        assert!(terms[0].hit_penalty.terms.is_empty());
        // 7 + 5 + 3 + 3 - 4
        assert_eq!(objective.evaluate(&values), 14.0);
    }

    #[test]
    fn chip_terms_read_bonus_variables() {
        let mut model = Model::new();
        let horizon = Horizon::new(1, 1);
        let vars = SquadVars::declare(&mut model, 1, &horizon, 2);
        let xp = Projections::from_rows(vec![vec![4.0]], 1);
        let terms = week_terms(
            &vars,
            &xp,
            &horizon,
            &ScoringRules::default(),
            &TransferRules::default(),
        );

        let mut values = vec![0.0; model.num_vars()];
        values[vars.bench_boost_pts.get(0, 0).index()] = 4.0;
        values[vars.triple_captain_pts.get(0, 0).index()] = 4.0;
        assert_eq!(terms[0].bench_boost.evaluate(&values), 4.0);
        assert_eq!(terms[0].triple_captain_bonus.evaluate(&values), 4.0);
        assert_eq!(terms[0].total().evaluate(&values), 8.0);
    }
}
