// JSON document written to stdout.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fplan_core::Cost;
use fplan_solver::{ChipUsage, Diagnostic, GameweekPlan, SolveOutcome, SolveStatus};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Report<'a> {
    generated_at: DateTime<Utc>,
    status: SolveStatus,
    totals: Totals,
    chips: BTreeMap<u32, ChipUsage>,
    plans: &'a [GameweekPlan],
    diagnostics: &'a [Diagnostic],
}

#[derive(Debug, Serialize)]
struct Totals {
    /// Final week's squad cost, in tenths of a million.
    cost: Cost,
    points: f64,
    hits: u32,
}

pub fn render(outcome: &SolveOutcome, generated_at: DateTime<Utc>) -> serde_json::Result<String> {
    let history = &outcome.history;
    let report = Report {
        generated_at,
        status: outcome.status,
        totals: Totals {
            cost: history.total_cost(),
            points: history.total_points(),
            hits: history.total_hits(),
        },
        chips: history.chip_usage(),
        plans: history.plans(),
        diagnostics: &outcome.diagnostics,
    };
    serde_json::to_string_pretty(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fplan_core::{PlayerId, SquadRule};
    use fplan_solver::RosterHistory;
    use std::time::Duration;

    #[test]
    fn failed_outcome_renders_empty_plan_with_diagnostics() {
        let outcome = SolveOutcome {
            status: SolveStatus::Infeasible,
            history: RosterHistory::default(),
            diagnostics: vec![Diagnostic {
                rule: SquadRule::ForcePlayerId(PlayerId(99)),
                message: "no player with id 99".into(),
            }],
            elapsed: Duration::from_millis(5),
        };
        let at = Utc.with_ymd_and_hms(2025, 8, 15, 18, 30, 0).unwrap();

        let json: serde_json::Value = serde_json::from_str(&render(&outcome, at).unwrap()).unwrap();
        assert_eq!(json["status"], "infeasible");
        assert_eq!(json["generated_at"], "2025-08-15T18:30:00Z");
        assert_eq!(json["totals"]["cost"], 0);
        assert_eq!(json["totals"]["hits"], 0);
        assert!(json["plans"].as_array().unwrap().is_empty());
        assert!(json["chips"].as_object().unwrap().is_empty());
        assert_eq!(json["diagnostics"][0]["message"], "no player with id 99");
        assert!(json.get("elapsed").is_none());
    }
}
