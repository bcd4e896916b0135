// Player identity, position, and cost types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Squad composition constants
// ---------------------------------------------------------------------------

pub const SQUAD_SIZE: usize = 15;
pub const STARTING_XI_SIZE: usize = 11;

/// Football positions used for squad quotas and formation minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Parse a position string into a Position enum.
    ///
    /// Accepts the FPL abbreviations (GK, DEF, MID, FWD) plus the long-form
    /// aliases GKP/GOALKEEPER, DEFENDER, MIDFIELDER, FORWARD. Case-insensitive.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GK" | "GKP" | "GOALKEEPER" => Some(Position::Goalkeeper),
            "DEF" | "DEFENDER" => Some(Position::Defender),
            "MID" | "MIDFIELDER" => Some(Position::Midfielder),
            "FWD" | "FORWARD" => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Exact number of players of this position in a 15-man squad.
    pub fn squad_quota(&self) -> usize {
        match self {
            Position::Goalkeeper => 2,
            Position::Defender => 5,
            Position::Midfielder => 5,
            Position::Forward => 3,
        }
    }

    /// Minimum starters of this position in any legal formation.
    /// Goalkeepers are exact (always one), outfield positions are lower bounds.
    pub fn min_starters(&self) -> usize {
        match self {
            Position::Goalkeeper => 1,
            Position::Defender => 3,
            Position::Midfielder => 2,
            Position::Forward => 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Identity and cost
// ---------------------------------------------------------------------------

/// Stable upstream player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player price in tenths of a million (the FPL `now_cost` unit), so 45 is £4.5m.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cost(pub u32);

impl Cost {
    /// Convert a price in millions (e.g. 4.5) to the fixed-point unit.
    /// Returns `None` for negative or non-finite input.
    pub fn from_millions(millions: f64) -> Option<Self> {
        if !millions.is_finite() || millions < 0.0 {
            return None;
        }
        let tenths = (millions * 10.0).round();
        if tenths > u32::MAX as f64 {
            return None;
        }
        Some(Cost(tenths as u32))
    }

    pub fn tenths(&self) -> u32 {
        self.0
    }
}

impl std::iter::Sum for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Self {
        Cost(iter.map(|c| c.0).sum())
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{}.{}m", self.0 / 10, self.0 % 10)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One row of the score table: static attributes plus projected points keyed
/// by calendar gameweek number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: Position,
    pub cost: Cost,
    pub expected_points: BTreeMap<u32, f64>,
}

impl Player {
    /// Projected points for a calendar gameweek, if the table covers it.
    pub fn points_for(&self, gameweek: u32) -> Option<f64> {
        self.expected_points.get(&gameweek).copied()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
