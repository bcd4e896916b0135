// Score table: the per-player, per-gameweek projected points the optimizer
// consumes, plus CSV loading.
//
// CSV layout: the fixed columns `id,name,team,position,cost` (cost in
// millions, e.g. 4.5) followed by one column per gameweek named `gw<N>`
// (e.g. `gw7,gw8,gw9`). Blank gameweek cells are left absent rather than
// defaulted, so horizon coverage is checked where the horizon is known.

use crate::player::{Cost, Player, PlayerId, Position};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Columns every score-table CSV must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["id", "name", "team", "position", "cost"];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScoreTableError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("score table is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("invalid row at line {line}: {message}")]
    InvalidRow { line: u64, message: String },

    #[error("duplicate player id {0}")]
    DuplicateId(PlayerId),

    #[error("score table contains no players")]
    Empty,
}

// ---------------------------------------------------------------------------
// ScoreTable
// ---------------------------------------------------------------------------

/// Immutable collection of players in a fixed order. The position of a player
/// in `players()` is its dense index in every optimizer variable table.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    players: Vec<Player>,
    by_id: HashMap<PlayerId, usize>,
}

impl ScoreTable {
    pub fn new(players: Vec<Player>) -> Result<Self, ScoreTableError> {
        if players.is_empty() {
            return Err(ScoreTableError::Empty);
        }
        let mut by_id = HashMap::with_capacity(players.len());
        for (idx, player) in players.iter().enumerate() {
            if by_id.insert(player.id, idx).is_some() {
                return Err(ScoreTableError::DuplicateId(player.id));
            }
        }
        Ok(Self { players, by_id })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player(&self, idx: usize) -> &Player {
        &self.players[idx]
    }

    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Indices of every player whose name matches exactly.
    pub fn indices_named(&self, name: &str) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.name == name)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Earliest gameweek any player has a projection for.
    pub fn first_gameweek(&self) -> Option<u32> {
        self.players
            .iter()
            .filter_map(|p| p.expected_points.keys().next().copied())
            .min()
    }

    /// Distinct team names in sorted order.
    pub fn teams(&self) -> BTreeSet<&str> {
        self.players.iter().map(|p| p.team.as_str()).collect()
    }

    /// Indices of the players belonging to each team, keyed by team name.
    pub fn players_by_team(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut map: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (idx, player) in self.players.iter().enumerate() {
            map.entry(player.team.as_str()).or_default().push(idx);
        }
        map
    }

    pub fn indices_at(&self, position: Position) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.position == position)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Load a score table from a CSV file.
    pub fn load_csv(path: &Path) -> Result<Self, ScoreTableError> {
        let file = std::fs::File::open(path).map_err(|e| ScoreTableError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_csv_reader(file)
    }

    /// Parse a score table from any CSV reader.
    pub fn from_csv_reader<R: Read>(rdr: R) -> Result<Self, ScoreTableError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
        let headers = reader.headers()?.clone();
        let layout = ColumnLayout::from_headers(&headers)?;

        let mut players = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            players.push(layout.parse_record(&record, line)?);
        }
        debug!(
            "parsed {} players with {} gameweek columns",
            players.len(),
            layout.gameweeks.len()
        );
        Self::new(players)
    }
}

// ---------------------------------------------------------------------------
// CSV column handling (private)
// ---------------------------------------------------------------------------

struct ColumnLayout {
    id: usize,
    name: usize,
    team: usize,
    position: usize,
    cost: usize,
    /// (column index, gameweek number)
    gameweeks: Vec<(usize, u32)>,
}

fn cell(record: &csv::StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

/// Parse `gw7` / `GW7` into 7.
fn gameweek_from_header(header: &str) -> Option<u32> {
    let lower = header.to_ascii_lowercase();
    lower.strip_prefix("gw")?.parse().ok()
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ScoreTableError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        };

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| find(**c).is_none())
            .map(|c| c.to_string())
            .collect();

        let gameweeks: Vec<(usize, u32)> = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| gameweek_from_header(h).map(|gw| (idx, gw)))
            .collect();

        if !missing.is_empty() || gameweeks.is_empty() {
            let mut missing = missing;
            if gameweeks.is_empty() {
                missing.push("gw<N>".to_string());
            }
            return Err(ScoreTableError::MissingColumns(missing));
        }

        // Every required column was found above.
        let [id, name, team, position, cost] = REQUIRED_COLUMNS.map(|c| find(c).unwrap_or(0));

        Ok(Self {
            id,
            name,
            team,
            position,
            cost,
            gameweeks,
        })
    }

    fn parse_record(&self, record: &csv::StringRecord, line: u64) -> Result<Player, ScoreTableError> {
        let field = |idx: usize| cell(record, idx);
        let invalid = |message: String| ScoreTableError::InvalidRow { line, message };

        let id: u32 = field(self.id)
            .parse()
            .map_err(|_| invalid(format!("bad id '{}'", field(self.id))))?;

        let name = field(self.name).to_string();
        if name.is_empty() {
            return Err(invalid("empty name".into()));
        }
        let team = field(self.team).to_string();
        if team.is_empty() {
            return Err(invalid(format!("empty team for '{name}'")));
        }

        let position = Position::from_str_pos(field(self.position))
            .ok_or_else(|| invalid(format!("unknown position '{}' for '{name}'", field(self.position))))?;

        let cost = field(self.cost)
            .parse::<f64>()
            .ok()
            .and_then(Cost::from_millions)
            .ok_or_else(|| invalid(format!("bad cost '{}' for '{name}'", field(self.cost))))?;

        let mut expected_points = BTreeMap::new();
        for &(col, gw) in &self.gameweeks {
            let raw = field(col);
            if raw.is_empty() {
                continue;
            }
            let points: f64 = raw
                .parse()
                .map_err(|_| invalid(format!("bad points '{raw}' for '{name}' in gw{gw}")))?;
            expected_points.insert(gw, points);
        }

        Ok(Player {
            id: PlayerId(id),
            name,
            team,
            position,
            cost,
            expected_points,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
