//! Static clue and completion-code tables.
//!
//! Both tables are pipe-delimited text: the first row is a header and the
//! first column of every row is a label, both discarded. Remaining cells are
//! indexed by station, rows by team. A reserved `BREAK` cell marks the
//! boundary between phase one and phase two and must sit at the same position
//! in both tables. Tables are parsed once at startup and immutable for the
//! process lifetime.
//!
//! Every lookup goes through bounds-checked accessors returning `Result`, so
//! an out-of-range station index surfaces as a loud [`ContentError`] instead
//! of a silent panic.

use std::path::Path;

use thiserror::Error;

use crate::TeamNumber;

/// Reserved cell value marking the phase boundary.
pub const BREAK_SENTINEL: &str = "BREAK";

/// Prefix marking a clue cell whose payload is an image asset, not text.
pub const PHOTO_MARKER: &str = "*photo*";

/// One stop in the hunt sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Station {
    /// A text clue, with `\n` escapes already rendered as line breaks.
    Clue(String),
    /// An image clue; `asset` names the picture to send.
    PhotoClue { asset: String },
    /// The phase boundary. Never shown as a numbered clue.
    Break,
}

/// Errors from parsing or querying the content tables.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {which} table: {source}")]
    Io {
        which: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{which} table has no team rows")]
    EmptyTable { which: &'static str },
    #[error("clue table has {clue_teams} teams but code table has {code_teams}")]
    TeamCountMismatch {
        clue_teams: usize,
        code_teams: usize,
    },
    #[error("team {team}: clue row has {clues} stations but code row has {codes}")]
    RowLengthMismatch {
        team: TeamNumber,
        clues: usize,
        codes: usize,
    },
    #[error("team {team}: no {BREAK_SENTINEL} cell in row")]
    MissingBreak { team: TeamNumber },
    #[error("team {team}: more than one {BREAK_SENTINEL} cell in a row")]
    MultipleBreaks { team: TeamNumber },
    #[error("team {team}: clue break at station {clue_position} but code break at {code_position:?}")]
    BreakPositionMismatch {
        team: TeamNumber,
        clue_position: usize,
        code_position: Option<usize>,
    },
    #[error("team {team}: {BREAK_SENTINEL} cannot be the first station")]
    BreakAtStart { team: TeamNumber },
    #[error("team {team}: photo clue at station {index} names no asset")]
    EmptyPhotoAsset { team: TeamNumber, index: usize },
    #[error("unknown team {team} (tables have {team_count} teams)")]
    UnknownTeam { team: TeamNumber, team_count: usize },
    #[error("team {team}: station index {index} out of bounds (table has {station_count})")]
    StationOutOfBounds {
        team: TeamNumber,
        index: usize,
        station_count: usize,
    },
    #[error("team {team}: no completion code exists at the break (station {index})")]
    CodeAtBreak { team: TeamNumber, index: usize },
}

/// Per-team row: stations and the parallel completion codes.
///
/// `codes` is `None` exactly at the break position.
#[derive(Debug, Clone)]
struct TeamContent {
    stations: Vec<Station>,
    codes: Vec<Option<String>>,
    break_position: usize,
}

/// Immutable clue/code lookup tables for every team.
#[derive(Debug, Clone)]
pub struct ContentTables {
    teams: Vec<TeamContent>,
}

impl ContentTables {
    /// Parse both tables from pipe-delimited text.
    ///
    /// Validates the shape invariants up front so the state machine can rely
    /// on them: matching team counts, equal row lengths per team, exactly one
    /// break per team at the same position in both tables, and a non-empty
    /// phase one.
    pub fn parse(clues_src: &str, codes_src: &str) -> Result<Self, ContentError> {
        let clue_rows = parse_rows(clues_src);
        let code_rows = parse_rows(codes_src);

        if clue_rows.is_empty() {
            return Err(ContentError::EmptyTable { which: "clue" });
        }
        if code_rows.is_empty() {
            return Err(ContentError::EmptyTable { which: "code" });
        }
        if clue_rows.len() != code_rows.len() {
            return Err(ContentError::TeamCountMismatch {
                clue_teams: clue_rows.len(),
                code_teams: code_rows.len(),
            });
        }

        let mut teams = Vec::with_capacity(clue_rows.len());
        for (row_index, (clue_row, code_row)) in clue_rows.iter().zip(code_rows.iter()).enumerate()
        {
            let team = TeamNumber(row_index as u32 + 1);
            teams.push(parse_team(team, clue_row, code_row)?);
        }

        Ok(Self { teams })
    }

    /// Load and parse both tables from disk.
    pub fn load(clues_path: &Path, codes_path: &Path) -> Result<Self, ContentError> {
        let clues_src = std::fs::read_to_string(clues_path).map_err(|source| ContentError::Io {
            which: "clue",
            source,
        })?;
        let codes_src = std::fs::read_to_string(codes_path).map_err(|source| ContentError::Io {
            which: "code",
            source,
        })?;
        Self::parse(&clues_src, &codes_src)
    }

    /// Number of teams in the tables.
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// All valid team numbers, in order.
    pub fn team_numbers(&self) -> impl Iterator<Item = TeamNumber> + '_ {
        (1..=self.teams.len() as u32).map(TeamNumber)
    }

    /// Parse free-text input as a team number, accepting surrounding
    /// whitespace. Returns `None` unless the value is in `1..=team_count`.
    pub fn parse_team_number(&self, text: &str) -> Option<TeamNumber> {
        let n: u32 = text.trim().parse().ok()?;
        if n >= 1 && n as usize <= self.teams.len() {
            Some(TeamNumber(n))
        } else {
            None
        }
    }

    fn team(&self, team: TeamNumber) -> Result<&TeamContent, ContentError> {
        self.teams
            .get(team.index())
            .filter(|_| team.0 >= 1)
            .ok_or(ContentError::UnknownTeam {
                team,
                team_count: self.teams.len(),
            })
    }

    /// Number of stations in a team's row (break included).
    pub fn station_count(&self, team: TeamNumber) -> Result<usize, ContentError> {
        Ok(self.team(team)?.stations.len())
    }

    /// The station at `index` for `team`.
    pub fn station(&self, team: TeamNumber, index: usize) -> Result<&Station, ContentError> {
        let row = self.team(team)?;
        row.stations
            .get(index)
            .ok_or(ContentError::StationOutOfBounds {
                team,
                index,
                station_count: row.stations.len(),
            })
    }

    /// The completion code expected at `index` for `team`.
    ///
    /// Asking for the code at the break position is an invariant violation:
    /// the state machine never awaits a code there.
    pub fn code(&self, team: TeamNumber, index: usize) -> Result<&str, ContentError> {
        let row = self.team(team)?;
        let slot = row.codes.get(index).ok_or(ContentError::StationOutOfBounds {
            team,
            index,
            station_count: row.codes.len(),
        })?;
        slot.as_deref()
            .ok_or(ContentError::CodeAtBreak { team, index })
    }

    /// Index of the break sentinel in this team's row.
    pub fn break_position(&self, team: TeamNumber) -> Result<usize, ContentError> {
        Ok(self.team(team)?.break_position)
    }

    /// The first phase-two station: one past the break.
    pub fn post_break_index(&self, team: TeamNumber) -> Result<usize, ContentError> {
        Ok(self.team(team)?.break_position + 1)
    }

    /// The station number shown to players.
    ///
    /// The break sentinel occupies a storage slot but is not a station, so
    /// numbering compensates: stations at or before the break display
    /// `index + 1`, stations after it display the raw `index`. Displayed
    /// numbers are part of the event's printed materials; do not change this
    /// without a product decision.
    pub fn display_number(&self, team: TeamNumber, index: usize) -> Result<usize, ContentError> {
        let row = self.team(team)?;
        if index >= row.stations.len() {
            return Err(ContentError::StationOutOfBounds {
                team,
                index,
                station_count: row.stations.len(),
            });
        }
        if index <= row.break_position {
            Ok(index + 1)
        } else {
            Ok(index)
        }
    }
}

/// Split a table into rows of cells, discarding the header row and the label
/// column. Blank lines are skipped.
fn parse_rows(src: &str) -> Vec<Vec<String>> {
    src.lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .map(|line| {
            line.split('|')
                .skip(1)
                .map(|cell| cell.to_string())
                .collect()
        })
        .collect()
}

fn parse_team(
    team: TeamNumber,
    clue_row: &[String],
    code_row: &[String],
) -> Result<TeamContent, ContentError> {
    if clue_row.len() != code_row.len() {
        return Err(ContentError::RowLengthMismatch {
            team,
            clues: clue_row.len(),
            codes: code_row.len(),
        });
    }

    let break_positions: Vec<usize> = clue_row
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.as_str() == BREAK_SENTINEL)
        .map(|(i, _)| i)
        .collect();
    let break_position = match break_positions.as_slice() {
        [] => return Err(ContentError::MissingBreak { team }),
        [position] => *position,
        _ => return Err(ContentError::MultipleBreaks { team }),
    };
    if break_position == 0 {
        return Err(ContentError::BreakAtStart { team });
    }

    let code_breaks: Vec<usize> = code_row
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.as_str() == BREAK_SENTINEL)
        .map(|(i, _)| i)
        .collect();
    if code_breaks.len() > 1 {
        return Err(ContentError::MultipleBreaks { team });
    }
    if code_breaks.first().copied() != Some(break_position) {
        return Err(ContentError::BreakPositionMismatch {
            team,
            clue_position: break_position,
            code_position: code_breaks.first().copied(),
        });
    }

    let mut stations = Vec::with_capacity(clue_row.len());
    for (index, cell) in clue_row.iter().enumerate() {
        stations.push(parse_station(team, index, cell)?);
    }

    let codes = code_row
        .iter()
        .map(|cell| {
            if cell.as_str() == BREAK_SENTINEL {
                None
            } else {
                Some(cell.clone())
            }
        })
        .collect();

    Ok(TeamContent {
        stations,
        codes,
        break_position,
    })
}

fn parse_station(team: TeamNumber, index: usize, cell: &str) -> Result<Station, ContentError> {
    if cell == BREAK_SENTINEL {
        return Ok(Station::Break);
    }
    if let Some(asset) = cell.strip_prefix(PHOTO_MARKER) {
        if asset.is_empty() {
            return Err(ContentError::EmptyPhotoAsset { team, index });
        }
        return Ok(Station::PhotoClue {
            asset: asset.to_string(),
        });
    }
    // Clue cells carry literal \n sequences that render as real line breaks.
    Ok(Station::Clue(cell.replace("\\n", "\n")))
}
