use std::path::{Path, PathBuf};

use fxhash::FxHashSet;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

const DEFAULT_ROSTER_CSV: &str = include_str!("default_roster.csv");


/// One known participant and the team they score for.
///
/// The user id is kept as text. Ids such as `00123` and `123` are different people.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct RosterEntry {
    #[serde(rename = "UserID")]
    pub(crate) user_id: String,
    #[serde(rename = "MemberName")]
    pub(crate) member_name: String,
    #[serde(rename = "TeamName")]
    pub(crate) team_name: String,
    /// Older roster files call this column `Z`.
    #[serde(rename = "League", alias = "Z")]
    pub(crate) league: String,
}


#[derive(Debug, Error)]
pub(crate) enum RosterError {
    #[error("Failed to read roster file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed roster in {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },
    #[error("Duplicate user id {user_id:?} in {origin} (line {line})")]
    DuplicateUserId {
        origin: String,
        user_id: String,
        line: u64,
    },
    #[error("Roster {origin} has no members")]
    Empty { origin: String },
}


/// Where the roster comes from. Without a configured file the compiled in roster is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RosterSource {
    Embedded,
    File(PathBuf),
}


impl RosterSource {
    pub(crate) fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::File(path.to_path_buf()),
            None => Self::Embedded,
        }
    }
}


/// The static table of members, loaded once per run and never mutated.
#[derive(Debug, Clone)]
pub(crate) struct Roster {
    entries: Vec<RosterEntry>,
}


impl Roster {
    pub(crate) fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn team_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.team_name.as_str())
            .collect::<FxHashSet<_>>()
            .len()
    }
}


pub(crate) fn load_roster(source: &RosterSource) -> Result<Roster, RosterError> {
    let roster = match source {
        RosterSource::Embedded => parse_roster(DEFAULT_ROSTER_CSV, "embedded roster")?,
        RosterSource::File(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|source| RosterError::Io { path: path.clone(), source })?;
            parse_roster(&text, &path.display().to_string())?
        }
    };
    info!("Loaded {} members in {} teams", roster.len(), roster.team_count());
    Ok(roster)
}


/// Parses roster CSV text. `origin` only shows up in error messages.
pub(crate) fn parse_roster(text: &str, origin: &str) -> Result<Roster, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let csv_error = |source: csv::Error| RosterError::Csv { origin: origin.to_string(), source };
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut seen = FxHashSet::default();
    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let entry: RosterEntry = record.deserialize(Some(&headers)).map_err(csv_error)?;
        if !seen.insert(entry.user_id.clone()) {
            let line = record.position().map(|position| position.line()).unwrap_or_default();
            return Err(RosterError::DuplicateUserId { origin: origin.to_string(), user_id: entry.user_id, line });
        }
        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(RosterError::Empty { origin: origin.to_string() });
    }
    Ok(Roster { entries })
}
