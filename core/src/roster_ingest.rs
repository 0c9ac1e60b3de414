//! Roster ingestion — uploaded schedule grid → normalized
//! (person, day, shift_code) rows.
//!
//! The table-extraction service hands over the first table of the
//! document's first page as ordered rows of cell strings. Row 0 is a header
//! (it never matches a staff alias, so the row loop drops it), column 0 is
//! a row label, column 1 is the staff member's full legal name, and columns
//! 2..=32 map to days 1..=31 of the month.
//!
//! Ingestion is all-or-nothing per upload: a document that yields zero
//! matchable entries leaves the stored roster untouched and reports
//! failure. Parse and store errors never escape `ingest` — the boundary
//! converts everything to a boolean.

use crate::{
    cache::RosterGeneration,
    config::DeskConfig,
    error::CoreResult,
    store::DeskStore,
    types::{Day, PersonId},
};
use serde::Deserialize;

/// Highest day column a roster sheet can carry.
pub const LAST_DAY: Day = 31;

/// One normalized roster fact: `person` works `shift_code` on `day`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub person: PersonId,
    pub day: Day,
    pub shift_code: String,
}

/// The first extractable table of an uploaded schedule document, as the
/// extraction service delivers it: ordered rows of (possibly empty) cells.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleTable {
    pub rows: Vec<Vec<String>>,
}

impl ScheduleTable {
    /// Decode the extraction service's JSON payload.
    pub fn from_json(raw: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Collapse a name cell to a single lowercased line: newlines and runs of
/// whitespace become one space.
fn normalize_name(cell: &str) -> String {
    cell.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalize a shift-code cell: strip every whitespace character (embedded
/// newlines included) and uppercase the rest.
pub fn normalize_shift_code(cell: &str) -> String {
    cell.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

pub struct RosterIngest {
    config: DeskConfig,
    generation: RosterGeneration,
}

impl RosterIngest {
    pub fn new(config: DeskConfig, generation: RosterGeneration) -> Self {
        Self { config, generation }
    }

    /// Ingest one uploaded schedule table. Returns `true` only when the
    /// store now holds this document's roster; on any failure the previous
    /// roster is left untouched.
    pub fn ingest(&self, store: &mut DeskStore, table: &ScheduleTable) -> bool {
        let entries = self.parse_entries(table);
        if entries.is_empty() {
            log::warn!("roster ingestion failed: no row matched a known staff alias");
            return false;
        }
        match store.replace_roster(&entries) {
            Ok(()) => {
                self.generation.bump();
                log::info!("roster replaced: {} entries", entries.len());
                true
            }
            Err(e) => {
                log::warn!("roster ingestion failed: {e}");
                false
            }
        }
    }

    /// Convenience boundary for callers holding the raw upload payload:
    /// a decode failure is an extraction failure, reported as `false`.
    pub fn ingest_json(&self, store: &mut DeskStore, raw: &str) -> bool {
        match ScheduleTable::from_json(raw) {
            Ok(table) => self.ingest(store, &table),
            Err(e) => {
                log::warn!("roster ingestion failed: table extraction error: {e}");
                false
            }
        }
    }

    /// Walk the grid and collect every matchable (person, day, code) fact.
    /// Rows with empty or unrecognized names are dropped without error.
    fn parse_entries(&self, table: &ScheduleTable) -> Vec<RosterEntry> {
        let mut entries = Vec::new();
        for row in &table.rows {
            let Some(name_cell) = row.get(1) else { continue };
            let name = normalize_name(name_cell);
            if name.is_empty() {
                continue;
            }
            let Some(person) = self.match_alias(&name) else {
                log::debug!("roster row dropped: no alias matches {name:?}");
                continue;
            };
            for day in 1..=LAST_DAY {
                let column = day as usize + 1;
                let Some(cell) = row.get(column) else { break };
                let code = normalize_shift_code(cell);
                if code.is_empty() {
                    continue;
                }
                entries.push(RosterEntry {
                    person: person.clone(),
                    day,
                    shift_code: code,
                });
            }
        }
        entries
    }

    /// First alias-table fragment contained in the normalized name wins.
    /// Table order is the only determinism guarantee for names that match
    /// more than one fragment.
    fn match_alias(&self, normalized_name: &str) -> Option<PersonId> {
        self.config
            .aliases
            .iter()
            .find(|rule| normalized_name.contains(&rule.fragment.to_lowercase()))
            .map(|rule| rule.person.clone())
    }
}
