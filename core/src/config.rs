//! Desk configuration — technician roster, alias table, duty special cases.

use crate::types::PersonId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One alias-table entry: a fragment of a staff member's full legal name as
/// it appears in uploaded rosters, mapped to their short id.
///
/// Matching is case-insensitive substring containment, evaluated in table
/// order with the first hit winning — order is part of the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasRule {
    pub fragment: String,
    pub person: PersonId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    /// The fixed IT technician roster.
    pub staff: Vec<PersonId>,
    /// Ordered full-name-fragment → short-id table for roster ingestion.
    pub aliases: Vec<AliasRule>,
    /// The one technician whose afternoon shift runs to 22:00 instead of 21:00.
    pub late_afternoon_anchor: PersonId,
    /// Clinic operating timezone as a fixed UTC offset in hours (WIB = +7).
    pub utc_offset_hours: i32,
    /// Upper bound on patients per deletion request.
    pub max_patients_per_request: usize,
}

impl DeskConfig {
    /// Load the desk configuration from `<data_dir>/staff.json`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = Path::new(data_dir).join("staff.json");
        let raw = fs::read_to_string(&path)?;
        let config: DeskConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Compiled-in defaults matching the clinic's current IT roster.
    /// Used by tests and as the fallback when no data dir is present.
    pub fn builtin() -> Self {
        let staff = ["Isfan", "Udin", "Rey", "Jaka", "Teguh", "Ferdi", "Hisyam"];
        Self {
            staff: staff.iter().map(|s| s.to_string()).collect(),
            aliases: staff
                .iter()
                .map(|s| AliasRule {
                    fragment: s.to_lowercase(),
                    person: s.to_string(),
                })
                .collect(),
            late_afternoon_anchor: "Udin".to_string(),
            utc_offset_hours: 7,
            max_patients_per_request: 4,
        }
    }
}
