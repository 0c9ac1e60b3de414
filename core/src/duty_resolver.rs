//! Duty resolution — which technicians are on standby at a given instant.
//!
//! Each roster entry for today or yesterday is evaluated against an ordered
//! rule table. The first rule whose shift-code pattern AND day condition
//! both match wins, and that rule's hour window alone decides whether the
//! person is active — no fall-through to later windows. Codes the table
//! does not recognize never put anyone on duty.
//!
//! Night shifts span midnight: the after-midnight portion is attributed to
//! the shift's start day, so a night entry on day D keeps its holder on
//! duty until 07:00 on day D+1.

use crate::{
    cache::{DutyCache, RosterGeneration},
    config::DeskConfig,
    error::CoreResult,
    roster_ingest::RosterEntry,
    store::DeskStore,
    types::{Day, PersonId},
};
use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    /// The roster table is empty — no schedule has been loaded at all.
    NoSchedule,
    /// A roster is loaded; `staff` may still be empty if nobody's window
    /// covers the queried instant.
    Ok,
}

/// Resolver output, shaped for the workflow layer:
/// `{ "status": "no_schedule" | "ok", "staff": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DutyReport {
    pub status: DutyStatus,
    pub staff: Vec<PersonId>,
}

impl DutyReport {
    pub fn no_schedule() -> Self {
        Self {
            status: DutyStatus::NoSchedule,
            staff: Vec::new(),
        }
    }

    pub fn on_duty(staff: Vec<PersonId>) -> Self {
        Self {
            status: DutyStatus::Ok,
            staff,
        }
    }
}

// ── Shift window rules ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum CodePattern {
    /// The normalized code contains this letter anywhere.
    Contains(char),
    /// The normalized code is exactly this string.
    Exactly(&'static str),
}

impl CodePattern {
    fn matches(self, code: &str) -> bool {
        match self {
            CodePattern::Contains(c) => code.contains(c),
            CodePattern::Exactly(s) => code == s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayRef {
    Today,
    Yesterday,
}

struct DutyRule {
    pattern: CodePattern,
    day: DayRef,
    /// Active window, inclusive start / exclusive end, local hours.
    start_hour: u32,
    end_hour: u32,
    /// Exclusive end for the configured late-afternoon anchor, where the
    /// rule differentiates.
    anchor_end_hour: Option<u32>,
}

/// Evaluated top to bottom; first pattern+day match wins. Night is checked
/// before morning so a combined code carrying the night letter resolves as
/// a night shift.
const DUTY_RULES: &[DutyRule] = &[
    // Night continuation: last night's shift runs until 07:00 this morning.
    DutyRule {
        pattern: CodePattern::Contains('M'),
        day: DayRef::Yesterday,
        start_hour: 0,
        end_hour: 7,
        anchor_end_hour: None,
    },
    // Night start: tonight's shift begins at 21:00.
    DutyRule {
        pattern: CodePattern::Contains('M'),
        day: DayRef::Today,
        start_hour: 21,
        end_hour: 24,
        anchor_end_hour: None,
    },
    // Morning, including the combined morning+afternoon code.
    DutyRule {
        pattern: CodePattern::Contains('P'),
        day: DayRef::Today,
        start_hour: 7,
        end_hour: 16,
        anchor_end_hour: None,
    },
    // Strict afternoon; the designated anchor covers one extra hour.
    DutyRule {
        pattern: CodePattern::Exactly("S"),
        day: DayRef::Today,
        start_hour: 14,
        end_hour: 21,
        anchor_end_hour: Some(22),
    },
];

/// Codes that explicitly mean "not working". Everything else the rule table
/// does not match is equally inert — the list exists so the intent is
/// visible, not because the default would differ.
const OFF_CODES: &[&str] = &["L", "LL", "/L", "OFF", ""];

fn entry_is_active(
    entry: &RosterEntry,
    today: Day,
    yesterday: Day,
    hour: u32,
    anchor: &PersonId,
) -> bool {
    let code = entry.shift_code.as_str();
    if OFF_CODES.contains(&code) {
        return false;
    }
    let day_matches = |day: DayRef| match day {
        DayRef::Today => entry.day == today,
        DayRef::Yesterday => entry.day == yesterday,
    };
    let Some(rule) = DUTY_RULES
        .iter()
        .find(|r| r.pattern.matches(code) && day_matches(r.day))
    else {
        return false; // unrecognized code — fail closed
    };
    let end = match rule.anchor_end_hour {
        Some(late) if entry.person == *anchor => late,
        _ => rule.end_hour,
    };
    hour >= rule.start_hour && hour < end
}

/// Pure rule evaluation over already-fetched entries. Returns the
/// deduplicated, sorted set of active staff.
pub fn resolve(entries: &[RosterEntry], now: NaiveDateTime, anchor: &PersonId) -> Vec<PersonId> {
    let today = now.day() as Day;
    let yesterday = (now - Duration::days(1)).day() as Day;
    let hour = now.hour();

    let mut active: Vec<PersonId> = entries
        .iter()
        .filter(|entry| entry_is_active(entry, today, yesterday, hour, anchor))
        .map(|entry| entry.person.clone())
        .collect();
    active.sort();
    active.dedup();
    active
}

// ── Resolver ─────────────────────────────────────────────────────────────────

pub struct DutyResolver {
    config: DeskConfig,
    cache: DutyCache,
}

impl DutyResolver {
    pub fn new(config: DeskConfig, generation: RosterGeneration) -> Self {
        Self {
            config,
            cache: DutyCache::new(generation),
        }
    }

    /// Who is on standby at `now`? Pure read+compute over the stored
    /// roster; recomputing every call gives identical results, the cache
    /// only shortcuts within its staleness bound.
    ///
    /// Store errors propagate — they are the one transient failure mode the
    /// resolver has.
    pub fn active_staff(&self, store: &DeskStore, now: NaiveDateTime) -> CoreResult<DutyReport> {
        if let Some(hit) = self.cache.lookup(now) {
            return Ok(hit);
        }

        if store.roster_len()? == 0 {
            let report = DutyReport::no_schedule();
            self.cache.store(now, report.clone());
            return Ok(report);
        }

        let today = now.day() as Day;
        let yesterday = (now - Duration::days(1)).day() as Day;
        let entries = store.roster_for_days(today, yesterday)?;
        let staff = resolve(&entries, now, &self.config.late_afternoon_anchor);
        let report = DutyReport::on_duty(staff);
        self.cache.store(now, report.clone());
        Ok(report)
    }
}
