//! Duty resolver tests — window boundaries, overnight continuation, the
//! late-afternoon special case, and the no-schedule distinction.

use chrono::{NaiveDate, NaiveDateTime};
use rme_core::{
    cache::RosterGeneration,
    config::DeskConfig,
    duty_resolver::{resolve, DutyResolver, DutyStatus},
    roster_ingest::{RosterEntry, RosterIngest, ScheduleTable},
    store::DeskStore,
};

fn build() -> (DeskStore, DutyResolver, RosterGeneration) {
    let store = DeskStore::in_memory().expect("open in-memory store");
    store.migrate().expect("migrate");
    let generation = RosterGeneration::new();
    let resolver = DutyResolver::new(DeskConfig::builtin(), generation.clone());
    (store, resolver, generation)
}

fn seed(store: &mut DeskStore, entries: &[(&str, u8, &str)]) {
    let entries: Vec<RosterEntry> = entries
        .iter()
        .map(|(person, day, code)| RosterEntry {
            person: person.to_string(),
            day: *day,
            shift_code: code.to_string(),
        })
        .collect();
    store.replace_roster(&entries).expect("replace roster");
}

/// March 2026 has 31 days, which keeps day arithmetic simple.
fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, day)
        .expect("valid day")
        .and_hms_opt(hour, 0, 0)
        .expect("valid hour")
}

fn staff_at(store: &DeskStore, resolver: &DutyResolver, now: NaiveDateTime) -> Vec<String> {
    let report = resolver.active_staff(store, now).expect("resolve");
    assert_eq!(report.status, DutyStatus::Ok);
    report.staff
}

/// A night entry on day D keeps its holder on duty until 07:00 on day D+1.
#[test]
fn night_shift_continues_past_midnight() {
    let (mut store, resolver, _) = build();
    seed(&mut store, &[("Teguh", 10, "M")]);

    assert_eq!(staff_at(&store, &resolver, at(11, 0)), vec!["Teguh"]);
    assert_eq!(staff_at(&store, &resolver, at(11, 6)), vec!["Teguh"]);
    assert!(staff_at(&store, &resolver, at(11, 7)).is_empty());
    assert!(staff_at(&store, &resolver, at(11, 8)).is_empty());
}

/// The same entry puts its holder on duty from 21:00 on day D itself.
#[test]
fn night_shift_starts_at_21() {
    let (mut store, resolver, _) = build();
    seed(&mut store, &[("Teguh", 10, "M")]);

    assert!(staff_at(&store, &resolver, at(10, 20)).is_empty());
    assert_eq!(staff_at(&store, &resolver, at(10, 21)), vec!["Teguh"]);
    assert_eq!(staff_at(&store, &resolver, at(10, 23)), vec!["Teguh"]);
    // Before the shift starts, the holder is off all day.
    assert!(staff_at(&store, &resolver, at(10, 12)).is_empty());
}

/// Morning runs 07:00–16:00 on the scheduled day only.
#[test]
fn morning_window_boundaries() {
    let (mut store, resolver, _) = build();
    seed(&mut store, &[("Rey", 10, "P")]);

    assert!(staff_at(&store, &resolver, at(10, 6)).is_empty());
    assert_eq!(staff_at(&store, &resolver, at(10, 7)), vec!["Rey"]);
    assert_eq!(staff_at(&store, &resolver, at(10, 15)), vec!["Rey"]);
    assert!(staff_at(&store, &resolver, at(10, 16)).is_empty());
    // A morning shift never continues into the next day.
    assert!(staff_at(&store, &resolver, at(11, 8)).is_empty());
}

/// The combined morning+afternoon code carries the morning window.
#[test]
fn combined_code_takes_morning_window() {
    let (mut store, resolver, _) = build();
    seed(&mut store, &[("Jaka", 10, "PS")]);

    assert_eq!(staff_at(&store, &resolver, at(10, 10)), vec!["Jaka"]);
    assert!(staff_at(&store, &resolver, at(10, 18)).is_empty());
}

/// Night is checked before morning: a code carrying the night letter
/// resolves as a night shift even when it also carries a day letter.
#[test]
fn night_checked_before_morning() {
    let (mut store, resolver, _) = build();
    seed(&mut store, &[("Ferdi", 10, "MP")]);

    assert!(staff_at(&store, &resolver, at(10, 10)).is_empty());
    assert_eq!(staff_at(&store, &resolver, at(10, 22)), vec!["Ferdi"]);
    assert_eq!(staff_at(&store, &resolver, at(11, 5)), vec!["Ferdi"]);
}

/// A regular afternoon ends at 21:00; the designated late-afternoon
/// technician covers one extra hour.
#[test]
fn afternoon_limit_differs_for_anchor() {
    let (mut store, resolver, _) = build();
    // "Udin" is the built-in late-afternoon anchor.
    seed(&mut store, &[("Teguh", 10, "S"), ("Udin", 10, "S")]);

    assert!(staff_at(&store, &resolver, at(10, 13)).is_empty());
    assert_eq!(
        staff_at(&store, &resolver, at(10, 14)),
        vec!["Teguh", "Udin"]
    );
    assert_eq!(
        staff_at(&store, &resolver, at(10, 20)),
        vec!["Teguh", "Udin"]
    );
    assert_eq!(staff_at(&store, &resolver, at(10, 21)), vec!["Udin"]);
    assert!(staff_at(&store, &resolver, at(10, 22)).is_empty());
}

/// The anchor's extra hour applies to the strict afternoon code only.
#[test]
fn anchor_extension_limited_to_afternoon() {
    let (mut store, resolver, _) = build();
    seed(&mut store, &[("Udin", 10, "P")]);

    assert_eq!(staff_at(&store, &resolver, at(10, 15)), vec!["Udin"]);
    assert!(staff_at(&store, &resolver, at(10, 16)).is_empty());
}

/// Explicit off codes and unrecognized codes never put anyone on duty.
#[test]
fn off_and_unknown_codes_are_inert() {
    let (mut store, resolver, _) = build();
    seed(
        &mut store,
        &[
            ("Isfan", 10, "L"),
            ("Udin", 10, "LL"),
            ("Rey", 10, "/L"),
            ("Jaka", 10, "OFF"),
            ("Ferdi", 10, "X"),
        ],
    );

    for hour in [0, 6, 10, 15, 20, 23] {
        assert!(
            staff_at(&store, &resolver, at(10, hour)).is_empty(),
            "hour {hour} should have nobody on duty"
        );
    }
}

/// An empty roster table is "no schedule loaded", which callers must be
/// able to tell apart from "roster loaded, nobody on duty".
#[test]
fn no_schedule_distinct_from_no_standby() {
    let (store, resolver, _) = build();
    let report = resolver.active_staff(&store, at(10, 10)).unwrap();
    assert_eq!(report.status, DutyStatus::NoSchedule);
    assert!(report.staff.is_empty());

    let (mut store, resolver, _) = build();
    seed(&mut store, &[("Teguh", 10, "L")]);
    let report = resolver.active_staff(&store, at(10, 10)).unwrap();
    assert_eq!(report.status, DutyStatus::Ok);
    assert!(report.staff.is_empty());
}

/// Duplicate roster rows collapse and the result is sorted.
#[test]
fn staff_sorted_and_deduplicated() {
    let (mut store, resolver, _) = build();
    seed(
        &mut store,
        &[
            ("Teguh", 10, "P"),
            ("Teguh", 10, "P"),
            ("Ferdi", 10, "P"),
        ],
    );

    assert_eq!(
        staff_at(&store, &resolver, at(10, 9)),
        vec!["Ferdi", "Teguh"]
    );
}

/// The pure rule evaluation gives the same answer as the store-backed
/// resolver.
#[test]
fn pure_resolve_matches_resolver() {
    let entries = vec![RosterEntry {
        person: "Teguh".to_string(),
        day: 10,
        shift_code: "M".to_string(),
    }];
    let anchor = "Udin".to_string();

    assert_eq!(resolve(&entries, at(11, 6), &anchor), vec!["Teguh"]);
    assert!(resolve(&entries, at(11, 8), &anchor).is_empty());
}

/// A successful re-ingestion invalidates any cached report: queries after
/// the swap see the new roster even within the cache staleness window.
#[test]
fn reingestion_invalidates_cached_report() {
    let (mut store, resolver, generation) = build();
    let ingest = RosterIngest::new(DeskConfig::builtin(), generation);

    let morning_teguh = ScheduleTable {
        rows: vec![roster_row("Teguh Adi Pradana", 10, "P")],
    };
    assert!(ingest.ingest(&mut store, &morning_teguh));
    assert_eq!(staff_at(&store, &resolver, at(10, 9)), vec!["Teguh"]);

    let morning_rey = ScheduleTable {
        rows: vec![roster_row("Rey Firmansyah", 10, "P")],
    };
    assert!(ingest.ingest(&mut store, &morning_rey));
    assert_eq!(staff_at(&store, &resolver, at(10, 9)), vec!["Rey"]);
}

/// End to end: ingest a grid scheduling Teguh for a day-1 morning, then
/// resolve inside and outside the window.
#[test]
fn ingested_morning_resolves_end_to_end() {
    let (mut store, resolver, generation) = build();
    let ingest = RosterIngest::new(DeskConfig::builtin(), generation);

    let table = ScheduleTable {
        rows: vec![roster_row("Teguh Adi Pradana", 1, "P")],
    };
    assert!(ingest.ingest(&mut store, &table));

    let report = resolver.active_staff(&store, at(1, 10)).unwrap();
    assert_eq!(report.status, DutyStatus::Ok);
    assert_eq!(report.staff, vec!["Teguh"]);

    let report = resolver.active_staff(&store, at(1, 18)).unwrap();
    assert_eq!(report.status, DutyStatus::Ok);
    assert!(report.staff.is_empty());
}

/// Label column, name column, then one cell per day of month.
fn roster_row(name: &str, day: u8, code: &str) -> Vec<String> {
    let mut cells = vec![String::new(); 33];
    cells[1] = name.to_string();
    cells[day as usize + 1] = code.to_string();
    cells
}
