//! Short-lived duty-report cache.
//!
//! Duty membership changes at hour granularity and roster data changes only
//! on ingestion, so the last report can be re-served for a short window.
//! The cached slot is keyed by (roster generation, day, hour); a successful
//! ingestion bumps the shared generation counter, which drops anything
//! cached before the table swap. A hit must be indistinguishable from a
//! fresh computation.

use crate::duty_resolver::DutyReport;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Monotone counter shared between ingestion and resolvers. Cloning hands
/// out another handle to the same counter.
#[derive(Debug, Clone, Default)]
pub struct RosterGeneration(Arc<AtomicU64>);

impl RosterGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by ingestion after a successful roster replace.
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Longest a cached report may be served.
const MAX_STALENESS: Duration = Duration::from_secs(30);

struct CacheSlot {
    generation: u64,
    day: u32,
    hour: u32,
    stored_at: Instant,
    report: DutyReport,
}

pub struct DutyCache {
    generation: RosterGeneration,
    slot: Mutex<Option<CacheSlot>>,
}

impl DutyCache {
    pub fn new(generation: RosterGeneration) -> Self {
        Self {
            generation,
            slot: Mutex::new(None),
        }
    }

    pub fn lookup(&self, now: NaiveDateTime) -> Option<DutyReport> {
        let slot = self.slot.lock().ok()?;
        let cached = slot.as_ref()?;
        if cached.generation != self.generation.current() {
            return None;
        }
        if cached.day != now.day() || cached.hour != now.hour() {
            return None;
        }
        if cached.stored_at.elapsed() > MAX_STALENESS {
            return None;
        }
        Some(cached.report.clone())
    }

    pub fn store(&self, now: NaiveDateTime, report: DutyReport) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(CacheSlot {
                generation: self.generation.current(),
                day: now.day(),
                hour: now.hour(),
                stored_at: Instant::now(),
                report,
            });
        }
    }
}
