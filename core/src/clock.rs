//! Clinic wall clock — the production source of "now".
//!
//! The duty resolver is pure over a caller-supplied instant; this clock is
//! where that instant comes from outside of tests. The clinic operates on a
//! fixed UTC offset (no DST), so a `FixedOffset` is the whole story.

use chrono::{FixedOffset, NaiveDateTime, Utc};

pub struct ClinicClock {
    offset: FixedOffset,
}

impl ClinicClock {
    /// Offsets outside ±23 h are clamped into range.
    pub fn new(utc_offset_hours: i32) -> Self {
        let secs = utc_offset_hours.clamp(-23, 23) * 3600;
        let offset = FixedOffset::east_opt(secs).expect("clamped offset is in range");
        Self { offset }
    }

    /// Current local date-time in the clinic's operating timezone.
    pub fn now_local(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}
