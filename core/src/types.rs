//! Shared primitive types used across the entire crate.

/// Short canonical staff identifier, drawn from the configured roster.
pub type PersonId = String;

/// Day-of-month in [1, 31].
pub type Day = u8;

/// Rowid of a deletion-request task.
pub type TaskId = i64;
