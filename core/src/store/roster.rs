//! Roster table operations — full-replace writes, day-pair reads.

use crate::{error::CoreResult, roster_ingest::RosterEntry, types::Day};
use rusqlite::params;

impl super::DeskStore {
    /// Atomically replace the whole roster with `entries`.
    ///
    /// Swap-then-publish: the new rows are written to a staging table which
    /// is renamed over the live one inside a single transaction. A reader on
    /// another connection sees either the complete old roster or the
    /// complete new one, never a partial mix.
    pub fn replace_roster(&mut self, entries: &[RosterEntry]) -> CoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DROP TABLE IF EXISTS roster_staging;
             CREATE TABLE roster_staging (
                 person     TEXT    NOT NULL,
                 day        INTEGER NOT NULL CHECK (day BETWEEN 1 AND 31),
                 shift_code TEXT    NOT NULL
             );",
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO roster_staging (person, day, shift_code) VALUES (?1, ?2, ?3)",
            )?;
            for entry in entries {
                stmt.execute(params![entry.person, entry.day as i64, entry.shift_code])?;
            }
        }
        tx.execute_batch(
            "DROP TABLE roster;
             ALTER TABLE roster_staging RENAME TO roster;
             CREATE INDEX idx_roster_day ON roster(day);",
        )?;
        tx.commit()?;
        Ok(())
    }

    /// All entries scheduled on either of two days of the month.
    pub fn roster_for_days(&self, a: Day, b: Day) -> CoreResult<Vec<RosterEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT person, day, shift_code FROM roster WHERE day = ?1 OR day = ?2",
        )?;
        let rows = stmt.query_map(params![a as i64, b as i64], |row| {
            Ok(RosterEntry {
                person: row.get(0)?,
                day: row.get::<_, i64>(1)? as Day,
                shift_code: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Total roster rows currently loaded.
    pub fn roster_len(&self) -> CoreResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM roster", [], |row| row.get(0))
            .map_err(Into::into)
    }

    /// Full ordered dump of the roster. Used by tests to compare snapshots
    /// across ingestions.
    pub fn roster_snapshot(&self) -> CoreResult<Vec<RosterEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT person, day, shift_code FROM roster ORDER BY person, day, shift_code",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RosterEntry {
                person: row.get(0)?,
                day: row.get::<_, i64>(1)? as Day,
                shift_code: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
