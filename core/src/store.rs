//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database.
//! Workflow code calls store methods — it never executes SQL directly.

mod roster;
mod tasks;

use crate::error::CoreResult;
use rusqlite::{params, Connection, OptionalExtension};

pub struct DeskStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl DeskStore {
    pub fn open(path: &str) -> CoreResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> CoreResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    /// For file-based databases, this opens the same file.
    pub fn reopen(&self) -> CoreResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> CoreResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../migrations/002_roster.sql"))?;
        Ok(())
    }

    // ── Profiles ───────────────────────────────────────────────

    /// Remember a requester's or technician's payroll number. Empty names
    /// and empty numbers are silently ignored.
    pub fn save_profile(&self, name: &str, nip: &str) -> CoreResult<()> {
        if name.is_empty() || nip.is_empty() {
            return Ok(());
        }
        self.conn.execute(
            "INSERT INTO profile (name, nip) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET nip = excluded.nip",
            params![name, nip],
        )?;
        Ok(())
    }

    pub fn profile_nip(&self, name: &str) -> CoreResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT nip FROM profile WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }
}
