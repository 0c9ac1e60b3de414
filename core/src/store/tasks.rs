//! Task-queue table operations.

use crate::{
    error::CoreResult,
    task_queue::{NewTask, TaskRecord, TaskStatus},
    types::TaskId,
};
use rusqlite::{params, OptionalExtension, Row};

fn task_row_mapper(row: &Row<'_>) -> rusqlite::Result<TaskRecord> {
    let status_raw: String = row.get(12)?;
    let status = TaskStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            12,
            rusqlite::types::Type::Text,
            format!("unknown task status: {status_raw}").into(),
        )
    })?;
    Ok(TaskRecord {
        task_id: row.get(0)?,
        unit: row.get(1)?,
        requester: row.get(2)?,
        requester_nip: row.get(3)?,
        patients_json: row.get(4)?,
        patient_display: row.get(5)?,
        primary_rm: row.get(6)?,
        file_name: row.get(7)?,
        requested_tech: row.get(8)?,
        executor: row.get(9)?,
        executor_nip: row.get(10)?,
        queued_at: row.get(11)?,
        status,
        completed_at: row.get(13)?,
    })
}

const TASK_COLUMNS: &str = "task_id, unit, requester, requester_nip, patients_json,
    patient_display, primary_rm, file_name, requested_tech, executor,
    executor_nip, queued_at, status, completed_at";

impl super::DeskStore {
    pub fn insert_task(&self, task: &NewTask) -> CoreResult<TaskId> {
        self.conn.execute(
            "INSERT INTO task (
                unit, requester, requester_nip, patients_json, patient_display,
                primary_rm, file_name, requested_tech, status, queued_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                task.unit,
                task.requester,
                task.requester_nip,
                task.patients_json,
                task.patient_display,
                task.primary_rm,
                task.file_name,
                task.requested_tech,
                TaskStatus::Queued.as_str(),
                task.queued_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_task(&self, task_id: TaskId) -> CoreResult<Option<TaskRecord>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM task WHERE task_id = ?1");
        self.conn
            .query_row(&sql, params![task_id], task_row_mapper)
            .optional()
            .map_err(Into::into)
    }

    /// Open work addressed to `tech`: unclaimed tasks requested for them or
    /// for anyone, plus in-progress tasks they have already claimed.
    pub fn pending_tasks_for(&self, tech: &str) -> CoreResult<Vec<TaskRecord>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM task
             WHERE (status = 'queued'
                    AND (requested_tech = ?1 OR requested_tech IS NULL))
                OR (status = 'in_progress' AND executor = ?1)
             ORDER BY task_id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![tech], task_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Bind a queued task to an executor. Returns false when the task was
    /// already claimed (or does not exist).
    pub fn claim_task(&self, task_id: TaskId, tech: &str) -> CoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE task SET status = 'in_progress', executor = ?2
             WHERE task_id = ?1 AND status = 'queued'",
            params![task_id, tech],
        )?;
        Ok(changed > 0)
    }

    /// Close an in-progress task. Returns false when the task was not
    /// in progress under this executor.
    pub fn complete_task(
        &self,
        task_id: TaskId,
        tech: &str,
        tech_nip: &str,
        completed_at: &str,
    ) -> CoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE task SET status = 'done', executor_nip = ?3, completed_at = ?4
             WHERE task_id = ?1 AND status = 'in_progress' AND executor = ?2",
            params![task_id, tech, tech_nip, completed_at],
        )?;
        Ok(changed > 0)
    }

    /// Completed-task tallies per technician, busiest first.
    pub fn completed_counts(&self) -> CoreResult<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT executor, COUNT(*) FROM task
             WHERE status = 'done' AND executor IS NOT NULL
             GROUP BY executor
             ORDER BY COUNT(*) DESC, executor ASC",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Completed tasks whose patient display name or primary record number
    /// contains `term`. An empty term returns the whole archive.
    pub fn search_archive(&self, term: &str) -> CoreResult<Vec<TaskRecord>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM task
             WHERE status = 'done'
               AND (patient_display LIKE '%' || ?1 || '%'
                    OR primary_rm LIKE '%' || ?1 || '%')
             ORDER BY task_id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![term], task_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Unclaimed tasks waiting in the queue.
    pub fn queue_depth(&self) -> CoreResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM task WHERE status = 'queued'",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
