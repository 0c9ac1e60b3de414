//! Deletion-request queue — submission, claim, completion, archive.
//!
//! The queue consumes the duty resolver's output for exactly one decision:
//! which technician an incoming task should be offered to. Everything else
//! here is plain relational workflow over the store.

use crate::{
    config::DeskConfig,
    duty_resolver::{DutyResolver, DutyStatus},
    error::{CoreError, CoreResult},
    request_form::{FormState, PatientEntry, RequestForm},
    store::DeskStore,
    types::{PersonId, TaskId},
};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Queued,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "queued" => Some(TaskStatus::Queued),
            "in_progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// Insert payload for a new task row.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub unit: String,
    pub requester: String,
    pub requester_nip: String,
    pub patients_json: String,
    pub patient_display: String,
    pub primary_rm: String,
    pub file_name: String,
    pub requested_tech: Option<PersonId>,
    pub queued_at: String,
}

/// Row from the `task` table. Patients stay JSON-encoded at rest; decode
/// on demand with [`TaskRecord::patients`].
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub unit: String,
    pub requester: String,
    pub requester_nip: String,
    pub patients_json: String,
    pub patient_display: String,
    pub primary_rm: String,
    pub file_name: String,
    pub requested_tech: Option<PersonId>,
    pub executor: Option<PersonId>,
    pub executor_nip: Option<String>,
    pub status: TaskStatus,
    pub queued_at: String,
    pub completed_at: Option<String>,
}

impl TaskRecord {
    pub fn patients(&self) -> CoreResult<Vec<PatientEntry>> {
        Ok(serde_json::from_str(&self.patients_json)?)
    }
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Archive file names keep only word characters from the patient name.
fn sanitize_for_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

pub struct TaskQueue {
    config: DeskConfig,
}

impl TaskQueue {
    pub fn new(config: DeskConfig) -> Self {
        Self { config }
    }

    /// Start a new submission form bounded by the configured patient cap.
    pub fn new_form(&self, planned_patients: usize) -> CoreResult<RequestForm> {
        RequestForm::new(planned_patients, self.config.max_patients_per_request)
    }

    /// Persist a submitted form as a queued task and remember the
    /// requester's payroll number. Only a form in the `Submitted` state is
    /// accepted.
    pub fn submit(
        &self,
        store: &DeskStore,
        form: &RequestForm,
        queued_at: NaiveDateTime,
    ) -> CoreResult<TaskId> {
        if form.state() != FormState::Submitted {
            return Err(CoreError::FormState {
                action: "submit",
                state: "not yet signed",
            });
        }
        let requester = form.requester().ok_or(CoreError::EmptyField {
            field: "requester",
        })?;
        let patients = form.patients();
        let first = patients.first().ok_or(CoreError::EmptyField {
            field: "patients",
        })?;

        let file_name = format!(
            "deletion_{}_{}_{}.docx",
            sanitize_for_file_name(&first.name),
            first.rm_number,
            queued_at.format("%H%M%S"),
        );

        store.save_profile(&requester.name, &requester.nip)?;

        let task = NewTask {
            unit: requester.unit.clone(),
            requester: requester.name.clone(),
            requester_nip: requester.nip.clone(),
            patients_json: serde_json::to_string(patients)?,
            patient_display: form.patient_display(),
            primary_rm: first.rm_number.clone(),
            file_name,
            requested_tech: requester.requested_tech.clone(),
            queued_at: queued_at.format(TIMESTAMP_FORMAT).to_string(),
        };
        let task_id = store.insert_task(&task)?;
        log::info!(
            "task {task_id} queued for {}",
            task.requested_tech.as_deref().unwrap_or("any technician")
        );
        Ok(task_id)
    }

    /// Open work addressed to `tech` (or to anyone), oldest first.
    pub fn pending_for(&self, store: &DeskStore, tech: &PersonId) -> CoreResult<Vec<TaskRecord>> {
        store.pending_tasks_for(tech)
    }

    /// Take a queued task. Returns false when somebody else got there
    /// first.
    pub fn claim(&self, store: &DeskStore, task_id: TaskId, tech: &PersonId) -> CoreResult<bool> {
        let claimed = store.claim_task(task_id, tech)?;
        if !claimed {
            log::warn!("task {task_id} could not be claimed by {tech}");
        }
        Ok(claimed)
    }

    /// Finish an in-progress task, stamping executor and completion time.
    pub fn complete(
        &self,
        store: &DeskStore,
        task_id: TaskId,
        tech: &PersonId,
        tech_nip: &str,
        completed_at: NaiveDateTime,
    ) -> CoreResult<bool> {
        store.save_profile(tech, tech_nip)?;
        let done = store.complete_task(
            task_id,
            tech,
            tech_nip,
            &completed_at.format(TIMESTAMP_FORMAT).to_string(),
        )?;
        if done {
            log::info!("task {task_id} completed by {tech}");
        }
        Ok(done)
    }

    /// Completed-task tallies per technician, busiest first.
    pub fn completed_counts(&self, store: &DeskStore) -> CoreResult<Vec<(PersonId, i64)>> {
        store.completed_counts()
    }

    /// Archive lookup by patient display name or primary record number.
    pub fn search_archive(&self, store: &DeskStore, term: &str) -> CoreResult<Vec<TaskRecord>> {
        store.search_archive(term)
    }

    /// Unclaimed tasks waiting in the queue.
    pub fn queue_depth(&self, store: &DeskStore) -> CoreResult<i64> {
        store.queue_depth()
    }

    /// The workflow decision the duty resolver gates: the technician an
    /// incoming task should be offered to right now. None when no roster is
    /// loaded or nobody is on standby.
    pub fn suggest_executor(
        &self,
        store: &DeskStore,
        resolver: &DutyResolver,
        now: NaiveDateTime,
    ) -> CoreResult<Option<PersonId>> {
        let report = resolver.active_staff(store, now)?;
        if report.status == DutyStatus::NoSchedule {
            return Ok(None);
        }
        Ok(report.staff.first().cloned())
    }
}
