//! Deletion-request submission form — an explicit finite-state machine.
//!
//! States: CollectingRequester → CollectingPatient(i) for i in 1..=N →
//! AwaitingSignature → Submitted. The form object owns all partial input;
//! nothing lives in ambient session state. Invalid transitions are form
//! errors, never panics.

use crate::{
    error::{CoreError, CoreResult},
    types::PersonId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One medical-record entry slated for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientEntry {
    pub name: String,
    /// Exactly 9 digits.
    pub rm_number: String,
    pub visit_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub name: String,
    pub nip: String,
    pub unit: String,
    /// None = any technician may take the task.
    pub requested_tech: Option<PersonId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    CollectingRequester,
    /// 1-based index of the patient slot currently being filled.
    CollectingPatient(usize),
    AwaitingSignature,
    Submitted,
}

impl FormState {
    fn name(&self) -> &'static str {
        match self {
            FormState::CollectingRequester => "collecting requester",
            FormState::CollectingPatient(_) => "collecting patients",
            FormState::AwaitingSignature => "awaiting signature",
            FormState::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestForm {
    state: FormState,
    planned_patients: usize,
    requester: Option<Requester>,
    patients: Vec<PatientEntry>,
    signature_ref: Option<String>,
}

impl RequestForm {
    pub fn new(planned_patients: usize, max_patients: usize) -> CoreResult<Self> {
        if planned_patients == 0 || planned_patients > max_patients {
            return Err(CoreError::PatientCount {
                requested: planned_patients,
                max: max_patients,
            });
        }
        Ok(Self {
            state: FormState::CollectingRequester,
            planned_patients,
            requester: None,
            patients: Vec::new(),
            signature_ref: None,
        })
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn requester(&self) -> Option<&Requester> {
        self.requester.as_ref()
    }

    pub fn patients(&self) -> &[PatientEntry] {
        &self.patients
    }

    pub fn signature_ref(&self) -> Option<&str> {
        self.signature_ref.as_deref()
    }

    /// "First Patient (+k)" for multi-patient requests.
    pub fn patient_display(&self) -> String {
        match self.patients.as_slice() {
            [] => String::new(),
            [only] => only.name.clone(),
            [first, rest @ ..] => format!("{} (+{})", first.name, rest.len()),
        }
    }

    pub fn set_requester(&mut self, requester: Requester) -> CoreResult<()> {
        if self.state != FormState::CollectingRequester {
            return Err(self.state_error("set_requester"));
        }
        if requester.name.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "requester name" });
        }
        if requester.unit.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "unit" });
        }
        self.requester = Some(requester);
        self.state = FormState::CollectingPatient(1);
        Ok(())
    }

    pub fn add_patient(&mut self, patient: PatientEntry) -> CoreResult<()> {
        let FormState::CollectingPatient(slot) = self.state else {
            return Err(self.state_error("add_patient"));
        };
        if patient.name.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "patient name" });
        }
        if patient.reason.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "deletion reason" });
        }
        if patient.rm_number.len() != 9 || !patient.rm_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(CoreError::InvalidRecordNumber {
                actual: patient.rm_number,
            });
        }
        self.patients.push(patient);
        self.state = if slot == self.planned_patients {
            FormState::AwaitingSignature
        } else {
            FormState::CollectingPatient(slot + 1)
        };
        Ok(())
    }

    /// Re-open the previous patient slot, discarding its saved entry.
    pub fn back(&mut self) -> CoreResult<()> {
        match self.state {
            FormState::CollectingPatient(slot) if slot > 1 => {
                self.patients.pop();
                self.state = FormState::CollectingPatient(slot - 1);
                Ok(())
            }
            _ => Err(self.state_error("back")),
        }
    }

    /// Attach the requester's signature reference and seal the form.
    /// The reference is opaque here — where it points is the UI layer's
    /// concern.
    pub fn sign(&mut self, signature_ref: &str) -> CoreResult<()> {
        if self.state != FormState::AwaitingSignature {
            return Err(self.state_error("sign"));
        }
        if signature_ref.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "signature" });
        }
        self.signature_ref = Some(signature_ref.to_string());
        self.state = FormState::Submitted;
        Ok(())
    }

    fn state_error(&self, action: &'static str) -> CoreError {
        CoreError::FormState {
            action,
            state: self.state.name(),
        }
    }
}
