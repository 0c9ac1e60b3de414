use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Medical-record number must be exactly 9 digits, got {actual:?}")]
    InvalidRecordNumber { actual: String },

    #[error("Required field '{field}' is empty")]
    EmptyField { field: &'static str },

    #[error("'{action}' is not valid while the form is {state}")]
    FormState {
        action: &'static str,
        state: &'static str,
    },

    #[error("Patient count must be between 1 and {max}, got {requested}")]
    PatientCount { requested: usize, max: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
