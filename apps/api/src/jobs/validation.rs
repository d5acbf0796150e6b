use serde::Deserialize;
use thiserror::Error;

use crate::models::{JobStatus, NewJob};

/// Digits in an Indian mobile number without the country code.
const CONTACT_DIGITS: usize = 10;

/// Body of `POST /api/v1/jobs`. Every field is optional on the wire so a
/// missing field is reported alongside the other problems instead of failing
/// deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobPostingRequest {
    pub job_type: String,
    pub location: String,
    pub workers_needed: Option<i32>,
    pub contact_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobValidationError {
    #[error("job_type must not be empty")]
    MissingJobType,

    #[error("location must not be empty")]
    MissingLocation,

    #[error("workers_needed must be at least 1")]
    InvalidWorkersNeeded,

    #[error("contact_number must be exactly 10 digits")]
    InvalidContactNumber,
}

/// Checks a posting and returns the row to insert, or every rule it breaks.
///
/// Text fields are trimmed before checking and storing. `workers_needed`
/// defaults to 1. New postings are always `open`.
pub fn validate_job_posting(req: &JobPostingRequest) -> Result<NewJob, Vec<JobValidationError>> {
    let job_type = req.job_type.trim();
    let location = req.location.trim();
    let contact_number = req.contact_number.trim();
    let workers_needed = req.workers_needed.unwrap_or(1);

    let mut errors = Vec::new();
    if job_type.is_empty() {
        errors.push(JobValidationError::MissingJobType);
    }
    if location.is_empty() {
        errors.push(JobValidationError::MissingLocation);
    }
    if workers_needed < 1 {
        errors.push(JobValidationError::InvalidWorkersNeeded);
    }
    if !is_contact_number(contact_number) {
        errors.push(JobValidationError::InvalidContactNumber);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewJob {
        job_type: job_type.to_string(),
        location: location.to_string(),
        workers_needed,
        contact_number: contact_number.to_string(),
        status: JobStatus::Open.as_str().to_string(),
    })
}

/// One line listing every violation, for the error response body.
pub fn describe(errors: &[JobValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn is_contact_number(value: &str) -> bool {
    value.len() == CONTACT_DIGITS && value.bytes().all(|b| b.is_ascii_digit())
}
