use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Only `open` has meaning to this service; anything else is "not open".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Open => "open",
        }
    }
}

/// A posted vacancy as stored. `status` stays a free string: rows written by
/// other tools may carry values this service does not know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i64,
    pub job_type: String,
    pub location: String,
    pub workers_needed: i32,
    pub contact_number: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn has_status(&self, status: JobStatus) -> bool {
        self.status == status.as_str()
    }
}

/// Insert payload for the `jobs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    pub job_type: String,
    pub location: String,
    pub workers_needed: i32,
    pub contact_number: String,
    pub status: String,
}
