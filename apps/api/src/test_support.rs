//! Test doubles shared by handler and router tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::ivr::handlers::GatewayParams;
use crate::ivr::matcher::SubstringMatcher;
use crate::models::{Job, NewJob, Worker};
use crate::session::MemorySessionStore;
use crate::state::AppState;
use crate::store::{JobFilter, JobStore, Store, StoreError, WorkerStore};

/// Every call fails, as if the database were unreachable.
pub struct FailingStore;

fn down() -> StoreError {
    StoreError::Unavailable("store is down".to_string())
}

#[async_trait]
impl WorkerStore for FailingStore {
    async fn find_worker(&self, _phone: &str) -> Result<Option<Worker>, StoreError> {
        Err(down())
    }

    async fn insert_worker(&self, _worker: &Worker) -> Result<(), StoreError> {
        Err(down())
    }

    async fn delete_worker(&self, _phone: &str) -> Result<u64, StoreError> {
        Err(down())
    }
}

#[async_trait]
impl JobStore for FailingStore {
    async fn insert_job(&self, _job: &NewJob) -> Result<Job, StoreError> {
        Err(down())
    }

    async fn search_jobs(&self, _filter: &JobFilter) -> Result<Vec<Job>, StoreError> {
        Err(down())
    }

    async fn list_open_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Err(down())
    }
}

pub fn state_with(store: Arc<dyn Store>) -> AppState {
    AppState {
        store,
        sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(600))),
        matcher: Arc::new(SubstringMatcher),
        max_reprompts: 3,
    }
}

pub fn open_job(id: i64, job_type: &str, location: &str, contact: &str) -> Job {
    Job {
        id,
        job_type: job_type.to_string(),
        location: location.to_string(),
        workers_needed: 1,
        contact_number: contact.to_string(),
        status: "open".to_string(),
        created_at: None,
    }
}

/// A gateway form for `call_sid`, calling from `from`.
pub fn gateway(call_sid: &str, from: &str) -> GatewayParams {
    GatewayParams {
        call_sid: Some(call_sid.to_string()),
        from: Some(from.to_string()),
        ..GatewayParams::default()
    }
}
