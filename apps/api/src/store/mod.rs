//! Worker and job persistence.
//!
//! The controller only ever needs a handful of operations: point lookup and
//! insert/delete of workers, insert of jobs, and a filtered job search. They
//! are expressed as traits so the hosted REST backend, a direct Postgres pool
//! and the in-memory store are interchangeable.
//!
//! `AppState` carries an `Arc<dyn Store>`, chosen at startup via config.

pub mod memory;
pub mod postgres;
pub mod postgrest;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::models::{Job, JobStatus, NewJob, Worker};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use postgrest::PostgrestStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Store returned no row after inserting into {0}")]
    MissingRow(&'static str),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Job search criteria. Both text filters are case-insensitive substring
/// matches; `status` is an exact match.
#[derive(Debug, Clone, PartialEq)]
pub struct JobFilter {
    pub job_type_contains: String,
    pub location_contains: String,
    pub status: JobStatus,
}

impl JobFilter {
    pub fn open(job_type_contains: &str, location_contains: &str) -> Self {
        Self {
            job_type_contains: job_type_contains.trim().to_string(),
            location_contains: location_contains.trim().to_string(),
            status: JobStatus::Open,
        }
    }

    /// Reference semantics shared by every backend.
    pub fn matches(&self, job: &Job) -> bool {
        job.has_status(self.status)
            && contains_ignore_case(&job.job_type, &self.job_type_contains)
            && contains_ignore_case(&job.location, &self.location_contains)
    }
}

#[async_trait]
pub trait WorkerStore: Send + Sync {
    /// Returns the worker registered under `phone`, if any.
    async fn find_worker(&self, phone: &str) -> Result<Option<Worker>, StoreError>;

    /// Inserts a worker row. No deduplication happens here; a second insert
    /// for the same phone number is left to the backing table's constraints.
    async fn insert_worker(&self, worker: &Worker) -> Result<(), StoreError>;

    /// Deletes every worker row for `phone`, returning how many were removed.
    async fn delete_worker(&self, phone: &str) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert_job(&self, job: &NewJob) -> Result<Job, StoreError>;

    /// Jobs matching `filter`, oldest first.
    async fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, StoreError>;

    /// All open jobs, oldest first.
    async fn list_open_jobs(&self) -> Result<Vec<Job>, StoreError>;
}

pub trait Store: WorkerStore + JobStore {}

impl<T: WorkerStore + JobStore> Store for T {}

/// Builds the store selected by `STORE_BACKEND`.
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgrest => {
            let store =
                PostgrestStore::new(&config.supabase_url, config.supabase_anon_key.clone())
                    .context("Failed to build REST store client")?;
            info!("Using REST store at {}", config.supabase_url);
            Arc::new(store)
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("STORE_BACKEND=postgres requires DATABASE_URL")?;
            let pool = postgres::create_pool(url).await?;
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::default())
        }
    };
    Ok(store)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
