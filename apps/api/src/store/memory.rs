use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::{JobFilter, JobStore, StoreError, WorkerStore};
use crate::models::{Job, JobStatus, NewJob, Worker};

/// Process-local store for local runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    workers: RwLock<Vec<Worker>>,
    jobs: RwLock<Vec<Job>>,
    next_job_id: AtomicI64,
}

impl MemoryStore {
    #[cfg(test)]
    /// Seeds a job row as-is, status included. The job-posting path always
    /// writes `open`; this is how other statuses get in.
    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        let next = jobs.iter().map(|j| j.id).max().unwrap_or(0);
        Self {
            workers: RwLock::new(Vec::new()),
            jobs: RwLock::new(jobs),
            next_job_id: AtomicI64::new(next),
        }
    }

    #[cfg(test)]
    pub fn worker_count(&self, phone: &str) -> usize {
        self.workers
            .read()
            .map(|w| w.iter().filter(|w| w.phone_number == phone).count())
            .unwrap_or(0)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".to_string())
}

#[async_trait]
impl WorkerStore for MemoryStore {
    async fn find_worker(&self, phone: &str) -> Result<Option<Worker>, StoreError> {
        let workers = self.workers.read().map_err(poisoned)?;
        Ok(workers.iter().find(|w| w.phone_number == phone).cloned())
    }

    async fn insert_worker(&self, worker: &Worker) -> Result<(), StoreError> {
        self.workers.write().map_err(poisoned)?.push(worker.clone());
        Ok(())
    }

    async fn delete_worker(&self, phone: &str) -> Result<u64, StoreError> {
        let mut workers = self.workers.write().map_err(poisoned)?;
        let before = workers.len();
        workers.retain(|w| w.phone_number != phone);
        Ok((before - workers.len()) as u64)
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn insert_job(&self, job: &NewJob) -> Result<Job, StoreError> {
        let id = self.next_job_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = Job {
            id,
            job_type: job.job_type.clone(),
            location: job.location.clone(),
            workers_needed: job.workers_needed,
            contact_number: job.contact_number.clone(),
            status: job.status.clone(),
            created_at: Some(Utc::now()),
        };
        self.jobs.write().map_err(poisoned)?.push(row.clone());
        Ok(row)
    }

    async fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.read().map_err(poisoned)?;
        Ok(jobs.iter().filter(|j| filter.matches(j)).cloned().collect())
    }

    async fn list_open_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.read().map_err(poisoned)?;
        Ok(jobs
            .iter()
            .filter(|j| j.has_status(JobStatus::Open))
            .cloned()
            .collect())
    }
}
