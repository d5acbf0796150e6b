use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use super::{JobFilter, JobStore, StoreError, WorkerStore};
use crate::models::{Job, JobStatus, NewJob, Worker};

const JOB_COLUMNS: &str = "id, job_type, location, workers_needed, contact_number, status, created_at";

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Talks to the `workers` and `jobs` tables directly over a pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkerStore for PgStore {
    async fn find_worker(&self, phone: &str) -> Result<Option<Worker>, StoreError> {
        let worker = sqlx::query_as::<_, Worker>(
            "SELECT phone_number, skill, location, language FROM workers WHERE phone_number = $1 LIMIT 1",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(worker)
    }

    async fn insert_worker(&self, worker: &Worker) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO workers (phone_number, skill, location, language) VALUES ($1, $2, $3, $4)",
        )
        .bind(&worker.phone_number)
        .bind(&worker.skill)
        .bind(&worker.location)
        .bind(&worker.language)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_worker(&self, phone: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM workers WHERE phone_number = $1")
            .bind(phone)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn insert_job(&self, job: &NewJob) -> Result<Job, StoreError> {
        let sql = format!(
            "INSERT INTO jobs (job_type, location, workers_needed, contact_number, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {JOB_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Job>(&sql)
            .bind(&job.job_type)
            .bind(&job.location)
            .bind(job.workers_needed)
            .bind(&job.contact_number)
            .bind(&job.status)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, StoreError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs \
             WHERE job_type ILIKE $1 AND location ILIKE $2 AND status = $3 \
             ORDER BY id"
        );
        let jobs = sqlx::query_as::<_, Job>(&sql)
            .bind(contains_pattern(&filter.job_type_contains))
            .bind(contains_pattern(&filter.location_contains))
            .bind(filter.status.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    async fn list_open_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE status = $1 ORDER BY id");
        let jobs = sqlx::query_as::<_, Job>(&sql)
            .bind(JobStatus::Open.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }
}

/// `%term%` with LIKE metacharacters in `term` escaped, so spoken text is
/// always matched literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
