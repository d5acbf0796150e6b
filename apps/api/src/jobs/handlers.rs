use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::jobs::validation::{describe, validate_job_posting, JobPostingRequest};
use crate::models::Job;
use crate::state::AppState;

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<JobPostingRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let new_job = validate_job_posting(&req).map_err(|errors| {
        let message = describe(&errors);
        warn!("Rejected job posting: {message}");
        AppError::Validation(message)
    })?;

    let job = state.store.insert_job(&new_job).await?;
    info!(job_id = job.id, "Job posted: {} in {}", job.job_type, job.location);
    Ok((StatusCode::CREATED, Json(job)))
}
