pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ivr::callback::{
    HANDLE_SKILL, LANGUAGE_CHOICE, PROVIDE_CONTACT, REGISTER_AND_FIND_JOBS, RETURNING_CHOICE,
    WELCOME,
};
use crate::ivr::handlers;
use crate::jobs::handlers::handle_create_job;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Call flow, posted to by the telephony gateway
        .route(WELCOME, post(handlers::handle_welcome))
        .route(LANGUAGE_CHOICE, post(handlers::handle_language_choice))
        .route(HANDLE_SKILL, post(handlers::handle_skill))
        .route(
            REGISTER_AND_FIND_JOBS,
            post(handlers::handle_register_and_find_jobs),
        )
        .route(RETURNING_CHOICE, post(handlers::handle_returning_choice))
        .route(PROVIDE_CONTACT, post(handlers::handle_provide_contact))
        // Job posting
        .route("/api/v1/jobs", post(handle_create_job))
        .with_state(state)
}
