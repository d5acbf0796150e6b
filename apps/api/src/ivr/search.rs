use tracing::info;

use crate::ivr::callback::{CallbackUrl, PROVIDE_CONTACT};
use crate::ivr::matcher::JobMatcher;
use crate::ivr::prompts;
use crate::models::{Job, Language};
use crate::store::{Store, StoreError};
use crate::twiml::{Gather, VoiceResponse};

/// What a job search produced. Only the first match is ever offered.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found { count: usize, first: Job },
    Empty,
}

impl SearchOutcome {
    pub fn contact_number(&self) -> Option<&str> {
        match self {
            SearchOutcome::Found { first, .. } => Some(first.contact_number.as_str()),
            SearchOutcome::Empty => None,
        }
    }
}

pub async fn search_jobs(
    matcher: &dyn JobMatcher,
    store: &dyn Store,
    skill: &str,
    location: &str,
) -> Result<SearchOutcome, StoreError> {
    info!(
        matcher = matcher.name(),
        "Searching for jobs with skill: {skill}, location: {location}"
    );
    let jobs = matcher.find(store, skill, location).await?;
    let count = jobs.len();

    Ok(match jobs.into_iter().next() {
        Some(first) => {
            info!("Found {count} job(s)");
            SearchOutcome::Found { count, first }
        }
        None => {
            info!("No jobs found");
            SearchOutcome::Empty
        }
    })
}

/// A match offers the employer's number behind a key press; no match ends the
/// call with a promise to call back.
pub fn present(outcome: &SearchOutcome, skill: &str, location: &str, lang: Language) -> VoiceResponse {
    match outcome {
        SearchOutcome::Found { count, first } => {
            let action = CallbackUrl::new(PROVIDE_CONTACT)
                .param("number", first.contact_number.as_str())
                .build();
            let message = prompts::jobs_found(lang, *count, skill, location, &first.location);
            VoiceResponse::new().gather(Gather::digit(action).say(lang, message))
        }
        SearchOutcome::Empty => VoiceResponse::new().say(lang, prompts::no_jobs(lang)).hangup(),
    }
}
