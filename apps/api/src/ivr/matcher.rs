//! Job matching: pluggable, trait-based strategy that turns a spoken skill and
//! location into matching open jobs.
//!
//! Default: `SubstringMatcher` (case-insensitive substring filter pushed down
//! to the store). Alternative: `TokenMatcher` (any spoken word matches).
//!
//! `AppState` holds an `Arc<dyn JobMatcher>`, swapped at startup via config.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::MatcherKind;
use crate::models::Job;
use crate::store::{JobFilter, Store, StoreError};

/// Implement this to change how callers are matched to jobs without touching
/// the call flow.
#[async_trait]
pub trait JobMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Open jobs for `skill` in `location`, best first.
    async fn find(
        &self,
        store: &dyn Store,
        skill: &str,
        location: &str,
    ) -> Result<Vec<Job>, StoreError>;
}

pub fn build_matcher(kind: MatcherKind) -> Arc<dyn JobMatcher> {
    match kind {
        MatcherKind::Substring => Arc::new(SubstringMatcher),
        MatcherKind::Token => Arc::new(TokenMatcher),
    }
}

/// Job type contains the skill and job location contains the location,
/// ignoring case; status must be `open`.
pub struct SubstringMatcher;

#[async_trait]
impl JobMatcher for SubstringMatcher {
    fn name(&self) -> &'static str {
        "substring"
    }

    async fn find(
        &self,
        store: &dyn Store,
        skill: &str,
        location: &str,
    ) -> Result<Vec<Job>, StoreError> {
        store.search_jobs(&JobFilter::open(skill, location)).await
    }
}

/// Speech recognition often adds words ("I am a plumber"). A job matches when
/// any word of the skill occurs in its type and any word of the location
/// occurs in its location. Filtering happens in process over open jobs.
pub struct TokenMatcher;

#[async_trait]
impl JobMatcher for TokenMatcher {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn find(
        &self,
        store: &dyn Store,
        skill: &str,
        location: &str,
    ) -> Result<Vec<Job>, StoreError> {
        let skill_tokens = tokens(skill);
        let location_tokens = tokens(location);
        let jobs = store.list_open_jobs().await?;
        Ok(jobs
            .into_iter()
            .filter(|job| {
                any_token_in(&skill_tokens, &job.job_type)
                    && any_token_in(&location_tokens, &job.location)
            })
            .collect())
    }
}

/// Words shorter than this ("a", "am", "in") match almost anything.
const MIN_TOKEN_CHARS: usize = 3;

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// No tokens at all matches everything, like an empty substring does.
fn any_token_in(tokens: &[String], field: &str) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let field = field.to_lowercase();
    tokens.iter().any(|t| field.contains(t.as_str()))
}
