use std::sync::Arc;

use crate::ivr::matcher::JobMatcher;
use crate::session::SessionStore;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Workers and jobs. Backend chosen by STORE_BACKEND.
    pub store: Arc<dyn Store>,
    /// Per-call session records keyed by CallSid.
    pub sessions: Arc<dyn SessionStore>,
    /// Pluggable job matcher. Default: SubstringMatcher. Swap via JOB_MATCHER env.
    pub matcher: Arc<dyn JobMatcher>,
    /// Consecutive unrecognised speech inputs tolerated before the call ends.
    pub max_reprompts: u32,
}
