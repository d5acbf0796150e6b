use tracing::warn;

use crate::ivr::callback::{non_blank, parse_attempt};
use crate::models::Language;
use crate::session::CallSession;
use crate::state::AppState;
use crate::twiml::VoiceResponse;

/// The session for the call behind the current request.
///
/// Session trouble never ends a call: load failures fall back to a fresh
/// session and save failures are logged, leaving the callback URL's query
/// parameters to carry the flow.
pub struct CallContext {
    pub session: CallSession,
}

impl CallContext {
    pub async fn open(state: &AppState, call_sid: Option<&str>) -> Self {
        let Some(call_sid) = non_blank(call_sid) else {
            return Self {
                session: CallSession::default(),
            };
        };

        let session = match state.sessions.load(&call_sid).await {
            Ok(Some(session)) => session,
            Ok(None) => CallSession::new(&call_sid),
            Err(e) => {
                warn!(call_sid = %call_sid, "Failed to load call session: {e}");
                CallSession::new(&call_sid)
            }
        };
        Self { session }
    }

    /// Language from the query if it parses, else the session's, else English.
    pub fn language(&self, from_query: Option<&str>) -> Language {
        from_query
            .and_then(Language::from_tag)
            .or(self.session.language)
            .unwrap_or_default()
    }

    /// Re-prompts so far: the larger of the session counter and the one the
    /// callback URL carried.
    pub fn attempts(&self, from_query: Option<&str>) -> u32 {
        self.session.attempts.max(parse_attempt(from_query))
    }

    /// Starts the call over, keeping only its identifier.
    pub fn restart(&mut self) {
        self.session = CallSession::new(&self.session.call_sid);
    }

    /// Persists the session, or drops it when `response` ends the call.
    pub async fn finish(&self, state: &AppState, response: VoiceResponse) -> VoiceResponse {
        if !self.session.is_persistent() {
            return response;
        }

        let result = if response.ends_call() {
            state.sessions.clear(&self.session.call_sid).await
        } else {
            state.sessions.save(&self.session).await
        };
        if let Err(e) = result {
            warn!(call_sid = %self.session.call_sid, "Failed to update call session: {e}");
        }
        response
    }
}
