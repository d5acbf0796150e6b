//! Short-lived per-call session records.
//!
//! Each step of a call is a separate HTTP request. The session keeps what the
//! caller has told us so far (language, skill, location), where they are in
//! the flow, and how many times in a row speech went unrecognised. Records are
//! keyed by the gateway's call identifier and expire on their own.

pub mod memory;
pub mod redis_store;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::models::Language;

pub use memory::MemorySessionStore;
pub use redis_store::RedisSessionStore;

const KEY_PREFIX: &str = "voicepe:call:";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Session encoding error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Where a call currently is. Mirrors the IVR endpoint that will receive the
/// next request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Welcome,
    LanguageChoice,
    Skill,
    Location,
    ReturningChoice,
    ProvideContact,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    pub call_sid: String,
    pub stage: Stage,
    pub language: Option<Language>,
    pub skill: Option<String>,
    pub location: Option<String>,
    pub contact_number: Option<String>,
    /// Consecutive unrecognised speech inputs.
    pub attempts: u32,
}

impl CallSession {
    pub fn new(call_sid: &str) -> Self {
        Self {
            call_sid: call_sid.to_string(),
            ..Self::default()
        }
    }

    /// Sessions without a call identifier live for one request only.
    pub fn is_persistent(&self) -> bool {
        !self.call_sid.is_empty()
    }
}

pub fn session_key(call_sid: &str) -> String {
    format!("{KEY_PREFIX}{call_sid}")
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, call_sid: &str) -> Result<Option<CallSession>, SessionError>;

    /// Writes the session and restarts its expiry clock.
    async fn save(&self, session: &CallSession) -> Result<(), SessionError>;

    async fn clear(&self, call_sid: &str) -> Result<(), SessionError>;
}

/// Redis when `REDIS_URL` is set, otherwise an in-process map.
pub async fn connect(config: &Config) -> Result<Arc<dyn SessionStore>> {
    match config.redis_url.as_deref() {
        Some(url) => {
            let client = redis::Client::open(url).context("Invalid REDIS_URL")?;
            let store = RedisSessionStore::new(client, config.session_ttl)
                .await
                .context("Failed to connect to Redis")?;
            info!("Redis session store initialized");
            Ok(Arc::new(store))
        }
        None => {
            info!("REDIS_URL not set; call sessions are kept in process memory");
            Ok(Arc::new(MemorySessionStore::new(config.session_ttl)))
        }
    }
}
