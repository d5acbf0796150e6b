use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

/// Which persistence backend serves workers and jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgrest,
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgrest" | "rest" | "supabase" => Ok(StoreBackend::Postgrest),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown store backend '{other}'")),
        }
    }
}

/// Which job matching strategy the call flow uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    Substring,
    Token,
}

impl FromStr for MatcherKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(MatcherKind::Substring),
            "token" => Ok(MatcherKind::Token),
            other => Err(anyhow!("unknown job matcher '{other}'")),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub port: u16,
    pub rust_log: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub session_ttl: Duration,
    pub max_reprompts: u32,
    pub job_matcher: MatcherKind,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        Ok(Config {
            supabase_url: require("SUPABASE_URL")?,
            supabase_anon_key: require("SUPABASE_ANON_KEY")?,
            twilio_account_sid: require("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: require("TWILIO_AUTH_TOKEN")?,
            port: parse_or(get("PORT"), 3000).context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            store_backend: parse_or(get("STORE_BACKEND"), StoreBackend::Postgrest)
                .context("STORE_BACKEND must be one of postgrest, postgres, memory")?,
            database_url: get("DATABASE_URL"),
            redis_url: get("REDIS_URL"),
            session_ttl: Duration::from_secs(
                parse_or(get("SESSION_TTL_SECS"), 600)
                    .context("SESSION_TTL_SECS must be a number of seconds")?,
            ),
            max_reprompts: parse_or(get("MAX_REPROMPTS"), 3)
                .context("MAX_REPROMPTS must be a non-negative integer")?,
            job_matcher: parse_or(get("JOB_MATCHER"), MatcherKind::Substring)
                .context("JOB_MATCHER must be one of substring, token")?,
        })
    }
}

fn parse_or<T>(value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Into<anyhow::Error>,
{
    match value {
        Some(raw) => raw.trim().parse::<T>().map_err(Into::into),
        None => Ok(default),
    }
}
