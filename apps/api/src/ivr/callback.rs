//! Endpoint paths and the query strings the flow carries between them.

pub const WELCOME: &str = "/ivr/welcome";
pub const LANGUAGE_CHOICE: &str = "/ivr/handle-language-choice";
pub const HANDLE_SKILL: &str = "/ivr/handle-skill";
pub const REGISTER_AND_FIND_JOBS: &str = "/ivr/register-and-find-jobs";
pub const RETURNING_CHOICE: &str = "/ivr/handle-returning-choice";
pub const PROVIDE_CONTACT: &str = "/ivr/provide-contact";

/// Builds an `action`/redirect URL with percent-encoded query values.
#[derive(Debug, Clone)]
pub struct CallbackUrl {
    path: &'static str,
    params: Vec<(&'static str, String)>,
}

impl CallbackUrl {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Adds `attempt=<n>` only once at least one re-prompt has happened.
    pub fn attempt(self, attempts: u32) -> Self {
        if attempts == 0 {
            self
        } else {
            self.param("attempt", attempts.to_string())
        }
    }

    pub fn build(self) -> String {
        if self.params.is_empty() {
            return self.path.to_string();
        }
        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parses an `attempt` query value; anything malformed counts as zero.
pub fn parse_attempt(value: Option<&str>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}
