use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Language;

/// A registered job seeker, keyed by the phone number they call from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Worker {
    pub phone_number: String,
    pub skill: String,
    pub location: String,
    /// Locale tag as stored; parse with [`Worker::preferred_language`].
    pub language: String,
}

impl Worker {
    pub fn new(phone_number: String, skill: String, location: String, language: Language) -> Self {
        Self {
            phone_number,
            skill,
            location,
            language: language.tag().to_string(),
        }
    }

    pub fn preferred_language(&self) -> Language {
        Language::from_tag(&self.language).unwrap_or_default()
    }
}
