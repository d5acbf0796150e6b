use serde::{Deserialize, Serialize};

/// Languages the call flow can speak. The serialized form is the speech
/// locale tag the telephony gateway expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    English,
    #[serde(rename = "hi-IN")]
    Hindi,
}

impl Language {
    pub fn tag(self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
        }
    }

    /// Parses a locale tag. Unknown tags yield `None` so callers can pick
    /// their own fallback.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "en-us" | "en" => Some(Language::English),
            "hi-in" | "hi" => Some(Language::Hindi),
            _ => None,
        }
    }

    /// Menu mapping for the new-caller prompt: `2` is Hindi, anything else
    /// (including no key press) is English.
    pub fn from_digit(digit: Option<&str>) -> Self {
        match digit.map(str::trim) {
            Some("2") => Language::Hindi,
            _ => Language::English,
        }
    }

    /// The key that selects this language on the new-caller menu.
    pub fn menu_digit(self) -> &'static str {
        match self {
            Language::English => "1",
            Language::Hindi => "2",
        }
    }
}
