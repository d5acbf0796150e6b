//! Markup responses for the telephony gateway.
//!
//! A response is an ordered list of verbs: speak text, collect keypad digits
//! or speech (posting the result to an `action` URL), redirect to another
//! endpoint, or hang up. Handlers build a [`VoiceResponse`] and return it
//! directly; it renders itself as `text/xml`.

use std::borrow::Cow;
use std::fmt::Write as _;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

use crate::models::Language;

/// Voice used for every `<Say>`.
pub const VOICE: &str = "alice";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherInput {
    Dtmf,
    Speech,
}

impl GatherInput {
    fn as_str(self) -> &'static str {
        match self {
            GatherInput::Dtmf => "dtmf",
            GatherInput::Speech => "speech",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Say {
    pub language: Language,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gather {
    pub input: GatherInput,
    pub num_digits: Option<u8>,
    pub action: String,
    pub language: Option<Language>,
    pub speech_timeout: Option<&'static str>,
    pub prompts: Vec<Say>,
}

impl Gather {
    /// Collects a single key press.
    pub fn digit(action: String) -> Self {
        Self {
            input: GatherInput::Dtmf,
            num_digits: Some(1),
            action,
            language: None,
            speech_timeout: None,
            prompts: Vec::new(),
        }
    }

    /// Collects one spoken phrase, recognised in `language`.
    pub fn speech(action: String, language: Language) -> Self {
        Self {
            input: GatherInput::Speech,
            num_digits: None,
            action,
            language: Some(language),
            speech_timeout: Some("auto"),
            prompts: Vec::new(),
        }
    }

    pub fn say(mut self, language: Language, text: impl Into<String>) -> Self {
        self.prompts.push(Say {
            language,
            text: text.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verb {
    Say(Say),
    Gather(Gather),
    Redirect(String),
    Hangup,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, language: Language, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say(Say {
            language,
            text: text.into(),
        }));
        self
    }

    pub fn gather(mut self, gather: Gather) -> Self {
        self.verbs.push(Verb::Gather(gather));
        self
    }

    /// Re-enters the flow at `url` with a POST.
    pub fn redirect(mut self, url: String) -> Self {
        self.verbs.push(Verb::Redirect(url));
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    /// True when the call ends after this response.
    pub fn ends_call(&self) -> bool {
        matches!(self.verbs.last(), Some(Verb::Hangup))
    }

    pub fn render(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>");
        for verb in &self.verbs {
            match verb {
                Verb::Say(say) => render_say(&mut xml, say),
                Verb::Gather(gather) => render_gather(&mut xml, gather),
                Verb::Redirect(url) => {
                    let _ = write!(xml, "<Redirect method=\"POST\">{}</Redirect>", escape(url));
                }
                Verb::Hangup => xml.push_str("<Hangup/>"),
            }
        }
        xml.push_str("</Response>");
        xml
    }
}

/// Inspection helpers for handler tests.
#[cfg(test)]
impl VoiceResponse {
    /// The first gather, if this response waits for caller input.
    pub fn first_gather(&self) -> Option<&Gather> {
        self.verbs.iter().find_map(|v| match v {
            Verb::Gather(g) => Some(g),
            _ => None,
        })
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.verbs.iter().find_map(|v| match v {
            Verb::Redirect(url) => Some(url.as_str()),
            _ => None,
        })
    }

    /// Every spoken sentence in document order, nested prompts included.
    pub fn spoken(&self) -> Vec<&Say> {
        let mut out = Vec::new();
        for verb in &self.verbs {
            match verb {
                Verb::Say(say) => out.push(say),
                Verb::Gather(g) => out.extend(g.prompts.iter()),
                _ => {}
            }
        }
        out
    }
}

impl IntoResponse for VoiceResponse {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "text/xml")], self.render()).into_response()
    }
}

fn render_say(xml: &mut String, say: &Say) {
    let _ = write!(
        xml,
        "<Say voice=\"{VOICE}\" language=\"{}\">{}</Say>",
        say.language.tag(),
        escape(&say.text)
    );
}

fn render_gather(xml: &mut String, gather: &Gather) {
    let _ = write!(xml, "<Gather input=\"{}\"", gather.input.as_str());
    if let Some(n) = gather.num_digits {
        let _ = write!(xml, " numDigits=\"{n}\"");
    }
    let _ = write!(xml, " action=\"{}\" method=\"POST\"", escape(&gather.action));
    if let Some(lang) = gather.language {
        let _ = write!(xml, " language=\"{}\"", lang.tag());
    }
    if let Some(timeout) = gather.speech_timeout {
        let _ = write!(xml, " speechTimeout=\"{timeout}\"");
    }
    xml.push('>');
    for say in &gather.prompts {
        render_say(xml, say);
    }
    xml.push_str("</Gather>");
}

/// Escapes the five XML special characters for text and attribute values.
fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
