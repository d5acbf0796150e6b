//! Axum route handlers for the phone call flow.
//!
//! Each endpoint is one step of the conversation. The gateway posts the
//! caller's input (key presses, speech transcript) as a form body; anything
//! earlier steps learned comes back through the callback URL's query string
//! and the call session. Handlers always answer with markup: failures become
//! spoken apologies, never HTTP errors.

use axum::{
    extract::{Query, State},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::ivr::callback::{
    non_blank, CallbackUrl, HANDLE_SKILL, LANGUAGE_CHOICE, REGISTER_AND_FIND_JOBS,
    RETURNING_CHOICE, WELCOME,
};
use crate::ivr::context::CallContext;
use crate::ivr::prompts;
use crate::ivr::search;
use crate::models::{Language, Worker};
use crate::session::Stage;
use crate::state::AppState;
use crate::twiml::{Gather, VoiceResponse};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Form fields the gateway posts on every request. Only the ones the flow
/// reads are listed; the rest are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct GatewayParams {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "Digits")]
    pub digits: Option<String>,
    #[serde(rename = "SpeechResult")]
    pub speech_result: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguageChoiceQuery {
    #[serde(rename = "Digits")]
    pub digits: Option<String>,
    pub attempt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SkillQuery {
    pub lang: Option<String>,
    #[serde(rename = "SpeechResult")]
    pub speech_result: Option<String>,
    pub attempt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterQuery {
    pub lang: Option<String>,
    pub skill: Option<String>,
    pub attempt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturningQuery {
    pub skill: Option<String>,
    pub location: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    pub number: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /ivr/welcome
///
/// Entry point for every call. Known callers get the search/update menu,
/// everyone else picks a language.
pub async fn handle_welcome(
    State(state): State<AppState>,
    Form(params): Form<GatewayParams>,
) -> VoiceResponse {
    info!("Incoming call to /ivr/welcome");
    let mut call = CallContext::open(&state, params.call_sid.as_deref()).await;

    let Some(caller) = non_blank(params.from.as_deref()) else {
        warn!("Call arrived without a caller number");
        return call.finish(&state, system_error()).await;
    };

    info!("Searching for worker with phone: {caller}");
    let response = match state.store.find_worker(&caller).await {
        Ok(Some(worker)) => {
            info!("Found returning worker");
            let lang = worker.preferred_language();
            let action = CallbackUrl::new(RETURNING_CHOICE)
                .param("skill", worker.skill.as_str())
                .param("location", worker.location.as_str())
                .param("lang", lang.tag())
                .build();
            let menu = prompts::returning_menu(lang, &worker.skill, &worker.location);

            call.restart();
            call.session.stage = Stage::ReturningChoice;
            call.session.language = Some(lang);
            call.session.skill = Some(worker.skill);
            call.session.location = Some(worker.location);

            VoiceResponse::new().gather(Gather::digit(action).say(lang, menu))
        }
        Ok(None) => {
            info!("New worker detected");
            call.restart();
            call.session.stage = Stage::LanguageChoice;

            VoiceResponse::new().gather(
                Gather::digit(CallbackUrl::new(LANGUAGE_CHOICE).build())
                    .say(Language::English, prompts::NEW_CALLER_ENGLISH)
                    .say(Language::Hindi, prompts::NEW_CALLER_HINDI),
            )
        }
        Err(e) => {
            error!("Store error in /ivr/welcome: {e}");
            system_error()
        }
    };

    call.finish(&state, response).await
}

/// POST /ivr/handle-language-choice
///
/// `2` selects Hindi, anything else English; then asks for the caller's work.
/// Re-prompt redirects pass the digit in the query instead of the body.
pub async fn handle_language_choice(
    State(state): State<AppState>,
    Query(query): Query<LanguageChoiceQuery>,
    Form(params): Form<GatewayParams>,
) -> VoiceResponse {
    info!("Handling language choice");
    let mut call = CallContext::open(&state, params.call_sid.as_deref()).await;

    let digits =
        non_blank(params.digits.as_deref()).or_else(|| non_blank(query.digits.as_deref()));
    let lang = Language::from_digit(digits.as_deref());
    let attempts = call.attempts(query.attempt.as_deref());

    call.session.language = Some(lang);
    call.session.stage = Stage::Skill;
    call.session.attempts = attempts;

    let action = CallbackUrl::new(HANDLE_SKILL)
        .param("lang", lang.tag())
        .attempt(attempts)
        .build();
    let response = VoiceResponse::new()
        .gather(Gather::speech(action, lang).say(lang, prompts::ask_skill(lang)));

    call.finish(&state, response).await
}

/// POST /ivr/handle-skill
///
/// Takes the spoken skill and asks for the city. A missing transcript loops
/// back to the skill question.
pub async fn handle_skill(
    State(state): State<AppState>,
    Query(query): Query<SkillQuery>,
    Form(params): Form<GatewayParams>,
) -> VoiceResponse {
    info!("Handling skill input");
    let mut call = CallContext::open(&state, params.call_sid.as_deref()).await;
    let lang = call.language(query.lang.as_deref());
    call.session.language = Some(lang);
    let prior = call.attempts(query.attempt.as_deref());

    // A transcript in the body is a fresh answer. One in the query is the
    // skill echoed back after the city was missed, so the miss count stays.
    let (skill, attempts) = match non_blank(params.speech_result.as_deref()) {
        Some(skill) => (Some(skill), 0),
        None => (non_blank(query.speech_result.as_deref()), prior),
    };

    let response = match skill {
        Some(skill) => {
            info!("Skill captured: {skill}");
            let action = CallbackUrl::new(REGISTER_AND_FIND_JOBS)
                .param("lang", lang.tag())
                .param("skill", skill.as_str())
                .attempt(attempts)
                .build();

            call.session.skill = Some(skill);
            call.session.stage = Stage::Location;
            call.session.attempts = attempts;

            VoiceResponse::new()
                .gather(Gather::speech(action, lang).say(lang, prompts::ask_location(lang)))
        }
        None => {
            warn!("Speech for skill not recognized");
            reprompt_skill(&mut call, lang, prior, state.max_reprompts)
        }
    };

    call.finish(&state, response).await
}

/// POST /ivr/register-and-find-jobs
///
/// Takes the spoken city, registers the caller and reads out matching jobs.
pub async fn handle_register_and_find_jobs(
    State(state): State<AppState>,
    Query(query): Query<RegisterQuery>,
    Form(params): Form<GatewayParams>,
) -> VoiceResponse {
    info!("Registering worker and finding jobs");
    let mut call = CallContext::open(&state, params.call_sid.as_deref()).await;
    let lang = call.language(query.lang.as_deref());
    call.session.language = Some(lang);
    let prior = call.attempts(query.attempt.as_deref());

    let Some(skill) =
        non_blank(query.skill.as_deref()).or_else(|| call.session.skill.clone())
    else {
        warn!("Callback arrived without a skill; asking for it again");
        let response = reprompt_skill(&mut call, lang, prior, state.max_reprompts);
        return call.finish(&state, response).await;
    };

    let Some(location) = non_blank(params.speech_result.as_deref()) else {
        warn!("Speech for location not recognized");
        let response = reprompt_location(&mut call, lang, &skill, prior, state.max_reprompts);
        return call.finish(&state, response).await;
    };

    let Some(caller) = non_blank(params.from.as_deref()) else {
        warn!("Registration arrived without a caller number");
        return call.finish(&state, system_error()).await;
    };

    // No duplicate check: a replayed request inserts a second row.
    info!("Registering worker: {caller}, {skill}, {location}");
    let worker = Worker::new(caller, skill.clone(), location.clone(), lang);
    if let Err(e) = state.store.insert_worker(&worker).await {
        error!("Store error while registering worker: {e}");
        let response = VoiceResponse::new()
            .say(Language::English, prompts::SAVE_ERROR)
            .hangup();
        return call.finish(&state, response).await;
    }
    info!("Worker registered successfully");

    call.session.skill = Some(skill.clone());
    call.session.location = Some(location.clone());
    call.session.attempts = 0;

    let response = search_and_present(&state, &mut call, &skill, &location, lang).await;
    call.finish(&state, response).await
}

/// POST /ivr/handle-returning-choice
///
/// `1` searches with the stored skill and city, `2` deletes the caller's
/// record and starts registration over, anything else ends the call.
pub async fn handle_returning_choice(
    State(state): State<AppState>,
    Query(query): Query<ReturningQuery>,
    Form(params): Form<GatewayParams>,
) -> VoiceResponse {
    info!("Handling returning user choice");
    let mut call = CallContext::open(&state, params.call_sid.as_deref()).await;
    let lang = call.language(query.lang.as_deref());
    call.session.language = Some(lang);
    let caller = non_blank(params.from.as_deref());

    let response = match non_blank(params.digits.as_deref()).as_deref() {
        Some("1") => {
            search_for_returning(&state, &mut call, &query, caller.as_deref(), lang).await
        }
        Some("2") => re_register(&state, &mut call, caller.as_deref()).await,
        other => {
            info!("Invalid returning-caller choice: {other:?}");
            VoiceResponse::new()
                .say(lang, prompts::invalid_choice(lang))
                .hangup()
        }
    };

    call.finish(&state, response).await
}

/// POST /ivr/provide-contact
///
/// Reads the employer's number digit by digit in both languages and hangs up.
pub async fn handle_provide_contact(
    State(state): State<AppState>,
    Query(query): Query<ContactQuery>,
    Form(params): Form<GatewayParams>,
) -> VoiceResponse {
    info!("Providing contact number");
    let call = CallContext::open(&state, params.call_sid.as_deref()).await;

    let number =
        non_blank(query.number.as_deref()).or_else(|| call.session.contact_number.clone());
    let response = match number {
        Some(number) => {
            let spaced = prompts::spaced_digits(&number);
            VoiceResponse::new()
                .say(Language::English, prompts::contact_english(&spaced))
                .say(Language::Hindi, prompts::contact_hindi(&spaced))
                .hangup()
        }
        None => {
            warn!("No contact number to read out");
            system_error()
        }
    };

    call.finish(&state, response).await
}

// ────────────────────────────────────────────────────────────────────────────
// Shared steps
// ────────────────────────────────────────────────────────────────────────────

fn system_error() -> VoiceResponse {
    VoiceResponse::new()
        .say(Language::English, prompts::SYSTEM_ERROR)
        .hangup()
}

/// The next miss count, or `None` once `max` re-prompts have been used.
fn next_attempt(prior: u32, max: u32) -> Option<u32> {
    let next = prior.saturating_add(1);
    (next <= max).then_some(next)
}

fn give_up(lang: Language) -> VoiceResponse {
    VoiceResponse::new()
        .say(lang, prompts::too_many_attempts(lang))
        .hangup()
}

/// Apologises and replays the skill question via the language-choice step.
fn reprompt_skill(call: &mut CallContext, lang: Language, prior: u32, max: u32) -> VoiceResponse {
    let Some(attempts) = next_attempt(prior, max) else {
        warn!("Giving up after {prior} unrecognised answers");
        return give_up(lang);
    };

    call.session.stage = Stage::LanguageChoice;
    call.session.attempts = attempts;

    let redirect = CallbackUrl::new(LANGUAGE_CHOICE)
        .param("Digits", lang.menu_digit())
        .attempt(attempts)
        .build();
    VoiceResponse::new()
        .say(lang, prompts::skill_not_caught(lang))
        .redirect(redirect)
}

/// Apologises and replays the city question, echoing the skill so it is not
/// asked again.
fn reprompt_location(
    call: &mut CallContext,
    lang: Language,
    skill: &str,
    prior: u32,
    max: u32,
) -> VoiceResponse {
    let Some(attempts) = next_attempt(prior, max) else {
        warn!("Giving up after {prior} unrecognised answers");
        return give_up(lang);
    };

    call.session.stage = Stage::Skill;
    call.session.skill = Some(skill.to_string());
    call.session.attempts = attempts;

    let redirect = CallbackUrl::new(HANDLE_SKILL)
        .param("lang", lang.tag())
        .param("SpeechResult", skill)
        .attempt(attempts)
        .build();
    VoiceResponse::new()
        .say(lang, prompts::location_not_caught(lang))
        .redirect(redirect)
}

async fn search_and_present(
    state: &AppState,
    call: &mut CallContext,
    skill: &str,
    location: &str,
    lang: Language,
) -> VoiceResponse {
    match search::search_jobs(state.matcher.as_ref(), state.store.as_ref(), skill, location).await
    {
        Ok(outcome) => {
            call.session.contact_number = outcome.contact_number().map(str::to_string);
            call.session.stage = Stage::ProvideContact;
            search::present(&outcome, skill, location, lang)
        }
        Err(e) => {
            error!("Store error during job search: {e}");
            system_error()
        }
    }
}

async fn search_for_returning(
    state: &AppState,
    call: &mut CallContext,
    query: &ReturningQuery,
    caller: Option<&str>,
    lang: Language,
) -> VoiceResponse {
    let mut skill = non_blank(query.skill.as_deref()).or_else(|| call.session.skill.clone());
    let mut location =
        non_blank(query.location.as_deref()).or_else(|| call.session.location.clone());

    // Callback lost its parameters: re-derive them from the worker row.
    if skill.is_none() || location.is_none() {
        if let Some(phone) = caller {
            match state.store.find_worker(phone).await {
                Ok(Some(worker)) => {
                    skill = skill.or(Some(worker.skill));
                    location = location.or(Some(worker.location));
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Store error while reloading worker: {e}");
                    return system_error();
                }
            }
        }
    }

    let (Some(skill), Some(location)) = (skill, location) else {
        warn!("No skill or location available for returning caller");
        return system_error();
    };

    call.session.skill = Some(skill.clone());
    call.session.location = Some(location.clone());
    search_and_present(state, call, &skill, &location, lang).await
}

async fn re_register(
    state: &AppState,
    call: &mut CallContext,
    caller: Option<&str>,
) -> VoiceResponse {
    let Some(phone) = caller else {
        warn!("Update request arrived without a caller number");
        return system_error();
    };

    info!("Deleting old worker record for re-registration: {phone}");
    match state.store.delete_worker(phone).await {
        Ok(removed) => {
            info!("Removed {removed} worker row(s)");
            call.restart();
            call.session.stage = Stage::Welcome;
            VoiceResponse::new().redirect(CallbackUrl::new(WELCOME).build())
        }
        Err(e) => {
            error!("Store error while deleting worker: {e}");
            system_error()
        }
    }
}
