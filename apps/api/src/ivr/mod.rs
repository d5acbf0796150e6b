//! The phone call flow: one handler per step, plus the prompts, callback
//! URLs and job search they share.

pub mod callback;
pub mod context;
pub mod handlers;
pub mod matcher;
pub mod prompts;
pub mod search;
