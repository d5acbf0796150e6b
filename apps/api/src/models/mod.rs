pub mod job;
pub mod language;
pub mod worker;

pub use job::{Job, JobStatus, NewJob};
pub use language::Language;
pub use worker::Worker;
