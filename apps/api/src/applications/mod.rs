// Job-application tracking: CRUD over `job_applications`, pipeline stats,
// and indicator scoring of the user's CV against a posting.

pub mod handlers;
pub mod indicators;
pub mod job_parser;
pub mod prompts;
pub mod repository;
pub mod status;
pub mod tracking;
pub mod validation;
