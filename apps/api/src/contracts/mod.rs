// Employment contract review: deterministic red-flag scan, LLM clause
// analysis and a server-side risk score.

pub mod analysis;
pub mod handlers;
pub mod prompts;
pub mod red_flags;
pub mod scoring;
