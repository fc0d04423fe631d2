// Salary negotiation strategy: server-side anchor math plus LLM-written
// talking points around those numbers.

pub mod anchors;
pub mod handlers;
pub mod prompts;
pub mod strategy;
