// Mock-interview coaching: generated question sets, per-answer feedback
// and a scored summary once the session is completed.

pub mod coach;
pub mod handlers;
pub mod prompts;
pub mod sessions;
