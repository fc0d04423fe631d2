// GDPR surface: consent log, data export and the deletion-request workflow.

pub mod consent;
pub mod deletion;
pub mod export;
pub mod handlers;
