// CV versions (upload, manual, tailored) and AI tailoring.
// Every version is append-only and snapshotted to object storage.

pub mod handlers;
pub mod prompts;
pub mod tailor;
pub mod versioning;
