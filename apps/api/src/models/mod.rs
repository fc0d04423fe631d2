pub mod application;
pub mod compensation;
pub mod contract;
pub mod cv;
pub mod gdpr;
pub mod interview;
pub mod profile;
pub mod usage;
