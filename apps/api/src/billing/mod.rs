// Payment-provider webhook: signature verification and tier sync.

pub mod handlers;
pub mod webhook;
