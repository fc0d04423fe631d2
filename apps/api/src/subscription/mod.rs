// Tiered subscriptions: monthly per-feature quotas enforced with the split pattern
// (check before the action, increment after it succeeds).

pub mod handlers;
pub mod tiers;
pub mod usage;
