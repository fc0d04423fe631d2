//! Per-user fixed-window rate limit for AI-backed endpoints.
//!
//! One Redis key per user per wall-clock minute, `INCR`ed on every call and
//! expired after the window. If Redis is unreachable the request goes through.

use chrono::Utc;
use redis::AsyncCommands;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

const WINDOW_SECS: i64 = 60;

pub fn window_key(user_id: Uuid, unix_secs: i64) -> String {
    format!("ratelimit:{user_id}:{}", unix_secs / WINDOW_SECS)
}

/// Whether a request numbered `count` within its window is over `limit`.
pub fn exceeds(count: u64, limit: u32) -> bool {
    count > u64::from(limit)
}

async fn bump_window(client: &redis::Client, key: &str) -> redis::RedisResult<u64> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let count: u64 = conn.incr(key, 1).await?;
    if count == 1 {
        let _: () = conn.expire(key, WINDOW_SECS).await?;
    }
    Ok(count)
}

/// Fails with `RateLimited` once the caller exceeds `RATE_LIMIT_PER_MINUTE`.
pub async fn enforce_rate_limit(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    let key = window_key(user_id, Utc::now().timestamp());
    match bump_window(&state.redis, &key).await {
        Ok(count) if exceeds(count, state.config.rate_limit_per_minute) => {
            warn!("User {user_id} rate limited ({count} requests this minute)");
            Err(AppError::RateLimited)
        }
        Ok(_) => Ok(()),
        Err(e) => {
            warn!("Rate limiter unavailable, allowing request: {e}");
            Ok(())
        }
    }
}
