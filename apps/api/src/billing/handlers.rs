use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::billing::webhook::{interpret_event, verify_signature, TierChange, WebhookEvent};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/webhooks/stripe
///
/// Unauthenticated; the signature is the authentication. Takes the raw body
/// because the signature covers the exact bytes sent.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers.get("stripe-signature").and_then(|v| v.to_str().ok());
    verify_signature(
        &body,
        signature,
        &state.config.stripe_webhook_secret,
        Utc::now().timestamp(),
    )?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Malformed webhook payload: {e}")))?;

    match interpret_event(&event) {
        TierChange::Set { user_id, tier } => {
            let updated = sqlx::query("UPDATE profiles SET tier = $2 WHERE id = $1")
                .bind(user_id)
                .bind(tier.as_str())
                .execute(&state.db)
                .await?;
            if updated.rows_affected() == 0 {
                warn!("{} for unknown user {user_id}", event.event_type);
            } else {
                info!("User {user_id} moved to tier {} ({})", tier.as_str(), event.event_type);
            }
        }
        TierChange::Ignore(reason) => info!("Webhook ignored: {reason}"),
    }

    Ok(Json(json!({ "received": true })))
}
