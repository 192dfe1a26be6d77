use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::{bot, state::AppState, telegram::Update};

pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Telegram webhook. Anything past the secret check is acknowledged with 200
/// so Telegram does not redeliver updates the bot failed to handle.
#[utoipa::path(
    post,
    path = "/telegram/webhook",
    request_body(content = String, description = "Telegram Update JSON", content_type = "application/json"),
    responses(
        (status = 200, description = "Update accepted"),
        (status = 403, description = "Secret token mismatch"),
    ),
    tag = "Webhooks"
)]
pub async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let secret = headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    if secret != Some(state.config.telegram.webhook_secret.as_str()) {
        tracing::warn!("telegram webhook rejected: bad secret token");
        return StatusCode::FORBIDDEN;
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(err) => {
            tracing::warn!(error = %err, "unparseable telegram update");
            return StatusCode::OK;
        }
    };

    let update_id = update.update_id;
    let user_id = update.sender().map(|user| user.id);
    if let Err(err) = bot::dispatch(&state, update).await {
        tracing::error!(update_id, ?user_id, error = %err, "update handling failed");
    }
    StatusCode::OK
}
