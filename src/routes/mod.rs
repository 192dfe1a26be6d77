use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::{get, post},
};

use crate::{
    config::AppConfig,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod admin;
pub mod doc;
pub mod health;
pub mod params;
pub mod payments;
pub mod telegram;

// Webhook paths come from configuration; state is bound at the top level.
pub fn create_router(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route(&config.telegram.webhook_path, post(telegram::telegram_webhook))
        .route(&config.yookassa.webhook_path, post(payments::payment_webhook))
        .nest("/api/admin", admin::router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
