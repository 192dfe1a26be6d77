use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::orders::PaymentStatus,
    error::error_response,
    response::{ApiResponse, Meta},
    services::webhook_service::ReconcileOutcome,
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub outcome: String,
    pub order_id: Option<Uuid>,
    pub payment_status: Option<PaymentStatus>,
}

impl From<ReconcileOutcome> for WebhookAck {
    fn from(outcome: ReconcileOutcome) -> Self {
        let (name, order_id, payment_status) = match outcome {
            ReconcileOutcome::Applied { order_id, status } => {
                ("applied", Some(order_id), Some(status))
            }
            ReconcileOutcome::Duplicate => ("duplicate", None, None),
            ReconcileOutcome::Mismatched => ("mismatched", None, None),
            ReconcileOutcome::Ignored => ("ignored", None, None),
        };
        Self {
            outcome: name.to_string(),
            order_id,
            payment_status,
        }
    }
}

/// YooKassa notification endpoint. Client errors are answered with 400 so
/// the provider stops retrying; storage failures with 500 so it retries.
#[utoipa::path(
    post,
    path = "/yookassa_payment_webhook",
    request_body(content = String, description = "YooKassa notification JSON", content_type = "application/json"),
    responses(
        (status = 200, description = "Notification processed", body = ApiResponse<WebhookAck>),
        (status = 400, description = "Malformed or uncorrelated notification"),
        (status = 500, description = "Storage failure"),
    ),
    tag = "Webhooks"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Response {
    match state.reconciler.reconcile(&body).await {
        Ok(outcome) => {
            tracing::info!(?outcome, "payment notification handled");
            let ack = WebhookAck::from(outcome);
            (
                StatusCode::OK,
                Json(ApiResponse::success("OK", ack, Some(Meta::empty()))),
            )
                .into_response()
        }
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                tracing::error!(error = %err, "payment notification failed");
            } else {
                tracing::warn!(error = %err, "payment notification rejected");
            }
            error_response(status, err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_reports_applied_transition() {
        let order_id = Uuid::new_v4();
        let ack = WebhookAck::from(ReconcileOutcome::Applied {
            order_id,
            status: PaymentStatus::Paid,
        });
        assert_eq!(ack.outcome, "applied");
        assert_eq!(ack.order_id, Some(order_id));
        assert_eq!(ack.payment_status, Some(PaymentStatus::Paid));
    }

    #[test]
    fn ack_for_duplicate_carries_no_order() {
        let ack = WebhookAck::from(ReconcileOutcome::Duplicate);
        assert_eq!(ack.outcome, "duplicate");
        assert!(ack.order_id.is_none());
    }
}
