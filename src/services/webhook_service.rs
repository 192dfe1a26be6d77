use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QuerySelect, Set, TransactionTrait,
    sea_query::LockType,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    bot::texts,
    entity::orders::{ActiveModel as OrderActive, Entity as Orders, Model as OrderModel, PaymentStatus},
    services::export_service::OrderExporter,
    telegram::Notifier,
};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("malformed notification: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("notification carries no usable order id")]
    MissingCorrelation,

    #[error("order {0} not found")]
    OrderNotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl WebhookError {
    /// Only internal failures ask the provider to redeliver.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Malformed(_)
            | WebhookError::MissingCorrelation
            | WebhookError::OrderNotFound(_) => StatusCode::BAD_REQUEST,
            WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied {
        order_id: Uuid,
        status: PaymentStatus,
    },
    /// Status already equals the target.
    Duplicate,
    /// Payment id differs from the one stored on the order.
    Mismatched,
    /// Unknown event, or the order already reached the other terminal state.
    Ignored,
}

#[derive(Debug, Deserialize)]
struct Notification {
    event: String,
    object: PaymentObject,
}

#[derive(Debug, Deserialize)]
struct PaymentObject {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    order_id: Option<Value>,
    telegram_user_id: Option<Value>,
}

impl Metadata {
    fn order_id(&self) -> Option<Uuid> {
        match self.order_id.as_ref()? {
            Value::String(raw) => Uuid::parse_str(raw.trim()).ok(),
            _ => None,
        }
    }

    /// The provider echoes metadata values back as strings.
    fn telegram_user_id(&self) -> Option<i64> {
        match self.telegram_user_id.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(raw) => raw.trim().parse().ok(),
            _ => None,
        }
    }
}

/// `Some` when the notification must not change the order.
fn settled_outcome(
    order: &OrderModel,
    payment_id: &str,
    target: PaymentStatus,
) -> Option<ReconcileOutcome> {
    if order.payment_id.as_deref() != Some(payment_id) {
        tracing::warn!(
            order_id = %order.id,
            payment_id,
            stored = order.payment_id.as_deref().unwrap_or("-"),
            "payment id mismatch"
        );
        return Some(ReconcileOutcome::Mismatched);
    }
    if order.payment_status == target {
        tracing::info!(order_id = %order.id, status = ?target, "duplicate notification");
        return Some(ReconcileOutcome::Duplicate);
    }
    if !order.payment_status.can_transition_to(target) {
        tracing::warn!(
            order_id = %order.id,
            current = ?order.payment_status,
            target = ?target,
            "order already settled"
        );
        return Some(ReconcileOutcome::Ignored);
    }
    None
}

fn target_status(event: &str) -> Option<PaymentStatus> {
    match event {
        "payment.succeeded" | "payment_succeeded" => Some(PaymentStatus::Paid),
        "payment.canceled" | "payment_canceled" => Some(PaymentStatus::Canceled),
        _ => None,
    }
}

/// Applies payment notifications to orders exactly once.
#[derive(Clone)]
pub struct WebhookReconciler {
    db: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
    exporter: Arc<dyn OrderExporter>,
}

impl WebhookReconciler {
    pub fn new(
        db: DatabaseConnection,
        notifier: Arc<dyn Notifier>,
        exporter: Arc<dyn OrderExporter>,
    ) -> Self {
        Self {
            db,
            notifier,
            exporter,
        }
    }

    pub async fn reconcile(&self, body: &[u8]) -> Result<ReconcileOutcome, WebhookError> {
        let notification: Notification = serde_json::from_slice(body)?;

        let Some(target) = target_status(&notification.event) else {
            tracing::info!(event = %notification.event, "ignoring payment event");
            return Ok(ReconcileOutcome::Ignored);
        };

        let metadata = &notification.object.metadata;
        let order_id = metadata
            .order_id()
            .ok_or(WebhookError::MissingCorrelation)?;
        let payment_id = notification.object.id.as_str();

        tracing::debug!(
            %order_id,
            payment_id,
            provider_status = notification.object.status.as_deref().unwrap_or("-"),
            "payment notification received"
        );

        let txn = self.db.begin().await?;

        // Row lock held across the check and the write.
        let Some(order) = Orders::find_by_id(order_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Err(WebhookError::OrderNotFound(order_id));
        };

        if let Some(outcome) = settled_outcome(&order, payment_id, target) {
            txn.rollback().await?;
            return Ok(outcome);
        }

        let mut active: OrderActive = order.into();
        active.payment_status = Set(target);
        if target == PaymentStatus::Paid {
            active.paid_at = Set(Some(Utc::now().into()));
        }
        let order = active.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(%order_id, status = ?target, "payment status updated");

        self.after_transition(&order, metadata.telegram_user_id())
            .await;

        Ok(ReconcileOutcome::Applied {
            order_id,
            status: target,
        })
    }

    /// Best effort; the committed status is never rolled back from here.
    async fn after_transition(&self, order: &OrderModel, fallback_chat: Option<i64>) {
        let text = match order.payment_status {
            PaymentStatus::Paid => texts::order_paid_notification(order.id),
            PaymentStatus::Canceled => texts::order_canceled_notification(order.id),
            PaymentStatus::Pending => return,
        };

        match order.user_id.or(fallback_chat) {
            Some(chat_id) => {
                if let Err(err) = self.notifier.notify(chat_id, &text).await {
                    tracing::warn!(order_id = %order.id, error = %err, "payment notification failed");
                }
            }
            None => tracing::warn!(order_id = %order.id, "no recipient for payment notification"),
        }

        if order.payment_status == PaymentStatus::Paid {
            if let Err(err) = self.exporter.export_paid(&self.db, order.id).await {
                tracing::warn!(order_id = %order.id, error = %err, "order export failed");
            }
        }
    }
}
