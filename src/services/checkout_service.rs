use std::sync::Arc;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{
    conversation::{ConversationState, ConversationStore},
    error::AppResult,
    payments::{PaymentGateway, PaymentRequest},
    services::{cart_service, order_service},
    telegram::escape_html,
};

/// What the chat layer should show after a checkout step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Nothing to check out; show the cart instead.
    ShowCart,
    PromptDeliveryInfo,
    /// Delivery text was blank; state is unchanged.
    Reprompt,
    ConfirmDeliveryInfo {
        delivery_info: String,
    },
    MissingDeliveryInfo,
    PaymentRequired {
        order_id: Uuid,
        confirmation_url: String,
    },
    Failed,
}

/// Drives a user from the cart through delivery info to a payable order.
#[derive(Clone)]
pub struct CheckoutService {
    db: DatabaseConnection,
    conversations: Arc<ConversationStore>,
    payments: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(
        db: DatabaseConnection,
        conversations: Arc<ConversationStore>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            db,
            conversations,
            payments,
        }
    }

    pub async fn start(&self, user_id: i64) -> AppResult<CheckoutStep> {
        if cart_service::list(&self.db, user_id).await?.is_empty() {
            self.conversations.clear(user_id);
            return Ok(CheckoutStep::ShowCart);
        }

        self.conversations
            .set(user_id, ConversationState::AwaitingDeliveryInfo);
        Ok(CheckoutStep::PromptDeliveryInfo)
    }

    /// Also accepted while awaiting confirmation: new text replaces the pending
    /// details, and blank text keeps them.
    pub fn submit_delivery_info(&self, user_id: i64, text: &str) -> CheckoutStep {
        match self.conversations.get(user_id) {
            ConversationState::AwaitingDeliveryInfo
            | ConversationState::AwaitingConfirmation { .. } => {}
            _ => return CheckoutStep::MissingDeliveryInfo,
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return CheckoutStep::Reprompt;
        }

        let delivery_info = escape_html(trimmed);
        self.conversations.set(
            user_id,
            ConversationState::AwaitingConfirmation {
                delivery_info: delivery_info.clone(),
            },
        );
        CheckoutStep::ConfirmDeliveryInfo { delivery_info }
    }

    /// Creates the order and its payment. Every outcome leaves the user idle.
    pub async fn confirm(&self, user_id: i64) -> CheckoutStep {
        let delivery_info = match self.conversations.take(user_id) {
            ConversationState::AwaitingConfirmation { delivery_info } => delivery_info,
            _ => return CheckoutStep::MissingDeliveryInfo,
        };

        match self.place_order(user_id, &delivery_info).await {
            Ok(step) => step,
            Err(err) => {
                tracing::error!(user_id, error = %err, "checkout failed");
                CheckoutStep::Failed
            }
        }
    }

    pub fn cancel(&self, user_id: i64) -> CheckoutStep {
        self.conversations.clear(user_id);
        CheckoutStep::ShowCart
    }

    async fn place_order(&self, user_id: i64, delivery_info: &str) -> AppResult<CheckoutStep> {
        let Some(created) =
            order_service::materialize_from_cart(&self.db, user_id, delivery_info).await?
        else {
            return Ok(CheckoutStep::ShowCart);
        };
        let order = created.order;
        let ordered: Vec<Uuid> = created
            .items
            .iter()
            .filter_map(|item| item.product_id)
            .collect();

        // The cart stays intact until the payment id is stored, so a provider
        // failure leaves a pending order without payment id and a usable cart.
        let intent = self
            .payments
            .create_intent(PaymentRequest {
                amount: order.total_amount,
                description: format!("Payment for order #{}", order.id),
                order_id: order.id,
                user_id,
            })
            .await
            .inspect_err(|err| {
                tracing::warn!(order_id = %order.id, error = %err, "payment intent failed");
            })?;

        order_service::attach_payment_id(&self.db, order.id, &intent.id).await?;
        // Entries added while the provider call was in flight are not part of the order.
        cart_service::remove_products(&self.db, user_id, &ordered).await?;

        tracing::info!(order_id = %order.id, payment_id = %intent.id, "awaiting payment");
        Ok(CheckoutStep::PaymentRequired {
            order_id: order.id,
            confirmation_url: intent.confirmation_url,
        })
    }
}
