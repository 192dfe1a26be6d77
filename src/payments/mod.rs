use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use uuid::Uuid;

pub mod yookassa;

pub use yookassa::YooKassaClient;

pub const CURRENCY: &str = "RUB";

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment provider rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected payment provider response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub description: String,
    pub order_id: Uuid,
    pub user_id: i64,
}

/// Provider-side pending charge.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    pub confirmation_url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Each call carries a fresh idempotency key; failures are not retried.
    async fn create_intent(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentIntent, PaymentGatewayError>;
}

/// Fresh idempotency token for one provider call.
pub fn new_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}

/// Amount as the provider expects it: always two fractional digits.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_always_carry_two_decimals() {
        assert_eq!(format_amount(Decimal::new(250, 0)), "250.00");
        assert_eq!(format_amount(Decimal::new(12345, 3)), "12.35");
        assert_eq!(format_amount(Decimal::new(5, 1)), "0.50");
    }

    #[test]
    fn idempotency_keys_are_unique() {
        assert_ne!(new_idempotency_key(), new_idempotency_key());
    }
}
