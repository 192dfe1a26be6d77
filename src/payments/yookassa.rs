use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    CURRENCY, PaymentGateway, PaymentGatewayError, PaymentIntent, PaymentRequest, format_amount,
    new_idempotency_key,
};
use crate::config::YooKassaConfig;

#[derive(Debug, Serialize)]
struct Amount {
    value: String,
    currency: &'static str,
}

#[derive(Debug, Serialize)]
struct RedirectConfirmation<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    return_url: &'a str,
}

#[derive(Debug, Serialize)]
struct Metadata {
    order_id: String,
    telegram_user_id: i64,
}

#[derive(Debug, Serialize)]
struct CreatePayment<'a> {
    amount: Amount,
    confirmation: RedirectConfirmation<'a>,
    capture: bool,
    description: &'a str,
    metadata: Metadata,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: String,
    confirmation: Option<ConfirmationResponse>,
}

#[derive(Debug, Deserialize)]
struct ConfirmationResponse {
    confirmation_url: Option<String>,
}

/// YooKassa `/payments` API client.
#[derive(Clone)]
pub struct YooKassaClient {
    http: Client,
    cfg: YooKassaConfig,
}

impl YooKassaClient {
    pub fn new(cfg: YooKassaConfig) -> Result<Self, PaymentGatewayError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(cfg.timeout)
            .build()?;
        Ok(Self { http, cfg })
    }
}

#[async_trait]
impl PaymentGateway for YooKassaClient {
    async fn create_intent(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let idempotence_key = new_idempotency_key();
        let body = CreatePayment {
            amount: Amount {
                value: format_amount(request.amount),
                currency: CURRENCY,
            },
            confirmation: RedirectConfirmation {
                kind: "redirect",
                return_url: &self.cfg.return_url,
            },
            capture: true,
            description: &request.description,
            metadata: Metadata {
                order_id: request.order_id.to_string(),
                telegram_user_id: request.user_id,
            },
        };

        tracing::debug!(
            order_id = %request.order_id,
            amount = %body.amount.value,
            idempotence_key = %idempotence_key,
            "creating payment"
        );

        let url = format!("{}/payments", self.cfg.api_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .basic_auth(&self.cfg.shop_id, Some(&self.cfg.secret_key))
            .header("Idempotence-Key", &idempotence_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentGatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let payment: PaymentResponse = response.json().await?;
        let confirmation_url = payment
            .confirmation
            .and_then(|c| c.confirmation_url)
            .ok_or_else(|| {
                PaymentGatewayError::InvalidResponse(format!(
                    "payment {} has no confirmation url",
                    payment.id
                ))
            })?;

        Ok(PaymentIntent {
            id: payment.id,
            confirmation_url,
        })
    }
}
