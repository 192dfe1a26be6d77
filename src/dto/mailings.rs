use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMailingRequest {
    pub message_text: String,
    pub photo_url: Option<String>,
}
