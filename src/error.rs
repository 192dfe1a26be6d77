use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    payments::PaymentGatewayError,
    response::{ApiResponse, Meta},
    telegram::TransportError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    /// Bad user input; recovered locally by re-prompting.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Payment provider error")]
    PaymentGateway(#[from] PaymentGatewayError),

    #[error("Chat transport error")]
    Transport(#[from] TransportError),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::PaymentGateway(_) | AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::OrmError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        error_response(status, self.to_string())
    }
}

/// Error envelope shared by every JSON endpoint.
pub(crate) fn error_response(status: StatusCode, message: String) -> Response {
    let body = ApiResponse {
        message: message.clone(),
        data: Some(ErrorData { error: message }),
        meta: Some(Meta::empty()),
    };

    (status, axum::Json(body)).into_response()
}

pub type AppResult<T> = Result<T, AppError>;
