use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::SectionType,
    response::{ApiResponse, Meta},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Insufficient stock for product {product_id}")]
    InsufficientStock { product_id: Uuid },

    #[error("No selected cart items")]
    EmptySelection,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("{section} is full")]
    CapacityExceeded { section: SectionType },

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
            AppError::EmptySelection | AppError::EmptyCart => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            AppError::DbError(_) | AppError::OrmError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Persistence failures leave no partial state behind, so callers may retry them.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::DbError(_) | AppError::OrmError(_))
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::DbError(err) => tracing::error!(error = %err, "database failure"),
            AppError::OrmError(err) => tracing::error!(error = %err, "orm failure"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal failure"),
            _ => {}
        }

        let message = if self.is_retryable() {
            "Temporary failure, please retry".to_string()
        } else {
            self.to_string()
        };

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData {
                error: message,
                retryable: self.is_retryable(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
