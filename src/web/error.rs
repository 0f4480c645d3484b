//! Mapping of typed failures onto HTTP responses

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::core::error::MachineError;
use crate::machine::UnknownRecipe;
use crate::web::models::ErrorResponse;
use crate::web::rate_limit::RateLimited;

/// Every failure a handler can report
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Machine(#[from] MachineError),

    #[error(transparent)]
    UnknownRecipe(#[from] UnknownRecipe),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited(RateLimited),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RateLimited> for ApiError {
    fn from(limited: RateLimited) -> Self {
        ApiError::RateLimited(limited)
    }
}

impl ApiError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Machine(e) => e.kind(),
            ApiError::UnknownRecipe(_) => "UnknownRecipe",
            ApiError::RateLimited(_) => "RateLimitExceeded",
            ApiError::InvalidRequest(_) => "InvalidRequest",
            ApiError::Internal(_) => "InternalError",
        }
    }

    fn details(&self) -> serde_json::Value {
        match self {
            ApiError::Machine(MachineError::InvalidAmount { amount, reason }) => json!({
                "amount": amount,
                "reason": reason,
            }),
            ApiError::Machine(MachineError::ContainerOverflow {
                container,
                level,
                capacity,
                attempted,
                max_fillable,
            }) => json!({
                "container_type": container,
                "current_level": level,
                "capacity": capacity,
                "attempted_amount": attempted,
                "max_fillable": max_fillable,
            }),
            ApiError::Machine(MachineError::InsufficientResources { shortages }) => json!({
                "shortages": shortages,
            }),
            ApiError::UnknownRecipe(UnknownRecipe(name)) => json!({
                "recipe": name,
            }),
            ApiError::RateLimited(limited) => json!({
                "limit": limited.limit,
                "class": limited.class,
                "retry_after_secs": limited.retry_after.as_secs(),
            }),
            _ => json!({}),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Machine(MachineError::InvalidAmount { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Machine(MachineError::ContainerOverflow { .. }) => StatusCode::CONFLICT,
            ApiError::Machine(MachineError::InsufficientResources { .. }) => StatusCode::CONFLICT,
            ApiError::Machine(MachineError::Persistence(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UnknownRecipe(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());

        if let ApiError::RateLimited(limited) = self {
            // Round up so clients never retry early
            let secs = limited.retry_after.as_secs() + u64::from(limited.retry_after.subsec_nanos() > 0);
            builder.insert_header((header::RETRY_AFTER, secs.to_string()));
        }

        builder.json(ErrorResponse {
            success: false,
            message: self.to_string(),
            error_type: self.error_type().to_string(),
            details: self.details(),
        })
    }
}
