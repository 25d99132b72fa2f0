use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use custody_core::error::DomainError;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(e) => match e {
                DomainError::InvalidAmount
                | DomainError::InvalidInput(_)
                | DomainError::InsufficientBalance => StatusCode::BAD_REQUEST,
                DomainError::InvalidCredentials | DomainError::Unauthorized => {
                    StatusCode::UNAUTHORIZED
                }
                DomainError::AccountNotFound => StatusCode::NOT_FOUND,
                DomainError::AlreadyExists(_) => StatusCode::CONFLICT,
                DomainError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                DomainError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Domain(e) => match e {
                DomainError::InvalidAmount => "INVALID_AMOUNT",
                DomainError::InvalidInput(_) => "INVALID_INPUT",
                DomainError::InsufficientBalance => "INSUFFICIENT_BALANCE",
                DomainError::InvalidCredentials => "INVALID_CREDENTIALS",
                DomainError::Unauthorized => "UNAUTHORIZED",
                DomainError::AccountNotFound => "ACCOUNT_NOT_FOUND",
                DomainError::AlreadyExists(_) => "ALREADY_EXISTS",
                DomainError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
                DomainError::InternalError(_) => "INTERNAL_ERROR",
            },
        }
    }

    /// Server-side faults get a generic message; details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::Domain(DomainError::StorageUnavailable(_)) => {
                "Storage temporarily unavailable".to_string()
            }
            ApiError::Domain(DomainError::InternalError(_)) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let client_fault = match &self {
            ApiError::Domain(e) => e.is_client_error(),
            ApiError::BadRequest(_) => true,
        };
        if !client_fault {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = ApiResponse::<()>::error(self.code(), &self.public_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DomainError::InvalidAmount, StatusCode::BAD_REQUEST),
            (DomainError::InsufficientBalance, StatusCode::BAD_REQUEST),
            (DomainError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (DomainError::Unauthorized, StatusCode::UNAUTHORIZED),
            (DomainError::AccountNotFound, StatusCode::NOT_FOUND),
            (DomainError::AlreadyExists("a".into()), StatusCode::CONFLICT),
            (DomainError::StorageUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::InternalError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (domain, status) in cases {
            assert_eq!(ApiError::from(domain).status(), status);
        }
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let err = ApiError::from(DomainError::StorageUnavailable("password=hunter2".into()));
        assert!(!err.public_message().contains("hunter2"));
    }
}
