use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::{
    auth::{jwt::TokenError, repo_types::StoreError, services::CreateUserError},
    response::{ApiResponse, Reply},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every failure a request can end in.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no token provided")]
    MissingToken,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("user not found")]
    UserNotFound,
    #[error("route not found")]
    NotFound,
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            other => AppError::Store(other),
        }
    }
}

impl From<CreateUserError> for AppError {
    fn from(e: CreateUserError) -> Self {
        match e {
            CreateUserError::Store(s) => s.into(),
            CreateUserError::Hash(h) => AppError::Internal(h),
        }
    }
}

/// Internal error text attached to 500 responses. Only surfaced to clients
/// outside production, by `app::expose_error_details`.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

pub(crate) const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::Token(_)
            | AppError::UserNotFound => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation failed",
            AppError::DuplicateEmail => "User already exists with this email",
            // Same text for unknown email and wrong password.
            AppError::InvalidCredentials => "Invalid email or password",
            AppError::MissingToken => "Access denied. No token provided",
            AppError::Token(TokenError::Invalid) => "Invalid token",
            AppError::Token(TokenError::Expired) => "Token expired",
            AppError::UserNotFound => "User not found",
            AppError::NotFound => "Route not found",
            AppError::Store(_) | AppError::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Validation(errors) => Some(json!(errors)),
            _ => None,
        };
        let mut response = Reply(status, ApiResponse::fail(self.message(), detail)).into_response();

        if status.is_server_error() {
            error!(error = %self, "request failed");
            response
                .extensions_mut()
                .insert(InternalDetail(self.to_string()));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::Validation(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Token(TokenError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_duplicate_becomes_duplicate_email() {
        let err: AppError = StoreError::DuplicateEmail.into();
        assert!(matches!(err, AppError::DuplicateEmail));
        let err: AppError = CreateUserError::Store(StoreError::DuplicateEmail).into();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[test]
    fn server_errors_carry_detail_extension() {
        let response = AppError::Internal(anyhow::anyhow!("pool timed out")).into_response();
        let detail = response.extensions().get::<InternalDetail>().unwrap();
        assert!(detail.0.contains("pool timed out"));

        let response = AppError::InvalidCredentials.into_response();
        assert!(response.extensions().get::<InternalDetail>().is_none());
    }
}
