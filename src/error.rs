//!
//! # Error Handling
//!
//! This module defines `AppError`, the single error type returned by every service
//! operation. Each variant is one kind of the error taxonomy: invalid caller input,
//! duplicate identity on registration, rejected credentials, a missing or bad token,
//! a task that does not exist (or is not visible to the caller), and opaque internal
//! failures.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly, and provides `From` conversions for `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error` and
//! `bcrypt::BcryptError` so the `?` operator classifies lower-level failures.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all classified errors a service operation can return.
#[derive(Debug)]
pub enum AppError {
    /// Caller-supplied data failed validation (HTTP 422).
    InvalidInput(String),
    /// Registration collided with an existing email (HTTP 409).
    DuplicateIdentity(String),
    /// Unknown email or wrong password (HTTP 401).
    /// Carries no detail; both causes render identically.
    InvalidCredentials,
    /// Missing, malformed, expired or badly signed token (HTTP 401).
    Unauthenticated(String),
    /// The task does not exist or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// Store connectivity or any other unclassified failure (HTTP 500).
    /// The message is logged but never sent to the client.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::DuplicateIdentity(msg) => write!(f, "Duplicate identity: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateIdentity(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::InvalidInput(msg)
            | AppError::DuplicateIdentity(msg)
            | AppError::Unauthenticated(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                "Internal server error".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Classifies `sqlx::Error`.
///
/// Unique violations only occur on `users.email`, and foreign-key violations only on
/// `tasks.owner_id` / `tasks.assigned_to`, so both can be reported as caller errors.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateIdentity("Email already registered".into())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::InvalidInput("Referenced user does not exist".into())
            }
            _ => AppError::Internal(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::InvalidInput(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthenticated(format!("Invalid token: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
