// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Username already exists")]
    UsernameAlreadyExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Permission level {required} required")]
    Forbidden { required: i32 },

    #[error("User not found")]
    UserNotFound,

    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Could not read CSV file {path}: {source}")]
    ImportFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid CSV row at line {line}: {reason}")]
    InvalidCsvRow { line: u64, reason: String },

    #[error("Product {0} already exists")]
    DuplicateProduct(String),

    #[error("Metric {0} is out of range for the stored values")]
    MetricOverflow(&'static str),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    // Qualquer coisa inesperada, com contexto do anyhow.
    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::WrongCurrentPassword
            | AppError::UnknownTable(_)
            | AppError::InvalidDate(_)
            | AppError::ImportFile { .. } => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists
            | AppError::UsernameAlreadyExists
            | AppError::DuplicateProduct(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::CsvError(_) | AppError::InvalidCsvRow { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::DatabaseError(_)
            | AppError::MetricOverflow(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                })
            }
            AppError::ImportFile { path, source } => {
                tracing::warn!("CSV import could not read {}: {}", path, source);
                json!({ "error": format!("Could not read CSV file {}: {}", path, source) })
            }
            ref e if status.is_server_error() => {
                tracing::error!("Internal server error: {:?}", e);
                json!({ "error": "An unexpected error occurred." })
            }
            e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_credentials_use_the_generic_message() {
        let (status, body) = body_of(AppError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn internal_errors_hide_their_details() {
        let (status, body) = body_of(AppError::InternalServerError(anyhow::anyhow!(
            "connection string leaked"
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An unexpected error occurred.");
    }

    #[tokio::test]
    async fn csv_row_errors_are_unprocessable() {
        let (status, body) = body_of(AppError::InvalidCsvRow {
            line: 4,
            reason: "missing handleId".into(),
        })
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Invalid CSV row at line 4: missing handleId");
    }

    #[test]
    fn forbidden_maps_to_403() {
        assert_eq!(AppError::Forbidden { required: 6 }.status(), StatusCode::FORBIDDEN);
    }
}
