//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as the JSON envelope `{"success": false,
//! "message": ..}` with the matching HTTP status.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// Scan path only: the card exists but is deactivated.
  #[error("gone: {0}")]
  Gone(String),

  #[error("invalid credentials")]
  Unauthorized,

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<tapcard_core::Error> for ApiError {
  fn from(e: tapcard_core::Error) -> Self {
    match e {
      tapcard_core::Error::NotFound(id) => {
        ApiError::NotFound(format!("card {id} not found"))
      }
      tapcard_core::Error::CodeNotFound(code) => {
        ApiError::NotFound(format!("card {code} not found"))
      }
      tapcard_core::Error::Gone(code) => {
        ApiError::Gone(format!("card {code} is no longer active"))
      }
      tapcard_core::Error::Storage(e) => ApiError::Storage(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Gone(m) => (StatusCode::GONE, m.clone()),
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "invalid email or password".to_string())
      }
      ApiError::Storage(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (
      status,
      Json(json!({ "success": false, "message": message })),
    )
      .into_response()
  }
}
