//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use portall_core::{eligibility::Denial, flow::EvaluateError, validate::ValidationErrors};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  /// The eligibility gate refused the request.
  #[error("forbidden: {0}")]
  Forbidden(Denial),

  #[error(transparent)]
  Invalid(ValidationErrors),

  /// The request body could not be read as the expected JSON.
  #[error(transparent)]
  Body(#[from] JsonRejection),

  /// A path segment could not be parsed.
  #[error(transparent)]
  Path(#[from] PathRejection),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl<E> From<EvaluateError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(e: EvaluateError<E>) -> Self {
    match e {
      EvaluateError::Denied(d) => Self::Forbidden(d),
      EvaluateError::Invalid(v) => Self::Invalid(v),
      EvaluateError::Store(e) => Self::store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Unauthorized(m) => {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Forbidden(d) => (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": d.to_string(), "reason": d.code() })),
      )
        .into_response(),
      ApiError::Invalid(v) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "validation failed", "details": v })),
      )
        .into_response(),
      ApiError::Body(r) => {
        (r.status(), Json(json!({ "error": r.body_text() }))).into_response()
      }
      ApiError::Path(r) => {
        (r.status(), Json(json!({ "error": r.body_text() }))).into_response()
      }
      // Storage details stay in the logs.
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal error" })),
        )
          .into_response()
      }
    }
  }
}
