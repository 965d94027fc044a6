//! Request extractors whose rejections are [`ApiError`]s, so malformed
//! bodies and path segments get the same JSON error shape as everything
//! else.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// A JSON request body. Syntax errors, type errors and a missing
/// `content-type` are answered with `{"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// A typed path segment, e.g. a UUID.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);
