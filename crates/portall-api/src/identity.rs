//! The calling coach's identity.
//!
//! Sessions and credentials are handled in front of this router; by the time
//! a request arrives here, the authenticated coach id is carried in the
//! [`COACH_HEADER`] header and is treated as opaque.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated coach's UUID.
pub const COACH_HEADER: &str = "x-portall-coach";

/// Present in a handler means the request names a calling coach.
#[derive(Debug, Clone, Copy)]
pub struct CoachIdentity(pub Uuid);

impl<S> FromRequestParts<S> for CoachIdentity
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let value = parts
      .headers
      .get(COACH_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| ApiError::Unauthorized(format!("missing {COACH_HEADER} header")))?;

    let id = Uuid::parse_str(value.trim())
      .map_err(|_| ApiError::Unauthorized(format!("malformed {COACH_HEADER} header")))?;

    Ok(CoachIdentity(id))
  }
}
