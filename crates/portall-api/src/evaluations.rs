//! Handlers for evaluation endpoints. All of them act on behalf of the
//! calling coach ([`CoachIdentity`]).
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/players/:id/eligibility` | 200 with `allowed` either way |
//! | `POST` | `/players/:id/evaluations` | 201, 400 invalid, 403 denied |
//! | `GET`  | `/players/:id/evaluations` | Full history, oldest first |
//! | `GET`  | `/players/:id/evaluations/current` | 404 if none |
//! | `GET`  | `/evaluations` | Current record per evaluated player |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use portall_core::{
  eligibility::{Eligibility, check_eligibility},
  evaluation::EvaluationRecord,
  flow::evaluate_player,
  store::RecruitingStore,
  validate::EvaluationValidator,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam},
  identity::CoachIdentity,
};

// ─── Eligibility ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EligibilityBody {
  pub allowed: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason:  Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

/// `GET /players/:id/eligibility`
pub async fn eligibility<S>(
  State(store): State<Arc<S>>,
  CoachIdentity(coach_id): CoachIdentity,
  PathParam(player_id): PathParam<Uuid>,
) -> Result<Json<EligibilityBody>, ApiError>
where
  S: RecruitingStore,
{
  let outcome = check_eligibility(store.as_ref(), coach_id, player_id)
    .await
    .map_err(ApiError::store)?;

  let body = match outcome {
    Eligibility::Allowed { .. } => EligibilityBody {
      allowed: true,
      reason:  None,
      message: None,
    },
    Eligibility::Denied(d) => EligibilityBody {
      allowed: false,
      reason:  Some(d.code()),
      message: Some(d.to_string()),
    },
  };
  Ok(Json(body))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

/// `POST /players/:id/evaluations`
///
/// The body is taken as raw JSON so every field error is reported at once,
/// rather than the first one serde trips over.
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  CoachIdentity(coach_id): CoachIdentity,
  PathParam(player_id): PathParam<Uuid>,
  JsonBody(body): JsonBody<Value>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitingStore,
{
  let validator = EvaluationValidator::for_today();
  let submission =
    evaluate_player(store.as_ref(), &validator, coach_id, player_id, &body)
      .await?;
  Ok((StatusCode::CREATED, Json(submission)))
}

// ─── Read models ──────────────────────────────────────────────────────────────

/// `GET /players/:id/evaluations`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  CoachIdentity(coach_id): CoachIdentity,
  PathParam(player_id): PathParam<Uuid>,
) -> Result<Json<Vec<EvaluationRecord>>, ApiError>
where
  S: RecruitingStore,
{
  let records = store
    .evaluation_history(coach_id, player_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `GET /players/:id/evaluations/current`
pub async fn current<S>(
  State(store): State<Arc<S>>,
  CoachIdentity(coach_id): CoachIdentity,
  PathParam(player_id): PathParam<Uuid>,
) -> Result<Json<EvaluationRecord>, ApiError>
where
  S: RecruitingStore,
{
  store
    .current_evaluation(coach_id, player_id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| {
      ApiError::NotFound(format!("no evaluation of player {player_id}"))
    })
}

/// `GET /evaluations`
pub async fn list_mine<S>(
  State(store): State<Arc<S>>,
  CoachIdentity(coach_id): CoachIdentity,
) -> Result<Json<Vec<EvaluationRecord>>, ApiError>
where
  S: RecruitingStore,
{
  let records = store
    .evaluated_players(coach_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}
