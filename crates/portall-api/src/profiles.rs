//! Handlers for registration endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/colleges` | Body: `{"name":"..."}` |
//! | `GET`   | `/colleges/:id` | 404 if not found |
//! | `POST`  | `/coaches` | Body: [`NewCoach`]; 404 if the college is unknown |
//! | `GET`   | `/coaches/:id` | Coach plus derived activity |
//! | `POST`  | `/players` | Body: [`NewPlayer`]; 404 if the college is unknown |
//! | `GET`   | `/players/:id` | 404 if not found |
//! | `PATCH` | `/players/:id` | Body: `{"visible":bool?,"active":bool?}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use portall_core::{
  evaluation::CoachActivity,
  profile::{Coach, College, NewCoach, NewPlayer, Player, PlayerFlags},
  store::RecruitingStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam},
};

/// Fail with 404 unless the college exists.
async fn require_college<S>(store: &S, id: Uuid) -> Result<College, ApiError>
where
  S: RecruitingStore,
{
  store
    .get_college(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("college {id} not found")))
}

fn require_name(name: &str) -> Result<String, ApiError> {
  let name = name.trim();
  if name.is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  Ok(name.to_owned())
}

// ─── Colleges ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCollegeBody {
  pub name: String,
}

/// `POST /colleges`
pub async fn create_college<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<CreateCollegeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitingStore,
{
  let name = require_name(&body.name)?;
  let college = store.add_college(name).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(college)))
}

/// `GET /colleges/:id`
pub async fn get_college<S>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<College>, ApiError>
where
  S: RecruitingStore,
{
  Ok(Json(require_college(store.as_ref(), id).await?))
}

// ─── Coaches ──────────────────────────────────────────────────────────────────

/// A coach together with their derived evaluation activity.
#[derive(Debug, Serialize)]
pub struct CoachProfile {
  #[serde(flatten)]
  pub coach:    Coach,
  pub activity: CoachActivity,
}

/// `POST /coaches`
///
/// The team sport is fixed here; there is no endpoint that changes it.
pub async fn create_coach<S>(
  State(store): State<Arc<S>>,
  JsonBody(mut body): JsonBody<NewCoach>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitingStore,
{
  body.name = require_name(&body.name)?;
  require_college(store.as_ref(), body.college_id).await?;
  let coach = store.add_coach(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(coach)))
}

/// `GET /coaches/:id`
pub async fn get_coach<S>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<CoachProfile>, ApiError>
where
  S: RecruitingStore,
{
  let coach = store
    .get_coach(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("coach {id} not found")))?;
  let activity = store.coach_activity(id).await.map_err(ApiError::store)?;
  Ok(Json(CoachProfile { coach, activity }))
}

// ─── Players ──────────────────────────────────────────────────────────────────

/// `POST /players`
pub async fn create_player<S>(
  State(store): State<Arc<S>>,
  JsonBody(mut body): JsonBody<NewPlayer>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitingStore,
{
  body.name = require_name(&body.name)?;
  require_college(store.as_ref(), body.college_id).await?;
  let player = store.add_player(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(player)))
}

/// `GET /players/:id`
pub async fn get_player<S>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Player>, ApiError>
where
  S: RecruitingStore,
{
  let player = store
    .get_player(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("player {id} not found")))?;
  Ok(Json(player))
}

/// `PATCH /players/:id`
pub async fn update_player_flags<S>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
  JsonBody(flags): JsonBody<PlayerFlags>,
) -> Result<Json<Player>, ApiError>
where
  S: RecruitingStore,
{
  let player = store
    .set_player_flags(id, flags)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("player {id} not found")))?;
  Ok(Json(player))
}
