//! The eligibility gate: may this coach evaluate this player?
//!
//! The gate is read-only. Business-rule denials come back as
//! [`Eligibility::Denied`]; storage failures come back as `Err`, so callers
//! can tell a 403 from a 500 without inspecting strings.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  profile::{Coach, Gender, Player, TeamSport},
  store::ProfileDirectory,
};

/// Why an evaluation was refused. The serialised `reason` tag is the stable
/// wire vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum Denial {
  #[error("evaluator not found")]
  EvaluatorNotFound,

  #[error("subject not found")]
  SubjectNotFound,

  #[error("subject not active or visible")]
  SubjectNotVisible,

  #[error("evaluator and subject belong to different organizational units")]
  OrganizationalMismatch,

  #[error(
    "category mismatch: a {sport} coach evaluates {expected} players, this player is {actual}"
  )]
  CategoryMismatch {
    sport:    TeamSport,
    expected: Gender,
    actual:   Gender,
  },
}

impl Denial {
  /// The wire code, matching the serde `reason` tag.
  pub fn code(&self) -> &'static str {
    match self {
      Self::EvaluatorNotFound => "evaluator-not-found",
      Self::SubjectNotFound => "subject-not-found",
      Self::SubjectNotVisible => "subject-not-visible",
      Self::OrganizationalMismatch => "organizational-mismatch",
      Self::CategoryMismatch { .. } => "category-mismatch",
    }
  }
}

/// Outcome of [`check_eligibility`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
  /// Carries the resolved records so the caller need not look them up again.
  Allowed { coach: Coach, player: Player },
  Denied(Denial),
}

impl Eligibility {
  pub fn is_allowed(&self) -> bool { matches!(self, Self::Allowed { .. }) }

  pub fn denial(&self) -> Option<&Denial> {
    match self {
      Self::Allowed { .. } => None,
      Self::Denied(d) => Some(d),
    }
  }
}

/// Decide whether `coach_id` may evaluate `player_id`.
///
/// Checks run in a fixed order and the first failure wins: coach exists,
/// player exists, player active and visible, same college, player gender
/// matches the coach's team.
pub async fn check_eligibility<D>(
  directory: &D,
  coach_id: Uuid,
  player_id: Uuid,
) -> Result<Eligibility, D::Error>
where
  D: ProfileDirectory + ?Sized,
{
  let Some(coach) = directory.get_coach(coach_id).await? else {
    return Ok(Eligibility::Denied(Denial::EvaluatorNotFound));
  };
  let Some(player) = directory.get_player(player_id).await? else {
    return Ok(Eligibility::Denied(Denial::SubjectNotFound));
  };

  Ok(match gate(&coach, &player) {
    Some(denial) => Eligibility::Denied(denial),
    None => Eligibility::Allowed { coach, player },
  })
}

/// The rules that only need the two resolved records.
fn gate(coach: &Coach, player: &Player) -> Option<Denial> {
  if !player.is_evaluable() {
    return Some(Denial::SubjectNotVisible);
  }
  if player.college_id != coach.college_id {
    return Some(Denial::OrganizationalMismatch);
  }
  let expected = coach.sport.player_gender();
  if player.gender != expected {
    return Some(Denial::CategoryMismatch {
      sport: coach.sport,
      expected,
      actual: player.gender,
    });
  }
  None
}
