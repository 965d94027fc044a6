//! Storage traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `portall-store-sqlite`). Higher layers depend on these abstractions, not
//! on any concrete backend.
//!
//! - [`ProfileDirectory`] is the read-only lookup the eligibility gate needs.
//! - [`ProfileRegistry`] adds registration and flag updates.
//! - [`EvaluationStore`] owns evaluation records; every write to them goes
//!   through [`EvaluationStore::submit_evaluation`].
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  evaluation::{CoachActivity, EvaluationPayload, EvaluationRecord, Submission},
  profile::{Coach, College, NewCoach, NewPlayer, Player, PlayerFlags},
};

// ─── Read-only profile lookups ───────────────────────────────────────────────

pub trait ProfileDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a coach by UUID. Returns `None` if not found.
  fn get_coach(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Coach>, Self::Error>> + Send + '_;

  /// Retrieve a player by UUID. Returns `None` if not found.
  fn get_player(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;
}

// ─── Registration ────────────────────────────────────────────────────────────

pub trait ProfileRegistry: ProfileDirectory {
  fn add_college(
    &self,
    name: String,
  ) -> impl Future<Output = Result<College, Self::Error>> + Send + '_;

  fn get_college(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<College>, Self::Error>> + Send + '_;

  /// Register a coach. Fails if the college does not exist.
  fn add_coach(
    &self,
    input: NewCoach,
  ) -> impl Future<Output = Result<Coach, Self::Error>> + Send + '_;

  /// Register a player. Fails if the college does not exist.
  fn add_player(
    &self,
    input: NewPlayer,
  ) -> impl Future<Output = Result<Player, Self::Error>> + Send + '_;

  /// Update a player's visibility flags. Returns `None` if not found.
  fn set_player_flags(
    &self,
    id: Uuid,
    flags: PlayerFlags,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;
}

// ─── Evaluations ─────────────────────────────────────────────────────────────

/// Versioned, append-only evaluation history.
pub trait EvaluationStore: ProfileDirectory {
  /// Append the next version of `coach_id`'s evaluation of `player_id`.
  ///
  /// Callers must have passed the eligibility gate and the validator first.
  /// Reading the current version and inserting its successor is one atomic
  /// unit, serialised per (coach, player) pair: concurrent submissions yield
  /// consecutive versions, never a duplicate. On failure nothing is written.
  fn submit_evaluation(
    &self,
    coach_id: Uuid,
    player_id: Uuid,
    payload: EvaluationPayload,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// The highest-version record for the pair, if any.
  fn current_evaluation(
    &self,
    coach_id: Uuid,
    player_id: Uuid,
  ) -> impl Future<Output = Result<Option<EvaluationRecord>, Self::Error>> + Send + '_;

  /// Every version for the pair, oldest first.
  fn evaluation_history(
    &self,
    coach_id: Uuid,
    player_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EvaluationRecord>, Self::Error>> + Send + '_;

  /// The current record of every player `coach_id` has evaluated, most
  /// recently evaluated first.
  fn evaluated_players(
    &self,
    coach_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EvaluationRecord>, Self::Error>> + Send + '_;

  /// Submission count and latest submission time for a coach.
  fn coach_activity(
    &self,
    coach_id: Uuid,
  ) -> impl Future<Output = Result<CoachActivity, Self::Error>> + Send + '_;
}

// ─── Everything ──────────────────────────────────────────────────────────────

/// A backend that provides every store capability; what the HTTP layer needs.
pub trait RecruitingStore: ProfileRegistry + EvaluationStore {}

impl<T: ProfileRegistry + EvaluationStore> RecruitingStore for T {}
