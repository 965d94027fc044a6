//! Error type for `portall-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] portall_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decode error: {0}")]
  Decode(String),

  #[error("college not found: {0}")]
  CollegeNotFound(Uuid),

  #[error("coach not found: {0}")]
  CoachNotFound(Uuid),

  #[error("player not found: {0}")]
  PlayerNotFound(Uuid),

  /// Another writer appended the same version first; nothing was written.
  #[error("concurrent evaluation of player {player_id} by coach {coach_id}")]
  VersionConflict { coach_id: Uuid, player_id: Uuid },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
