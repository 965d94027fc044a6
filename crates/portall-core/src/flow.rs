//! The evaluation request flow: gate, then validator, then store.
//!
//! Only the final step writes. A denial or an invalid payload returns before
//! the store is touched.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  eligibility::{Denial, Eligibility, check_eligibility},
  evaluation::Submission,
  store::EvaluationStore,
  validate::{EvaluationValidator, ValidationErrors},
};

/// Every way an evaluation request can fail, kept apart so the HTTP layer
/// can pick 403, 400 or 500 without parsing messages.
#[derive(Debug, Error)]
pub enum EvaluateError<E> {
  #[error("evaluation denied: {0}")]
  Denied(Denial),

  #[error(transparent)]
  Invalid(ValidationErrors),

  #[error("store error: {0}")]
  Store(#[source] E),
}

/// Evaluate `player_id` on behalf of `coach_id` with the raw JSON `body`.
///
/// No retry happens here: repeating a versioned write without caller-side
/// deduplication would append an extra version.
pub async fn evaluate_player<S>(
  store: &S,
  validator: &EvaluationValidator,
  coach_id: Uuid,
  player_id: Uuid,
  body: &Value,
) -> Result<Submission, EvaluateError<S::Error>>
where
  S: EvaluationStore + ?Sized,
{
  let eligibility = check_eligibility(store, coach_id, player_id)
    .await
    .map_err(EvaluateError::Store)?;

  if let Eligibility::Denied(denial) = eligibility {
    info!(%coach_id, %player_id, reason = denial.code(), "evaluation denied");
    return Err(EvaluateError::Denied(denial));
  }

  let payload = validator.validate(body).map_err(|errors| {
    debug!(%coach_id, %player_id, count = errors.errors().len(), "evaluation payload rejected");
    EvaluateError::Invalid(errors)
  })?;

  let submission = store
    .submit_evaluation(coach_id, player_id, payload)
    .await
    .map_err(EvaluateError::Store)?;

  info!(
    %coach_id,
    %player_id,
    version = submission.record.version,
    kind = ?submission.kind,
    "evaluation recorded"
  );
  Ok(submission)
}
