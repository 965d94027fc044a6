//! Evaluation records: one coach's versioned assessment of one player.
//!
//! Records are append-only. A re-evaluation never edits an earlier record;
//! it appends the next version. Which record is current is computed at read
//! time: it is the highest version for the (coach, player) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Payload ─────────────────────────────────────────────────────────────────

/// The validated body of an evaluation. Narrative fields are stored trimmed.
///
/// Only [`crate::validate::EvaluationValidator`] produces values of this type
/// from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationPayload {
  pub available_to_transfer:    bool,
  pub expected_graduation_year: i32,
  pub role_in_team:             String,
  pub performance_level:        String,
  pub player_strengths:         String,
  pub improvement_areas:        String,
  pub mentality:                String,
  pub coachability:             String,
  pub technique:                String,
  pub physique:                 String,
  pub coach_final_comment:      String,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One version of a coach's evaluation of a player.
///
/// Serialised in camelCase throughout, matching the flattened payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
  pub evaluation_id: Uuid,
  pub coach_id:      Uuid,
  pub player_id:     Uuid,
  /// Starts at 1 and increases by exactly one per submission for the pair.
  pub version:       u32,
  /// Computed: true only for the highest version of the pair.
  pub is_current:    bool,
  /// Server-assigned; never changes after creation.
  pub created_at:    DateTime<Utc>,
  #[serde(flatten)]
  pub payload:       EvaluationPayload,
}

// ─── Submission result ───────────────────────────────────────────────────────

/// Whether a submission started a pair's history or extended it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
  Created,
  NewVersion,
}

/// Returned by [`crate::store::EvaluationStore::submit_evaluation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub record:           EvaluationRecord,
  pub kind:             SubmissionKind,
  /// The version that was current before this submission, if any.
  pub previous_version: Option<u32>,
}

impl Submission {
  /// True when this was the coach's first evaluation of the player.
  pub fn is_new_subject(&self) -> bool { self.kind == SubmissionKind::Created }
}

// ─── Derived counters ────────────────────────────────────────────────────────

/// A coach's evaluation activity, derived from the evaluation history.
///
/// `total_evaluations` counts submission events, so re-evaluating the same
/// player counts again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachActivity {
  pub total_evaluations:  u64,
  pub last_evaluation_at: Option<DateTime<Utc>>,
}
