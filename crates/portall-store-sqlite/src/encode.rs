//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order equals time order. UUIDs are stored as hyphenated
//! lowercase strings. Enums use their snake_case names.

use chrono::{DateTime, SecondsFormat, Utc};
use portall_core::{
  evaluation::{EvaluationPayload, EvaluationRecord},
  profile::{Coach, College, Gender, Player, TeamSport},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── Version ──────────────────────────────────────────────────────────────────

pub fn decode_version(v: i64) -> Result<u32> {
  u32::try_from(v)
    .ok()
    .filter(|v| *v >= 1)
    .ok_or_else(|| Error::Decode(format!("bad evaluation version: {v}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `colleges` row.
pub struct RawCollege {
  pub college_id: String,
  pub name:       String,
  pub created_at: String,
}

pub const COLLEGE_COLUMNS: &str = "college_id, name, created_at";

impl RawCollege {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      college_id: row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_college(self) -> Result<College> {
    Ok(College {
      college_id: decode_uuid(&self.college_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `coaches` row.
pub struct RawCoach {
  pub coach_id:   String,
  pub college_id: String,
  pub name:       String,
  pub sport:      String,
  pub created_at: String,
}

pub const COACH_COLUMNS: &str = "coach_id, college_id, name, sport, created_at";

impl RawCoach {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      coach_id:   row.get(0)?,
      college_id: row.get(1)?,
      name:       row.get(2)?,
      sport:      row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  /// Fails on a sport the enum does not know; there is no fallback.
  pub fn into_coach(self) -> Result<Coach> {
    Ok(Coach {
      coach_id:   decode_uuid(&self.coach_id)?,
      college_id: decode_uuid(&self.college_id)?,
      name:       self.name,
      sport:      TeamSport::parse(&self.sport)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `players` row.
pub struct RawPlayer {
  pub player_id:  String,
  pub college_id: String,
  pub name:       String,
  pub gender:     String,
  pub position:   Option<String>,
  pub visible:    bool,
  pub active:     bool,
  pub created_at: String,
}

pub const PLAYER_COLUMNS: &str =
  "player_id, college_id, name, gender, position, visible, active, created_at";

impl RawPlayer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      player_id:  row.get(0)?,
      college_id: row.get(1)?,
      name:       row.get(2)?,
      gender:     row.get(3)?,
      position:   row.get(4)?,
      visible:    row.get(5)?,
      active:     row.get(6)?,
      created_at: row.get(7)?,
    })
  }

  pub fn into_player(self) -> Result<Player> {
    Ok(Player {
      player_id:  decode_uuid(&self.player_id)?,
      college_id: decode_uuid(&self.college_id)?,
      name:       self.name,
      gender:     Gender::parse(&self.gender)?,
      position:   self.position,
      visible:    self.visible,
      active:     self.active,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from an `evaluations` row, plus the computed
/// `is_current` column.
pub struct RawEvaluation {
  pub evaluation_id:            String,
  pub coach_id:                 String,
  pub player_id:                String,
  pub version:                  i64,
  pub created_at:               String,
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
  pub is_current:               bool,
}

/// Select list for `evaluations e`; the last column is computed.
pub const EVALUATION_COLUMNS: &str = "
  e.evaluation_id, e.coach_id, e.player_id, e.version, e.created_at,
  e.available_to_transfer, e.expected_graduation_year,
  e.role_in_team, e.performance_level, e.player_strengths,
  e.improvement_areas, e.mentality, e.coachability, e.technique,
  e.physique, e.coach_final_comment,
  e.version = (
    SELECT MAX(m.version) FROM evaluations m
    WHERE m.coach_id = e.coach_id AND m.player_id = e.player_id
  ) AS is_current";

impl RawEvaluation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      evaluation_id:            row.get(0)?,
      coach_id:                 row.get(1)?,
      player_id:                row.get(2)?,
      version:                  row.get(3)?,
      created_at:               row.get(4)?,
      available_to_transfer:    row.get(5)?,
      expected_graduation_year: row.get(6)?,
      role_in_team:             row.get(7)?,
      performance_level:        row.get(8)?,
      player_strengths:         row.get(9)?,
      improvement_areas:        row.get(10)?,
      mentality:                row.get(11)?,
      coachability:             row.get(12)?,
      technique:                row.get(13)?,
      physique:                 row.get(14)?,
      coach_final_comment:      row.get(15)?,
      is_current:               row.get(16)?,
    })
  }

  pub fn into_record(self) -> Result<EvaluationRecord> {
    Ok(EvaluationRecord {
      evaluation_id: decode_uuid(&self.evaluation_id)?,
      coach_id:      decode_uuid(&self.coach_id)?,
      player_id:     decode_uuid(&self.player_id)?,
      version:       decode_version(self.version)?,
      is_current:    self.is_current,
      created_at:    decode_dt(&self.created_at)?,
      payload:       EvaluationPayload {
        available_to_transfer:    self.available_to_transfer,
        expected_graduation_year: self.expected_graduation_year,
        role_in_team:             self.role_in_team,
        performance_level:        self.performance_level,
        player_strengths:         self.player_strengths,
        improvement_areas:        self.improvement_areas,
        mentality:                self.mentality,
        coachability:             self.coachability,
        technique:                self.technique,
        physique:                 self.physique,
        coach_final_comment:      self.coach_final_comment,
      },
    })
  }
}
