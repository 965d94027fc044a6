//! [`SqliteStore`], the SQLite implementation of the Portall store traits.

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;
use uuid::Uuid;

use portall_core::{
  evaluation::{
    CoachActivity, EvaluationPayload, EvaluationRecord, Submission, SubmissionKind,
  },
  profile::{Coach, College, NewCoach, NewPlayer, Player, PlayerFlags},
  store::{EvaluationStore, ProfileDirectory, ProfileRegistry},
};

use crate::{
  encode::{
    COACH_COLUMNS, COLLEGE_COLUMNS, EVALUATION_COLUMNS, PLAYER_COLUMNS, RawCoach,
    RawCollege, RawEvaluation, RawPlayer, decode_dt, decode_version, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Portall store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every call
/// runs to completion on the connection's own thread, one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// The current time at the precision timestamps are stored with, so a
/// returned record compares equal to the same record read back.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// What happened inside the submission transaction.
enum Appended {
  Inserted {
    previous:   Option<i64>,
    version:    i64,
    created_at: DateTime<Utc>,
  },
  MissingCoach,
  MissingPlayer,
}

fn row_exists(
  conn: &rusqlite::Connection,
  sql: &str,
  id: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(sql, rusqlite::params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// True if `err` is a UNIQUE constraint violation.
fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

/// Map a failed submission transaction. Losing the version race to another
/// writer is a [`Error::VersionConflict`]; anything else is a database error.
fn submit_error(err: tokio_rusqlite::Error, coach_id: Uuid, player_id: Uuid) -> Error {
  if is_unique_violation(&err) {
    Error::VersionConflict { coach_id, player_id }
  } else {
    Error::Database(err)
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run an evaluation query and decode every row.
  async fn query_evaluations(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<EvaluationRecord>> {
    let raws: Vec<RawEvaluation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawEvaluation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvaluation::into_record).collect()
  }
}

// ─── ProfileDirectory impl ───────────────────────────────────────────────────

impl ProfileDirectory for SqliteStore {
  type Error = Error;

  async fn get_coach(&self, id: Uuid) -> Result<Option<Coach>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCoach> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COACH_COLUMNS} FROM coaches WHERE coach_id = ?1"),
              rusqlite::params![id_str],
              RawCoach::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCoach::into_coach).transpose()
  }

  async fn get_player(&self, id: Uuid) -> Result<Option<Player>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPlayer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = ?1"),
              rusqlite::params![id_str],
              RawPlayer::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlayer::into_player).transpose()
  }
}

// ─── ProfileRegistry impl ────────────────────────────────────────────────────

impl ProfileRegistry for SqliteStore {
  async fn add_college(&self, name: String) -> Result<College> {
    let college = College {
      college_id: Uuid::new_v4(),
      name,
      created_at: now(),
    };

    let id_str = encode_uuid(college.college_id);
    let name   = college.name.clone();
    let at_str = encode_dt(college.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO colleges (college_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(college)
  }

  async fn get_college(&self, id: Uuid) -> Result<Option<College>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCollege> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLLEGE_COLUMNS} FROM colleges WHERE college_id = ?1"),
              rusqlite::params![id_str],
              RawCollege::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCollege::into_college).transpose()
  }

  async fn add_coach(&self, input: NewCoach) -> Result<Coach> {
    let coach = Coach {
      coach_id:   Uuid::new_v4(),
      college_id: input.college_id,
      name:       input.name,
      sport:      input.sport,
      created_at: now(),
    };

    let id_str      = encode_uuid(coach.coach_id);
    let college_str = encode_uuid(coach.college_id);
    let name        = coach.name.clone();
    let sport_str   = coach.sport.as_ref().to_owned();
    let at_str      = encode_dt(coach.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !row_exists(&tx, "SELECT 1 FROM colleges WHERE college_id = ?1", &college_str)? {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO coaches (coach_id, college_id, name, sport, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, college_str, name, sport_str, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::CollegeNotFound(coach.college_id));
    }
    Ok(coach)
  }

  async fn add_player(&self, input: NewPlayer) -> Result<Player> {
    let player = Player {
      player_id:  Uuid::new_v4(),
      college_id: input.college_id,
      name:       input.name,
      gender:     input.gender,
      position:   input.position,
      visible:    input.visible,
      active:     input.active,
      created_at: now(),
    };

    let id_str      = encode_uuid(player.player_id);
    let college_str = encode_uuid(player.college_id);
    let name        = player.name.clone();
    let gender_str  = player.gender.as_ref().to_owned();
    let position    = player.position.clone();
    let visible     = player.visible;
    let active      = player.active;
    let at_str      = encode_dt(player.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !row_exists(&tx, "SELECT 1 FROM colleges WHERE college_id = ?1", &college_str)? {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO players (
             player_id, college_id, name, gender, position, visible, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            college_str,
            name,
            gender_str,
            position,
            visible,
            active,
            at_str,
          ],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::CollegeNotFound(player.college_id));
    }
    Ok(player)
  }

  async fn set_player_flags(
    &self,
    id:    Uuid,
    flags: PlayerFlags,
  ) -> Result<Option<Player>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPlayer> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE players
             SET visible = COALESCE(?2, visible),
                 active  = COALESCE(?3, active)
           WHERE player_id = ?1",
          rusqlite::params![id_str, flags.visible, flags.active],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = ?1"),
              rusqlite::params![id_str],
              RawPlayer::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlayer::into_player).transpose()
  }
}

// ─── EvaluationStore impl ────────────────────────────────────────────────────

impl EvaluationStore for SqliteStore {
  async fn submit_evaluation(
    &self,
    coach_id:  Uuid,
    player_id: Uuid,
    payload:   EvaluationPayload,
  ) -> Result<Submission> {
    let evaluation_id = Uuid::new_v4();

    let eval_id_str   = encode_uuid(evaluation_id);
    let coach_id_str  = encode_uuid(coach_id);
    let player_id_str = encode_uuid(player_id);
    let p             = payload.clone();

    // BEGIN IMMEDIATE takes the write lock before reading the current
    // version, so no other writer can append between the read and the
    // insert. The UNIQUE (coach_id, player_id, version) constraint backs
    // this up for writers on other connections.
    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !row_exists(&tx, "SELECT 1 FROM coaches WHERE coach_id = ?1", &coach_id_str)? {
          return Ok(Appended::MissingCoach);
        }
        if !row_exists(&tx, "SELECT 1 FROM players WHERE player_id = ?1", &player_id_str)? {
          return Ok(Appended::MissingPlayer);
        }

        let previous: Option<i64> = tx.query_row(
          "SELECT MAX(version) FROM evaluations WHERE coach_id = ?1 AND player_id = ?2",
          rusqlite::params![coach_id_str, player_id_str],
          |r| r.get(0),
        )?;
        let version = previous.unwrap_or(0) + 1;
        // Taken under the write lock so creation order matches version order.
        let created_at = now();

        tx.execute(
          "INSERT INTO evaluations (
             evaluation_id, coach_id, player_id, version, created_at,
             available_to_transfer, expected_graduation_year,
             role_in_team, performance_level, player_strengths,
             improvement_areas, mentality, coachability, technique,
             physique, coach_final_comment
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
          rusqlite::params![
            eval_id_str,
            coach_id_str,
            player_id_str,
            version,
            encode_dt(created_at),
            p.available_to_transfer,
            p.expected_graduation_year,
            p.role_in_team,
            p.performance_level,
            p.player_strengths,
            p.improvement_areas,
            p.mentality,
            p.coachability,
            p.technique,
            p.physique,
            p.coach_final_comment,
          ],
        )?;
        tx.commit()?;

        Ok(Appended::Inserted { previous, version, created_at })
      })
      .await;

    let (previous, version, created_at) = match result {
      Ok(Appended::Inserted { previous, version, created_at }) => {
        (previous, version, created_at)
      }
      Ok(Appended::MissingCoach) => return Err(Error::CoachNotFound(coach_id)),
      Ok(Appended::MissingPlayer) => return Err(Error::PlayerNotFound(player_id)),
      Err(e) => return Err(submit_error(e, coach_id, player_id)),
    };

    let version          = decode_version(version)?;
    let previous_version = previous.map(decode_version).transpose()?;
    let kind             = match previous_version {
      None    => SubmissionKind::Created,
      Some(_) => SubmissionKind::NewVersion,
    };

    debug!(%coach_id, %player_id, version, "appended evaluation");

    Ok(Submission {
      record: EvaluationRecord {
        evaluation_id,
        coach_id,
        player_id,
        version,
        is_current: true,
        created_at,
        payload,
      },
      kind,
      previous_version,
    })
  }

  async fn current_evaluation(
    &self,
    coach_id:  Uuid,
    player_id: Uuid,
  ) -> Result<Option<EvaluationRecord>> {
    let sql = format!(
      "SELECT {EVALUATION_COLUMNS}
       FROM evaluations e
       WHERE e.coach_id = ?1 AND e.player_id = ?2
       ORDER BY e.version DESC
       LIMIT 1"
    );
    let mut records = self
      .query_evaluations(sql, vec![encode_uuid(coach_id), encode_uuid(player_id)])
      .await?;
    Ok(records.pop())
  }

  async fn evaluation_history(
    &self,
    coach_id:  Uuid,
    player_id: Uuid,
  ) -> Result<Vec<EvaluationRecord>> {
    let sql = format!(
      "SELECT {EVALUATION_COLUMNS}
       FROM evaluations e
       WHERE e.coach_id = ?1 AND e.player_id = ?2
       ORDER BY e.version ASC"
    );
    self
      .query_evaluations(sql, vec![encode_uuid(coach_id), encode_uuid(player_id)])
      .await
  }

  async fn evaluated_players(&self, coach_id: Uuid) -> Result<Vec<EvaluationRecord>> {
    let sql = format!(
      "SELECT {EVALUATION_COLUMNS}
       FROM evaluations e
       WHERE e.coach_id = ?1
         AND e.version = (
           SELECT MAX(m.version) FROM evaluations m
           WHERE m.coach_id = e.coach_id AND m.player_id = e.player_id
         )
       ORDER BY e.created_at DESC, e.rowid DESC"
    );
    self.query_evaluations(sql, vec![encode_uuid(coach_id)]).await
  }

  async fn coach_activity(&self, coach_id: Uuid) -> Result<CoachActivity> {
    let id_str = encode_uuid(coach_id);

    let (count, last): (i64, Option<String>) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*), MAX(created_at) FROM evaluations WHERE coach_id = ?1",
          rusqlite::params![id_str],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?)
      })
      .await?;

    let last_evaluation_at: Option<DateTime<Utc>> =
      last.as_deref().map(decode_dt).transpose()?;

    Ok(CoachActivity {
      total_evaluations: u64::try_from(count)
        .map_err(|_| Error::Decode(format!("bad evaluation count: {count}")))?,
      last_evaluation_at,
    })
  }
}
