//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Method, Request, StatusCode},
};
use chrono::{Datelike, Utc};
use portall_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{COACH_HEADER, api_router};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  api_router(Arc::new(store))
}

async fn send(
  app: &Router,
  method: Method,
  uri: &str,
  coach: Option<Uuid>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(coach) = coach {
    req = req.header(COACH_HEADER, coach.to_string());
  }
  let req = match body {
    Some(b) => req
      .header("content-type", "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => req.body(Body::empty()).unwrap(),
  };

  let res = app.clone().oneshot(req).await.unwrap();
  let status = res.status();
  let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

fn id_of(v: &Value, key: &str) -> Uuid {
  v[key].as_str().unwrap().parse().unwrap()
}

fn evaluation_body(comment: &str) -> Value {
  json!({
    "availableToTransfer": true,
    "expectedGraduationYear": Utc::now().year() + 1,
    "roleInTeam": "Holding midfielder",
    "performanceLevel": "First-choice starter all season",
    "playerStrengths": "Reads the game early, wins second balls",
    "improvementAreas": "Forward passing under pressure",
    "mentality": "Demanding of himself and others",
    "coachability": "Takes film sessions seriously",
    "technique": "Clean short passing, decent long range",
    "physique": "Strong in the duel, good endurance",
    "coachFinalComment": comment,
  })
}

struct Seeded {
  college: Uuid,
  coach:   Uuid,
  player:  Uuid,
}

/// Register a men's soccer coach and an eligible male player through the API.
async fn seed(app: &Router) -> Seeded {
  let (status, college) = send(
    app,
    Method::POST,
    "/colleges",
    None,
    Some(json!({ "name": "Lakeshore CC" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let college = id_of(&college, "college_id");

  let (status, coach) = send(
    app,
    Method::POST,
    "/coaches",
    None,
    Some(json!({
      "college_id": college,
      "name": "Coach Reyes",
      "sport": "mens_soccer",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, player) = send(
    app,
    Method::POST,
    "/players",
    None,
    Some(json!({
      "college_id": college,
      "name": "Luis Mendez",
      "gender": "male",
      "position": "Midfielder",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  Seeded {
    college,
    coach: id_of(&coach, "coach_id"),
    player: id_of(&player, "player_id"),
  }
}

// ─── Registry ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn registry_round_trip() {
  let app = app().await;
  let s = seed(&app).await;

  let (status, college) =
    send(&app, Method::GET, &format!("/colleges/{}", s.college), None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(college["name"], "Lakeshore CC");

  let (status, player) =
    send(&app, Method::GET, &format!("/players/{}", s.player), None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(player["visible"], true);
  assert_eq!(player["active"], true);

  let (status, player) = send(
    &app,
    Method::PATCH,
    &format!("/players/{}", s.player),
    None,
    Some(json!({ "visible": false })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(player["visible"], false);
  assert_eq!(player["active"], true);
}

#[tokio::test]
async fn unknown_ids_are_404() {
  let app = app().await;
  let missing = Uuid::new_v4();

  for uri in [
    format!("/colleges/{missing}"),
    format!("/coaches/{missing}"),
    format!("/players/{missing}"),
  ] {
    let (status, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
  }

  let (status, _) = send(
    &app,
    Method::POST,
    "/coaches",
    None,
    Some(json!({ "college_id": missing, "name": "Nobody", "sport": "womens_soccer" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_sport_is_rejected_at_registration() {
  let app = app().await;
  let s = seed(&app).await;

  let (status, res) = send(
    &app,
    Method::POST,
    "/coaches",
    None,
    Some(json!({ "college_id": s.college, "name": "Coach Lee", "sport": "basketball" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  let message = res["error"].as_str().unwrap();
  assert!(message.contains("basketball"), "{message}");
}

#[tokio::test]
async fn unreadable_bodies_get_json_errors() {
  let app = app().await;
  let s = seed(&app).await;
  let uri = format!("/players/{}/evaluations", s.player);

  let raw = |content_type: Option<&str>, body: &'static str| {
    let mut req = Request::builder()
      .method(Method::POST)
      .uri(&uri)
      .header(COACH_HEADER, s.coach.to_string());
    if let Some(ct) = content_type {
      req = req.header("content-type", ct);
    }
    req.body(Body::from(body)).unwrap()
  };

  for (req, expected) in [
    (raw(Some("application/json"), "{not json"), StatusCode::BAD_REQUEST),
    (raw(None, "{}"), StatusCode::UNSUPPORTED_MEDIA_TYPE),
  ] {
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), expected);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string(), "{body}");
  }
}

#[tokio::test]
async fn malformed_path_id_gets_json_error() {
  let app = app().await;
  let (status, res) = send(&app, Method::GET, "/players/not-a-uuid", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(res["error"].is_string(), "{res}");
}

#[tokio::test]
async fn blank_college_name_is_400() {
  let app = app().await;
  let (status, _) = send(
    &app,
    Method::POST,
    "/colleges",
    None,
    Some(json!({ "name": "   " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Evaluations ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_creates_then_versions() {
  let app = app().await;
  let s = seed(&app).await;
  let uri = format!("/players/{}/evaluations", s.player);

  let (status, first) = send(
    &app,
    Method::POST,
    &uri,
    Some(s.coach),
    Some(evaluation_body("Ready to contribute at a four-year programme.")),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(first["kind"], "created");
  assert_eq!(first["previousVersion"], Value::Null);
  assert_eq!(first["record"]["version"], 1);
  assert_eq!(first["record"]["isCurrent"], true);
  assert_eq!(first["record"]["roleInTeam"], "Holding midfielder");

  let (status, second) = send(
    &app,
    Method::POST,
    &uri,
    Some(s.coach),
    Some(evaluation_body("Improved markedly over the spring season.")),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(second["kind"], "new_version");
  assert_eq!(second["previousVersion"], 1);
  assert_eq!(second["record"]["version"], 2);

  let (status, history) = send(&app, Method::GET, &uri, Some(s.coach), None).await;
  assert_eq!(status, StatusCode::OK);
  let history = history.as_array().unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0]["isCurrent"], false);
  assert_eq!(history[1]["isCurrent"], true);

  let (status, current) =
    send(&app, Method::GET, &format!("{uri}/current"), Some(s.coach), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(current["version"], 2);

  let (status, mine) =
    send(&app, Method::GET, "/evaluations", Some(s.coach), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(mine.as_array().unwrap().len(), 1);

  let (status, coach) =
    send(&app, Method::GET, &format!("/coaches/{}", s.coach), None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(coach["sport"], "mens_soccer");
  assert_eq!(coach["activity"]["total_evaluations"], 2);
}

#[tokio::test]
async fn invalid_payload_is_400_with_details() {
  let app = app().await;
  let s = seed(&app).await;

  let mut body = evaluation_body("n/a");
  body["roleInTeam"] = json!("tbd");
  body.as_object_mut().unwrap().remove("physique");

  let (status, res) = send(
    &app,
    Method::POST,
    &format!("/players/{}/evaluations", s.player),
    Some(s.coach),
    Some(body),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(res["error"], "validation failed");

  let fields: Vec<&str> = res["details"]
    .as_array()
    .unwrap()
    .iter()
    .map(|d| d["field"].as_str().unwrap())
    .collect();
  assert_eq!(fields, ["roleInTeam", "physique", "coachFinalComment"]);

  let (status, _) = send(
    &app,
    Method::GET,
    &format!("/players/{}/evaluations/current", s.player),
    Some(s.coach),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hidden_player_is_403_and_eligibility_reports_it() {
  let app = app().await;
  let s = seed(&app).await;

  send(
    &app,
    Method::PATCH,
    &format!("/players/{}", s.player),
    None,
    Some(json!({ "active": false })),
  )
  .await;

  let (status, res) = send(
    &app,
    Method::POST,
    &format!("/players/{}/evaluations", s.player),
    Some(s.coach),
    Some(evaluation_body("Would have been a strong recommendation.")),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(res["reason"], "subject-not-visible");

  let (status, res) = send(
    &app,
    Method::GET,
    &format!("/players/{}/eligibility", s.player),
    Some(s.coach),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(res["allowed"], false);
  assert_eq!(res["reason"], "subject-not-visible");
}

#[tokio::test]
async fn wrong_gender_is_category_mismatch() {
  let app = app().await;
  let s = seed(&app).await;

  let (_, player) = send(
    &app,
    Method::POST,
    "/players",
    None,
    Some(json!({ "college_id": s.college, "name": "Ana Silva", "gender": "female" })),
  )
  .await;
  let player = id_of(&player, "player_id");

  let (status, res) = send(
    &app,
    Method::GET,
    &format!("/players/{player}/eligibility"),
    Some(s.coach),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(res["allowed"], false);
  assert_eq!(res["reason"], "category-mismatch");
  let message = res["message"].as_str().unwrap();
  assert!(message.contains("male players"), "{message}");
  assert!(message.contains("is female"), "{message}");

  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/players/{player}/evaluations"),
    Some(s.coach),
    Some(evaluation_body("Should never be stored for this coach.")),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn eligible_pair_reports_allowed() {
  let app = app().await;
  let s = seed(&app).await;

  let (status, res) = send(
    &app,
    Method::GET,
    &format!("/players/{}/eligibility", s.player),
    Some(s.coach),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(res, json!({ "allowed": true }));
}

#[tokio::test]
async fn missing_or_malformed_identity_is_401() {
  let app = app().await;
  let s = seed(&app).await;
  let uri = format!("/players/{}/evaluations", s.player);

  let (status, _) = send(
    &app,
    Method::POST,
    &uri,
    None,
    Some(evaluation_body("Header is missing on this request.")),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let req = Request::builder()
    .method(Method::GET)
    .uri(&uri)
    .header(COACH_HEADER, "not-a-uuid")
    .body(Body::empty())
    .unwrap();
  let res = app.clone().oneshot(req).await.unwrap();
  assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_coach_is_403() {
  let app = app().await;
  let s = seed(&app).await;

  let (status, res) = send(
    &app,
    Method::POST,
    &format!("/players/{}/evaluations", s.player),
    Some(Uuid::new_v4()),
    Some(evaluation_body("Submitted under an identity nobody registered.")),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(res["reason"], "evaluator-not-found");
}

// ─── Storage failures ─────────────────────────────────────────────────────────

mod broken {
  use portall_core::{
    evaluation::{CoachActivity, EvaluationPayload, EvaluationRecord, Submission},
    profile::{Coach, College, NewCoach, NewPlayer, Player, PlayerFlags},
    store::{EvaluationStore, ProfileDirectory, ProfileRegistry},
  };
  use thiserror::Error;
  use uuid::Uuid;

  #[derive(Debug, Error)]
  #[error("database file is locked by pid 4242")]
  pub struct Locked;

  /// A store whose every call fails.
  #[derive(Clone)]
  pub struct BrokenStore;

  impl ProfileDirectory for BrokenStore {
    type Error = Locked;

    async fn get_coach(&self, _id: Uuid) -> Result<Option<Coach>, Locked> { Err(Locked) }

    async fn get_player(&self, _id: Uuid) -> Result<Option<Player>, Locked> { Err(Locked) }
  }

  impl ProfileRegistry for BrokenStore {
    async fn add_college(&self, _name: String) -> Result<College, Locked> { Err(Locked) }

    async fn get_college(&self, _id: Uuid) -> Result<Option<College>, Locked> { Err(Locked) }

    async fn add_coach(&self, _input: NewCoach) -> Result<Coach, Locked> { Err(Locked) }

    async fn add_player(&self, _input: NewPlayer) -> Result<Player, Locked> { Err(Locked) }

    async fn set_player_flags(
      &self,
      _id: Uuid,
      _flags: PlayerFlags,
    ) -> Result<Option<Player>, Locked> {
      Err(Locked)
    }
  }

  impl EvaluationStore for BrokenStore {
    async fn submit_evaluation(
      &self,
      _coach_id: Uuid,
      _player_id: Uuid,
      _payload: EvaluationPayload,
    ) -> Result<Submission, Locked> {
      Err(Locked)
    }

    async fn current_evaluation(
      &self,
      _coach_id: Uuid,
      _player_id: Uuid,
    ) -> Result<Option<EvaluationRecord>, Locked> {
      Err(Locked)
    }

    async fn evaluation_history(
      &self,
      _coach_id: Uuid,
      _player_id: Uuid,
    ) -> Result<Vec<EvaluationRecord>, Locked> {
      Err(Locked)
    }

    async fn evaluated_players(
      &self,
      _coach_id: Uuid,
    ) -> Result<Vec<EvaluationRecord>, Locked> {
      Err(Locked)
    }

    async fn coach_activity(&self, _coach_id: Uuid) -> Result<CoachActivity, Locked> {
      Err(Locked)
    }
  }
}

#[tokio::test]
async fn storage_failure_is_an_opaque_500() {
  let app = api_router(Arc::new(broken::BrokenStore));
  let coach = Uuid::new_v4();
  let player = Uuid::new_v4();

  for (method, uri, body) in [
    (
      Method::POST,
      format!("/players/{player}/evaluations"),
      Some(evaluation_body("Never stored, the database is unavailable.")),
    ),
    (Method::GET, format!("/players/{player}/eligibility"), None),
    (Method::GET, "/evaluations".to_owned(), None),
    (Method::POST, "/colleges".to_owned(), Some(json!({ "name": "Northgate CC" }))),
  ] {
    let (status, res) = send(&app, method, &uri, Some(coach), body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
    assert_eq!(res, json!({ "error": "internal error" }), "{uri}");
  }
}
