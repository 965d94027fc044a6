//! Profiles: colleges, coaches and players.
//!
//! Profiles are owned by registration. The evaluation flow only reads them;
//! a coach's activity counters are derived from the evaluation history
//! rather than stored here.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Categories ──────────────────────────────────────────────────────────────

/// Player gender, the category a player is gated on.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Gender {
  Male,
  Female,
}

impl Gender {
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownVariant {
      kind:  "gender",
      value: s.to_owned(),
    })
  }
}

/// The team a coach is responsible for.
///
/// Fixed at registration. Changing it would silently invalidate earlier
/// eligibility decisions, so no operation updates it.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TeamSport {
  MensSoccer,
  WomensSoccer,
}

impl TeamSport {
  /// The only player gender a coach of this team may evaluate.
  ///
  /// Exhaustive on purpose: adding a sport must add its mapping here.
  pub fn player_gender(self) -> Gender {
    match self {
      Self::MensSoccer => Gender::Male,
      Self::WomensSoccer => Gender::Female,
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownVariant {
      kind:  "team sport",
      value: s.to_owned(),
    })
  }
}

// ─── College ─────────────────────────────────────────────────────────────────

/// The institution that scopes which coaches may evaluate which players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct College {
  pub college_id: Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

// ─── Coach ───────────────────────────────────────────────────────────────────

/// An NJCAA coach, authorised to evaluate players of their own college and
/// team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coach {
  pub coach_id:   Uuid,
  pub college_id: Uuid,
  pub name:       String,
  pub sport:      TeamSport,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::ProfileRegistry::add_coach`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewCoach {
  pub college_id: Uuid,
  pub name:       String,
  pub sport:      TeamSport,
}

// ─── Player ──────────────────────────────────────────────────────────────────

/// A player who can be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
  pub player_id:  Uuid,
  pub college_id: Uuid,
  pub name:       String,
  pub gender:     Gender,
  pub position:   Option<String>,
  /// Hidden players cannot be evaluated.
  pub visible:    bool,
  /// Deactivated players cannot be evaluated.
  pub active:     bool,
  pub created_at: DateTime<Utc>,
}

impl Player {
  /// Only active, visible players are eligible evaluation targets.
  pub fn is_evaluable(&self) -> bool { self.active && self.visible }
}

/// Input to [`crate::store::ProfileRegistry::add_player`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlayer {
  pub college_id: Uuid,
  pub name:       String,
  pub gender:     Gender,
  #[serde(default)]
  pub position:   Option<String>,
  #[serde(default = "default_true")]
  pub visible:    bool,
  #[serde(default = "default_true")]
  pub active:     bool,
}

impl NewPlayer {
  /// A visible, active player with no position.
  pub fn new(college_id: Uuid, name: impl Into<String>, gender: Gender) -> Self {
    Self {
      college_id,
      name: name.into(),
      gender,
      position: None,
      visible: true,
      active: true,
    }
  }
}

fn default_true() -> bool { true }

/// Partial update of a player's visibility flags. `None` leaves a flag
/// untouched.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PlayerFlags {
  pub visible: Option<bool>,
  pub active:  Option<bool>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sport_maps_to_player_gender() {
    assert_eq!(TeamSport::MensSoccer.player_gender(), Gender::Male);
    assert_eq!(TeamSport::WomensSoccer.player_gender(), Gender::Female);
  }

  #[test]
  fn strum_and_serde_agree_on_names() {
    for sport in [TeamSport::MensSoccer, TeamSport::WomensSoccer] {
      let json = serde_json::to_value(sport).unwrap();
      assert_eq!(json, serde_json::Value::String(sport.to_string()));
      assert_eq!(TeamSport::parse(sport.as_ref()).unwrap(), sport);
    }
    assert_eq!(Gender::parse("female").unwrap(), Gender::Female);
  }

  #[test]
  fn unknown_sport_is_rejected() {
    let err = TeamSport::parse("mens_basketball").unwrap_err();
    assert!(matches!(err, Error::UnknownVariant { kind: "team sport", .. }));
  }

  #[test]
  fn new_player_defaults_to_evaluable() {
    let p: NewPlayer = serde_json::from_value(serde_json::json!({
      "college_id": Uuid::new_v4(),
      "name": "Sam Rivera",
      "gender": "male",
    }))
    .unwrap();
    assert!(p.visible && p.active);
    assert!(p.position.is_none());
  }
}
