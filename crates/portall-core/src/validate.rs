//! Shape and content-quality checks for submitted evaluations.
//!
//! The validator works on the raw JSON body rather than a deserialised
//! struct, so that a wrong type in one field does not hide problems in the
//! others. Every field is checked and all violations are reported together.

use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::evaluation::EvaluationPayload;

/// How many years ahead of the current year a graduation may be expected.
pub const GRADUATION_WINDOW_YEARS: i32 = 6;

/// Low-effort answers rejected in every narrative field, compared against
/// the trimmed, lowercased value.
pub const PLACEHOLDERS: &[&str] = &[
  "n/a",
  "na",
  "none",
  "nothing",
  "tbd",
  "todo",
  "...",
  "-",
  "--",
  "?",
  "null",
  "undefined",
  "not applicable",
  "no comment",
  "see above",
  "same as above",
];

const AVAILABLE_TO_TRANSFER: &str = "availableToTransfer";
const EXPECTED_GRADUATION_YEAR: &str = "expectedGraduationYear";

#[derive(Debug, Clone, Copy)]
struct TextRule {
  field: &'static str,
  label: &'static str,
  min:   usize,
  max:   usize,
}

const fn rule(
  field: &'static str,
  label: &'static str,
  min: usize,
  max: usize,
) -> TextRule {
  TextRule { field, label, min, max }
}

const TEXT_RULES: [TextRule; 9] = [
  rule("roleInTeam", "Role in team", 5, 500),
  rule("performanceLevel", "Performance level", 10, 1000),
  rule("playerStrengths", "Player strengths", 10, 1000),
  rule("improvementAreas", "Improvement areas", 10, 1000),
  rule("mentality", "Mentality", 10, 500),
  rule("coachability", "Coachability", 10, 500),
  rule("technique", "Technique", 10, 500),
  rule("physique", "Physique", 10, 500),
  rule("coachFinalComment", "Final comment", 20, 1500),
];

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A single problem with one field of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

impl FieldError {
  fn new(field: &str, message: impl Into<String>) -> Self {
    Self { field: field.to_owned(), message: message.into() }
  }
}

/// Every problem found in a payload, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("evaluation payload has {} invalid field(s)", .0.len())]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
  pub fn errors(&self) -> &[FieldError] { &self.0 }

  /// The error reported for `field`, if any.
  pub fn get(&self, field: &str) -> Option<&FieldError> {
    self.0.iter().find(|e| e.field == field)
  }
}

/// The `{ valid, errors }` view of a validation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
  pub valid:  bool,
  pub errors: Vec<FieldError>,
}

// ─── Validator ───────────────────────────────────────────────────────────────

/// Validates evaluation payloads against a fixed reference year.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationValidator {
  current_year: i32,
}

impl EvaluationValidator {
  pub fn new(current_year: i32) -> Self { Self { current_year } }

  /// A validator anchored on the current UTC calendar year.
  pub fn for_today() -> Self { Self::new(Utc::now().year()) }

  pub fn current_year(&self) -> i32 { self.current_year }

  /// Validate `raw` and return the typed, trimmed payload.
  pub fn validate(
    &self,
    raw: &Value,
  ) -> Result<EvaluationPayload, ValidationErrors> {
    let Some(obj) = raw.as_object() else {
      return Err(ValidationErrors(vec![FieldError::new(
        "payload",
        "must be a JSON object",
      )]));
    };

    let mut errors = Vec::new();
    let available = check_bool(obj, AVAILABLE_TO_TRANSFER, &mut errors);
    let year = self.check_graduation_year(obj, &mut errors);
    let texts = TEXT_RULES.map(|rule| check_text(obj, rule, &mut errors));

    for key in obj.keys() {
      let known = key == AVAILABLE_TO_TRANSFER
        || key == EXPECTED_GRADUATION_YEAR
        || TEXT_RULES.iter().any(|r| r.field == key);
      if !known {
        errors.push(FieldError::new(key, format!("\"{key}\" is not allowed")));
      }
    }

    match (available, year, texts) {
      (
        Some(available_to_transfer),
        Some(expected_graduation_year),
        [
          Some(role_in_team),
          Some(performance_level),
          Some(player_strengths),
          Some(improvement_areas),
          Some(mentality),
          Some(coachability),
          Some(technique),
          Some(physique),
          Some(coach_final_comment),
        ],
      ) if errors.is_empty() => Ok(EvaluationPayload {
        available_to_transfer,
        expected_graduation_year,
        role_in_team,
        performance_level,
        player_strengths,
        improvement_areas,
        mentality,
        coachability,
        technique,
        physique,
        coach_final_comment,
      }),
      _ => Err(ValidationErrors(errors)),
    }
  }

  pub fn report(&self, raw: &Value) -> ValidationReport {
    match self.validate(raw) {
      Ok(_) => ValidationReport { valid: true, errors: Vec::new() },
      Err(e) => ValidationReport { valid: false, errors: e.0 },
    }
  }

  fn check_graduation_year(
    &self,
    obj: &Map<String, Value>,
    errors: &mut Vec<FieldError>,
  ) -> Option<i32> {
    let field = EXPECTED_GRADUATION_YEAR;
    let n = match obj.get(field) {
      None | Some(Value::Null) => {
        errors.push(FieldError::new(field, format!("\"{field}\" is required")));
        return None;
      }
      Some(Value::Number(n)) => n,
      Some(_) => {
        errors.push(FieldError::new(field, format!("\"{field}\" must be a number")));
        return None;
      }
    };

    let Some(year) = integral(n) else {
      errors.push(FieldError::new(field, format!("\"{field}\" must be an integer")));
      return None;
    };

    let (min, max) = (self.current_year, self.current_year + GRADUATION_WINDOW_YEARS);
    match i32::try_from(year) {
      Ok(y) if (min..=max).contains(&y) => Some(y),
      _ => {
        errors.push(FieldError::new(
          field,
          format!("\"{field}\" must be between {min} and {max}"),
        ));
        None
      }
    }
  }
}

/// The number as an integer, accepting floats with no fractional part
/// (`2027.0`).
fn integral(n: &serde_json::Number) -> Option<i64> {
  if let Some(i) = n.as_i64() {
    return Some(i);
  }
  let f = n.as_f64()?;
  if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
    Some(f as i64)
  } else {
    None
  }
}

impl Default for EvaluationValidator {
  fn default() -> Self { Self::for_today() }
}

fn check_bool(
  obj: &Map<String, Value>,
  field: &str,
  errors: &mut Vec<FieldError>,
) -> Option<bool> {
  match obj.get(field) {
    Some(Value::Bool(b)) => Some(*b),
    None | Some(Value::Null) => {
      errors.push(FieldError::new(field, format!("\"{field}\" is required")));
      None
    }
    Some(_) => {
      errors.push(FieldError::new(field, format!("\"{field}\" must be a boolean")));
      None
    }
  }
}

fn check_text(
  obj: &Map<String, Value>,
  rule: TextRule,
  errors: &mut Vec<FieldError>,
) -> Option<String> {
  let TextRule { field, label, min, max } = rule;
  let raw = match obj.get(field) {
    Some(Value::String(s)) => s,
    None | Some(Value::Null) => {
      errors.push(FieldError::new(field, format!("\"{field}\" is required")));
      return None;
    }
    Some(_) => {
      errors.push(FieldError::new(field, format!("\"{field}\" must be a string")));
      return None;
    }
  };

  let trimmed = raw.trim();
  if trimmed.is_empty() {
    errors.push(FieldError::new(field, format!("\"{field}\" is not allowed to be empty")));
    return None;
  }
  if is_placeholder(trimmed) {
    errors.push(FieldError::new(
      field,
      format!("{label} needs a real assessment, not a placeholder like \"{trimmed}\""),
    ));
    return None;
  }

  let len = trimmed.chars().count();
  if len < min {
    errors.push(FieldError::new(
      field,
      format!("\"{field}\" length must be at least {min} characters long"),
    ));
    return None;
  }
  if len > max {
    errors.push(FieldError::new(
      field,
      format!("\"{field}\" length must be less than or equal to {max} characters long"),
    ));
    return None;
  }

  Some(trimmed.to_owned())
}

/// Exact, case-insensitive match against [`PLACEHOLDERS`].
pub fn is_placeholder(text: &str) -> bool {
  let lowered = text.trim().to_lowercase();
  PLACEHOLDERS.contains(&lowered.as_str())
}
