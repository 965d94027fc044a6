//! JSON REST API for Portall.
//!
//! Exposes an axum [`Router`] backed by any
//! [`portall_core::store::RecruitingStore`]. Authentication and transport
//! concerns are the caller's responsibility; the calling coach is named by
//! the [`identity::COACH_HEADER`] header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", portall_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod evaluations;
pub mod extract;
pub mod identity;
pub mod profiles;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use portall_core::store::RecruitingStore;

pub use error::ApiError;
pub use identity::{COACH_HEADER, CoachIdentity};

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecruitingStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Registry
    .route("/colleges", post(profiles::create_college::<S>))
    .route("/colleges/{id}", get(profiles::get_college::<S>))
    .route("/coaches", post(profiles::create_coach::<S>))
    .route("/coaches/{id}", get(profiles::get_coach::<S>))
    .route("/players", post(profiles::create_player::<S>))
    .route(
      "/players/{id}",
      get(profiles::get_player::<S>).patch(profiles::update_player_flags::<S>),
    )
    // Evaluations
    .route("/players/{id}/eligibility", get(evaluations::eligibility::<S>))
    .route(
      "/players/{id}/evaluations",
      get(evaluations::history::<S>).post(evaluations::submit::<S>),
    )
    .route(
      "/players/{id}/evaluations/current",
      get(evaluations::current::<S>),
    )
    .route("/evaluations", get(evaluations::list_mine::<S>))
    .with_state(store)
}
