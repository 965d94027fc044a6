//! Core types and trait definitions for Portall player evaluations.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the three pieces of the evaluation protocol: the payload validator
//! ([`validate`]), the eligibility gate ([`eligibility`]) and the store
//! abstraction ([`store`]). [`flow`] chains them in the required order.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod eligibility;
pub mod error;
pub mod evaluation;
pub mod flow;
pub mod profile;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
