//! mx-service: the MixMind automation service
//!
//! Orchestrates the full workflow: analyze tracks on the worker pool,
//! generate ranked suggestions (rule-based or remote with rule-based
//! fallback), audition them non-destructively, and commit or revert them as
//! append-only history entries. [`Mixing`] is the string-typed facade the
//! API layer talks to.

mod error;
mod facade;
mod provider;
mod service;

pub use error::*;
pub use facade::*;
pub use provider::*;
pub use service::*;
