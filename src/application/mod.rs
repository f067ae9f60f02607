//! Application layer managing wizard state and screen workflows.
//!
//! This module coordinates between the domain layer and presentation layer,
//! handling navigation, validation on submit, persistence and API results.

pub mod state;

pub use state::*;
