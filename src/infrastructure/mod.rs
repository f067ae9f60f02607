//! Infrastructure layer providing external service integrations.
//!
//! This module contains the durable form state store, the HTTP client for
//! the remote endpoints and the worker that runs requests off the UI thread.

pub mod api;
pub mod persistence;
pub mod worker;

pub use api::*;
pub use persistence::*;
pub use worker::*;
