//! Loan Wizard - Terminal Loan Application
//!
//! A three-step loan application wizard for the terminal: personal data,
//! address and workplace, then loan parameters.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

pub use application::*;
pub use domain::*;
