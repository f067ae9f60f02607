//! Domain layer: wizard data models, form descriptions and validation rules.

pub mod form;
pub mod models;
pub mod validation;

pub use form::*;
pub use models::*;
pub use validation::*;
