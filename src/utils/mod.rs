//! Utilities Module
//!
//! Cross-cutting helpers: the error envelope, password and token material,
//! and input validation.

pub mod error;
pub mod security;
pub mod validation;

pub use error::{AppError, AppResult, ErrorResponse};
pub use security::*;
pub use validation::*;
