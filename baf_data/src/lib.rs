//! Shared data model for BAF script templates and extracted snippets.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_snippet, validate_template};
