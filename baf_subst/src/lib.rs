#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! Template engine for BAF scripts.
//!
//! Repeated runs of trigger or action lines are factored into named templates
//! with `<FIELD>` placeholders. [`collapse`] replaces a run a template matches
//! with one `{"Template": {fields}}` reference; [`expand`] turns references back
//! into the original lines.

pub const BAF_SUBST_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bindings;
pub mod config;
pub mod driver;
pub mod element;
pub mod error;
pub mod registry;
pub mod snippet;
pub mod source;
pub mod template;

pub use bindings::Bindings;
pub use config::Config;
pub use driver::{collapse, expand};
pub use element::{AlternativeGroup, Element, GroupMember, LiteralPattern, MatchResult};
pub use error::{DefinitionError, PatternError, SourceError, SubstError};
pub use registry::TemplateRegistry;
pub use snippet::{Statement, collapse_snippet, expand_snippet, load_snippet};
pub use source::{DirSource, TemplateSource};
pub use template::Template;
