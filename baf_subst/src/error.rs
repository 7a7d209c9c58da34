//! Error types for template loading, compiling and formatting.
//!
//! A failed match is never an error: matchers return `None`. Everything here is
//! either a broken template library (reported once, at load time) or a caller
//! asking to format a line without all of its fields bound.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A single line pattern could not be turned into a matcher.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("placeholder '<{0}>' appears more than once in one line")]
    DuplicatePlaceholder(String),
    #[error("line does not compile to a valid matcher: {0}")]
    Regex(#[from] regex::Error),
}

/// The template source could not produce a definition.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no definition found for template '{0}'")]
    NotFound(String),
    #[error("template name '{0}' is not a plain file name")]
    InvalidName(String),
    #[error("reading template '{name}' from '{}'", .path.display())]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing template '{name}' from '{}'", .path.display())]
    Parse {
        name: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("listing templates in '{}'", .path.display())]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A template library is malformed or incomplete. Always fatal, always raised at load time.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("unable to load template '{name}'")]
    Load {
        name: String,
        #[source]
        source: SourceError,
    },
    #[error("unable to enumerate templates")]
    Enumerate(#[source] SourceError),
    #[error("template '{name}' is malformed:\n{details}")]
    Invalid { name: String, details: String },
    #[error("template '{template}' has a bad line '{line}'")]
    Pattern {
        template: String,
        line: String,
        #[source]
        source: PatternError,
    },
    #[error("template reference cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },
    #[error("unknown template '{0}'")]
    Unknown(String),
}

/// Errors raised while expanding references back into script lines.
#[derive(Debug, Error)]
pub enum SubstError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error("no value bound for field '<{field}>' in line '{line}'")]
    MissingField { field: String, line: String },
}
