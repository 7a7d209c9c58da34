//! Compiled template elements and the result of matching one.

pub mod group;
pub mod literal;

pub use group::AlternativeGroup;
pub use literal::{LiteralPattern, substitute_known};

use std::fmt;
use std::sync::Arc;

use baf_data::Item;

use crate::bindings::Bindings;
use crate::error::SubstError;
use crate::template::Template;

/// Where a match sat in the searched sequence, and what it bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub before: Vec<Item>,
    pub bindings: Bindings,
    pub after: Vec<Item>,
}

impl MatchResult {
    /// Split `sequence` around the single item at `index`.
    pub fn split(sequence: &[Item], index: usize, bindings: Bindings) -> Self {
        Self {
            before: sequence[..index].to_vec(),
            bindings,
            after: sequence[index + 1..].to_vec(),
        }
    }

    /// The unmatched items (before followed by after) and the bindings.
    pub fn into_parts(self) -> (Vec<Item>, Bindings) {
        let mut remaining = self.before;
        remaining.extend(self.after);
        (remaining, self.bindings)
    }

    /// Replace the matched material with `item`.
    pub fn splice(self, item: Item) -> Vec<Item> {
        let mut out = self.before;
        out.push(item);
        out.extend(self.after);
        out
    }
}

/// One step of a named template.
#[derive(Debug, Clone)]
pub enum Element {
    Literal(LiteralPattern),
    Group(AlternativeGroup),
    Template(Arc<Template>),
}

/// An OR-group member; groups never contain groups.
#[derive(Debug, Clone)]
pub enum GroupMember {
    Literal(LiteralPattern),
    Template(Arc<Template>),
}

impl Element {
    pub fn match_in(&self, sequence: &[Item], bindings: &Bindings) -> Option<MatchResult> {
        match self {
            Element::Literal(pattern) => pattern.match_in(sequence, bindings),
            Element::Group(group) => group.match_in(sequence, bindings),
            Element::Template(template) => template.match_in(sequence, bindings),
        }
    }

    /// Render this element as sequence items.
    ///
    /// # Errors
    /// - `SubstError::MissingField` if a placeholder lacks a binding
    pub fn format(&self, bindings: &Bindings) -> Result<Vec<Item>, SubstError> {
        match self {
            Element::Literal(pattern) => Ok(vec![Item::Line(pattern.format(bindings)?)]),
            Element::Group(group) => Ok(vec![group.format(bindings)?]),
            Element::Template(template) => template.format(bindings),
        }
    }

    pub fn line_count(&self) -> usize {
        match self {
            Element::Literal(_) => 1,
            Element::Group(group) => group.line_count(),
            Element::Template(template) => template.line_count(),
        }
    }
}

impl GroupMember {
    pub fn match_in(&self, sequence: &[Item], bindings: &Bindings) -> Option<MatchResult> {
        match self {
            GroupMember::Literal(pattern) => pattern.match_in(sequence, bindings),
            GroupMember::Template(template) => template.match_in(sequence, bindings),
        }
    }

    pub fn line_count(&self) -> usize {
        match self {
            GroupMember::Literal(_) => 1,
            GroupMember::Template(template) => template.line_count(),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Literal(pattern) => write!(f, "{pattern}"),
            Element::Group(group) => write!(f, "{group}"),
            Element::Template(template) => write!(f, "template '{}'", template.name()),
        }
    }
}

impl fmt::Display for GroupMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupMember::Literal(pattern) => write!(f, "{pattern}"),
            GroupMember::Template(template) => write!(f, "template '{}'", template.name()),
        }
    }
}
