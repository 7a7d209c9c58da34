//! OR-groups: unordered sets of members matched against one nested sub-sequence.

use std::fmt;

use baf_data::Item;
use log::debug;

use crate::bindings::Bindings;
use crate::element::{GroupMember, MatchResult};
use crate::error::SubstError;

#[derive(Debug, Clone)]
pub struct AlternativeGroup {
    members: Vec<GroupMember>,
}

impl AlternativeGroup {
    pub fn new(members: Vec<GroupMember>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    pub fn line_count(&self) -> usize {
        self.members.iter().map(GroupMember::line_count).sum()
    }

    /// Find the first nested group in `sequence` that this group accounts for completely.
    ///
    /// Only nested groups with exactly as many items as this group has members
    /// are candidates. Members are tried in declared order, each removing the
    /// item it matched; there is no search over alternative assignments.
    pub fn match_in(&self, sequence: &[Item], bindings: &Bindings) -> Option<MatchResult> {
        for (index, item) in sequence.iter().enumerate() {
            let Item::Group(candidate) = item else {
                continue;
            };
            if candidate.len() != self.members.len() {
                continue;
            }
            if let Some(bound) = self.match_candidate(candidate, bindings) {
                debug!("{self}: candidate {index} MATCHES");
                return Some(MatchResult::split(sequence, index, bound));
            }
        }
        None
    }

    fn match_candidate(&self, candidate: &[Item], bindings: &Bindings) -> Option<Bindings> {
        let mut remaining = candidate.to_vec();
        let mut bound = bindings.clone();
        for member in &self.members {
            let Some(found) = member.match_in(&remaining, &bound) else {
                debug!("{self}: member {member} does not match");
                return None;
            };
            (remaining, bound) = found.into_parts();
        }
        remaining.is_empty().then_some(bound)
    }

    /// Render the members in declared order as one nested group item.
    ///
    /// # Errors
    /// - `SubstError::MissingField` if any member line lacks a binding
    pub fn format(&self, bindings: &Bindings) -> Result<Item, SubstError> {
        let mut items = Vec::with_capacity(self.members.len());
        for member in &self.members {
            match member {
                GroupMember::Literal(pattern) => items.push(Item::Line(pattern.format(bindings)?)),
                GroupMember::Template(template) => items.extend(template.format(bindings)?),
            }
        }
        Ok(Item::Group(items))
    }
}

impl fmt::Display for AlternativeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OR({})", self.members.len())
    }
}
