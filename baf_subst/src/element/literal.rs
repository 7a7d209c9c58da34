//! Single-line patterns with `<NAME>` placeholders.

use std::fmt;

use baf_data::Item;
use lazy_static::lazy_static;
use log::debug;
use regex::{Captures, Match, Regex};

use crate::bindings::Bindings;
use crate::element::MatchResult;
use crate::error::{PatternError, SubstError};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"<(\w+)>").expect("placeholder pattern is valid");
}

fn placeholder_name<'t>(found: &Match<'t>) -> &'t str {
    let marker = found.as_str();
    &marker[1..marker.len() - 1]
}

/// Replace each `<NAME>` in `text` with its bound value.
///
/// Placeholders without a binding are left in place when `strict` is false,
/// and reported as the `Err` name when it is true.
fn fill<'t>(text: &'t str, fields: &Bindings, strict: bool) -> Result<String, &'t str> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for found in PLACEHOLDER.find_iter(text) {
        let name = placeholder_name(&found);
        out.push_str(&text[last..found.start()]);
        match fields.get(name) {
            Some(value) => out.push_str(value),
            None if strict => return Err(name),
            None => out.push_str(found.as_str()),
        }
        last = found.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Substitute the placeholders `fields` knows about, keeping the rest verbatim.
pub fn substitute_known(text: &str, fields: &Bindings) -> String {
    if fields.is_empty() {
        return text.to_string();
    }
    // non-strict fill never reports a missing name
    fill(text, fields, false).unwrap_or_else(|_| text.to_string())
}

/// A compiled line pattern.
#[derive(Debug, Clone)]
pub struct LiteralPattern {
    text: String,
    fields: Vec<String>,
    regex: Regex,
}

impl LiteralPattern {
    /// Compile `text` into a matcher with one greedy capture per placeholder.
    ///
    /// # Errors
    /// - if a placeholder name repeats within `text`
    /// - if the resulting expression fails to compile
    pub fn compile(text: &str) -> Result<Self, PatternError> {
        let mut pattern = String::with_capacity(text.len() + 8);
        let mut fields: Vec<String> = Vec::new();
        let mut last = 0;
        for found in PLACEHOLDER.find_iter(text) {
            let name = placeholder_name(&found);
            if fields.iter().any(|f| f == name) {
                return Err(PatternError::DuplicatePlaceholder(name.to_string()));
            }
            pattern.push_str(&regex::escape(&text[last..found.start()]));
            pattern.push_str("(.*)");
            fields.push(name.to_string());
            last = found.end();
        }
        pattern.push_str(&regex::escape(&text[last..]));

        Ok(Self {
            text: text.to_string(),
            fields,
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names in order of appearance.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn captured(&self, caps: &Captures<'_>) -> Bindings {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), caps.get(i + 1).map_or("", |m| m.as_str())))
            .collect()
    }

    /// Find the first line in `sequence` this pattern occurs in whose captures agree with `bindings`.
    ///
    /// A line that matches but disagrees with `bindings` is skipped, not fatal.
    pub fn match_in(&self, sequence: &[Item], bindings: &Bindings) -> Option<MatchResult> {
        for (index, item) in sequence.iter().enumerate() {
            let Some(line) = item.as_line() else {
                continue;
            };
            let Some(caps) = self.regex.captures(line) else {
                debug!("'{}' != '{line}'", self.text);
                continue;
            };
            if let Some(unified) = bindings.unify(&self.captured(&caps)) {
                debug!("'{}' == '{line}'", self.text);
                return Some(MatchResult::split(sequence, index, unified));
            }
            debug!("'{}' ~= '{line}' but field values conflict", self.text);
        }
        None
    }

    /// Render this line with every placeholder filled from `bindings`.
    ///
    /// # Errors
    /// - `SubstError::MissingField` if a placeholder has no binding
    pub fn format(&self, bindings: &Bindings) -> Result<String, SubstError> {
        fill(&self.text, bindings, true).map_err(|field| SubstError::MissingField {
            field: field.to_string(),
            line: self.text.clone(),
        })
    }
}

impl fmt::Display for LiteralPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line '{}'", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(values: &[&str]) -> Vec<Item> {
        values.iter().copied().map(Item::from).collect()
    }

    #[test]
    fn compile_escapes_regex_metacharacters() {
        let pattern = LiteralPattern::compile("HPPercentLT(Myself,<PCT>)").unwrap();
        assert_eq!(pattern.fields(), ["PCT"]);
        let found = pattern
            .match_in(&lines(&["HPPercentLT(Myself,50)"]), &Bindings::new())
            .expect("match");
        assert_eq!(found.bindings.get("PCT"), Some("50"));
        assert!(pattern.match_in(&lines(&["HPPercentLTxMyself,50)"]), &Bindings::new()).is_none());
    }

    #[test]
    fn compile_rejects_repeated_placeholder() {
        let err = LiteralPattern::compile("Swap(<A>,<A>)").unwrap_err();
        assert!(matches!(err, PatternError::DuplicatePlaceholder(name) if name == "A"));
    }

    #[test]
    fn match_searches_within_a_line() {
        let pattern = LiteralPattern::compile("See(<WHO>)").unwrap();
        let found = pattern
            .match_in(&lines(&["!See(Player1)"]), &Bindings::new())
            .expect("substring match");
        assert_eq!(found.bindings.get("WHO"), Some("Player1"));
    }

    #[test]
    fn match_reports_before_and_after() {
        let pattern = LiteralPattern::compile("B(<X>)").unwrap();
        let seq = vec![Item::line("A()"), Item::Group(lines(&["B(9)"])), Item::line("B(1)"), Item::line("C()")];
        let found = pattern.match_in(&seq, &Bindings::new()).expect("match");
        // nested groups are not searched by a bare line pattern
        assert_eq!(found.before, vec![Item::line("A()"), Item::Group(lines(&["B(9)"]))]);
        assert_eq!(found.after, vec![Item::line("C()")]);
        assert_eq!(found.bindings.get("X"), Some("1"));
    }

    #[test]
    fn match_skips_conflicting_occurrence() {
        let pattern = LiteralPattern::compile("Q(<X>)").unwrap();
        let bound: Bindings = [("X", "2")].into_iter().collect();
        let found = pattern
            .match_in(&lines(&["Q(1)", "Q(2)", "R()"]), &bound)
            .expect("second occurrence agrees");
        assert_eq!(found.before, lines(&["Q(1)"]));
        assert_eq!(found.after, lines(&["R()"]));

        let bound: Bindings = [("X", "3")].into_iter().collect();
        assert!(pattern.match_in(&lines(&["Q(1)", "Q(2)"]), &bound).is_none());
    }

    #[test]
    fn format_fills_fields_and_reports_missing_ones() {
        let pattern = LiteralPattern::compile("Spell(<TARGET>,<SPELL>)").unwrap();
        let full: Bindings = [("TARGET", "Myself"), ("SPELL", "CLERIC_BLESS")].into_iter().collect();
        assert_eq!(pattern.format(&full).unwrap(), "Spell(Myself,CLERIC_BLESS)");

        let partial: Bindings = [("TARGET", "Myself")].into_iter().collect();
        let err = pattern.format(&partial).unwrap_err();
        assert!(matches!(err, SubstError::MissingField { field, .. } if field == "SPELL"));
    }

    #[test]
    fn substitute_known_keeps_unbound_placeholders() {
        let fields: Bindings = [("A", "1")].into_iter().collect();
        assert_eq!(substitute_known("F(<A>,<B>)", &fields), "F(1,<B>)");
        assert_eq!(substitute_known("F(<A>)", &Bindings::new()), "F(<A>)");
    }
}
