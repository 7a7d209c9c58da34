//! Named templates: ordered composites of lines, OR-groups and other templates.

use std::fmt;
use std::sync::Arc;

use baf_data::{DefElement, Item, TemplateDef, TemplateKind, validate_template};
use log::debug;

use crate::bindings::Bindings;
use crate::element::{AlternativeGroup, Element, GroupMember, LiteralPattern, MatchResult};
use crate::error::{DefinitionError, SubstError};

/// A compiled, immutable template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    kind: TemplateKind,
    elements: Vec<Element>,
    depth: usize,
}

impl Template {
    /// Compile a stored definition. `resolve` supplies the compiled form of each referenced template.
    ///
    /// # Errors
    /// - `DefinitionError::Invalid` for structurally malformed definitions
    /// - `DefinitionError::Pattern` for lines that do not compile
    /// - anything `resolve` reports for a referenced template
    pub fn compile<F>(name: &str, kind: TemplateKind, def: &TemplateDef, mut resolve: F) -> Result<Self, DefinitionError>
    where
        F: FnMut(&str) -> Result<Arc<Template>, DefinitionError>,
    {
        let errors = validate_template(name, def);
        if !errors.is_empty() {
            let details = errors
                .into_iter()
                .map(|err| format!("- {err}"))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(DefinitionError::Invalid {
                name: name.to_string(),
                details,
            });
        }

        let literal = |line: &str| {
            LiteralPattern::compile(line).map_err(|source| DefinitionError::Pattern {
                template: name.to_string(),
                line: line.to_string(),
                source,
            })
        };

        let mut depth = 0;
        let mut reference = |target: &str| {
            let template = resolve(target)?;
            depth = depth.max(template.depth + 1);
            Ok::<_, DefinitionError>(template)
        };

        let mut elements = Vec::with_capacity(def.elements.len());
        for element in &def.elements {
            elements.push(match element {
                DefElement::Line(line) => Element::Literal(literal(line)?),
                DefElement::Ref(target) => Element::Template(reference(target)?),
                DefElement::Group(members) => {
                    let mut compiled = Vec::with_capacity(members.len());
                    for member in members {
                        compiled.push(match member {
                            DefElement::Line(line) => GroupMember::Literal(literal(line)?),
                            DefElement::Ref(target) => GroupMember::Template(reference(target)?),
                            // validate_template already rejected these
                            DefElement::Group(_) => {
                                return Err(DefinitionError::Invalid {
                                    name: name.to_string(),
                                    details: "- OR-group nested inside OR-group".to_string(),
                                });
                            },
                        });
                    }
                    Element::Group(AlternativeGroup::new(compiled))
                },
            });
        }

        Ok(Self {
            name: name.to_string(),
            kind,
            elements,
            depth,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of script lines this template expands to. Used to try bigger templates first.
    pub fn line_count(&self) -> usize {
        self.elements.iter().map(Element::line_count).sum()
    }

    /// Reference nesting: 0 for a template of plain lines and groups, otherwise
    /// one more than the deepest template it references.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Try to account for every element of this template somewhere in `sequence`.
    ///
    /// Elements are searched in declared order over whatever earlier elements
    /// left behind, and an element's first acceptable occurrence is kept: a
    /// later element failing does not revisit earlier choices. On success the
    /// reference position is placed just before the first consumed item.
    pub fn match_in(&self, sequence: &[Item], bindings: &Bindings) -> Option<MatchResult> {
        let mut remaining = sequence.to_vec();
        let mut bound = bindings.clone();

        for element in &self.elements {
            debug!("{}: examining {element}", self.name);
            let Some(found) = element.match_in(&remaining, &bound) else {
                debug!("{}: {element} does not match", self.name);
                return None;
            };
            debug!("{}: {element} MATCHES", self.name);
            // leaf matchers unify against `bound`, so their bindings already extend it
            (remaining, bound) = found.into_parts();
        }

        // Unconsumed items leading the original sequence stay in front of the reference.
        let split = sequence
            .iter()
            .zip(&remaining)
            .take_while(|(original, left)| original == left)
            .count();
        let after = remaining.split_off(split);
        Some(MatchResult {
            before: remaining,
            bindings: bound,
            after,
        })
    }

    /// Render every element in declared order.
    ///
    /// # Errors
    /// - `SubstError::MissingField` if a placeholder lacks a binding
    pub fn format(&self, bindings: &Bindings) -> Result<Vec<Item>, SubstError> {
        let mut out = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            out.extend(element.format(bindings)?);
        }
        Ok(out)
    }
}

impl AsRef<Template> for Template {
    fn as_ref(&self) -> &Template {
        self
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} template '{}'", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn def(value: serde_json::Value) -> TemplateDef {
        serde_json::from_value(value).expect("template json")
    }

    fn standalone(name: &str, value: serde_json::Value) -> Template {
        Template::compile(name, TemplateKind::Trigger, &def(value), |target| {
            Err(DefinitionError::Unknown(target.to_string()))
        })
        .expect("compiles")
    }

    fn lines(values: &[&str]) -> Vec<Item> {
        values.iter().copied().map(Item::from).collect()
    }

    #[test]
    fn matches_elements_anywhere_in_sequence() {
        let t = standalone("Pair", json!(["P(<X>)", "Q(<Y>)"]));
        let seq = lines(&["A()", "P(1)", "B()", "Q(2)", "C()"]);
        let found = t.match_in(&seq, &Bindings::new()).expect("match");
        assert_eq!(found.before, lines(&["A()"]));
        assert_eq!(found.after, lines(&["B()", "C()"]));
        assert_eq!(found.bindings.get("X"), Some("1"));
        assert_eq!(found.bindings.get("Y"), Some("2"));
    }

    #[test]
    fn shared_placeholder_must_agree() {
        let t = standalone("Baz", json!(["P(<X>)", "Q(<X>)"]));
        assert!(t.match_in(&lines(&["P(1)", "Q(2)"]), &Bindings::new()).is_none());
        let found = t
            .match_in(&lines(&["P(1)", "Q(2)", "Q(1)"]), &Bindings::new())
            .expect("later Q agrees");
        assert_eq!(found.bindings.get("X"), Some("1"));
        assert_eq!(found.before, Vec::<Item>::new());
        assert_eq!(found.after, lines(&["Q(2)"]));
    }

    #[test]
    fn greedy_choice_is_not_revisited() {
        // P(<X>) takes P(1) first; R(<X>) then finds no R(1) and the attempt fails
        // even though P(2)/R(2) would have matched.
        let t = standalone("Greedy", json!(["P(<X>)", "R(<X>)"]));
        assert!(t.match_in(&lines(&["P(1)", "P(2)", "R(2)"]), &Bindings::new()).is_none());
    }

    #[test]
    fn missing_element_fails_the_template() {
        let t = standalone("Pair", json!(["P()", "Q()"]));
        assert!(t.match_in(&lines(&["P()", "R()"]), &Bindings::new()).is_none());
    }

    #[test]
    fn nested_reference_is_matched_and_formatted_inline() {
        let foo = Arc::new(standalone("Foo", json!(["Spell(<X>)"])));
        let outer = Template::compile("Outer", TemplateKind::Trigger, &def(json!([{"Foo": null}, "Done()"])), |_| {
            Ok(Arc::clone(&foo))
        })
        .unwrap();
        assert_eq!(outer.line_count(), 2);
        assert_eq!(foo.depth(), 0);
        assert_eq!(outer.depth(), 1);

        let found = outer
            .match_in(&lines(&["Spell(FIRE)", "Done()"]), &Bindings::new())
            .expect("match");
        assert_eq!(found.bindings.get("X"), Some("FIRE"));
        assert_eq!(outer.format(&found.bindings).unwrap(), lines(&["Spell(FIRE)", "Done()"]));
    }

    #[test]
    fn incoming_bindings_steer_every_element() {
        let t = standalone("Pair", json!(["P(<X>)", "Q(<Y>)"]));
        let outer = Bindings::new().bind("X", "2").unwrap();
        let found = t
            .match_in(&lines(&["P(1)", "P(2)", "Q(3)"]), &outer)
            .expect("P(2) agrees with X");
        assert_eq!(found.before, lines(&["P(1)"]));
        assert_eq!(found.after, Vec::<Item>::new());
        assert_eq!(found.bindings.get("X"), Some("2"));
        assert_eq!(found.bindings.get("Y"), Some("3"));
    }

    #[test]
    fn group_element_counts_member_lines() {
        let t = standalone("Or", json!(["A()", ["B()", "C()", "D()"]]));
        assert_eq!(t.line_count(), 4);
        let formatted = t.format(&Bindings::new()).unwrap();
        assert_eq!(formatted, vec![Item::line("A()"), Item::Group(lines(&["B()", "C()", "D()"]))]);
    }

    #[test]
    fn compile_reports_malformed_definitions() {
        let nested = Template::compile("Nested", TemplateKind::Action, &def(json!([["A()", ["B()"]]])), |t| {
            Err(DefinitionError::Unknown(t.to_string()))
        });
        assert!(matches!(nested, Err(DefinitionError::Invalid { name, .. }) if name == "Nested"));

        let duplicate = Template::compile("Dup", TemplateKind::Action, &def(json!(["F(<A>,<A>)"])), |t| {
            Err(DefinitionError::Unknown(t.to_string()))
        });
        assert!(matches!(duplicate, Err(DefinitionError::Pattern { template, .. }) if template == "Dup"));

        let unresolved = Template::compile("Lost", TemplateKind::Action, &def(json!([{"Nope": {}}])), |t| {
            Err(DefinitionError::Unknown(t.to_string()))
        });
        assert!(matches!(unresolved, Err(DefinitionError::Unknown(name)) if name == "Nope"));
    }
}
