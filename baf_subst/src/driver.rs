//! Collapse and expand over whole sequences.

use baf_data::{Item, Reference};
use log::{debug, info};

use crate::bindings::Bindings;
use crate::element::substitute_known;
use crate::error::SubstError;
use crate::registry::TemplateRegistry;
use crate::template::Template;

/// Try each template once, in the order given, replacing whatever it matches with a reference.
///
/// Later templates see the sequence as rewritten by earlier ones. A template
/// that does not match leaves the sequence untouched.
pub fn collapse<I>(sequence: &[Item], templates: I) -> Vec<Item>
where
    I: IntoIterator,
    I::Item: AsRef<Template>,
{
    let mut current = sequence.to_vec();
    for template in templates {
        let template = template.as_ref();
        let Some(found) = template.match_in(&current, &Bindings::new()) else {
            debug!("{template}: no match");
            continue;
        };
        info!("collapsed {template} ({} fields)", found.bindings.len());
        let reference = Reference::new(template.name(), found.bindings.clone().into_fields());
        current = found.splice(Item::Ref(reference));
    }
    current
}

/// Replace every reference in `sequence` with the lines of its template.
///
/// Literal lines get `ambient` placeholders filled in and keep any others
/// verbatim. A reference is formatted with its own fields overlaid by
/// `ambient`, and every placeholder of its template must then be bound.
/// OR-groups stay groups, with their members expanded.
///
/// # Errors
/// - `SubstError::Definition` for references to unknown templates
/// - `SubstError::MissingField` when a reference lacks a field its template needs
pub fn expand(registry: &TemplateRegistry, sequence: &[Item], ambient: &Bindings) -> Result<Vec<Item>, SubstError> {
    let mut out = Vec::with_capacity(sequence.len());
    for item in sequence {
        match item {
            Item::Line(line) => out.push(Item::Line(substitute_known(line, ambient))),
            Item::Group(members) => out.push(Item::Group(expand(registry, members, ambient)?)),
            Item::Ref(reference) => {
                let template = registry.template(&reference.name)?;
                let bindings = Bindings::from(&reference.fields).overlay(ambient);
                let lines = template.format(&bindings)?;
                debug!("expanded {template} into {} items", lines.len());
                out.extend(lines);
            },
        }
    }
    Ok(out)
}
