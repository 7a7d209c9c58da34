use std::fmt;

use crate::*;

/// Validation error for structurally malformed template or snippet data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { context: String },
    NestedGroup { context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty { context } => write!(f, "empty {context}"),
            ValidationError::NestedGroup { context } => write!(f, "OR-group nested inside OR-group ({context})"),
            ValidationError::InvalidValue { context } => write!(f, "invalid value ({context})"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a template definition for shapes the matcher cannot compile.
///
/// ```
/// use baf_data::{DefElement, TemplateDef, validate_template};
///
/// let def = TemplateDef::new(vec![
///     DefElement::Line("See(<TARGET>)".into()),
///     DefElement::Group(vec![DefElement::Line("A()".into()), DefElement::Line("B()".into())]),
/// ]);
/// assert!(validate_template("SeeTarget", &def).is_empty());
/// ```
pub fn validate_template(name: &str, def: &TemplateDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "template name is blank".to_string(),
        });
    }
    if def.elements.is_empty() {
        errors.push(ValidationError::Empty {
            context: format!("template '{name}'"),
        });
    }

    for (index, element) in def.elements.iter().enumerate() {
        let context = format!("template '{name}' element {index}");
        match element {
            DefElement::Line(_) => {},
            DefElement::Ref(target) => check_ref_name(target, &context, &mut errors),
            DefElement::Group(members) => {
                if members.is_empty() {
                    errors.push(ValidationError::Empty {
                        context: format!("OR-group in {context}"),
                    });
                }
                for (member_index, member) in members.iter().enumerate() {
                    let member_context = format!("{context} member {member_index}");
                    match member {
                        DefElement::Line(_) => {},
                        DefElement::Ref(target) => check_ref_name(target, &member_context, &mut errors),
                        DefElement::Group(_) => errors.push(ValidationError::NestedGroup {
                            context: member_context,
                        }),
                    }
                }
            },
        }
    }

    errors
}

/// Check a snippet document before it is collapsed or expanded.
pub fn validate_snippet(snippet: &SnippetDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let label = snippet.name.as_deref().unwrap_or("<unnamed>");

    let mut check_items = |items: &[Item], context: &str| {
        for item in items {
            check_item(item, context, false, &mut errors);
        }
    };
    check_items(&snippet.triggers, &format!("snippet '{label}' triggers"));
    for response in &snippet.responses {
        check_items(
            &response.actions,
            &format!("snippet '{label}' response #{}", response.weight),
        );
    }

    for (index, fields) in snippet.fields.iter().enumerate() {
        if fields.keys().any(|key| key.trim().is_empty()) {
            errors.push(ValidationError::InvalidValue {
                context: format!("snippet '{label}' field set {index} has a blank field name"),
            });
        }
    }

    errors
}

fn check_item(item: &Item, context: &str, in_group: bool, errors: &mut Vec<ValidationError>) {
    match item {
        Item::Line(_) => {},
        Item::Ref(reference) => check_ref_name(&reference.name, context, errors),
        Item::Group(members) => {
            if in_group {
                errors.push(ValidationError::NestedGroup {
                    context: context.to_string(),
                });
                return;
            }
            if members.is_empty() {
                errors.push(ValidationError::Empty {
                    context: format!("OR-group in {context}"),
                });
            }
            for member in members {
                check_item(member, context, true, errors);
            }
        },
    }
}

fn check_ref_name(target: &str, context: &str, errors: &mut Vec<ValidationError>) {
    if target.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: format!("blank template reference in {context}"),
        });
    }
}
