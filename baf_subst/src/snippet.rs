//! Collapse and expand whole extracted statements.
//!
//! A snippet holds one IF/THEN statement with its triggers and weighted
//! response blocks, plus any number of field sets. Triggers are collapsed
//! with trigger templates and each response block with action templates.
//! Expansion produces one concrete statement per field set.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use baf_data::{Item, ResponseDef, SnippetDef, TemplateKind, validate_snippet};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::bindings::Bindings;
use crate::error::SubstError;
use crate::registry::TemplateRegistry;

/// A fully expanded IF/THEN statement, ready for a text serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "if")]
    pub triggers: Vec<Item>,
    #[serde(rename = "then")]
    pub responses: Vec<ResponseDef>,
}

/// Load and validate a snippet document.
///
/// # Errors
/// - on file IO error, JSON parse error, or structural validation failure
pub fn load_snippet(path: &Path) -> Result<SnippetDef> {
    let text = fs::read_to_string(path).with_context(|| format!("reading snippet from '{}'", path.display()))?;
    let snippet: SnippetDef =
        serde_json::from_str(&text).with_context(|| format!("parsing snippet JSON from '{}'", path.display()))?;

    let errors = validate_snippet(&snippet);
    if !errors.is_empty() {
        let details = errors
            .into_iter()
            .map(|err| format!("- {err}"))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("snippet '{}' failed validation:\n{details}", path.display());
    }
    if snippet.responses.is_empty() {
        warn!("snippet '{}' has no response blocks", path.display());
    }
    Ok(snippet)
}

/// Collapse triggers and every response block of `snippet`.
pub fn collapse_snippet(registry: &TemplateRegistry, snippet: &SnippetDef) -> SnippetDef {
    let triggers = registry.collapse(TemplateKind::Trigger, &snippet.triggers);
    let responses = snippet
        .responses
        .iter()
        .map(|response| ResponseDef {
            weight: response.weight,
            actions: registry.collapse(TemplateKind::Action, &response.actions),
        })
        .collect();

    info!(
        "snippet '{}': {} -> {} trigger items",
        snippet.name.as_deref().unwrap_or("<unnamed>"),
        snippet.triggers.len(),
        triggers.len()
    );

    SnippetDef {
        name: snippet.name.clone(),
        triggers,
        responses,
        fields: snippet.fields.clone(),
    }
}

/// Produce one concrete statement per field set of `snippet` (one if it has none).
///
/// # Errors
/// - anything [`TemplateRegistry::expand`] reports
pub fn expand_snippet(registry: &TemplateRegistry, snippet: &SnippetDef) -> Result<Vec<Statement>, SubstError> {
    let field_sets: Vec<Bindings> = if snippet.fields.is_empty() {
        vec![Bindings::new()]
    } else {
        snippet.fields.iter().map(Bindings::from).collect()
    };

    let label = snippet.name.as_deref().unwrap_or("<unnamed>");
    if field_sets.len() > 1 {
        info!("expanding multi-part {label} ({})", field_sets.len());
    } else {
        info!("expanding single-part {label}");
    }

    let mut statements = Vec::with_capacity(field_sets.len());
    for ambient in &field_sets {
        let triggers = registry.expand(&snippet.triggers, ambient)?;
        let mut responses = Vec::with_capacity(snippet.responses.len());
        for response in &snippet.responses {
            responses.push(ResponseDef {
                weight: response.weight,
                actions: registry.expand(&response.actions, ambient)?,
            });
        }
        statements.push(Statement { triggers, responses });
    }
    Ok(statements)
}
