//! The loaded template library.
//!
//! A registry is built once from a [`TemplateSource`], compiling every
//! requested template together with everything it references, and is
//! read-only afterwards. Collapse and expand borrow it.

use std::collections::BTreeMap;
use std::sync::Arc;

use baf_data::{Item, TemplateKind};
use log::{debug, info};

use crate::bindings::Bindings;
use crate::driver;
use crate::error::{DefinitionError, SubstError};
use crate::source::TemplateSource;
use crate::template::Template;

#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Arc<Template>>,
}

impl TemplateRegistry {
    /// Load `names` and every template they reference.
    ///
    /// # Errors
    /// - `DefinitionError` if any template is missing, malformed or part of a reference cycle
    pub fn load<S, N>(source: &S, names: &[N]) -> Result<Self, DefinitionError>
    where
        S: TemplateSource + ?Sized,
        N: AsRef<str>,
    {
        let mut registry = Self::default();
        let mut in_progress = Vec::new();
        for name in names {
            registry.resolve(source, name.as_ref(), &mut in_progress)?;
        }
        info!("{} templates loaded", registry.len());
        Ok(registry)
    }

    /// Load every template `source` can enumerate.
    ///
    /// # Errors
    /// - `DefinitionError::Enumerate` if the source cannot be listed
    /// - anything [`TemplateRegistry::load`] reports
    pub fn load_all<S>(source: &S) -> Result<Self, DefinitionError>
    where
        S: TemplateSource + ?Sized,
    {
        let names = source.names().map_err(DefinitionError::Enumerate)?;
        Self::load(source, &names)
    }

    fn resolve<S>(&mut self, source: &S, name: &str, in_progress: &mut Vec<String>) -> Result<Arc<Template>, DefinitionError>
    where
        S: TemplateSource + ?Sized,
    {
        if let Some(template) = self.templates.get(name) {
            return Ok(Arc::clone(template));
        }
        if let Some(start) = in_progress.iter().position(|n| n == name) {
            let mut chain = in_progress[start..].to_vec();
            chain.push(name.to_string());
            return Err(DefinitionError::Cycle { chain });
        }

        let (kind, def) = source.load(name).map_err(|source| DefinitionError::Load {
            name: name.to_string(),
            source,
        })?;

        in_progress.push(name.to_string());
        let template = Template::compile(name, kind, &def, |target| self.resolve(source, target, in_progress))?;
        in_progress.pop();

        debug!("compiled {template} ({} lines)", template.line_count());
        let template = Arc::new(template);
        self.templates.insert(name.to_string(), Arc::clone(&template));
        Ok(template)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Template>> {
        self.templates.get(name)
    }

    /// Look up `name`, treating absence as a definition error.
    ///
    /// # Errors
    /// - `DefinitionError::Unknown` if no template of that name was loaded
    pub fn template(&self, name: &str) -> Result<&Arc<Template>, DefinitionError> {
        self.get(name).ok_or_else(|| DefinitionError::Unknown(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Template>> {
        self.templates.values()
    }

    /// Templates of `kind`, largest first.
    ///
    /// Among equal sizes, deeper templates go first so a wrapper is tried
    /// before the template it wraps; remaining ties fall back to name order.
    pub fn collapse_order(&self, kind: TemplateKind) -> Vec<&Arc<Template>> {
        let mut order: Vec<_> = self.templates.values().filter(|t| t.kind() == kind).collect();
        order.sort_by(|a, b| {
            b.line_count()
                .cmp(&a.line_count())
                .then_with(|| b.depth().cmp(&a.depth()))
                .then_with(|| a.name().cmp(b.name()))
        });
        order
    }

    /// Collapse `sequence` with every template of `kind`.
    pub fn collapse(&self, kind: TemplateKind, sequence: &[Item]) -> Vec<Item> {
        driver::collapse(sequence, self.collapse_order(kind))
    }

    /// Expand every reference in `sequence`.
    ///
    /// # Errors
    /// - `SubstError::Definition` for references to unknown templates
    /// - `SubstError::MissingField` when a reference does not bind every field it needs
    pub fn expand(&self, sequence: &[Item], ambient: &Bindings) -> Result<Vec<Item>, SubstError> {
        driver::expand(self, sequence, ambient)
    }
}
