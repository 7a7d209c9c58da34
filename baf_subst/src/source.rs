//! Where template definitions come from.
//!
//! The engine only needs "give me the definition called X". A directory of
//! JSON files is the on-disk layout: trigger templates live in `if/`, action
//! templates in `then/`, one `<name>.json` per template.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use baf_data::{TemplateDef, TemplateKind};
use log::{debug, warn};

use crate::error::SourceError;

pub const DEFAULT_TRIGGER_DIR: &str = "if";
pub const DEFAULT_ACTION_DIR: &str = "then";

/// Supplies template definitions by name.
pub trait TemplateSource {
    /// Load the definition called `name` and report which kind it is.
    ///
    /// # Errors
    /// - `SourceError::NotFound` if no such template exists
    /// - any I/O or parse failure of the backing store
    fn load(&self, name: &str) -> Result<(TemplateKind, TemplateDef), SourceError>;

    /// Every template name this source can provide, sorted.
    ///
    /// # Errors
    /// - if the backing store cannot be listed
    fn names(&self) -> Result<Vec<String>, SourceError>;
}

/// Read-only directory of JSON template files.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
    trigger_dir: String,
    action_dir: String,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_dirs(root, DEFAULT_TRIGGER_DIR, DEFAULT_ACTION_DIR)
    }

    pub fn with_dirs(root: impl Into<PathBuf>, trigger_dir: impl Into<String>, action_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            trigger_dir: trigger_dir.into(),
            action_dir: action_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding templates of `kind`.
    pub fn dir(&self, kind: TemplateKind) -> PathBuf {
        match kind {
            TemplateKind::Trigger => self.root.join(&self.trigger_dir),
            TemplateKind::Action => self.root.join(&self.action_dir),
        }
    }

    /// Path of the file that defines `name`; trigger templates shadow action templates.
    ///
    /// Names that are not a single path component never resolve.
    pub fn path_for(&self, name: &str) -> Option<(TemplateKind, PathBuf)> {
        if !is_plain_name(name) {
            return None;
        }
        TemplateKind::ALL.into_iter().find_map(|kind| {
            let path = self.dir(kind).join(format!("{name}.json"));
            path.is_file().then_some((kind, path))
        })
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

impl TemplateSource for DirSource {
    fn load(&self, name: &str) -> Result<(TemplateKind, TemplateDef), SourceError> {
        if !is_plain_name(name) {
            return Err(SourceError::InvalidName(name.to_string()));
        }
        let Some((kind, path)) = self.path_for(name) else {
            return Err(SourceError::NotFound(name.to_string()));
        };
        debug!("loading {kind} template '{name}' from '{}'", path.display());
        let text = fs::read_to_string(&path).map_err(|source| SourceError::Io {
            name: name.to_string(),
            path: path.clone(),
            source,
        })?;
        let def = serde_json::from_str(&text).map_err(|source| SourceError::Parse {
            name: name.to_string(),
            path,
            source,
        })?;
        Ok((kind, def))
    }

    fn names(&self) -> Result<Vec<String>, SourceError> {
        let mut names = Vec::new();
        for kind in TemplateKind::ALL {
            let dir = self.dir(kind);
            if !dir.is_dir() {
                warn!("{kind} template directory '{}' does not exist", dir.display());
                continue;
            }
            let entries = fs::read_dir(&dir).map_err(|source| SourceError::List {
                path: dir.clone(),
                source,
            })?;
            for entry in entries {
                let path = entry
                    .map_err(|source| SourceError::List {
                        path: dir.clone(),
                        source,
                    })?
                    .path();
                if path.is_file()
                    && path.extension().is_some_and(|ext| ext == "json")
                    && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// In-memory trigger templates keyed by name.
impl TemplateSource for BTreeMap<String, TemplateDef> {
    fn load(&self, name: &str) -> Result<(TemplateKind, TemplateDef), SourceError> {
        self.get(name)
            .map(|def| (TemplateKind::Trigger, def.clone()))
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }

    fn names(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.keys().cloned().collect())
    }
}

/// In-memory templates of either kind keyed by name.
impl TemplateSource for BTreeMap<String, (TemplateKind, TemplateDef)> {
    fn load(&self, name: &str) -> Result<(TemplateKind, TemplateDef), SourceError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }

    fn names(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.keys().cloned().collect())
    }
}
