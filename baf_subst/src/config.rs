//! Tool configuration: where templates live.
//!
//! Values come from an optional TOML file; anything missing falls back to
//! defaults, and command-line flags override both.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::source::{DEFAULT_ACTION_DIR, DEFAULT_TRIGGER_DIR, DirSource};

pub const CONFIG_FILE_NAME: &str = "baf_subst.toml";

/// Cached default location of the template library.
static TEMPLATE_ROOT: LazyLock<PathBuf> = LazyLock::new(detect_template_root);

/// Resolve the most likely location of the template library.
fn detect_template_root() -> PathBuf {
    let mut candidates = vec![PathBuf::from("templates"), PathBuf::from("data/templates")];

    if let Ok(exe_path) = env::current_exe()
        && let Some(dir) = exe_path.parent()
    {
        candidates.push(dir.join("templates"));
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("templates"));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from("templates"))
}

pub fn default_template_root() -> PathBuf {
    TEMPLATE_ROOT.clone()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding the trigger and action template directories.
    pub template_dir: PathBuf,
    pub trigger_dir: String,
    pub action_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dir: default_template_root(),
            trigger_dir: DEFAULT_TRIGGER_DIR.to_string(),
            action_dir: DEFAULT_ACTION_DIR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`. Relative template paths resolve against the file's directory.
    ///
    /// # Errors
    /// - on file IO error or TOML parsing error
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading config from '{}'", path.display()))?;
        let mut config: Config =
            toml::from_str(&text).with_context(|| format!("parsing config TOML from '{}'", path.display()))?;

        if config.template_dir.is_relative()
            && let Some(base) = path.parent()
        {
            config.template_dir = base.join(&config.template_dir);
        }
        info!(
            "config loaded from '{}' (templates in '{}')",
            path.display(),
            config.template_dir.display()
        );
        Ok(config)
    }

    /// Load `path` if given, else `baf_subst.toml` in the working directory if present, else defaults.
    ///
    /// # Errors
    /// - if an existing config file cannot be read or parsed
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            },
        }
    }

    /// The template source this configuration describes.
    pub fn source(&self) -> DirSource {
        DirSource::with_dirs(&self.template_dir, &self.trigger_dir, &self.action_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_keys_fall_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "trigger_dir = \"triggers\"\n")?;

        let config = Config::load(&path)?;
        assert_eq!(config.trigger_dir, "triggers");
        assert_eq!(config.action_dir, DEFAULT_ACTION_DIR);
        Ok(())
    }

    #[test]
    fn relative_template_dir_resolves_against_config_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "template_dir = \"lib\"\naction_dir = \"actions\"\n")?;

        let config = Config::load(&path)?;
        assert_eq!(config.template_dir, dir.path().join("lib"));
        assert_eq!(config.source().dir(baf_data::TemplateKind::Action), dir.path().join("lib").join("actions"));
        Ok(())
    }

    #[test]
    fn malformed_config_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "template_dir = [1, 2]")?;
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config TOML"));
        Ok(())
    }
}
