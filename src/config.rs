use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::render::RenderOptions;
use crate::theme::{Budget, RenderProfile, Theme};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Optional replacements for a profile's built-in limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetOverride {
    pub max_lines: Option<usize>,
    pub truncate_length: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profiles {
    pub compact: BudgetOverride,
    pub full: BudgetOverride,
}

/// User configuration, read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vault name used when routing wiki links
    pub vault: Option<String>,
    pub theme: Theme,
    pub profiles: Profiles,
}

impl Config {
    /// Platform config location, e.g. `~/.config/notewidget/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "notewidget").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the platform location, if there is one
    pub fn load_default() -> Result<Config, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn budget(&self, profile: RenderProfile) -> Budget {
        let base = profile.budget();
        let overrides = match profile {
            RenderProfile::Compact => self.profiles.compact,
            RenderProfile::Full => self.profiles.full,
        };
        Budget {
            max_lines: overrides.max_lines.unwrap_or(base.max_lines),
            truncate_length: overrides.truncate_length.unwrap_or(base.truncate_length),
        }
    }

    pub fn render_options(&self, profile: RenderProfile) -> RenderOptions {
        self.theme.render_options(self.budget(profile))
    }
}
