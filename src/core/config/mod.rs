//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! revise reads settings from two TOML scopes and from git config:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//! - **Git**: `rebase.autoSquash`, `revise.autoSquash`, `revise.reauthor`
//!   and `sequence.presentation-order-head-on-top`
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. Git config
//! 5. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$REVISE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/revise/config.toml`
//! 3. `~/.revise/config.toml`
//!
//! # Repo Config Location
//!
//! `<common_dir>/revise/config.toml`, see [`RevisePaths::repo_config_path`].
//!
//! # Example
//!
//! ```no_run
//! use revise::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Autosquash: {}", config.autosquash());
//! ```

pub mod schema;

pub use schema::ReviseConfig;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::paths::RevisePaths;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Settings read from git config.
///
/// Each field is `None` when the key is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitSettings {
    /// `revise.autoSquash`, falling back to `rebase.autoSquash`
    pub autosquash: Option<bool>,
    /// `revise.reauthor`
    pub reauthor: Option<bool>,
    /// `sequence.presentation-order-head-on-top`
    pub head_on_top: Option<bool>,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules automatically.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ReviseConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<ReviseConfig>,
    /// Values from git config
    pub git: GitSettings,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `paths` is provided, also loads the repo-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(paths: Option<&RevisePaths>) -> Result<Config, ConfigError> {
        let (global, global_path) = Self::load_global()?;

        let (repo, repo_path) = match paths {
            Some(paths) => {
                let path = paths.repo_config_path();
                if path.exists() {
                    (Some(Self::read_config(&path)?), Some(path))
                } else {
                    (None, None)
                }
            }
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(Config {
            global,
            repo,
            git: GitSettings::default(),
            global_path,
            repo_path,
        })
    }

    /// Attach the settings read from git config.
    pub fn with_git_settings(mut self, git: GitSettings) -> Self {
        self.git = git;
        self
    }

    /// Load global configuration from standard locations.
    fn load_global() -> Result<(ReviseConfig, Option<PathBuf>), ConfigError> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("REVISE_CONFIG") {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("revise/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".revise/config.toml"));
        }

        for path in candidates {
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((ReviseConfig::default(), None))
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<ReviseConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The file settings with the repo file applied over the global one.
    fn file(&self) -> ReviseConfig {
        match &self.repo {
            Some(repo) => self.global.merged_with(repo),
            None => self.global.clone(),
        }
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Check if autosquash is enabled by default.
    ///
    /// Defaults to `false` if not configured.
    pub fn autosquash(&self) -> bool {
        self.git
            .autosquash
            .or(self.file().autosquash)
            .unwrap_or(false)
    }

    /// Check if rewritten commits should be reauthored.
    ///
    /// Defaults to `false` if not configured.
    pub fn reauthor(&self) -> bool {
        self.git.reauthor.or(self.file().reauthor).unwrap_or(false)
    }

    /// Check if interactive revisions use message-editing mode.
    ///
    /// Defaults to `false` if not configured.
    pub fn msgedit(&self) -> bool {
        self.file().msgedit.unwrap_or(false)
    }

    /// Check if todo lists show the newest entry first.
    ///
    /// Defaults to `false` if not configured.
    pub fn head_on_top(&self) -> bool {
        self.git
            .head_on_top
            .or(self.file().head_on_top)
            .unwrap_or(false)
    }

    /// Get the configured commit message editor, if any.
    pub fn editor(&self) -> Option<String> {
        self.file().editor
    }

    /// Get the configured todo list editor, if any.
    pub fn sequence_editor(&self) -> Option<String> {
        self.file().sequence_editor
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
