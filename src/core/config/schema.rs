//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global file and the repository file;
//! the repository file overrides the global file key by key.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g., editor commands must
//! not be blank).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// A revise configuration file.
///
/// # Example
///
/// ```toml
/// autosquash = true
/// reauthor = false
/// msgedit = false
/// head_on_top = false
/// editor = "vim"
/// sequence_editor = "vim"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReviseConfig {
    /// Group fixup!/squash! commits by default
    pub autosquash: Option<bool>,

    /// Reset authorship of rewritten commits
    pub reauthor: Option<bool>,

    /// Use message-editing mode for interactive revisions
    pub msgedit: Option<bool>,

    /// Show the newest todo entry first
    pub head_on_top: Option<bool>,

    /// Editor command for commit messages
    pub editor: Option<String>,

    /// Editor command for todo lists
    pub sequence_editor: Option<String>,
}

impl ReviseConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("editor", &self.editor),
            ("sequence_editor", &self.sequence_editor),
        ] {
            if let Some(command) = value {
                if command.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(format!(
                        "{key} cannot be empty"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Overlay `other` on top of `self`, key by key.
    pub fn merged_with(&self, other: &ReviseConfig) -> ReviseConfig {
        ReviseConfig {
            autosquash: other.autosquash.or(self.autosquash),
            reauthor: other.reauthor.or(self.reauthor),
            msgedit: other.msgedit.or(self.msgedit),
            head_on_top: other.head_on_top.or(self.head_on_top),
            editor: other.editor.clone().or_else(|| self.editor.clone()),
            sequence_editor: other
                .sequence_editor
                .clone()
                .or_else(|| self.sequence_editor.clone()),
        }
    }
}
