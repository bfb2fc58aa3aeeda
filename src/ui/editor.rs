//! ui::editor
//!
//! Interactive editing collaborators.
//!
//! # Design
//!
//! The engine never talks to a terminal directly. Everything interactive
//! goes through the [`Interact`] trait:
//!
//! - [`Interact::edit_text`] - free-form text round-trip (commit messages,
//!   message-editing todo lists)
//! - [`Interact::edit_sequence`] - list-oriented round-trip (line-wise todo
//!   lists)
//! - [`Interact::select_cut`] - interactive selection of the first half
//!   of a commit being cut in two
//!
//! Each call blocks until the user is done. An empty (or whitespace-only)
//! response means "abort"; deciding what to do with that is up to the caller.
//!
//! [`ProcessEditor`] is the real implementation: it writes a scratch file
//! under the git dir, runs the configured editor on it and reads it back.
//! [`ScriptedEditor`](super::scripted::ScriptedEditor) replays canned
//! responses in tests.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

use crate::core::config::Config;
use crate::core::paths::RevisePaths;
use crate::core::types::Oid;
use crate::git::{Commit, Git, GitError};

/// Errors from interactive collaborators.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Failed to write or read a scratch file.
    #[error("editor file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The editor process could not be started.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The editor process exited unsuccessfully.
    #[error("'{command}' exited with {status}")]
    Failed { command: String, status: String },

    /// A store operation needed by the collaborator failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A scripted collaborator ran out of responses.
    #[error("no scripted response left for '{name}'")]
    NoResponse { name: String },
}

/// A blocking, interactive editing collaborator.
pub trait Interact {
    /// Let the user edit free-form `text`.
    ///
    /// `name` identifies the scratch file (e.g. `COMMIT_EDITMSG`) and
    /// `instructions` is shown alongside the content but never returned.
    fn edit_text(&self, name: &str, text: &[u8], instructions: &str)
        -> Result<Vec<u8>, EditorError>;

    /// Let the user edit a list of short lines.
    fn edit_sequence(
        &self,
        name: &str,
        text: &[u8],
        instructions: &str,
    ) -> Result<Vec<u8>, EditorError>;

    /// Let the user pick which part of `commit` (relative to
    /// `parent_tree`) goes into the first half of a cut, returning the
    /// tree of that first half.
    fn select_cut(&self, git: &Git, commit: &Commit, parent_tree: &Oid)
        -> Result<Oid, EditorError>;
}

/// Render the scratch file: content, then the instructions as comments.
pub fn render_with_comments(text: &[u8], instructions: &str) -> Vec<u8> {
    let mut rendered = text.to_vec();
    if !rendered.is_empty() && !rendered.ends_with(b"\n") {
        rendered.push(b'\n');
    }
    rendered.push(b'\n');
    for line in instructions.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            rendered.extend_from_slice(b"#\n");
        } else {
            rendered.extend_from_slice(b"# ");
            rendered.extend_from_slice(line.as_bytes());
            rendered.push(b'\n');
        }
    }
    rendered
}

/// Drop comment lines and surrounding whitespace from an editor response.
///
/// A non-empty result always ends with exactly one newline.
pub fn strip_comments(response: &[u8]) -> Vec<u8> {
    let mut kept = Vec::with_capacity(response.len());
    for line in response.split_inclusive(|&b| b == b'\n') {
        if !line.starts_with(b"#") {
            kept.extend_from_slice(line);
        }
    }

    let trimmed = kept.trim_ascii();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let mut result = trimmed.to_vec();
    result.push(b'\n');
    result
}

/// The real editor: runs the user's configured editor on a scratch file.
#[derive(Debug, Clone)]
pub struct ProcessEditor {
    paths: RevisePaths,
    work_dir: PathBuf,
    editor: String,
    sequence_editor: String,
}

impl ProcessEditor {
    /// Resolve the editors for a repository.
    ///
    /// Commit messages: `$GIT_EDITOR`, config `editor`, `core.editor`,
    /// `$VISUAL`, `$EDITOR`, then `vi`.
    ///
    /// Todo lists: `$GIT_SEQUENCE_EDITOR`, config `sequence_editor`,
    /// `sequence.editor`, then the commit message editor.
    pub fn new(git: &Git, config: &Config) -> Result<Self, EditorError> {
        let info = git.info()?;

        let editor = match non_empty_env("GIT_EDITOR").or_else(|| config.editor()) {
            Some(editor) => editor,
            None => match git.string_config("core.editor")? {
                Some(editor) => editor,
                None => non_empty_env("VISUAL")
                    .or_else(|| non_empty_env("EDITOR"))
                    .unwrap_or_else(|| "vi".to_string()),
            },
        };

        let sequence_editor =
            match non_empty_env("GIT_SEQUENCE_EDITOR").or_else(|| config.sequence_editor()) {
                Some(editor) => editor,
                None => git
                    .string_config("sequence.editor")?
                    .unwrap_or_else(|| editor.clone()),
            };

        Ok(Self {
            paths: RevisePaths::from_repo_info(&info),
            work_dir: info.work_dir,
            editor,
            sequence_editor,
        })
    }

    /// The command used for free-form text.
    pub fn editor(&self) -> &str {
        &self.editor
    }

    /// The command used for todo lists.
    pub fn sequence_editor(&self) -> &str {
        &self.sequence_editor
    }

    fn run(
        &self,
        command: &str,
        name: &str,
        text: &[u8],
        instructions: &str,
    ) -> Result<Vec<u8>, EditorError> {
        let path = self.paths.editor_file(name);
        let io_error = |source| EditorError::Io {
            path: path.clone(),
            source,
        };

        fs::write(&path, render_with_comments(text, instructions)).map_err(io_error)?;

        // Let the shell split the command so "code --wait" etc. work
        let status = Command::new("sh")
            .arg("-c")
            .arg(format!("{command} \"$@\""))
            .arg(command)
            .arg(&path)
            .current_dir(&self.work_dir)
            .status()
            .map_err(|source| EditorError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(EditorError::Failed {
                command: command.to_string(),
                status: status.to_string(),
            });
        }

        let response = fs::read(&path).map_err(io_error)?;
        fs::remove_file(&path).ok();
        Ok(strip_comments(&response))
    }
}

impl Interact for ProcessEditor {
    fn edit_text(
        &self,
        name: &str,
        text: &[u8],
        instructions: &str,
    ) -> Result<Vec<u8>, EditorError> {
        self.run(&self.editor, name, text, instructions)
    }

    fn edit_sequence(
        &self,
        name: &str,
        text: &[u8],
        instructions: &str,
    ) -> Result<Vec<u8>, EditorError> {
        self.run(&self.sequence_editor, name, text, instructions)
    }

    fn select_cut(
        &self,
        git: &Git,
        commit: &Commit,
        parent_tree: &Oid,
    ) -> Result<Oid, EditorError> {
        let temp_index = self.paths.temp_index_path();
        git.write_temp_index(&temp_index, parent_tree)?;

        let command = format!("git reset --patch {} --", commit.tree);
        let status = Command::new("git")
            .args(["reset", "--patch", commit.tree.as_str(), "--"])
            .env("GIT_INDEX_FILE", &temp_index)
            .current_dir(&self.work_dir)
            .status()
            .map_err(|source| EditorError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            fs::remove_file(&temp_index).ok();
            return Err(EditorError::Failed {
                command,
                status: status.to_string(),
            });
        }

        let tree = git.read_temp_index_tree(&temp_index);
        fs::remove_file(&temp_index).ok();
        Ok(tree?)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod comments {
        use super::*;

        #[test]
        fn instructions_become_comments() {
            let rendered = render_with_comments(b"pick abc first", "Commands:\n\n p, pick");
            assert_eq!(
                rendered,
                b"pick abc first\n\n# Commands:\n#\n#  p, pick\n".to_vec()
            );
        }

        #[test]
        fn comments_and_whitespace_are_stripped() {
            let response = b"\n\npick abc first\n# a comment\npick def second\n\n#\n";
            assert_eq!(
                strip_comments(response),
                b"pick abc first\npick def second\n".to_vec()
            );
        }

        #[test]
        fn indented_hash_is_content() {
            assert_eq!(strip_comments(b" # kept\n"), b"# kept\n".to_vec());
        }

        #[test]
        fn only_comments_is_empty() {
            assert!(strip_comments(b"# nothing\n\n   \n").is_empty());
        }

        #[test]
        fn round_trip_keeps_content() {
            let text = b"title\n\nbody\n";
            let rendered = render_with_comments(text, "Please edit.");
            assert_eq!(strip_comments(&rendered), text.to_vec());
        }
    }
}
