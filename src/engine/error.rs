//! engine::error
//!
//! Errors raised while building, editing, validating or applying a todo list.
//!
//! Every error aborts the whole revise cycle; none is retried or repaired.
//! [`TodoError::category`] groups the variants into the coarse classes the
//! CLI reports on.

use thiserror::Error;

use crate::core::types::{Oid, TypeError};
use crate::git::GitError;
use crate::ui::editor::EditorError;

/// Coarse classification of a [`TodoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed todo entry or unknown action
    Parse,
    /// Operand does not name a known commit
    Reference,
    /// Edited todo list breaks an integrity rule
    Validation,
    /// Action cannot be applied at this point of the sequence
    Sequencing,
    /// Editor or object store failure
    ExternalProcess,
    /// The user asked to stop
    Aborted,
}

/// Errors from the todo-list engine.
#[derive(Debug, Error)]
pub enum TodoError {
    #[error("todo entry '{entry}' must follow format <action> <operand> <optional summary>")]
    MalformedEntry { entry: String },

    #[error(
        "unrecognized action '{token}'. Expected one of pick, fixup, squash, reword, cut, index, update-ref or #"
    )]
    UnknownAction { token: String },

    #[error("invalid ref name in todo list: {0}")]
    InvalidRefName(#[from] TypeError),

    #[error("unknown commit '{spec}': {source}")]
    UnknownCommit { spec: String, source: GitError },

    #[error("{oid} is not an ancestor of HEAD")]
    NotAncestor { oid: Oid },

    #[error("unexpected duplicate commit {oid} found in todos")]
    DuplicateCommit { oid: Oid },

    #[error("unexpected commit {oid} not referenced in original todo list")]
    ForeignCommit { oid: Oid },

    #[error("can't drop nonempty commit {oid}")]
    NonemptyDrop { oid: Oid },

    #[error("'index' actions must follow all non-index todo items (found {action} {oid} after an index step)")]
    IndexNotLast { action: String, oid: Oid },

    #[error("cannot attach '{entry}' to nonexistent base")]
    OrphanExtraStep { entry: String },

    #[error("cut part [{part}] is empty")]
    EmptyCut { part: u8 },

    #[error("cannot apply {action} as first commit")]
    NoCurrentCommit { action: String },

    #[error("no commits introduced on top of root commit")]
    NoCommits,

    #[error("editor failed: {0}")]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("nothing to do: {reason}")]
    Aborted { reason: String },
}

impl TodoError {
    /// The coarse category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            TodoError::MalformedEntry { .. }
            | TodoError::UnknownAction { .. }
            | TodoError::InvalidRefName(_) => ErrorCategory::Parse,
            TodoError::UnknownCommit { .. } | TodoError::NotAncestor { .. } => {
                ErrorCategory::Reference
            }
            TodoError::Git(GitError::CommitNotFound { .. } | GitError::AmbiguousRef { .. }) => {
                ErrorCategory::Reference
            }
            TodoError::DuplicateCommit { .. }
            | TodoError::ForeignCommit { .. }
            | TodoError::NonemptyDrop { .. }
            | TodoError::IndexNotLast { .. }
            | TodoError::OrphanExtraStep { .. }
            | TodoError::EmptyCut { .. } => ErrorCategory::Validation,
            TodoError::NoCurrentCommit { .. } | TodoError::NoCommits => {
                ErrorCategory::Sequencing
            }
            TodoError::Editor(_) | TodoError::Git(_) => ErrorCategory::ExternalProcess,
            TodoError::Aborted { .. } => ErrorCategory::Aborted,
        }
    }

    /// Check if this error is the user's "nothing to do" signal.
    pub fn is_aborted(&self) -> bool {
        self.category() == ErrorCategory::Aborted
    }
}
