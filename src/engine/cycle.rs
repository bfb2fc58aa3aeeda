//! engine::cycle
//!
//! One complete revise: select the range, build the plan, let the user
//! (or the autosquash matcher) transform it, validate, apply, and finally
//! move HEAD.
//!
//! # Modes
//!
//! - [`ReviseMode::Interactive`]: every commit after the base goes into a
//!   todo list the user edits.
//! - [`ReviseMode::Autosquash`]: the same list is regrouped by the
//!   autosquash matcher and applied without an editor.
//! - [`ReviseMode::Target`]: staged changes are folded into one commit
//!   (and its message optionally edited); everything after it is rebased.
//!
//! # Staged changes
//!
//! Unless disabled, a difference between the index and HEAD becomes a
//! synthetic `<git index>` commit on top of HEAD, appended to the plan as
//! an `index` step. If that step is still an `index` step after editing,
//! its changes stay staged on top of the new tip.
//!
//! # Invariants
//!
//! - Nothing is written to a ref before the plan has been fully applied,
//!   except the branches named by `update-ref` steps
//! - HEAD moves with CAS against the value read at the start
//! - The working tree is never touched

use super::action::CommitAction;
use super::autosquash::autosquash_todos;
use super::error::TodoError;
use super::exec::Executor;
use super::plan::build_todos;
use super::present::{edit_todos, EditMode};
use super::step::CommitStep;
use super::validate::validate_todos;
use crate::core::config::GitSettings;
use crate::core::types::Oid;
use crate::git::{Commit, Git, GitError};
use crate::ui::editor::Interact;
use crate::ui::output::{self, Verbosity};

/// Message of the synthetic commit holding staged changes.
pub const INDEX_MESSAGE: &[u8] = b"<git index>";

/// Reflog message for the final HEAD update.
const REWRITE_MESSAGE: &str = "git-revise rewrite";

/// How the plan is transformed before it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviseMode {
    /// Edit the commits after `base` (exclusive; `None` means every
    /// commit reachable from HEAD).
    Interactive {
        base: Option<String>,
        edit_mode: EditMode,
        autosquash: bool,
    },
    /// Regroup the commits after `base` with the autosquash matcher.
    Autosquash { base: Option<String> },
    /// Fold staged changes into `target`, optionally editing its message.
    Target { target: String, edit: bool },
}

/// A fully resolved revise invocation.
#[derive(Debug, Clone)]
pub struct ReviseRequest {
    /// What to do
    pub mode: ReviseMode,
    /// Reset authorship of every rewritten commit
    pub reauthor: bool,
    /// Turn staged changes into an index step
    pub use_index: bool,
    /// Show todo lists newest first
    pub head_on_top: bool,
    /// Output verbosity
    pub verbosity: Verbosity,
}

/// What a finished cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviseOutcome {
    /// HEAD moved from `old` to `new`.
    Rewritten { old: Oid, new: Oid },
    /// The result was identical to HEAD; nothing was written.
    Unchanged,
}

/// Read the revise-related git config keys.
///
/// `revise.autoSquash` wins over `rebase.autoSquash`.
pub fn load_git_settings(git: &Git) -> Result<GitSettings, GitError> {
    let autosquash = match git.bool_config("revise.autoSquash")? {
        Some(value) => Some(value),
        None => git.bool_config("rebase.autoSquash")?,
    };

    Ok(GitSettings {
        autosquash,
        reauthor: git.bool_config("revise.reauthor")?,
        head_on_top: git.bool_config("sequence.presentation-order-head-on-top")?,
    })
}

/// Move the index steps right after `target` as fixups, and turn
/// `target` into a reword when `edit` is set.
pub fn retarget_todos(todos: Vec<CommitStep>, target: &Oid, edit: bool) -> Vec<CommitStep> {
    let (staged, mut steps): (Vec<_>, Vec<_>) = todos
        .into_iter()
        .partition(|step| step.action == CommitAction::Index);

    let Some(position) = steps.iter().position(|step| step.commit.oid == *target) else {
        return steps;
    };
    if edit {
        steps[position].action = CommitAction::Reword;
    }

    let fixups = staged.into_iter().map(|mut step| {
        step.action = CommitAction::Fixup;
        step
    });
    steps.splice(position + 1..position + 1, fixups);
    steps
}

/// Commits after `base` (exclusive) up to `head`, oldest first.
fn range_after(git: &Git, base: Option<&Commit>, head: &Commit) -> Result<Vec<Commit>, TodoError> {
    let commits = git.first_parent_range(base.map(|b| &b.oid), &head.oid)?;

    if let Some(base) = base {
        let connected = match commits.first() {
            Some(first) => first.parents.first() == Some(&base.oid),
            None => base.oid == head.oid,
        };
        if !connected {
            return Err(TodoError::NotAncestor {
                oid: base.oid.clone(),
            });
        }
    }
    Ok(commits)
}

/// Staged changes as a commit on top of `head`, if there are any.
fn index_commit(git: &Git, head: &Commit, staged_tree: &Oid) -> Result<Option<Commit>, GitError> {
    if *staged_tree == head.tree {
        return Ok(None);
    }
    git.new_commit(
        staged_tree,
        std::slice::from_ref(&head.oid),
        INDEX_MESSAGE,
        &git.default_author()?,
        &git.default_committer()?,
    )
    .map(Some)
}

/// Run one revise cycle.
///
/// # Errors
///
/// - [`TodoError::Git`] with [`GitError::OperationInProgress`] if a
///   rebase, merge or similar is underway
/// - [`TodoError::NotAncestor`] if the base or target is not on HEAD's
///   first-parent history
/// - anything the editor round-trip, validation or execution reports
pub fn run_cycle(
    git: &Git,
    editor: &dyn Interact,
    request: &ReviseRequest,
) -> Result<ReviseOutcome, TodoError> {
    let state = git.state();
    if state.is_in_progress() {
        return Err(GitError::OperationInProgress { operation: state }.into());
    }

    let verbosity = request.verbosity;
    let head = git.head_commit()?;

    let expected_tree = if request.use_index {
        git.index_tree()?
    } else {
        head.tree.clone()
    };
    let index = if request.use_index {
        index_commit(git, &head, &expected_tree)?
    } else {
        None
    };
    if let Some(index) = &index {
        output::debug(format!("staged changes as {}", index.short()), verbosity);
    }

    let (base, commits) = match &request.mode {
        ReviseMode::Interactive { base, .. } | ReviseMode::Autosquash { base } => {
            let base = base.as_deref().map(|spec| git.get_commit(spec)).transpose()?;
            let commits = range_after(git, base.as_ref(), &head)?;
            (base, commits)
        }
        ReviseMode::Target { target, .. } => {
            let target = git.get_commit(target)?;
            let base = target
                .parents
                .first()
                .map(|parent| git.find_commit(parent))
                .transpose()?;
            let commits = range_after(git, base.as_ref(), &head)?;
            if commits.first() != Some(&target) {
                return Err(TodoError::NotAncestor { oid: target.oid });
            }
            (base, commits)
        }
    };
    output::debug(
        format!(
            "revising {} commit(s) on top of {}",
            commits.len(),
            base.as_ref().map_or("the root", |b| b.short())
        ),
        verbosity,
    );

    let original = build_todos(git, &commits, index.as_ref())?;
    let edited = match &request.mode {
        ReviseMode::Interactive {
            edit_mode,
            autosquash,
            ..
        } => {
            let todos = if *autosquash {
                autosquash_todos(git, original.clone())
            } else {
                original.clone()
            };
            edit_todos(git, editor, &todos, *edit_mode, request.head_on_top)?
        }
        ReviseMode::Autosquash { .. } => {
            let todos = autosquash_todos(git, original.clone());
            validate_todos(git, &original, &todos)?;
            todos
        }
        ReviseMode::Target { edit, .. } => {
            let target = commits.first().map(|c| c.oid.clone());
            match target {
                Some(target) => retarget_todos(original.clone(), &target, *edit),
                None => original.clone(),
            }
        }
    };

    let mut executor = Executor::new(git, editor).verbosity(verbosity);
    if request.reauthor {
        executor = executor.reauthor(git.default_author()?);
    }
    let new_tip = executor.apply(base, &original, &edited)?;

    let mut staged_tip = new_tip.clone();
    for step in edited.iter().filter(|s| s.action == CommitAction::Index) {
        staged_tip = git.rebase(&step.commit, Some(&staged_tip), None)?;
    }
    let final_tree = staged_tip.tree;

    if new_tip.oid == head.oid {
        output::warn("no changes performed", verbosity);
        return Ok(ReviseOutcome::Unchanged);
    }

    let head_name = git
        .head_ref()?
        .map_or_else(|| "HEAD".to_string(), |name| name.to_string());
    output::print(
        format!("Updating {} ({} => {})", head_name, head.oid, new_tip.oid),
        verbosity,
    );
    git.move_head(&new_tip.oid, &head.oid, REWRITE_MESSAGE)?;

    if request.use_index {
        git.write_index_tree(&final_tree)?;
    }
    if final_tree != expected_tree {
        output::warn(
            format!(
                "unexpected final tree\n\
                 (note) expected: {expected_tree}\n\
                 (note) actual: {final_tree}\n\
                 (note) the working tree has not been updated; use `git status` to see what changed"
            ),
            verbosity,
        );
    }

    Ok(ReviseOutcome::Rewritten {
        old: head.oid,
        new: new_tip.oid,
    })
}
