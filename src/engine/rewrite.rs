//! engine::rewrite
//!
//! Interactive single-commit rewrites used by the executor: message
//! refinement (`reword`, `squash`) and splitting (`cut`).

use super::error::TodoError;
use crate::git::{Commit, CommitUpdate, Git};
use crate::ui::editor::Interact;

/// Scratch file name for commit messages.
pub const COMMIT_MESSAGE_FILE: &str = "COMMIT_EDITMSG";

const MESSAGE_INSTRUCTIONS: &str = "\
Please enter the commit message for your changes. Lines starting
with '#' will be ignored, and an empty message aborts the commit.";

/// Let the user edit `commit`'s message; an empty result aborts.
pub fn edit_commit_message(
    git: &Git,
    editor: &dyn Interact,
    commit: &Commit,
) -> Result<Commit, TodoError> {
    let instructions = format!(
        "{MESSAGE_INSTRUCTIONS}\n\nEditing {} ({})",
        commit.short(),
        commit.summary_lossy()
    );
    let message = editor.edit_text(COMMIT_MESSAGE_FILE, &commit.message, &instructions)?;
    if message.trim_ascii().is_empty() {
        return Err(TodoError::Aborted {
            reason: "empty commit message".to_string(),
        });
    }

    Ok(git.update_commit(commit, CommitUpdate::new().message(message))?)
}

/// `[n] <message>`
fn part_message(part: u8, message: &[u8]) -> Vec<u8> {
    let mut prefixed = format!("[{part}] ").into_bytes();
    prefixed.extend_from_slice(message);
    prefixed
}

/// Split `commit` in two with the user's help and return the second half.
///
/// The first half goes from the parent's tree to the selected tree, the
/// second from there to `commit`'s own tree. Both messages are edited.
pub fn cut_commit(git: &Git, editor: &dyn Interact, commit: &Commit) -> Result<Commit, TodoError> {
    let parent_tree = match commit.parents.first() {
        Some(parent) => git.find_commit(parent)?.tree,
        None => git.empty_tree()?,
    };

    let mid = editor.select_cut(git, commit, &parent_tree)?;
    if mid == parent_tree {
        return Err(TodoError::EmptyCut { part: 1 });
    }
    if mid == commit.tree {
        return Err(TodoError::EmptyCut { part: 2 });
    }

    let first = git.update_commit(
        commit,
        CommitUpdate::new()
            .tree(mid)
            .message(part_message(1, &commit.message)),
    )?;
    let first = edit_commit_message(git, editor, &first)?;

    let second = git.update_commit(
        commit,
        CommitUpdate::new()
            .parents(vec![first.oid.clone()])
            .message(part_message(2, &commit.message)),
    )?;
    edit_commit_message(git, editor, &second)
}
