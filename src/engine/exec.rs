//! engine::exec
//!
//! Replays a validated todo list on top of a base commit.
//!
//! # Architecture
//!
//! The executor walks the original and edited lists side by side. For
//! each pair it rebases the edited step's commit onto the running tip
//! (`current`) and then applies the step's action:
//!
//! | action   | new tip                                                 |
//! |----------|---------------------------------------------------------|
//! | `pick`   | the rebased commit                                      |
//! | `fixup`  | `current` with the rebased tree                         |
//! | `reword` | the rebased commit, message edited                      |
//! | `squash` | `current` with the rebased tree, both messages, edited  |
//! | `cut`    | second half of the rebased commit after splitting it    |
//! | `index`  | unchanged; processing stops                             |
//!
//! Then authorship is reset (when asked to) and the step's `update-ref`
//! extra steps move their branches to the new tip.
//!
//! # Déjà vu
//!
//! While the set of commits seen so far in the edited list equals the set
//! seen in the original list, the tree at this point of the history is
//! already known: it is the tree of the original commit. The rebase then
//! reuses that tree instead of merging again, so conflicts the user
//! resolved when the history was first written are not raised again.
//! The first step where the sets differ switches this off for the rest of
//! the list, even if the sets later coincide again.
//!
//! # Invariants
//!
//! - Steps are applied strictly in order
//! - The only refs touched are those named by `update-ref` steps
//! - HEAD is never moved here; the caller decides what to do with the result

use std::collections::HashSet;

use super::action::{CommitAction, CommitlessAction};
use super::error::TodoError;
use super::rewrite::{cut_commit, edit_commit_message};
use super::step::{CommitStep, CommitlessStep};
use crate::core::types::{Oid, Signature};
use crate::git::{Commit, CommitUpdate, Git};
use crate::ui::editor::Interact;
use crate::ui::output::{self, Verbosity};

/// Reflog message for refs moved by `update-ref` steps.
const UPDATE_REF_MESSAGE: &str = "git-revise: update-ref";

/// Tracks the commits seen so far in both lists.
///
/// NOTE: once the two sets differ the flag latches. A reorder that later
/// covers the same commits again (`a b` vs `b a`) keeps merging; comparing
/// the sets afresh at each step would reuse the original trees from there on.
#[derive(Debug, Default)]
struct Touched {
    original: HashSet<Oid>,
    edited: HashSet<Oid>,
    diverged: bool,
}

impl Touched {
    /// Record one pair; true while both lists have covered the same
    /// commits at every step so far.
    fn record(&mut self, original: &Oid, edited: &Oid) -> bool {
        self.original.insert(original.clone());
        self.edited.insert(edited.clone());
        if self.original != self.edited {
            self.diverged = true;
        }
        !self.diverged
    }
}

/// Applies todo lists.
pub struct Executor<'a> {
    git: &'a Git,
    editor: &'a dyn Interact,
    reauthor: Option<Signature>,
    verbosity: Verbosity,
}

impl<'a> Executor<'a> {
    /// Create an executor that asks `editor` whenever a step needs input.
    pub fn new(git: &'a Git, editor: &'a dyn Interact) -> Self {
        Self {
            git,
            editor,
            reauthor: None,
            verbosity: Verbosity::Normal,
        }
    }

    /// Reset the author of every produced commit to `author`.
    pub fn reauthor(mut self, author: Signature) -> Self {
        self.reauthor = Some(author);
        self
    }

    /// Set the output verbosity for progress lines.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Apply `edited` on top of `current` and return the new tip.
    ///
    /// `original` is the list `edited` was derived from; both are walked
    /// pairwise. `current == None` means the history is rebuilt from
    /// nothing (a `--root` revise).
    ///
    /// # Errors
    ///
    /// - [`TodoError::NoCurrentCommit`] for a `fixup`/`squash` with nothing
    ///   to fold into
    /// - [`TodoError::NoCommits`] if no commit was produced at all
    /// - [`TodoError::Aborted`] if the user empties a message
    /// - [`TodoError::Git`] for rebase conflicts and store failures
    pub fn apply(
        &self,
        mut current: Option<Commit>,
        original: &[CommitStep],
        edited: &[CommitStep],
    ) -> Result<Commit, TodoError> {
        let mut touched = Touched::default();

        for (known, step) in original.iter().zip(edited) {
            let tree_to_keep = if touched.record(&known.commit.oid, &step.commit.oid) {
                Some(&known.commit.tree)
            } else {
                None
            };
            output::debug(
                format!(
                    "{} (tree {})",
                    step,
                    tree_to_keep.map_or("merged", |tree| tree.short())
                ),
                self.verbosity,
            );

            let rebased = self
                .git
                .rebase(&step.commit, current.as_ref(), tree_to_keep)?;
            let rebased = self
                .git
                .update_commit(&rebased, CommitUpdate::new().message(step.message.clone()))?;

            // Exhaustive over the closed action set: no unknown tag reaches here.
            let mut next = match step.action {
                CommitAction::Pick => rebased,
                CommitAction::Fixup => {
                    let base = self.require_current(current.as_ref(), step.action)?;
                    self.git
                        .update_commit(base, CommitUpdate::new().tree(rebased.tree))?
                }
                CommitAction::Reword => edit_commit_message(self.git, self.editor, &rebased)?,
                CommitAction::Squash => {
                    let base = self.require_current(current.as_ref(), step.action)?;
                    let mut fused = base.message.clone();
                    fused.extend_from_slice(b"\n\n");
                    fused.extend_from_slice(&rebased.message);
                    let squashed = self.git.update_commit(
                        base,
                        CommitUpdate::new().tree(rebased.tree).message(fused),
                    )?;
                    edit_commit_message(self.git, self.editor, &squashed)?
                }
                CommitAction::Cut => cut_commit(self.git, self.editor, &rebased)?,
                CommitAction::Index => break,
            };

            if let Some(author) = &self.reauthor {
                next = self
                    .git
                    .update_commit(&next, CommitUpdate::new().author(author.clone()))?;
            }

            for extra in step.significant_extra_steps() {
                self.apply_extra_step(extra, &next)?;
            }

            output::print(
                output::format_progress(step.action.as_str(), next.short(), &next.summary_lossy()),
                self.verbosity,
            );
            current = Some(next);
        }

        current.ok_or(TodoError::NoCommits)
    }

    fn require_current<'c>(
        &self,
        current: Option<&'c Commit>,
        action: CommitAction,
    ) -> Result<&'c Commit, TodoError> {
        current.ok_or_else(|| TodoError::NoCurrentCommit {
            action: action.to_string(),
        })
    }

    fn apply_extra_step(&self, extra: &CommitlessStep, tip: &Commit) -> Result<(), TodoError> {
        match extra.action {
            CommitlessAction::UpdateRef => {
                let name = extra.ref_name()?;
                let old = self.git.try_resolve_ref(name.as_str())?;
                self.git
                    .update_ref_cas(name.as_str(), &tip.oid, old.as_ref(), UPDATE_REF_MESSAGE)?;
                output::debug(format!("{name} -> {}", tip.short()), self.verbosity);
                Ok(())
            }
            CommitlessAction::Comment => Ok(()),
        }
    }
}
