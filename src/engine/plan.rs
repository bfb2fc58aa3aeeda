//! engine::plan
//!
//! Initial todo list generation.
//!
//! # Architecture
//!
//! The initial plan is one `pick` per commit in range (oldest first), plus
//! a trailing `index` step when there are staged changes. Each step is then
//! annotated with the branches and tags pointing at its commit:
//!
//! - a branch that is not checked out in any worktree gets an actionable
//!   `update-ref` extra step, so it follows the commit to its new id;
//! - everything else (tags, checked-out branches) gets an inert `#`
//!   comment. Moving a checked-out branch would leave that worktree with
//!   a stale index and working tree.
//!
//! # Invariants
//!
//! - Step order equals input order
//! - Annotation order per commit equals ref enumeration order
//! - Building a plan never mutates the repository

use std::collections::{HashMap, HashSet};

use super::action::{CommitAction, CommitlessAction};
use super::error::TodoError;
use super::step::{CommitStep, CommitlessStep};
use crate::core::types::{Oid, RefName};
use crate::git::{Commit, Git, RefEntry};

/// Build the initial todo list for `commits` (oldest first) and an
/// optional index commit, annotated with the repository's refs.
pub fn build_todos(
    git: &Git,
    commits: &[Commit],
    index: Option<&Commit>,
) -> Result<Vec<CommitStep>, TodoError> {
    let refs = git.list_refs()?;
    let checked_out = git.checked_out_branches()?;
    Ok(build_todos_with(commits, index, &refs, &checked_out))
}

/// Build the initial todo list from an explicit ref snapshot.
pub fn build_todos_with(
    commits: &[Commit],
    index: Option<&Commit>,
    refs: &[RefEntry],
    checked_out: &HashSet<RefName>,
) -> Vec<CommitStep> {
    let mut steps: Vec<CommitStep> = commits
        .iter()
        .map(|commit| CommitStep::new(CommitAction::Pick, commit.clone()))
        .collect();
    if let Some(index) = index {
        steps.push(CommitStep::new(CommitAction::Index, index.clone()));
    }

    let mut refs_by_commit: HashMap<&Oid, Vec<&RefName>> = HashMap::new();
    for entry in refs {
        refs_by_commit.entry(&entry.oid).or_default().push(&entry.name);
    }

    for step in &mut steps {
        let Some(names) = refs_by_commit.get(&step.commit.oid) else {
            continue;
        };
        for name in names {
            let action = if name.is_branch_ref() && !checked_out.contains(*name) {
                CommitlessAction::UpdateRef
            } else {
                CommitlessAction::Comment
            };
            step.extra_steps
                .push(CommitlessStep::new(action, name.as_bytes().to_vec()));
        }
    }

    steps
}
