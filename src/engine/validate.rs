//! engine::validate
//!
//! Integrity checks on an edited todo list.
//!
//! # Rules
//!
//! Checked in this order against the original list:
//!
//! 1. no commit appears twice;
//! 2. no commit appears that wasn't in the original list;
//! 3. dropped commits only form "bubbles": runs of dropped commits whose
//!    net effect on the tree is nothing (see [`check_drops`]);
//! 4. `index` steps only appear as a trailing run.
//!
//! Violations are reported, never repaired.

use std::collections::HashSet;

use super::action::CommitAction;
use super::error::TodoError;
use super::step::CommitStep;
use crate::core::types::Oid;
use crate::git::{Commit, Git};

/// Check `edited` against `original`, reading parent trees from the store.
pub fn validate_todos(
    git: &Git,
    original: &[CommitStep],
    edited: &[CommitStep],
) -> Result<(), TodoError> {
    validate_todos_with(original, edited, |parent| Ok(git.find_commit(parent)?.tree))
}

/// Check `edited` against `original`; `parent_tree` maps a parent commit
/// id to that commit's tree.
pub fn validate_todos_with<F>(
    original: &[CommitStep],
    edited: &[CommitStep],
    parent_tree: F,
) -> Result<(), TodoError>
where
    F: FnMut(&Oid) -> Result<Oid, TodoError>,
{
    let mut seen = HashSet::new();
    for step in edited {
        if !seen.insert(&step.commit.oid) {
            return Err(TodoError::DuplicateCommit {
                oid: step.commit.oid.clone(),
            });
        }
    }

    let known: HashSet<&Oid> = original.iter().map(|step| &step.commit.oid).collect();
    if let Some(step) = edited.iter().find(|step| !known.contains(&step.commit.oid)) {
        return Err(TodoError::ForeignCommit {
            oid: step.commit.oid.clone(),
        });
    }

    let dropped: Vec<&Commit> = original
        .iter()
        .filter(|step| !seen.contains(&step.commit.oid))
        .map(|step| &step.commit)
        .collect();
    check_drops(&dropped, parent_tree)?;

    check_index_tail(edited)
}

/// Accept `dropped` (in original order) only if it splits into bubbles.
///
/// Starting from the first dropped commit, find the first dropped commit
/// whose tree equals the starting commit's parent tree; everything up to
/// and including it cancels out and is discarded. Repeat on the rest.
/// Whatever cannot be discarded is a real loss of content.
pub fn check_drops<F>(dropped: &[&Commit], mut parent_tree: F) -> Result<(), TodoError>
where
    F: FnMut(&Oid) -> Result<Oid, TodoError>,
{
    let mut remaining = dropped;
    while let Some(head) = remaining.first() {
        let [parent] = head.parents.as_slice() else {
            break;
        };
        let base = parent_tree(parent)?;
        match remaining.iter().position(|commit| commit.tree == base) {
            Some(end) => remaining = &remaining[end + 1..],
            None => break,
        }
    }

    match remaining.first() {
        Some(commit) => Err(TodoError::NonemptyDrop {
            oid: commit.oid.clone(),
        }),
        None => Ok(()),
    }
}

/// Reject any non-index step after an index step.
pub fn check_index_tail(steps: &[CommitStep]) -> Result<(), TodoError> {
    let mut saw_index = false;
    for step in steps {
        if step.action == CommitAction::Index {
            saw_index = true;
        } else if saw_index {
            return Err(TodoError::IndexNotLast {
                action: step.action.to_string(),
                oid: step.commit.oid.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::step::fixtures::commit;

    /// A -> B -> C -> D with trees 10, 11, 10, 12 (B and C cancel out).
    fn history() -> Vec<Commit> {
        vec![
            commit(1, 10, Some(0), "A\n"),
            commit(2, 11, Some(1), "B\n"),
            commit(3, 10, Some(2), "C\n"),
            commit(4, 12, Some(3), "D\n"),
        ]
    }

    fn picks(commits: &[Commit]) -> Vec<CommitStep> {
        commits
            .iter()
            .map(|c| CommitStep::new(CommitAction::Pick, c.clone()))
            .collect()
    }

    fn trees(commits: Vec<Commit>) -> impl FnMut(&Oid) -> Result<Oid, TodoError> {
        move |parent| {
            Ok(commits
                .iter()
                .find(|c| &c.oid == parent)
                .map(|c| c.tree.clone())
                .unwrap_or_else(|| Oid::new("00".repeat(20)).unwrap()))
        }
    }

    fn validate(original: &[Commit], edited: &[Commit]) -> Result<(), TodoError> {
        validate_todos_with(&picks(original), &picks(edited), trees(history()))
    }

    #[test]
    fn unchanged_is_valid() {
        let h = history();
        assert!(validate(&h, &h).is_ok());
    }

    #[test]
    fn reorder_is_valid() {
        let h = history();
        let edited = vec![h[1].clone(), h[0].clone(), h[3].clone(), h[2].clone()];
        assert!(validate(&h, &edited).is_ok());
    }

    #[test]
    fn duplicate_rejected() {
        let h = history();
        let edited = vec![h[0].clone(), h[1].clone(), h[1].clone(), h[2].clone(), h[3].clone()];
        assert!(matches!(
            validate(&h, &edited),
            Err(TodoError::DuplicateCommit { oid }) if oid == h[1].oid
        ));
    }

    #[test]
    fn foreign_rejected() {
        let h = history();
        let stranger = commit(9, 90, Some(4), "stranger\n");
        let mut edited = h.clone();
        edited.push(stranger.clone());
        assert!(matches!(
            validate(&h, &edited),
            Err(TodoError::ForeignCommit { oid }) if oid == stranger.oid
        ));
    }

    mod bubbles {
        use super::*;

        #[test]
        fn dropping_cancelling_pair_accepted() {
            let h = history();
            let edited = vec![h[0].clone(), h[3].clone()];
            assert!(validate(&h, &edited).is_ok());
        }

        #[test]
        fn dropping_half_a_bubble_rejected() {
            let h = history();
            let edited = vec![h[0].clone(), h[2].clone(), h[3].clone()];
            assert!(matches!(
                validate(&h, &edited),
                Err(TodoError::NonemptyDrop { oid }) if oid == h[1].oid
            ));
        }

        #[test]
        fn dropping_real_change_rejected() {
            let h = history();
            let edited = vec![h[0].clone(), h[1].clone(), h[2].clone()];
            assert!(matches!(
                validate(&h, &edited),
                Err(TodoError::NonemptyDrop { oid }) if oid == h[3].oid
            ));
        }

        #[test]
        fn empty_commit_drop_accepted() {
            let base = commit(1, 10, Some(0), "base\n");
            let empty = commit(2, 10, Some(1), "empty\n");
            let commits = vec![base.clone(), empty.clone()];

            let result = validate_todos_with(
                &picks(&commits),
                &picks(&[base]),
                trees(commits.clone()),
            );
            assert!(result.is_ok());
        }

        #[test]
        fn root_commit_drop_rejected() {
            let root = commit(1, 10, None, "root\n");
            assert!(matches!(
                check_drops(&[&root], |_| unreachable!()),
                Err(TodoError::NonemptyDrop { .. })
            ));
        }

        #[test]
        fn nothing_dropped() {
            assert!(check_drops(&[], |_| unreachable!()).is_ok());
        }
    }

    mod index_tail {
        use super::*;

        #[test]
        fn trailing_index_ok() {
            let h = history();
            let mut steps = picks(&h);
            steps[3].action = CommitAction::Index;
            assert!(check_index_tail(&steps).is_ok());

            steps[2].action = CommitAction::Index;
            assert!(check_index_tail(&steps).is_ok());
        }

        #[test]
        fn index_before_pick_rejected() {
            let h = history();
            let mut steps = picks(&h);
            steps[1].action = CommitAction::Index;
            assert!(matches!(
                check_index_tail(&steps),
                Err(TodoError::IndexNotLast { oid, .. }) if oid == h[2].oid
            ));
        }
    }
}
