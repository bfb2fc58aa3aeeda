//! engine::autosquash
//!
//! Regroups `fixup!`/`squash!` commits next to the commits they target.
//!
//! # Matching
//!
//! Repeated `fixup! `/`squash! ` markers are stripped from a commit's
//! summary to get the *needle*. A marked step is folded, as `fixup` or
//! `squash` according to its outermost marker, into the first of:
//!
//! 1. the first group whose lead commit's summary starts with the needle;
//! 2. the group containing the commit the needle resolves to, when the
//!    needle is a commit reference (lookup failures count as no match);
//!
//! and otherwise starts a group of its own, keeping its original action.
//! Groups are emitted in the order their leads were first seen.
//!
//! A folded step is a fresh step: it carries none of the original step's
//! extra steps.

use super::action::CommitAction;
use super::step::CommitStep;
use crate::core::types::Oid;
use crate::git::Git;

const FIXUP: &[u8] = b"fixup! ";
const SQUASH: &[u8] = b"squash! ";

/// Strip every leading `fixup! `/`squash! ` marker from a summary.
pub fn strip_markers(summary: &[u8]) -> &[u8] {
    let mut needle = summary;
    while let Some(rest) = needle
        .strip_prefix(FIXUP)
        .or_else(|| needle.strip_prefix(SQUASH))
    {
        needle = rest.trim_ascii_start();
    }
    needle
}

/// Reorder `todos` so marked commits follow their targets, looking up
/// needles that might be commit references through `resolve`.
pub fn autosquash_todos_with<F>(todos: Vec<CommitStep>, mut resolve: F) -> Vec<CommitStep>
where
    F: FnMut(&str) -> Option<Oid>,
{
    let mut groups: Vec<Vec<CommitStep>> = Vec::new();

    for step in todos {
        let summary = step.commit.summary();
        let needle = strip_markers(summary);

        if needle.len() != summary.len() && !needle.is_empty() {
            let action = if summary.starts_with(b"fixup!") {
                CommitAction::Fixup
            } else {
                CommitAction::Squash
            };

            let by_summary = groups
                .iter()
                .position(|group| group[0].commit.summary().starts_with(needle));
            let target = match by_summary {
                Some(found) => Some(found),
                None => std::str::from_utf8(needle)
                    .ok()
                    .and_then(&mut resolve)
                    .and_then(|oid| {
                        groups
                            .iter()
                            .position(|group| group.iter().any(|s| s.commit.oid == oid))
                    }),
            };

            if let Some(found) = target {
                let folded = CommitStep::new(action, step.commit.clone());
                groups[found].push(folded);
                continue;
            }
        }

        groups.push(vec![step]);
    }

    groups.into_iter().flatten().collect()
}

/// Reorder `todos` so marked commits follow their targets.
///
/// Needles are resolved against the object store; lookup errors are
/// treated as "no match".
pub fn autosquash_todos(git: &Git, todos: Vec<CommitStep>) -> Vec<CommitStep> {
    autosquash_todos_with(todos, |needle| {
        git.get_commit(needle).ok().map(|commit| commit.oid)
    })
}
