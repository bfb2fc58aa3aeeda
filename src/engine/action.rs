//! engine::action
//!
//! The closed action vocabulary of todo lists.
//!
//! Two families exist: commit-bearing actions ([`CommitAction`]) that name
//! a commit, and commit-less actions ([`CommitlessAction`]) that ride along
//! with the preceding commit-bearing step.
//!
//! # Abbreviations
//!
//! [`parse_action`] accepts any prefix of a canonical name. Ambiguous
//! prefixes resolve to the first match in declaration order: every
//! commit-bearing action in [`CommitAction::ALL`] order, then every
//! commit-less action in [`CommitlessAction::ALL`] order. So `"s"` is
//! `squash`, `"c"` is `cut` and `"u"` is `update-ref`.

use std::fmt;

use super::error::TodoError;

/// Actions that operate on a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitAction {
    /// Use the commit
    Pick,
    /// Meld into the previous commit, keeping the previous message
    Fixup,
    /// Meld into the previous commit, editing the combined message
    Squash,
    /// Use the commit, editing its message
    Reword,
    /// Split the commit in two
    Cut,
    /// Leave the changes staged but uncommitted
    Index,
}

impl CommitAction {
    /// Declaration order; also the abbreviation tie-break order.
    pub const ALL: [CommitAction; 6] = [
        CommitAction::Pick,
        CommitAction::Fixup,
        CommitAction::Squash,
        CommitAction::Reword,
        CommitAction::Cut,
        CommitAction::Index,
    ];

    /// Canonical todo-list token.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitAction::Pick => "pick",
            CommitAction::Fixup => "fixup",
            CommitAction::Squash => "squash",
            CommitAction::Reword => "reword",
            CommitAction::Cut => "cut",
            CommitAction::Index => "index",
        }
    }
}

impl fmt::Display for CommitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions attached to a commit-bearing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitlessAction {
    /// Inert annotation
    Comment,
    /// Point a branch at the result of the enclosing step
    UpdateRef,
}

impl CommitlessAction {
    /// Declaration order; also the abbreviation tie-break order.
    pub const ALL: [CommitlessAction; 2] = [CommitlessAction::Comment, CommitlessAction::UpdateRef];

    /// Canonical todo-list token.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitlessAction::Comment => "#",
            CommitlessAction::UpdateRef => "update-ref",
        }
    }
}

impl fmt::Display for CommitlessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any action, from either family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Commit(CommitAction),
    Commitless(CommitlessAction),
}

impl Action {
    /// Canonical todo-list token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Commit(action) => action.as_str(),
            Action::Commitless(action) => action.as_str(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every action in declaration order.
fn declared() -> impl Iterator<Item = Action> {
    CommitAction::ALL
        .into_iter()
        .map(Action::Commit)
        .chain(CommitlessAction::ALL.into_iter().map(Action::Commitless))
}

/// Resolve a (possibly abbreviated) action token.
///
/// # Errors
///
/// Returns [`TodoError::UnknownAction`] if no canonical name starts with `text`.
///
/// # Example
///
/// ```
/// use revise::engine::action::{parse_action, Action, CommitAction, CommitlessAction};
///
/// assert_eq!(parse_action("f").unwrap(), Action::Commit(CommitAction::Fixup));
/// assert_eq!(parse_action("#").unwrap(), Action::Commitless(CommitlessAction::Comment));
/// assert!(parse_action("x").is_err());
/// ```
pub fn parse_action(text: &str) -> Result<Action, TodoError> {
    declared()
        .find(|action| action.as_str().starts_with(text))
        .ok_or_else(|| TodoError::UnknownAction {
            token: text.to_string(),
        })
}
