//! engine::step
//!
//! The in-memory todo list: commit-bearing steps carrying ordered
//! commit-less extra steps.
//!
//! # Entry grammar
//!
//! ```text
//! <action> <operand> [<summary>]
//! ```
//!
//! For commit-bearing actions the operand is a commit reference and an
//! optional summary replaces the first line of the step's message. For
//! commit-less actions the operand is kept as raw bytes (a ref name, or
//! free text for comments).

use std::fmt;
use std::sync::LazyLock;

use regex::bytes::Regex;

use super::action::{parse_action, Action, CommitAction, CommitlessAction};
use super::error::TodoError;
use crate::core::types::RefName;
use crate::git::{Commit, Git, GitError};

/// A step that names a commit.
#[derive(Debug, Clone)]
pub struct CommitStep {
    /// What to do with the commit
    pub action: CommitAction,
    /// The commit itself
    pub commit: Commit,
    /// Message to apply, initially the commit's own
    pub message: Vec<u8>,
    /// Commit-less steps applied after this one, in order
    pub extra_steps: Vec<CommitlessStep>,
}

impl CommitStep {
    /// A step using the commit's own message and no extra steps.
    pub fn new(action: CommitAction, commit: Commit) -> Self {
        let message = commit.message.clone();
        Self {
            action,
            commit,
            message,
            extra_steps: Vec::new(),
        }
    }

    /// Extra steps that have an effect (everything but comments).
    pub fn significant_extra_steps(&self) -> impl Iterator<Item = &CommitlessStep> {
        self.extra_steps
            .iter()
            .filter(|step| step.action != CommitlessAction::Comment)
    }

    /// First line of the step's message.
    pub fn summary(&self) -> &[u8] {
        crate::git::summary_of(&self.message)
    }
}

impl PartialEq for CommitStep {
    fn eq(&self, other: &Self) -> bool {
        self.action == other.action
            && self.commit == other.commit
            && self.message == other.message
            && self
                .significant_extra_steps()
                .eq(other.significant_extra_steps())
    }
}

impl Eq for CommitStep {}

/// `<action> <short-id>`
impl fmt::Display for CommitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.commit.short())
    }
}

/// A step without a commit, attached to the preceding commit step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitlessStep {
    /// What to do
    pub action: CommitlessAction,
    /// Raw operand bytes
    pub operand: Vec<u8>,
}

impl CommitlessStep {
    pub fn new(action: CommitlessAction, operand: impl Into<Vec<u8>>) -> Self {
        Self {
            action,
            operand: operand.into(),
        }
    }

    /// `<action> <operand>` as todo-list bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = format!("{} ", self.action).into_bytes();
        bytes.extend_from_slice(&self.operand);
        bytes
    }

    /// The operand as a ref name, for `update-ref` steps.
    pub fn ref_name(&self) -> Result<RefName, TodoError> {
        Ok(RefName::from_bytes(&self.operand)?)
    }
}

/// A parsed todo entry of either family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Commit(CommitStep),
    Commitless(CommitlessStep),
}

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^(?P<action>\S+)\s+(?P<operand>\S+)(?:\s+(?P<summary>.*))?$")
        .expect("todo entry regex")
});

/// The pieces of a todo entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    pub action: &'a [u8],
    pub operand: &'a [u8],
    pub summary: Option<&'a [u8]>,
}

/// Split an entry into action, operand and optional summary.
pub fn split_entry(line: &[u8]) -> Result<Entry<'_>, TodoError> {
    let malformed = || TodoError::MalformedEntry {
        entry: String::from_utf8_lossy(line).into_owned(),
    };

    let captures = ENTRY.captures(line).ok_or_else(malformed)?;

    match (captures.name("action"), captures.name("operand")) {
        (Some(action), Some(operand)) => Ok(Entry {
            action: action.as_bytes(),
            operand: operand.as_bytes(),
            summary: captures.name("summary").map(|m| m.as_bytes()),
        }),
        _ => Err(malformed()),
    }
}

/// Parse one todo entry, resolving commit operands through `resolve`.
pub fn parse_step_with<F>(line: &[u8], resolve: F) -> Result<Step, TodoError>
where
    F: FnOnce(&str) -> Result<Commit, GitError>,
{
    let entry = split_entry(line)?;
    let action = parse_action(&String::from_utf8_lossy(entry.action))?;

    let action = match action {
        Action::Commitless(action) => {
            let step = CommitlessStep::new(action, entry.operand);
            if action == CommitlessAction::UpdateRef {
                step.ref_name()?;
            }
            return Ok(Step::Commitless(step));
        }
        Action::Commit(action) => action,
    };

    let spec = String::from_utf8_lossy(entry.operand).into_owned();
    let commit = resolve(&spec).map_err(|source| TodoError::UnknownCommit { spec, source })?;

    let mut step = CommitStep::new(action, commit);
    if let Some(summary) = entry.summary {
        step.message = step.commit.message_with_edited_summary(summary);
    }
    Ok(Step::Commit(step))
}

/// Parse one todo entry against the object store.
pub fn parse_step(git: &Git, line: &[u8]) -> Result<Step, TodoError> {
    parse_step_with(line, |spec| git.get_commit(spec))
}
