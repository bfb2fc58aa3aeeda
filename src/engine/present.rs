//! engine::present
//!
//! Text projections of a todo list and their inverse parsers.
//!
//! # Modes
//!
//! - [`EditMode::LineWise`]: one line per entry. Commit steps render as
//!   `<action> <short-id> <summary>`, extra steps as `<action> <operand>`.
//!   Only actions, operands and summaries can be changed.
//! - [`EditMode::MessageEdit`]: one block per entry, each starting with a
//!   [`DELIMITER`]-prefixed header line. A commit block carries the full
//!   message after its header, so whole messages can be rewritten.
//!
//! The delimiter is not escaped: a message line starting with `++ ` is
//! read back as the start of a new block.
//!
//! # Head on top
//!
//! With `head_on_top` the rendered entries are reversed, and the parsed
//! entries are reversed back before extra steps are reattached. Commit
//! steps therefore always come back oldest first.

use super::error::TodoError;
use super::step::{parse_step_with, CommitStep, Step};
use super::validate::validate_todos;
use crate::git::{Commit, Git, GitError};
use crate::ui::editor::Interact;

/// Scratch file name for todo lists.
pub const TODO_FILE: &str = "git-revise-todo";

/// Marks the start of every block in message-editing mode.
pub const DELIMITER: &[u8] = b"++ ";

/// How a todo list is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Compact, one line per entry
    #[default]
    LineWise,
    /// Full messages, one delimited block per entry
    MessageEdit,
}

const COMMANDS: &str = "\
Commands:
 p, pick <commit> = use commit
 r, reword <commit> = use commit, but edit the commit message
 s, squash <commit> = use commit, but meld into previous commit
 f, fixup <commit> = like squash, but discard this commit's message
 c, cut <commit> = interactively split commit into two smaller commits
 i, index <commit> = leave commit changes staged, but uncommitted
 u, update-ref <ref> = point the branch at the commit above";

/// The comment block shown under a todo list of `count` commit steps.
pub fn instructions(mode: EditMode, count: usize) -> String {
    let body = match mode {
        EditMode::LineWise => "\
These lines are executed from top to bottom. They can be re-ordered and
their commands can be changed, however the number of lines must remain
identical. If present, index lines must be at the bottom of the list,
i.e. they can not be followed by non-index lines.",
        EditMode::MessageEdit => "\
Each block starts with a '++' marker followed by the command and the
commit id. The complete commit message follows on the next lines, up to
the next '++' marker or the end of the file. Messages are rewritten to
match before the command runs.

These blocks are executed from top to bottom. They can be re-ordered and
their commands can be changed, however the number of blocks must remain
identical. If present, index blocks must be at the bottom of the list,
i.e. they can not be followed by non-index blocks.",
    };

    format!(
        "Interactive Revise Todos ({count} commands)\n\n{COMMANDS}\n\n{body}\n\n\
         If you remove everything, the revising process will be aborted."
    )
}

/// Flatten `todos` into entries, each commit step followed by its extras.
fn entries<F>(todos: &[CommitStep], head_on_top: bool, mut render: F) -> Vec<Vec<u8>>
where
    F: FnMut(&CommitStep) -> Vec<u8>,
{
    let mut entries = Vec::new();
    for step in todos {
        entries.push(render(step));
        entries.extend(step.extra_steps.iter().map(|extra| extra.to_bytes()));
    }
    if head_on_top {
        entries.reverse();
    }
    entries
}

/// Render `todos` one entry per line.
pub fn serialize_linewise(todos: &[CommitStep], head_on_top: bool) -> Vec<u8> {
    let entries = entries(todos, head_on_top, |step| {
        let mut line = format!("{step} ").into_bytes();
        line.extend_from_slice(step.summary());
        line
    });

    let mut text = Vec::new();
    for entry in entries {
        text.extend_from_slice(&entry);
        text.push(b'\n');
    }
    text
}

/// Render `todos` as delimited blocks carrying full messages.
pub fn serialize_msgedit(todos: &[CommitStep], head_on_top: bool) -> Vec<u8> {
    let entries = entries(todos, head_on_top, |step| {
        let mut block = format!("{step}\n").into_bytes();
        block.extend_from_slice(&step.message);
        block
    });

    let mut text = Vec::new();
    for entry in entries {
        text.extend_from_slice(DELIMITER);
        text.extend_from_slice(&entry);
        if !entry.ends_with(b"\n") {
            text.push(b'\n');
        }
    }
    text
}

/// Parse a line-wise response; whitespace-only lines are skipped.
pub fn parse_linewise<F>(response: &[u8], mut resolve: F) -> Result<Vec<Step>, TodoError>
where
    F: FnMut(&str) -> Result<Commit, GitError>,
{
    response
        .split(|&b| b == b'\n')
        .map(<[u8]>::trim_ascii)
        .filter(|line| !line.is_empty())
        .map(|line| parse_step_with(line, &mut resolve))
        .collect()
}

/// Split a message-editing response into blocks, without their delimiters.
///
/// Text before the first delimiter is ignored.
fn split_blocks(response: &[u8]) -> Vec<&[u8]> {
    let mut starts = Vec::new();
    let mut line_start = true;
    for (i, &byte) in response.iter().enumerate() {
        if line_start && response[i..].starts_with(DELIMITER) {
            starts.push(i);
        }
        line_start = byte == b'\n';
    }

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(response.len());
            &response[start + DELIMITER.len()..end]
        })
        .collect()
}

/// Parse a message-editing response.
///
/// Each block's first line is the entry; for commit steps the rest of the
/// block, trimmed and newline-terminated, becomes the step's message.
pub fn parse_msgedit<F>(response: &[u8], mut resolve: F) -> Result<Vec<Step>, TodoError>
where
    F: FnMut(&str) -> Result<Commit, GitError>,
{
    let mut steps = Vec::new();
    for block in split_blocks(response) {
        let (header, message) = match block.iter().position(|&b| b == b'\n') {
            Some(newline) => (&block[..newline], &block[newline + 1..]),
            None => (block, &b""[..]),
        };

        let mut step = parse_step_with(header.trim_ascii(), &mut resolve)?;
        if let Step::Commit(commit_step) = &mut step {
            let mut edited = message.trim_ascii().to_vec();
            edited.push(b'\n');
            commit_step.message = edited;
        }
        steps.push(step);
    }
    Ok(steps)
}

/// Attach every commit-less step to the commit step before it.
pub fn reassociate(steps: Vec<Step>) -> Result<Vec<CommitStep>, TodoError> {
    let mut result: Vec<CommitStep> = Vec::new();
    for step in steps {
        match step {
            Step::Commit(step) => result.push(step),
            Step::Commitless(extra) => match result.last_mut() {
                Some(base) => base.extra_steps.push(extra),
                None => {
                    return Err(TodoError::OrphanExtraStep {
                        entry: String::from_utf8_lossy(&extra.to_bytes()).into_owned(),
                    })
                }
            },
        }
    }
    Ok(result)
}

/// Round-trip `todos` through the editor and rebuild the edited plan.
///
/// The result is not validated. An empty response aborts.
pub fn edit_todos_with<F>(
    editor: &dyn Interact,
    todos: &[CommitStep],
    mode: EditMode,
    head_on_top: bool,
    resolve: F,
) -> Result<Vec<CommitStep>, TodoError>
where
    F: FnMut(&str) -> Result<Commit, GitError>,
{
    let instructions = instructions(mode, todos.len());
    let response = match mode {
        EditMode::LineWise => editor.edit_sequence(
            TODO_FILE,
            &serialize_linewise(todos, head_on_top),
            &instructions,
        )?,
        EditMode::MessageEdit => editor.edit_text(
            TODO_FILE,
            &serialize_msgedit(todos, head_on_top),
            &instructions,
        )?,
    };

    if response.trim_ascii().is_empty() {
        return Err(TodoError::Aborted {
            reason: "empty todo list".to_string(),
        });
    }

    let mut steps = match mode {
        EditMode::LineWise => parse_linewise(&response, resolve)?,
        EditMode::MessageEdit => parse_msgedit(&response, resolve)?,
    };
    if head_on_top {
        steps.reverse();
    }
    reassociate(steps)
}

/// Let the user edit `todos`, then parse and validate the result.
pub fn edit_todos(
    git: &Git,
    editor: &dyn Interact,
    todos: &[CommitStep],
    mode: EditMode,
    head_on_top: bool,
) -> Result<Vec<CommitStep>, TodoError> {
    let edited = edit_todos_with(editor, todos, mode, head_on_top, |spec| git.get_commit(spec))?;
    validate_todos(git, todos, &edited)?;
    Ok(edited)
}
