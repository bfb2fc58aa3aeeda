//! ui::scripted
//!
//! Scripted editor for deterministic testing.
//!
//! # Design
//!
//! [`ScriptedEditor`] implements [`Interact`] by replaying a queue of
//! canned responses, one per call, and records every call so tests can
//! assert on what the user would have seen.
//!
//! # Example
//!
//! ```
//! use revise::ui::editor::Interact;
//! use revise::ui::scripted::{Response, ScriptedEditor};
//!
//! let editor = ScriptedEditor::new();
//! editor.push(Response::Keep);
//! editor.push(Response::Text(b"reworded\n".to_vec()));
//!
//! let first = editor.edit_sequence("git-revise-todo", b"pick abc one\n", "").unwrap();
//! assert_eq!(first, b"pick abc one\n");
//!
//! let second = editor.edit_text("COMMIT_EDITMSG", b"old\n", "").unwrap();
//! assert_eq!(second, b"reworded\n");
//! assert_eq!(editor.invocations().len(), 2);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::editor::{EditorError, Interact};
use crate::core::types::Oid;
use crate::git::{Commit, Git};

/// A canned answer for the next interactive call.
#[derive(Debug, Clone)]
pub enum Response {
    /// Hand the content back unchanged.
    Keep,
    /// Replace the content.
    Text(Vec<u8>),
    /// Compute the response from the content shown.
    Transform(fn(&[u8]) -> Vec<u8>),
    /// Answer a cut with this first-half tree.
    CutTree(Oid),
}

/// Which collaborator method was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    Text,
    Sequence,
    Cut,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Which method was called
    pub kind: InvocationKind,
    /// Scratch file name, or the commit id for cuts
    pub name: String,
    /// Content shown to the user
    pub input: Vec<u8>,
}

/// Editor that replays queued responses.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEditor {
    inner: Arc<Mutex<ScriptedInner>>,
}

#[derive(Debug, Default)]
struct ScriptedInner {
    responses: VecDeque<Response>,
    invocations: Vec<Invocation>,
}

impl ScriptedEditor {
    /// Create an editor with no queued responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an editor with the given responses queued in order.
    pub fn with_responses(responses: impl IntoIterator<Item = Response>) -> Self {
        let editor = Self::new();
        for response in responses {
            editor.push(response);
        }
        editor
    }

    /// Queue a response.
    pub fn push(&self, response: Response) {
        self.lock().responses.push_back(response);
    }

    /// All calls made so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().invocations.clone()
    }

    /// Number of responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lock().responses.len()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer(&self, kind: InvocationKind, name: &str, input: &[u8]) -> Result<Response, EditorError> {
        let mut inner = self.lock();
        inner.invocations.push(Invocation {
            kind,
            name: name.to_string(),
            input: input.to_vec(),
        });
        inner.responses.pop_front().ok_or_else(|| EditorError::NoResponse {
            name: name.to_string(),
        })
    }

    fn edit(&self, kind: InvocationKind, name: &str, text: &[u8]) -> Result<Vec<u8>, EditorError> {
        match self.answer(kind, name, text)? {
            Response::Keep => Ok(text.to_vec()),
            Response::Text(response) => Ok(response),
            Response::Transform(transform) => Ok(transform(text)),
            Response::CutTree(_) => Err(EditorError::NoResponse {
                name: name.to_string(),
            }),
        }
    }
}

impl Interact for ScriptedEditor {
    fn edit_text(&self, name: &str, text: &[u8], _instructions: &str) -> Result<Vec<u8>, EditorError> {
        self.edit(InvocationKind::Text, name, text)
    }

    fn edit_sequence(
        &self,
        name: &str,
        text: &[u8],
        _instructions: &str,
    ) -> Result<Vec<u8>, EditorError> {
        self.edit(InvocationKind::Sequence, name, text)
    }

    fn select_cut(&self, _git: &Git, commit: &Commit, _parent_tree: &Oid) -> Result<Oid, EditorError> {
        match self.answer(InvocationKind::Cut, commit.oid.as_str(), &commit.message)? {
            Response::CutTree(tree) => Ok(tree),
            _ => Err(EditorError::NoResponse {
                name: commit.oid.to_string(),
            }),
        }
    }
}
