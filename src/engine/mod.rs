//! engine
//!
//! The todo-list engine: Plan -> [Autosquash] -> Edit -> Validate -> Apply.
//!
//! # Architecture
//!
//! ```text
//! commits + index --> plan --> autosquash --> present (user) --> validate --> exec --> new tip
//! ```
//!
//! - [`action`]: the closed action vocabulary and abbreviation parsing
//! - [`step`]: commit steps, extra steps and the entry grammar
//! - [`plan`]: initial todo lists annotated with branches and tags
//! - [`autosquash`]: regrouping of `fixup!`/`squash!` commits
//! - [`present`]: line-wise and message-editing projections
//! - [`validate`]: integrity rules for edited lists
//! - [`exec`]: the executor that replays a list
//! - [`rewrite`]: message refinement and commit splitting
//! - [`cycle`]: one complete revise, from range selection to moving HEAD
//!
//! # Invariants
//!
//! - Every edited list is validated before it is applied
//! - Commits are never mutated; the executor only writes new objects
//! - HEAD moves once, at the end of a successful cycle
//!
//! # Example
//!
//! ```ignore
//! use revise::engine::{run_cycle, ReviseMode, ReviseRequest, EditMode};
//!
//! let request = ReviseRequest {
//!     mode: ReviseMode::Interactive {
//!         base: Some("HEAD~3".into()),
//!         edit_mode: EditMode::LineWise,
//!         autosquash: false,
//!     },
//!     reauthor: false,
//!     use_index: true,
//!     head_on_top: false,
//!     verbosity: ctx.verbosity(),
//! };
//! run_cycle(&git, &editor, &request)?;
//! ```

pub mod action;
pub mod autosquash;
pub mod cycle;
pub mod error;
pub mod exec;
pub mod plan;
pub mod present;
pub mod rewrite;
pub mod step;
pub mod validate;

// Re-exports for convenience
pub use action::{parse_action, Action, CommitAction, CommitlessAction};
pub use autosquash::{autosquash_todos, autosquash_todos_with};
pub use cycle::{load_git_settings, run_cycle, ReviseMode, ReviseOutcome, ReviseRequest};
pub use error::{ErrorCategory, TodoError};
pub use exec::Executor;
pub use plan::{build_todos, build_todos_with};
pub use present::{edit_todos, EditMode};
pub use step::{parse_step, parse_step_with, CommitStep, CommitlessStep, Step};
pub use validate::{validate_todos, validate_todos_with};

use std::path::PathBuf;

use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// The output verbosity these flags select.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}
