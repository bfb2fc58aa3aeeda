//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All object store reads and
//! writes flow through this interface. No other module should import `git2`.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Commit lookup, construction and rebasing
//! - Ref enumeration and CAS updates
//! - Worktree enumeration
//! - Index access
//! - Configuration lookup and default identities
//!
//! # Invariants
//!
//! - All ref updates use CAS (compare-and-swap) semantics
//! - Commits are never mutated; every change writes a new object
//! - All operations return strong types (Oid, RefName, Commit)
//!
//! # Example
//!
//! ```ignore
//! use revise::git::{CommitUpdate, Git};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.head_commit()?;
//! let reworded = git.update_commit(&head, CommitUpdate::new().message(b"new title\n".to_vec()))?;
//! git.move_head(&reworded.oid, &head.oid, "revise: reword")?;
//! ```

mod commit;
mod ident;
mod interface;

pub use commit::{Commit, CommitUpdate};
pub(crate) use commit::summary_of;
pub use interface::{Git, GitError, GitState, RefEntry, RepoInfo};
