//! core::paths
//!
//! Centralized path routing for revise storage locations.
//!
//! # Architecture
//!
//! Every file revise reads or writes inside a repository is computed here,
//! so that the following layouts are handled the same way everywhere:
//! - Normal repositories (git_dir == common_dir)
//! - Linked worktrees (common_dir is the parent repo's git dir)
//!
//! **Hard rule:** No code may assume `.git/` is a directory or that
//! `git_dir == common_dir`. All paths must go through `RevisePaths`.
//!
//! # Storage Layout
//!
//! Per-worktree scratch files live in `<git_dir>`:
//! - `git-revise-todo` - The todo list handed to the sequence editor
//! - `COMMIT_EDITMSG` - Commit messages handed to the editor
//! - `revise/TEMP_INDEX` - Temporary index used while cutting a commit
//!
//! Repository configuration lives in `<common_dir>/revise/config.toml`.
//!
//! # Example
//!
//! ```
//! use revise::core::paths::RevisePaths;
//! use std::path::PathBuf;
//!
//! let paths = RevisePaths::new(
//!     PathBuf::from("/repo/.git"),
//!     PathBuf::from("/repo/.git"),
//! );
//!
//! assert_eq!(
//!     paths.repo_config_path(),
//!     PathBuf::from("/repo/.git/revise/config.toml")
//! );
//! assert_eq!(
//!     paths.editor_file("git-revise-todo"),
//!     PathBuf::from("/repo/.git/git-revise-todo")
//! );
//! ```

use std::path::PathBuf;

use crate::git::RepoInfo;

/// Centralized path routing for revise storage.
///
/// # Invariants
///
/// - Repo-scoped configuration uses `common_dir` (shared across worktrees)
/// - Editor scratch files use `git_dir`, so two worktrees never share them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisePaths {
    /// Path to the per-worktree .git directory.
    pub git_dir: PathBuf,

    /// Path to the shared git directory (refs, objects, config).
    pub common_dir: PathBuf,
}

impl RevisePaths {
    /// Create a new RevisePaths from git_dir and common_dir.
    ///
    /// # Example
    ///
    /// ```
    /// use revise::core::paths::RevisePaths;
    /// use std::path::PathBuf;
    ///
    /// // Linked worktree
    /// let paths = RevisePaths::new(
    ///     PathBuf::from("/repo/.git/worktrees/feature"),
    ///     PathBuf::from("/repo/.git"),
    /// );
    /// assert_ne!(paths.git_dir, paths.common_dir);
    /// ```
    pub fn new(git_dir: PathBuf, common_dir: PathBuf) -> Self {
        Self {
            git_dir,
            common_dir,
        }
    }

    /// Create RevisePaths from a RepoInfo.
    pub fn from_repo_info(info: &RepoInfo) -> Self {
        Self {
            git_dir: info.git_dir.clone(),
            common_dir: info.common_dir.clone(),
        }
    }

    // =========================================================================
    // Repo-scoped paths (shared across worktrees)
    // =========================================================================

    /// Get the root revise directory under common_dir.
    pub fn repo_revise_dir(&self) -> PathBuf {
        self.common_dir.join("revise")
    }

    /// Get the path to the repository configuration file.
    ///
    /// This is `<common_dir>/revise/config.toml`.
    pub fn repo_config_path(&self) -> PathBuf {
        self.repo_revise_dir().join("config.toml")
    }

    // =========================================================================
    // Worktree-scoped paths
    // =========================================================================

    /// Get the path of an editor scratch file.
    ///
    /// This is `<git_dir>/<name>`, the same place git keeps `COMMIT_EDITMSG`.
    pub fn editor_file(&self, name: &str) -> PathBuf {
        self.git_dir.join(name)
    }

    /// Get the path of the temporary index used while cutting a commit.
    ///
    /// This is `<git_dir>/revise/TEMP_INDEX`.
    pub fn temp_index_path(&self) -> PathBuf {
        self.git_dir.join("revise").join("TEMP_INDEX")
    }
}
