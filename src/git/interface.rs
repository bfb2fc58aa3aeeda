//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to the object store. All
//! commit reads and writes, ref updates and index access flow through
//! [`Git`], which returns strong types and normalizes errors into typed
//! failure categories.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::CommitNotFound`] / [`GitError::AmbiguousRef`]: Lookup failures
//! - [`GitError::CasFailed`]: Compare-and-swap precondition failed
//! - [`GitError::MergeConflict`]: A rebase could not be applied cleanly
//! - [`GitError::OperationInProgress`]: Rebase/merge/cherry-pick in progress
//!
//! # Example
//!
//! ```ignore
//! use revise::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.head_commit()?;
//! println!("HEAD is {} {}", head.short(), head.summary_lossy());
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::commit::{encode_commit, Commit, CommitUpdate};
use super::ident::{self, IdentError, IdentRole};
use crate::core::types::{Oid, RefName, Signature, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// A commit reference did not resolve to any commit.
    #[error("unknown commit: {spec}")]
    CommitNotFound {
        /// The reference that was looked up
        spec: String,
    },

    /// A commit reference matched more than one object.
    #[error("ambiguous commit reference: {spec}")]
    AmbiguousRef {
        /// The reference that was looked up
        spec: String,
    },

    /// Compare-and-swap precondition failed.
    ///
    /// Ref updates only go through when the ref still holds the value it
    /// had when the cycle started.
    #[error("CAS failed for {refname}: expected {expected}, found {actual}")]
    CasFailed {
        /// The ref being updated
        refname: String,
        /// The expected old value
        expected: String,
        /// The actual current value
        actual: String,
    },

    /// Git operation in progress (rebase, merge, etc.).
    #[error("{operation} in progress")]
    OperationInProgress {
        /// The type of operation in progress
        operation: GitState,
    },

    /// Merge commits cannot be rebased.
    #[error("cannot rebase merge commit {oid}")]
    MergeCommit {
        /// The merge commit
        oid: Oid,
    },

    /// The three-way merge behind a rebase produced conflicts.
    #[error("conflict while applying {oid} ({summary}): {}", .paths.join(", "))]
    MergeConflict {
        /// The commit being applied
        oid: Oid,
        /// Its summary line
        summary: String,
        /// Conflicting paths
        paths: Vec<String>,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// No default identity is configured.
    #[error("unable to determine {role} identity: {message}")]
    NoIdentity {
        /// `author` or `committer`
        role: &'static str,
        /// The underlying error
        message: String,
    },

    /// A `GIT_*_DATE` variable holds a date git would reject.
    #[error("invalid date in {variable}: {value}")]
    InvalidIdentDate {
        /// The environment variable
        variable: String,
        /// Its value
        value: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::ObjectNotFound {
                oid: err.message().to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidRefName(msg) => GitError::InvalidRefName { message: msg },
            TypeError::InvalidSignature(msg) => GitError::Internal { message: msg },
        }
    }
}

/// Information about a Git repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to the per-worktree .git directory
    pub git_dir: PathBuf,
    /// Path to the shared .git directory
    pub common_dir: PathBuf,
    /// Path to the working directory
    pub work_dir: PathBuf,
}

/// State of in-progress Git operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitState {
    /// No operation in progress.
    Clean,

    /// Rebase in progress.
    Rebase,

    /// Merge in progress.
    Merge,

    /// Cherry-pick in progress.
    CherryPick,

    /// Revert in progress.
    Revert,

    /// Bisect in progress.
    Bisect,

    /// Apply mailbox in progress.
    ApplyMailbox,
}

impl GitState {
    /// Check if any operation is in progress.
    ///
    /// # Example
    ///
    /// ```
    /// use revise::git::GitState;
    ///
    /// assert!(!GitState::Clean.is_in_progress());
    /// assert!(GitState::Merge.is_in_progress());
    /// ```
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, GitState::Clean)
    }

    /// Get a human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            GitState::Clean => "clean",
            GitState::Rebase => "rebase",
            GitState::Merge => "merge",
            GitState::CherryPick => "cherry-pick",
            GitState::Revert => "revert",
            GitState::Bisect => "bisect",
            GitState::ApplyMailbox => "apply-mailbox",
        }
    }
}

impl std::fmt::Display for GitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A ref with its name and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// The full ref name
    pub name: RefName,
    /// The commit the ref points to, tags peeled
    pub oid: Oid,
}

fn to_git2(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
}

fn from_git2_oid(oid: git2::Oid) -> Result<Oid, GitError> {
    Oid::new(oid.to_string()).map_err(GitError::from)
}

fn from_git2_signature(sig: &git2::Signature<'_>) -> Result<Signature, GitError> {
    let when = sig.when();
    Signature::from_parts(
        sig.name_bytes(),
        sig.email_bytes(),
        when.seconds(),
        when.offset_minutes(),
    )
    .map_err(GitError::from)
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// should import `git2` directly.
///
/// # CAS Semantics
///
/// All ref mutation operations use compare-and-swap (CAS) semantics:
/// updates only succeed if the ref's current value matches an expected
/// value.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository or one of its linked worktrees.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Get repository information.
    pub fn info(&self) -> Result<RepoInfo, GitError> {
        let git_dir = self.repo.path().to_path_buf();
        let common_dir = self.repo.commondir().to_path_buf();
        let work_dir = self.repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        Ok(RepoInfo {
            git_dir,
            common_dir,
            work_dir,
        })
    }

    /// Get direct access to the .git directory path.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Get the working directory.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    // =========================================================================
    // State Detection
    // =========================================================================

    /// Get the current Git state (rebase, merge, etc.).
    pub fn state(&self) -> GitState {
        match self.repo.state() {
            git2::RepositoryState::Clean => GitState::Clean,
            git2::RepositoryState::Rebase
            | git2::RepositoryState::RebaseInteractive
            | git2::RepositoryState::RebaseMerge => GitState::Rebase,
            git2::RepositoryState::Merge => GitState::Merge,
            git2::RepositoryState::CherryPick | git2::RepositoryState::CherryPickSequence => {
                GitState::CherryPick
            }
            git2::RepositoryState::Revert | git2::RepositoryState::RevertSequence => {
                GitState::Revert
            }
            git2::RepositoryState::Bisect => GitState::Bisect,
            git2::RepositoryState::ApplyMailbox | git2::RepositoryState::ApplyMailboxOrRebase => {
                GitState::ApplyMailbox
            }
        }
    }

    // =========================================================================
    // Commit Lookup
    // =========================================================================

    /// Resolve a commit reference (hex id, abbreviation, ref name or
    /// revision expression) to a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::AmbiguousRef`] if an abbreviation matches several objects
    /// - [`GitError::CommitNotFound`] if nothing (or no commit) matches
    pub fn get_commit(&self, spec: &str) -> Result<Commit, GitError> {
        let object = self.repo.revparse_single(spec).map_err(|e| match e.code() {
            git2::ErrorCode::Ambiguous => GitError::AmbiguousRef {
                spec: spec.to_string(),
            },
            git2::ErrorCode::NotFound | git2::ErrorCode::InvalidSpec => {
                GitError::CommitNotFound {
                    spec: spec.to_string(),
                }
            }
            _ => GitError::from_git2(e, spec),
        })?;

        let commit = object.peel_to_commit().map_err(|_| GitError::CommitNotFound {
            spec: spec.to_string(),
        })?;

        Self::read_commit(&commit)
    }

    /// Load a commit by object id.
    pub fn find_commit(&self, oid: &Oid) -> Result<Commit, GitError> {
        let commit = self
            .repo
            .find_commit(to_git2(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        Self::read_commit(&commit)
    }

    /// Load the commit HEAD points at.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn (new repository)
    pub fn head_commit(&self) -> Result<Commit, GitError> {
        let commit = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        Self::read_commit(&commit)
    }

    /// The branch HEAD is attached to, or `None` when HEAD is detached.
    pub fn head_ref(&self) -> Result<Option<RefName>, GitError> {
        let head = self
            .repo
            .find_reference("HEAD")
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        match head.symbolic_target() {
            Some(target) => Ok(Some(RefName::new(target)?)),
            None => Ok(None),
        }
    }

    fn read_commit(commit: &git2::Commit<'_>) -> Result<Commit, GitError> {
        Ok(Commit {
            oid: from_git2_oid(commit.id())?,
            tree: from_git2_oid(commit.tree_id())?,
            parents: commit
                .parent_ids()
                .map(from_git2_oid)
                .collect::<Result<_, _>>()?,
            author: from_git2_signature(&commit.author())?,
            committer: from_git2_signature(&commit.committer())?,
            encoding: commit.message_encoding().map(str::to_owned),
            message: commit.message_raw_bytes().to_vec(),
        })
    }

    /// Walk the first-parent history from `tip` back to (excluding) `base`,
    /// oldest first.
    ///
    /// With `base == None` the walk goes all the way to the root commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::MergeCommit`] if a merge commit is part of the range
    pub fn first_parent_range(&self, base: Option<&Oid>, tip: &Oid) -> Result<Vec<Commit>, GitError> {
        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::REVERSE)?;
        walk.simplify_first_parent()?;
        walk.push(to_git2(tip)?)?;
        if let Some(base) = base {
            walk.hide(to_git2(base)?)?;
        }

        let mut commits = Vec::new();
        for id in walk {
            let commit = self.find_commit(&from_git2_oid(id?)?)?;
            if commit.is_merge() {
                return Err(GitError::MergeCommit { oid: commit.oid });
            }
            commits.push(commit);
        }
        Ok(commits)
    }

    // =========================================================================
    // Commit Construction
    // =========================================================================

    /// The identity new and reauthored commits are written under.
    ///
    /// `GIT_AUTHOR_NAME`, `GIT_AUTHOR_EMAIL` and `GIT_AUTHOR_DATE` win over
    /// `user.name`/`user.email`; the date defaults to now.
    pub fn default_author(&self) -> Result<Signature, GitError> {
        self.default_ident(IdentRole::Author)
    }

    /// The identity stamped on every commit this tool writes, honoring
    /// `GIT_COMMITTER_*` like [`default_author`](Self::default_author).
    pub fn default_committer(&self) -> Result<Signature, GitError> {
        self.default_ident(IdentRole::Committer)
    }

    fn default_ident(&self, role: IdentRole) -> Result<Signature, GitError> {
        let role_name = match role {
            IdentRole::Author => "author",
            IdentRole::Committer => "committer",
        };
        let mut config_error = None;
        let config = || match self.repo.signature() {
            Ok(sig) => Some((sig.name_bytes().to_vec(), sig.email_bytes().to_vec())),
            Err(e) => {
                config_error = Some(e.message().to_string());
                None
            }
        };

        ident::resolve(role, |key| std::env::var_os(key), config).map_err(|e| match e {
            IdentError::Missing(field) => GitError::NoIdentity {
                role: role_name,
                message: config_error
                    .take()
                    .unwrap_or_else(|| format!("no {field} configured")),
            },
            IdentError::BadDate { variable, value } => {
                GitError::InvalidIdentDate { variable, value }
            }
            IdentError::OutOfRange(message) => GitError::NoIdentity {
                role: role_name,
                message,
            },
        })
    }

    /// Write a new commit object.
    pub fn new_commit(
        &self,
        tree: &Oid,
        parents: &[Oid],
        message: &[u8],
        author: &Signature,
        committer: &Signature,
    ) -> Result<Commit, GitError> {
        self.write_commit(
            tree.clone(),
            parents.to_vec(),
            author.clone(),
            committer.clone(),
            None,
            message.to_vec(),
        )
    }

    /// Derive a new commit from `base` with some fields overridden.
    ///
    /// If the update changes nothing, `base` is returned unchanged.
    /// Otherwise the committer is restamped with
    /// [`default_committer`](Self::default_committer).
    pub fn update_commit(&self, base: &Commit, update: CommitUpdate) -> Result<Commit, GitError> {
        if update.is_noop_for(base) {
            return Ok(base.clone());
        }

        let CommitUpdate {
            tree,
            parents,
            message,
            author,
        } = update;

        self.write_commit(
            tree.unwrap_or_else(|| base.tree.clone()),
            parents.unwrap_or_else(|| base.parents.clone()),
            author.unwrap_or_else(|| base.author.clone()),
            self.default_committer()?,
            base.encoding.clone(),
            message.unwrap_or_else(|| base.message.clone()),
        )
    }

    /// Store a commit object and return it under its id.
    fn write_commit(
        &self,
        tree: Oid,
        parents: Vec<Oid>,
        author: Signature,
        committer: Signature,
        encoding: Option<String>,
        message: Vec<u8>,
    ) -> Result<Commit, GitError> {
        let body = encode_commit(
            &tree,
            &parents,
            &author,
            &committer,
            encoding.as_deref(),
            &message,
        );

        let odb = self.repo.odb()?;
        let id = odb.write(git2::ObjectType::Commit, &body)?;

        Ok(Commit {
            oid: from_git2_oid(id)?,
            tree,
            parents,
            author,
            committer,
            encoding,
            message,
        })
    }

    /// The id of the empty tree, writing it if needed.
    pub fn empty_tree(&self) -> Result<Oid, GitError> {
        let builder = self.repo.treebuilder(None)?;
        from_git2_oid(builder.write()?)
    }

    /// Reapply `commit`'s change on top of `parent` (`None` means "on
    /// top of nothing").
    ///
    /// When `tree_to_keep` is given, the three-way merge is skipped and
    /// that tree is used as the result.
    ///
    /// # Errors
    ///
    /// - [`GitError::MergeCommit`] if `commit` has several parents
    /// - [`GitError::MergeConflict`] if the change does not apply cleanly
    pub fn rebase(
        &self,
        commit: &Commit,
        parent: Option<&Commit>,
        tree_to_keep: Option<&Oid>,
    ) -> Result<Commit, GitError> {
        let new_parents: Vec<Oid> = parent.map(|p| p.oid.clone()).into_iter().collect();
        if commit.parents == new_parents {
            return Ok(commit.clone());
        }
        if commit.is_merge() {
            return Err(GitError::MergeCommit {
                oid: commit.oid.clone(),
            });
        }

        let tree = match tree_to_keep {
            Some(tree) => tree.clone(),
            None => {
                let base_tree = match commit.parents.first() {
                    Some(old_parent) => self.find_commit(old_parent)?.tree,
                    None => self.empty_tree()?,
                };
                let onto_tree = match parent {
                    Some(parent) => parent.tree.clone(),
                    None => self.empty_tree()?,
                };
                self.merge_trees(commit, &base_tree, &onto_tree)?
            }
        };

        self.update_commit(commit, CommitUpdate::new().tree(tree).parents(new_parents))
    }

    /// Three-way merge of `commit`'s tree against `onto` with `base` as
    /// the common ancestor.
    fn merge_trees(&self, commit: &Commit, base: &Oid, onto: &Oid) -> Result<Oid, GitError> {
        let ancestor = self.repo.find_tree(to_git2(base)?)?;
        let ours = self.repo.find_tree(to_git2(onto)?)?;
        let theirs = self.repo.find_tree(to_git2(&commit.tree)?)?;

        let index = self.repo.merge_trees(&ancestor, &ours, &theirs, None)?;
        if index.has_conflicts() {
            let mut paths = Vec::new();
            for conflict in index.conflicts()? {
                let conflict = conflict?;
                if let Some(entry) = conflict.our.or(conflict.their).or(conflict.ancestor) {
                    paths.push(String::from_utf8_lossy(&entry.path).into_owned());
                }
            }
            return Err(GitError::MergeConflict {
                oid: commit.oid.clone(),
                summary: commit.summary_lossy(),
                paths,
            });
        }

        let mut index = index;
        from_git2_oid(index.write_tree_to(&self.repo)?)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Read a boolean from git config; `None` if unset.
    pub fn bool_config(&self, name: &str) -> Result<Option<bool>, GitError> {
        let config = self.repo.config()?;
        match config.get_bool(name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, name)),
        }
    }

    /// Read a string from git config; `None` if unset.
    pub fn string_config(&self, name: &str) -> Result<Option<String>, GitError> {
        let config = self.repo.config()?;
        match config.get_string(name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, name)),
        }
    }

    // =========================================================================
    // Ref Enumeration
    // =========================================================================

    /// List every branch and tag, each peeled to the commit it names.
    ///
    /// Refs that don't name a commit are skipped.
    pub fn list_refs(&self) -> Result<Vec<RefEntry>, GitError> {
        let mut entries = Vec::new();
        for pattern in ["refs/heads/*", "refs/tags/*"] {
            for reference in self.repo.references_glob(pattern)? {
                let reference = reference?;

                // Skip refs with non-UTF8 or invalid names
                let Some(name) = reference.name().and_then(|n| RefName::new(n).ok()) else {
                    continue;
                };
                let Ok(commit) = reference.peel_to_commit() else {
                    continue;
                };

                entries.push(RefEntry {
                    name,
                    oid: from_git2_oid(commit.id())?,
                });
            }
        }
        Ok(entries)
    }

    /// Branches checked out in any worktree of this repository, the
    /// current one included.
    pub fn checked_out_branches(&self) -> Result<HashSet<RefName>, GitError> {
        let main = git2::Repository::open(self.repo.commondir())
            .map_err(|e| GitError::from_git2(e, "main worktree"))?;

        let mut branches = HashSet::new();
        if !main.is_bare() {
            branches.extend(Self::checked_out_branch(&main));
        }

        for name in main.worktrees()?.iter().flatten() {
            let worktree = main.find_worktree(name)?;
            if worktree.validate().is_err() {
                continue;
            }
            let linked = git2::Repository::open_from_worktree(&worktree)?;
            branches.extend(Self::checked_out_branch(&linked));
        }

        Ok(branches)
    }

    fn checked_out_branch(repo: &git2::Repository) -> Option<RefName> {
        let head = repo.find_reference("HEAD").ok()?;
        let target = head.symbolic_target()?;
        RefName::new(target).ok().filter(RefName::is_branch_ref)
    }

    // =========================================================================
    // CAS Ref Operations
    // =========================================================================

    /// Resolve a ref to the commit it points at; `None` if it doesn't exist.
    pub fn try_resolve_ref(&self, refname: &str) -> Result<Option<Oid>, GitError> {
        match self.repo.find_reference(refname) {
            Ok(reference) => {
                let oid = reference
                    .peel_to_commit()
                    .map_err(|e| GitError::from_git2(e, refname))?
                    .id();
                Ok(Some(from_git2_oid(oid)?))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, refname)),
        }
    }

    /// Update a ref with compare-and-swap semantics.
    ///
    /// The update only succeeds if the ref's current value matches
    /// `expected_old`. If `expected_old` is `None`, the ref must not exist
    /// (create case).
    ///
    /// # Errors
    ///
    /// - [`GitError::CasFailed`] if the current value doesn't match expected
    pub fn update_ref_cas(
        &self,
        refname: &str,
        new_oid: &Oid,
        expected_old: Option<&Oid>,
        message: &str,
    ) -> Result<(), GitError> {
        let current = self.try_resolve_ref_raw(refname)?;

        match (expected_old, current.as_ref()) {
            (Some(expected), Some(actual)) if expected.as_str() != actual => {
                return Err(GitError::CasFailed {
                    refname: refname.to_string(),
                    expected: expected.to_string(),
                    actual: actual.clone(),
                });
            }
            (Some(expected), None) => {
                return Err(GitError::CasFailed {
                    refname: refname.to_string(),
                    expected: expected.to_string(),
                    actual: "<none>".to_string(),
                });
            }
            (None, Some(actual)) => {
                return Err(GitError::CasFailed {
                    refname: refname.to_string(),
                    expected: "<none>".to_string(),
                    actual: actual.clone(),
                });
            }
            _ => {}
        }

        let new = to_git2(new_oid)?;
        let result = match expected_old {
            Some(expected) => {
                self.repo
                    .reference_matching(refname, new, true, to_git2(expected)?, message)
            }
            None => self.repo.reference(refname, new, false, message),
        };

        result.map_err(|e| match e.code() {
            git2::ErrorCode::Modified | git2::ErrorCode::Exists => GitError::CasFailed {
                refname: refname.to_string(),
                expected: expected_old.map_or_else(|| "<none>".to_string(), Oid::to_string),
                actual: "<changed concurrently>".to_string(),
            },
            _ => GitError::from_git2(e, refname),
        })?;

        Ok(())
    }

    /// Move HEAD (the branch it is attached to, or HEAD itself when
    /// detached) from `expected_old` to `new_oid`.
    pub fn move_head(&self, new_oid: &Oid, expected_old: &Oid, message: &str) -> Result<(), GitError> {
        match self.head_ref()? {
            Some(branch) => self.update_ref_cas(branch.as_str(), new_oid, Some(expected_old), message),
            None => self.update_ref_cas("HEAD", new_oid, Some(expected_old), message),
        }
    }

    /// Try to resolve a ref to its raw OID string (without validation).
    fn try_resolve_ref_raw(&self, refname: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_reference(refname) {
            Ok(reference) => {
                let resolved = reference.resolve().map_err(|e| GitError::from_git2(e, refname))?;
                let oid = resolved.target().ok_or_else(|| GitError::Internal {
                    message: format!("ref {} has no target", refname),
                })?;
                Ok(Some(oid.to_string()))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, refname)),
        }
    }

    // =========================================================================
    // Index
    // =========================================================================

    /// The tree currently staged in the index.
    pub fn index_tree(&self) -> Result<Oid, GitError> {
        let mut index = self.repo.index()?;
        from_git2_oid(index.write_tree()?)
    }

    /// Replace the staged content with `tree`. The working tree is not touched.
    pub fn write_index_tree(&self, tree: &Oid) -> Result<(), GitError> {
        let mut index = self.repo.index()?;
        let tree = self.repo.find_tree(to_git2(tree)?)?;
        index.read_tree(&tree)?;
        index.write()?;
        Ok(())
    }

    /// Write a standalone index file at `path` holding `tree`.
    pub fn write_temp_index(&self, path: &Path, tree: &Oid) -> Result<(), GitError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GitError::AccessError {
                message: format!("{}: {e}", parent.display()),
            })?;
        }

        let mut index = git2::Index::open(path)?;
        let tree = self.repo.find_tree(to_git2(tree)?)?;
        index.read_tree(&tree)?;
        index.write()?;
        Ok(())
    }

    /// Read back the tree held by a standalone index file.
    pub fn read_temp_index_tree(&self, path: &Path) -> Result<Oid, GitError> {
        let mut index = git2::Index::open(path)?;
        from_git2_oid(index.write_tree_to(&self.repo)?)
    }
}
