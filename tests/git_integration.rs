//! Integration tests for the Git interface.
//!
//! These tests use real git repositories created via tempfile to verify
//! that the Git interface works correctly with actual git operations.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use revise::core::types::{Oid, RefName};
use revise::git::{CommitUpdate, Git, GitError, GitState};

/// Test fixture that creates a real git repository.
///
/// The repository lives in `<tempdir>/repo` so linked worktrees can be
/// created next to it.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository on `main` with an initial commit.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = dir.path().join("repo");
        std::fs::create_dir(&repo).unwrap();

        run_git(&repo, &["init"]);
        run_git(&repo, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run_git(&repo, &["config", "user.email", "test@example.com"]);
        run_git(&repo, &["config", "user.name", "Test User"]);

        let repo = Self { dir };
        repo.commit_file("README.md", "# Test Repo\n", "Initial commit");
        repo
    }

    /// Get the path to the repository.
    fn path(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    /// Open a Git interface to this repository.
    fn git(&self) -> Git {
        Git::open(&self.path()).expect("failed to open test repo")
    }

    /// Create a file and commit it, returning the new commit OID.
    fn commit_file(&self, path: &str, content: &str, message: &str) -> Oid {
        std::fs::write(self.path().join(path), content).unwrap();
        run_git(&self.path(), &["add", path]);
        run_git(&self.path(), &["commit", "-m", message]);
        self.rev_parse("HEAD")
    }

    /// Resolve a revision using git directly.
    fn rev_parse(&self, spec: &str) -> Oid {
        Oid::new(git_output(&self.path(), &["rev-parse", spec])).unwrap()
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    git_output(dir, args);
}

/// Run a git command and return its trimmed stdout.
fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

// =============================================================================
// Repository Opening Tests
// =============================================================================

#[test]
fn open_valid_repository() {
    let repo = TestRepo::new();
    assert!(Git::open(&repo.path()).is_ok());
}

#[test]
fn open_from_subdirectory() {
    let repo = TestRepo::new();
    let subdir = repo.path().join("subdir");
    std::fs::create_dir(&subdir).unwrap();

    assert!(Git::open(&subdir).is_ok());
}

#[test]
fn open_non_repository_fails() {
    let dir = TempDir::new().unwrap();
    let git = Git::open(dir.path());
    assert!(matches!(git, Err(GitError::NotARepo { .. })));
}

#[test]
fn repo_info_paths() {
    let repo = TestRepo::new();
    let info = repo.git().info().unwrap();

    assert!(info.git_dir.ends_with(".git") || info.git_dir.ends_with(".git/"));
    assert_eq!(info.git_dir, info.common_dir);
    assert_eq!(
        info.work_dir.canonicalize().unwrap(),
        repo.path().canonicalize().unwrap()
    );
}

#[test]
fn clean_state_when_no_operation() {
    let repo = TestRepo::new();
    assert_eq!(repo.git().state(), GitState::Clean);
}

#[test]
fn merge_head_means_merge_in_progress() {
    let repo = TestRepo::new();
    let head = repo.rev_parse("HEAD");
    std::fs::write(repo.path().join(".git/MERGE_HEAD"), format!("{head}\n")).unwrap();

    let state = repo.git().state();
    assert_eq!(state, GitState::Merge);
    assert!(state.is_in_progress());
}

// =============================================================================
// Commit Lookup Tests
// =============================================================================

mod lookup {
    use super::*;

    #[test]
    fn head_commit_matches_git() {
        let repo = TestRepo::new();
        let head = repo.git().head_commit().unwrap();

        assert_eq!(head.oid, repo.rev_parse("HEAD"));
        assert_eq!(head.tree, repo.rev_parse("HEAD^{tree}"));
        assert!(head.is_root());
        assert_eq!(head.message, b"Initial commit\n");
        assert_eq!(head.author.name, b"Test User");
    }

    #[test]
    fn get_commit_by_expression_and_prefix() {
        let repo = TestRepo::new();
        let first = repo.rev_parse("HEAD");
        let second = repo.commit_file("a.txt", "a\n", "add a");
        let git = repo.git();

        assert_eq!(git.get_commit("HEAD~1").unwrap().oid, first);
        assert_eq!(git.get_commit(&second.as_str()[..10]).unwrap().oid, second);
        assert_eq!(git.get_commit("main").unwrap().oid, second);

        let commit = git.get_commit("HEAD").unwrap();
        assert_eq!(commit.parents, vec![first]);
    }

    #[test]
    fn unknown_commit_is_not_found() {
        let repo = TestRepo::new();
        assert!(matches!(
            repo.git().get_commit("no-such-branch"),
            Err(GitError::CommitNotFound { .. })
        ));
    }

    #[test]
    fn tree_is_not_a_commit() {
        let repo = TestRepo::new();
        assert!(matches!(
            repo.git().get_commit("HEAD^{tree}"),
            Err(GitError::CommitNotFound { .. })
        ));
    }

    #[test]
    fn first_parent_range_is_oldest_first() {
        let repo = TestRepo::new();
        let base = repo.rev_parse("HEAD");
        let a = repo.commit_file("a.txt", "a\n", "add a");
        let b = repo.commit_file("b.txt", "b\n", "add b");
        let git = repo.git();

        let range = git.first_parent_range(Some(&base), &b).unwrap();
        let ids: Vec<_> = range.iter().map(|c| c.oid.clone()).collect();
        assert_eq!(ids, vec![a.clone(), b.clone()]);

        let all = git.first_parent_range(None, &b).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].oid, base);
    }

    #[test]
    fn first_parent_range_rejects_merges() {
        let repo = TestRepo::new();
        let base = repo.rev_parse("HEAD");
        run_git(&repo.path(), &["checkout", "-b", "side"]);
        repo.commit_file("side.txt", "side\n", "side work");
        run_git(&repo.path(), &["checkout", "main"]);
        repo.commit_file("main.txt", "main\n", "main work");
        run_git(&repo.path(), &["merge", "--no-ff", "-m", "merge side", "side"]);

        let head = repo.rev_parse("HEAD");
        let result = repo.git().first_parent_range(Some(&base), &head);
        assert!(matches!(result, Err(GitError::MergeCommit { .. })));
    }
}

// =============================================================================
// Commit Construction Tests
// =============================================================================

mod construction {
    use super::*;

    #[test]
    fn noop_update_returns_same_commit() {
        let repo = TestRepo::new();
        let git = repo.git();
        let head = git.head_commit().unwrap();

        let same = git
            .update_commit(&head, CommitUpdate::new().message(head.message.clone()))
            .unwrap();
        assert_eq!(same.oid, head.oid);
    }

    #[test]
    fn message_update_writes_new_commit() {
        let repo = TestRepo::new();
        let git = repo.git();
        let head = git.head_commit().unwrap();

        let reworded = git
            .update_commit(&head, CommitUpdate::new().message(b"reworded\n".to_vec()))
            .unwrap();

        assert_ne!(reworded.oid, head.oid);
        assert_eq!(reworded.tree, head.tree);
        assert_eq!(reworded.author, head.author);

        // The object really is in the store
        let stored = git.find_commit(&reworded.oid).unwrap();
        assert_eq!(stored.message, b"reworded\n");
        assert_eq!(
            git_output(&repo.path(), &["log", "-1", "--format=%s", reworded.oid.as_str()]),
            "reworded"
        );
    }

    #[test]
    fn new_commit_with_parents() {
        let repo = TestRepo::new();
        let git = repo.git();
        let head = git.head_commit().unwrap();
        let author = git.default_author().unwrap();
        let committer = git.default_committer().unwrap();

        let child = git
            .new_commit(&head.tree, &[head.oid.clone()], b"empty child\n", &author, &committer)
            .unwrap();

        assert_eq!(child.parents, vec![head.oid.clone()]);
        assert_eq!(git.find_commit(&child.oid).unwrap().tree, head.tree);
    }

    #[test]
    fn rebase_onto_same_parent_is_identity() {
        let repo = TestRepo::new();
        let base = repo.rev_parse("HEAD");
        repo.commit_file("a.txt", "a\n", "add a");
        let git = repo.git();
        let head = git.head_commit().unwrap();
        let parent = git.find_commit(&base).unwrap();

        let rebased = git.rebase(&head, Some(&parent), None).unwrap();
        assert_eq!(rebased.oid, head.oid);
    }

    #[test]
    fn rebase_skips_intermediate_commit() {
        let repo = TestRepo::new();
        let base = repo.rev_parse("HEAD");
        repo.commit_file("a.txt", "a\n", "add a");
        let c = repo.commit_file("b.txt", "b\n", "add b");
        let git = repo.git();

        let commit = git.find_commit(&c).unwrap();
        let onto = git.find_commit(&base).unwrap();
        let rebased = git.rebase(&commit, Some(&onto), None).unwrap();

        assert_eq!(rebased.parents, vec![base]);
        assert_eq!(rebased.message, b"add b\n");
        let files = git_output(
            &repo.path(),
            &["ls-tree", "--name-only", rebased.tree.as_str()],
        );
        assert_eq!(files, "README.md\nb.txt");
    }

    #[test]
    fn rebase_with_known_tree_skips_merge() {
        let repo = TestRepo::new();
        let base = repo.rev_parse("HEAD");
        repo.commit_file("a.txt", "a\n", "add a");
        let c = repo.commit_file("b.txt", "b\n", "add b");
        let git = repo.git();

        let commit = git.find_commit(&c).unwrap();
        let onto = git.find_commit(&base).unwrap();
        let rebased = git.rebase(&commit, Some(&onto), Some(&commit.tree)).unwrap();

        assert_eq!(rebased.tree, commit.tree);
        assert_eq!(rebased.parents, vec![base]);
    }

    #[test]
    fn conflicting_rebase_names_paths() {
        let repo = TestRepo::new();
        let base = repo.rev_parse("HEAD");
        repo.commit_file("f.txt", "one\n", "write one");
        let c = repo.commit_file("f.txt", "two\n", "write two");
        let git = repo.git();

        let commit = git.find_commit(&c).unwrap();
        let onto = git.find_commit(&base).unwrap();
        let err = git.rebase(&commit, Some(&onto), None).unwrap_err();

        match err {
            GitError::MergeConflict { oid, paths, .. } => {
                assert_eq!(oid, c);
                assert_eq!(paths, vec!["f.txt".to_string()]);
            }
            other => panic!("expected a conflict, got {other:?}"),
        }
    }
}

// =============================================================================
// Refs and Worktrees
// =============================================================================

mod refs {
    use super::*;

    #[test]
    fn list_refs_peels_tags() {
        let repo = TestRepo::new();
        let head = repo.rev_parse("HEAD");
        run_git(&repo.path(), &["branch", "topic"]);
        run_git(&repo.path(), &["tag", "-a", "v1", "-m", "release"]);
        run_git(&repo.path(), &["tag", "light"]);

        let refs = repo.git().list_refs().unwrap();
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();

        assert!(names.contains(&"refs/heads/main"));
        assert!(names.contains(&"refs/heads/topic"));
        assert!(names.contains(&"refs/tags/v1"));
        assert!(names.contains(&"refs/tags/light"));
        assert!(refs.iter().all(|r| r.oid == head));
    }

    #[test]
    fn checked_out_branches_include_worktrees() {
        let repo = TestRepo::new();
        run_git(&repo.path(), &["branch", "side"]);
        run_git(&repo.path(), &["branch", "free"]);
        let wt = repo.dir.path().join("wt");
        run_git(
            &repo.path(),
            &["worktree", "add", wt.to_str().unwrap(), "side"],
        );

        let checked_out = repo.git().checked_out_branches().unwrap();

        assert!(checked_out.contains(&RefName::new("refs/heads/main").unwrap()));
        assert!(checked_out.contains(&RefName::new("refs/heads/side").unwrap()));
        assert!(!checked_out.contains(&RefName::new("refs/heads/free").unwrap()));

        // Same answer from inside the linked worktree
        let from_wt = Git::open(&wt).unwrap().checked_out_branches().unwrap();
        assert_eq!(from_wt, checked_out);
    }

    #[test]
    fn try_resolve_ref() {
        let repo = TestRepo::new();
        let git = repo.git();
        assert_eq!(
            git.try_resolve_ref("refs/heads/main").unwrap(),
            Some(repo.rev_parse("HEAD"))
        );
        assert_eq!(git.try_resolve_ref("refs/heads/missing").unwrap(), None);
    }

    #[test]
    fn update_ref_cas_create_and_update() {
        let repo = TestRepo::new();
        let first = repo.rev_parse("HEAD");
        let second = repo.commit_file("a.txt", "a\n", "add a");
        let git = repo.git();

        git.update_ref_cas("refs/heads/new", &first, None, "create")
            .unwrap();
        assert_eq!(repo.rev_parse("refs/heads/new"), first);

        git.update_ref_cas("refs/heads/new", &second, Some(&first), "move")
            .unwrap();
        assert_eq!(repo.rev_parse("refs/heads/new"), second);
    }

    #[test]
    fn update_ref_cas_rejects_stale_expectation() {
        let repo = TestRepo::new();
        let first = repo.rev_parse("HEAD");
        let second = repo.commit_file("a.txt", "a\n", "add a");
        let git = repo.git();

        let result = git.update_ref_cas("refs/heads/main", &first, Some(&first), "stale");
        assert!(matches!(result, Err(GitError::CasFailed { .. })));
        assert_eq!(repo.rev_parse("main"), second);

        let result = git.update_ref_cas("refs/heads/main", &first, None, "exists");
        assert!(matches!(result, Err(GitError::CasFailed { .. })));
    }

    #[test]
    fn move_head_follows_branch_or_detached_head() {
        let repo = TestRepo::new();
        let first = repo.rev_parse("HEAD");
        let second = repo.commit_file("a.txt", "a\n", "add a");
        let git = repo.git();

        git.move_head(&first, &second, "back").unwrap();
        assert_eq!(repo.rev_parse("main"), first);
        assert_eq!(git.head_ref().unwrap().unwrap().as_str(), "refs/heads/main");

        run_git(&repo.path(), &["checkout", "--detach"]);
        assert_eq!(git.head_ref().unwrap(), None);
        git.move_head(&second, &first, "forward").unwrap();
        assert_eq!(repo.rev_parse("HEAD"), second);
        assert_eq!(repo.rev_parse("main"), first);
    }
}

// =============================================================================
// Index and Config
// =============================================================================

mod index {
    use super::*;

    #[test]
    fn index_tree_tracks_staged_changes() {
        let repo = TestRepo::new();
        let git = repo.git();
        let head_tree = repo.rev_parse("HEAD^{tree}");

        assert_eq!(git.index_tree().unwrap(), head_tree);

        std::fs::write(repo.path().join("staged.txt"), "staged\n").unwrap();
        run_git(&repo.path(), &["add", "staged.txt"]);

        let staged = repo.git().index_tree().unwrap();
        assert_ne!(staged, head_tree);
        assert_eq!(staged, Oid::new(git_output(&repo.path(), &["write-tree"])).unwrap());
    }

    #[test]
    fn write_index_tree_replaces_staged_content() {
        let repo = TestRepo::new();
        let head_tree = repo.rev_parse("HEAD^{tree}");
        std::fs::write(repo.path().join("staged.txt"), "staged\n").unwrap();
        run_git(&repo.path(), &["add", "staged.txt"]);

        repo.git().write_index_tree(&head_tree).unwrap();

        assert_eq!(git_output(&repo.path(), &["diff", "--cached", "--name-only"]), "");
        // The working tree is untouched
        assert!(repo.path().join("staged.txt").exists());
    }

    #[test]
    fn bool_config_lookup() {
        let repo = TestRepo::new();
        run_git(&repo.path(), &["config", "revise.autoSquash", "true"]);
        let git = repo.git();

        assert_eq!(git.bool_config("revise.autoSquash").unwrap(), Some(true));
        assert_eq!(git.bool_config("revise.reauthor").unwrap(), None);
    }
}
