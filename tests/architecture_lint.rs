//! Architecture enforcement tests.
//!
//! The layering rules are only useful if CI catches violations:
//!
//! 1. **Single git doorway** - only `src/git/` may use `git2`
//! 2. **Thin CLI** - command handlers never mutate refs, the index or
//!    commit objects themselves; that is the engine's job
//! 3. **Quiet engine** - the engine reports through `ui::output`, never
//!    with raw `println!`/`eprintln!`
//! 4. **No terminal in the engine** - interaction goes through the
//!    `Interact` trait, so the engine never spawns processes

use std::fs;
use std::path::{Path, PathBuf};

/// All `.rs` files below `dir`, recursively.
fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).unwrap_or_else(|_| panic!("Failed to read {}", dir.display())) {
        let path = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().is_some_and(|e| e == "rs") {
            files.push(path);
        }
    }
    files
}

/// The code of a source file before its `#[cfg(test)]` module, without
/// comment lines (doc examples may unwrap freely).
fn non_test_source(path: &Path) -> String {
    let content =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("Failed to read {}", path.display()));
    let code = match content.find("#[cfg(test)]") {
        Some(pos) => &content[..pos],
        None => &content,
    };
    code.lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `file: uses pattern` for every pattern found in non-test code below `dir`.
fn violations(dir: &str, patterns: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for path in rust_files(Path::new(dir)) {
        let name = path.display().to_string();
        let source = non_test_source(&path);
        for pattern in patterns {
            if source.contains(pattern) {
                found.push(format!("{name}: uses `{pattern}`"));
            }
        }
    }
    found
}

// =============================================================================
// Single git doorway
// =============================================================================

#[test]
fn only_git_module_uses_git2() {
    let mut found = Vec::new();
    for dir in ["src/cli", "src/core", "src/engine", "src/ui"] {
        found.extend(violations(dir, &["git2::", "use git2"]));
    }
    for file in ["src/main.rs", "src/lib.rs"] {
        if non_test_source(Path::new(file)).contains("git2") {
            found.push(format!("{file}: uses git2"));
        }
    }

    assert!(
        found.is_empty(),
        "git2 used outside src/git/:\n{}",
        found.join("\n")
    );
}

// =============================================================================
// Thin CLI
// =============================================================================

#[test]
fn commands_do_not_mutate_the_repository() {
    let found = violations(
        "src/cli",
        &[
            "update_ref_cas(",
            "move_head(",
            "write_index_tree(",
            "new_commit(",
            "update_commit(",
            ".rebase(",
        ],
    );

    assert!(
        found.is_empty(),
        "CLI handlers must leave repository changes to the engine:\n{}",
        found.join("\n")
    );
}

// =============================================================================
// Quiet engine
// =============================================================================

#[test]
fn engine_reports_through_output_helpers() {
    let found = violations("src/engine", &["println!", "eprintln!", "print!("]);

    assert!(
        found.is_empty(),
        "engine must report through ui::output:\n{}",
        found.join("\n")
    );
}

#[test]
fn engine_never_spawns_processes() {
    let found = violations("src/engine", &["std::process", "Command::new"]);

    assert!(
        found.is_empty(),
        "engine must go through the Interact trait:\n{}",
        found.join("\n")
    );
}

/// Constant regexes compile with `expect` inside their lazy initializer.
#[test]
fn library_code_does_not_unwrap() {
    let mut found = Vec::new();
    for dir in ["src/core", "src/engine", "src/git", "src/ui", "src/cli"] {
        for path in rust_files(Path::new(dir)) {
            let source = non_test_source(&path).replace(".expect(\"todo entry regex\")", "");
            for pattern in [".unwrap()", ".expect("] {
                if source.contains(pattern) {
                    found.push(format!("{}: uses `{pattern}`", path.display()));
                }
            }
        }
    }

    assert!(
        found.is_empty(),
        "non-test code must propagate errors:\n{}",
        found.join("\n")
    );
}
