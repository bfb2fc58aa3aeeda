//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Flags
//!
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//!
//! Everything else selects what to revise and how; see [`Cli`].

use clap::Parser;
use std::path::PathBuf;

/// Rewrite, reorder and fold commits without touching the working tree
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "git-revise")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Fold the staged changes into an older commit
    git revise HEAD~2

    # Fold the staged changes and reword the commit
    git revise -e HEAD~2

    # Reorder, squash, reword or split the last three commits
    git revise -i HEAD~3

    # Same, editing whole commit messages in the todo list
    git revise -ie HEAD~3

    # Apply all fixup!/squash! commits since main
    git revise --autosquash main")]
pub struct Cli {
    /// Target commit to apply fixups to (base of the range with -i)
    pub target: Option<String>,

    /// Revise every commit reachable from HEAD, the root commit included
    #[arg(long, conflicts_with = "target")]
    pub root: bool,

    /// Interactively edit the todo list
    #[arg(short, long)]
    pub interactive: bool,

    /// Edit the commit message of the target (with -i: edit whole messages)
    #[arg(short, long)]
    pub edit: bool,

    /// Group fixup!/squash! commits with their targets
    #[arg(long, overrides_with = "no_autosquash")]
    pub autosquash: bool,

    /// Do not group fixup!/squash! commits
    #[arg(long, overrides_with = "autosquash")]
    pub no_autosquash: bool,

    /// Reset the author of rewritten commits to the current user
    #[arg(long)]
    pub reauthor: bool,

    /// Ignore staged changes
    #[arg(long)]
    pub no_index: bool,

    /// Run as if git-revise was started in this directory
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The autosquash choice made on the command line, if any.
    pub fn autosquash_flag(&self) -> Option<bool> {
        if self.autosquash {
            Some(true)
        } else if self.no_autosquash {
            Some(false)
        } else {
            None
        }
    }
}
