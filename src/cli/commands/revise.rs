//! revise command - rewrite history through a todo list
//!
//! # Modes
//!
//! - `git revise TARGET`: fold staged changes into TARGET
//! - `git revise -e TARGET`: same, and edit TARGET's message
//! - `git revise -i TARGET` / `git revise -i --root`: edit a todo list of
//!   every commit after TARGET (or of every commit)
//! - `git revise --autosquash TARGET`: apply fixup!/squash! commits
//!   after TARGET without an editor

use anyhow::{anyhow, bail, Context as _, Result};

use crate::cli::args::Cli;
use crate::core::config::Config;
use crate::core::paths::RevisePaths;
use crate::engine::{
    load_git_settings, run_cycle, Context, EditMode, ReviseMode, ReviseOutcome, ReviseRequest,
};
use crate::git::Git;
use crate::ui::editor::ProcessEditor;
use crate::ui::output::{self, Verbosity};

/// Turn parsed flags and configuration into a revise request.
///
/// Flags win over configuration. Without `-i`, only an explicit
/// `--autosquash` selects autosquash mode; the configured default only
/// applies to interactive sessions.
pub fn build_request(cli: &Cli, config: &Config, verbosity: Verbosity) -> Result<ReviseRequest> {
    let base = || -> Result<Option<String>> {
        if cli.root {
            Ok(None)
        } else {
            cli.target
                .clone()
                .map(Some)
                .ok_or_else(|| anyhow!("<target> is required unless --root is given"))
        }
    };

    let autosquash = cli.autosquash_flag();
    let mode = if cli.interactive {
        ReviseMode::Interactive {
            base: base()?,
            edit_mode: if cli.edit || config.msgedit() {
                EditMode::MessageEdit
            } else {
                EditMode::LineWise
            },
            autosquash: autosquash.unwrap_or_else(|| config.autosquash()),
        }
    } else if autosquash == Some(true) {
        ReviseMode::Autosquash { base: base()? }
    } else {
        if cli.root {
            bail!("--root requires --interactive or --autosquash");
        }
        let target = cli
            .target
            .clone()
            .ok_or_else(|| anyhow!("<target> is a required argument"))?;
        ReviseMode::Target {
            target,
            edit: cli.edit,
        }
    };

    Ok(ReviseRequest {
        mode,
        reauthor: cli.reauthor || config.reauthor(),
        use_index: !cli.no_index,
        head_on_top: config.head_on_top(),
        verbosity,
    })
}

/// Run one revise in the repository containing the working directory.
pub fn revise(cli: &Cli, ctx: &Context) -> Result<()> {
    let verbosity = ctx.verbosity();
    let cwd = match &ctx.cwd {
        Some(cwd) => cwd.clone(),
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    let git = Git::open(&cwd).context("Failed to open repository")?;
    let paths = RevisePaths::from_repo_info(&git.info()?);

    let settings = load_git_settings(&git).context("Failed to read git config")?;
    let config = Config::load(Some(&paths))
        .context("Failed to load configuration")?
        .with_git_settings(settings);
    if let Some(path) = config.global_config_loaded_from() {
        output::debug(format!("global config: {}", path.display()), verbosity);
    }
    if let Some(path) = config.repo_config_loaded_from() {
        output::debug(format!("repo config: {}", path.display()), verbosity);
    }

    let request = build_request(cli, &config, verbosity)?;
    output::debug(format!("{:?}", request.mode), verbosity);

    let editor = ProcessEditor::new(&git, &config).context("Failed to resolve the editor")?;
    output::debug(
        format!(
            "editor: {}, sequence editor: {}",
            editor.editor(),
            editor.sequence_editor()
        ),
        verbosity,
    );

    match run_cycle(&git, &editor, &request)? {
        ReviseOutcome::Rewritten { old, new } => {
            output::debug(format!("{} -> {}", old.short(), new.short()), verbosity);
        }
        ReviseOutcome::Unchanged => {}
    }
    Ok(())
}
