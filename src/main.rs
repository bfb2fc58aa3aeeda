//! git-revise binary entry point.

use std::process::ExitCode;

fn main() -> ExitCode {
    match revise::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            revise::ui::output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
