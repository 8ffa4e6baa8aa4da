//! rf - regionforge command-line entry point

use std::process::ExitCode;

fn main() -> ExitCode {
    match regionforge::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            regionforge::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
