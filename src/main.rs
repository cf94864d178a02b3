//! Questcard - Command-line tool for item catalogs and quest infographics

use std::process::ExitCode;

use questcard::cli;

fn main() -> ExitCode {
    cli::run()
}
