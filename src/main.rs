//! px2unit - command-line tool for converting CSS pixel lengths to rem

use std::process::ExitCode;

use px2unit::cli;

fn main() -> ExitCode {
    cli::run()
}
