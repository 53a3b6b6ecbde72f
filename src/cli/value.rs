//! Value command implementation

use std::process::ExitCode;

use crate::transform::Transformer;

use super::{load_options, OptionArgs, EXIT_SUCCESS};

/// Execute the value command
pub fn run_value(text: &str, file: Option<&str>, options: &OptionArgs) -> ExitCode {
    let set = match load_options(options) {
        Ok(set) => set,
        Err(code) => return code,
    };

    match set.select(file) {
        Some(effective) => println!("{}", Transformer::new(effective).convert_value(text)),
        None => {
            eprintln!("Warning: '{}' is excluded by every option entry", file.unwrap_or_default());
            println!("{}", text);
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
