//! Config command implementation

use std::process::ExitCode;

use super::{load_options, OptionArgs, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the config command
pub fn run_config(file: Option<&str>, options: &OptionArgs) -> ExitCode {
    let set = match load_options(options) {
        Ok(set) => set,
        Err(code) => return code,
    };

    let Some(effective) = set.select(file) else {
        eprintln!("Error: '{}' is excluded by every option entry", file.unwrap_or_default());
        return ExitCode::from(EXIT_ERROR);
    };

    match serde_json::to_string_pretty(&effective) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to serialize options: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
