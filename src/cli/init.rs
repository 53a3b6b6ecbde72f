//! Init command implementation

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::options::CONFIG_FILE_NAME;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Starter config with every option at its default
const CONFIG_TEMPLATE: &str = r#"# px2unit configuration
#
# For several option entries use [[options]] tables instead; a file gets the
# last entry whose excludeFiles does not match its path.

# Unit written after converted numbers
unit = "rem"

# Pixels per unit
rootValue = 16

# Decimals kept after rounding
unitPrecision = 5

# Properties to convert: exact names, "*", "foo*", "*foo", "*foo*", "!foo"
propList = ["font", "font-size", "line-height", "letter-spacing"]

# Rules whose selector contains one of these are skipped; { pattern = "..." } for a regex
selectorBlackList = []

# false keeps the px declaration and adds the converted one after it
replace = true

# Also convert px inside @media parameters
mediaQuery = false

# px values below this are left alone
minPixelValue = 0

# Files to skip; substrings or { pattern = "..." }
excludeFiles = []
"#;

/// Execute the init command
pub fn run_init(dir: &Path, force: bool) -> ExitCode {
    let path = dir.join(CONFIG_FILE_NAME);

    if path.exists() && !force {
        eprintln!("Error: '{}' already exists", path.display());
        eprintln!("Use --force to overwrite it");
        return ExitCode::from(EXIT_ERROR);
    }

    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("Error: Failed to create directory '{}': {}", dir.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    match fs::write(&path, CONFIG_TEMPLATE) {
        Ok(()) => {
            println!("Created {}", path.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to write '{}': {}", path.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
