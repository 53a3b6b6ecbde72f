//! Conversion options
//!
//! Provides option types, legacy key translation, per-file selection from an
//! ordered option set, and `px2unit.toml` loading.

pub mod legacy;
pub mod loader;
pub mod schema;
pub mod set;

pub use loader::{
    find_config, load_config, load_config_file, parse_config_str, ConfigError, ConfigFormat, CONFIG_FILE_NAME,
};
pub use schema::*;
pub use set::{CliOverrides, OptionSet};
