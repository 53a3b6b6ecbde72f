//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod config;
mod convert;
mod init;
mod value;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::options::{load_config, CliOverrides, ConfigError, OptionSet};
use crate::pattern::MatchRule;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Check if a path has a `.css` extension
pub fn is_css_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("css"))
}

/// Find all `.css` files in a directory (recursively), sorted by path
pub fn find_css_files(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/**/*.css", dir.display());
    let mut files: Vec<PathBuf> = match glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).filter(|p| p.is_file()).collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

/// px2unit - convert px lengths in CSS to rem (or another unit)
#[derive(Parser)]
#[command(name = "px2unit")]
#[command(about = "px2unit - Convert pixel lengths in CSS to rem or another linear unit")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert stylesheets
    Convert {
        /// Input files, directories (searched for *.css) or glob patterns.
        /// Reads stdin when omitted and stdin is not a terminal.
        inputs: Vec<String>,

        /// Output file, or directory when converting several files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite input files
        #[arg(long)]
        in_place: bool,

        /// Write nothing; exit with 1 if any file would change
        #[arg(long)]
        check: bool,

        /// Read CSS from stdin
        #[arg(long)]
        stdin: bool,

        /// Path used for excludeFiles matching when reading stdin
        #[arg(long)]
        stdin_path: Option<String>,

        /// Append a JSONL line per processed file to this log
        #[arg(long)]
        report: Option<PathBuf>,

        /// Number of parallel jobs (default: number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Convert a single value, e.g. `px2unit value "0 16px"`
    Value {
        /// CSS value or media query text
        text: String,

        /// File path used to select the option entry
        #[arg(long)]
        file: Option<String>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Print the effective options for a file as JSON
    Config {
        /// File path used to select the option entry
        #[arg(long)]
        file: Option<String>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Create a px2unit.toml with the default options
    Init {
        /// Directory to create the file in
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing px2unit.toml
        #[arg(long)]
        force: bool,
    },
}

/// Option loading and per-run overrides shared by several commands
#[derive(Args, Debug, Default, Clone)]
pub struct OptionArgs {
    /// Config file (.toml, .json or .json5); defaults to the nearest px2unit.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not look for px2unit.toml; start from the defaults
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,

    /// Target unit
    #[arg(long)]
    pub unit: Option<String>,

    /// Pixels per target unit
    #[arg(long)]
    pub root_value: Option<f64>,

    /// Decimals kept after rounding
    #[arg(long)]
    pub unit_precision: Option<u32>,

    /// Property filter, comma separated (e.g. '*,!border*')
    #[arg(long, value_delimiter = ',')]
    pub prop_list: Option<Vec<String>>,

    /// Selectors to leave alone, comma separated; /regex/ for patterns
    #[arg(long, value_delimiter = ',')]
    pub selector_black_list: Option<Vec<String>>,

    /// Replace values in place (true) or add a converted copy (false)
    #[arg(long)]
    pub replace: Option<bool>,

    /// Also convert @media parameters
    #[arg(long)]
    pub media_query: bool,

    /// Leave literals below this many pixels unconverted
    #[arg(long)]
    pub min_pixel_value: Option<f64>,

    /// Files to skip, comma separated; /regex/ for patterns
    #[arg(long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,
}

fn parse_rules(args: &Option<Vec<String>>) -> Result<Option<Vec<MatchRule>>, ConfigError> {
    args.as_ref()
        .map(|list| {
            list.iter()
                .map(|arg| {
                    MatchRule::from_arg(arg)
                        .map_err(|e| ConfigError::Shape(format!("invalid pattern '{}': {}", arg, e)))
                })
                .collect()
        })
        .transpose()
}

impl OptionArgs {
    /// Convert flags into overrides
    pub fn overrides(&self) -> Result<CliOverrides, ConfigError> {
        Ok(CliOverrides {
            unit: self.unit.clone(),
            root_value: self.root_value,
            unit_precision: self.unit_precision,
            selector_black_list: parse_rules(&self.selector_black_list)?,
            prop_list: self.prop_list.clone(),
            replace: self.replace,
            media_query: self.media_query.then_some(true),
            min_pixel_value: self.min_pixel_value,
            exclude_files: parse_rules(&self.exclude)?,
        })
    }

    /// Load the option set and apply overrides
    pub fn load(&self) -> Result<OptionSet, ConfigError> {
        let mut set = if self.no_config { OptionSet::default() } else { load_config(self.config.as_deref())? };
        set.apply_overrides(&self.overrides()?)?;
        Ok(set)
    }
}

/// Load options or report the error; shared by the command implementations
pub(crate) fn load_options(options: &OptionArgs) -> Result<OptionSet, ExitCode> {
    options.load().map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert { inputs, output, in_place, check, stdin, stdin_path, report, jobs, options } => {
            convert::run_convert(
                &inputs,
                output.as_deref(),
                in_place,
                check,
                stdin,
                stdin_path.as_deref(),
                report.as_deref(),
                jobs,
                &options,
            )
        }
        Commands::Value { text, file, options } => value::run_value(&text, file.as_deref(), &options),
        Commands::Config { file, options } => config::run_config(file.as_deref(), &options),
        Commands::Init { dir, force } => init::run_init(&dir, force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_is_css_file() {
        assert!(is_css_file(Path::new("a/b.css")));
        assert!(is_css_file(Path::new("B.CSS")));
        assert!(!is_css_file(Path::new("a.scss")));
        assert!(!is_css_file(Path::new("css")));
    }

    #[test]
    fn test_find_css_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("a.css"), "").unwrap();
        fs::write(temp.path().join("nested/b.css"), "").unwrap();
        fs::write(temp.path().join("c.txt"), "").unwrap();

        let files = find_css_files(temp.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_css_file(f)));
    }

    #[test]
    fn test_option_args_overrides() {
        let cli = Cli::try_parse_from([
            "px2unit",
            "value",
            "16px",
            "--root-value",
            "8",
            "--prop-list",
            "*,!border*",
            "--selector-black-list",
            "ignore,/^html$/",
            "--replace",
            "false",
            "--media-query",
        ])
        .unwrap();
        let Commands::Value { options, .. } = cli.command else { panic!("expected value command") };

        let overrides = options.overrides().unwrap();
        assert_eq!(overrides.root_value, Some(8.0));
        assert_eq!(overrides.prop_list, Some(vec!["*".to_string(), "!border*".to_string()]));
        assert_eq!(
            overrides.selector_black_list,
            Some(vec![MatchRule::literal("ignore"), MatchRule::pattern("^html$").unwrap()])
        );
        assert_eq!(overrides.replace, Some(false));
        assert_eq!(overrides.media_query, Some(true));
        assert_eq!(overrides.unit, None);
    }

    #[test]
    fn test_option_args_bad_pattern() {
        let options = OptionArgs { exclude: Some(vec!["/(/".to_string()]), ..Default::default() };
        assert!(matches!(options.overrides(), Err(ConfigError::Shape(_))));
    }

    #[test]
    fn test_option_args_load_explicit_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("opts.json5");
        fs::write(&path, "{ rootValue: 10 }").unwrap();

        let options = OptionArgs { config: Some(path), unit: Some("em".to_string()), ..Default::default() };
        let set = options.load().unwrap();
        let effective = set.select(None).unwrap();
        assert_eq!(effective.root_value, 10.0);
        assert_eq!(effective.unit, "em");
    }
}
