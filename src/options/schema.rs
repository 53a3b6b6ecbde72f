//! Option types
//!
//! `RawOptions` is what a caller or config file supplies: every field is
//! optional. `Options` is the merged, validated result used by the converter.

use serde::{Deserialize, Serialize};

use crate::pattern::MatchRule;
use crate::pixel::PxReplace;

/// Default target unit
pub const DEFAULT_UNIT: &str = "rem";
/// Default root font size in pixels
pub const DEFAULT_ROOT_VALUE: f64 = 16.0;
/// Default number of decimals kept
pub const DEFAULT_UNIT_PRECISION: u32 = 5;
/// Largest accepted `unitPrecision`; an `f64` carries no more decimals than this
pub const MAX_UNIT_PRECISION: u32 = 20;
/// Properties converted when no `propList` is given
pub const DEFAULT_PROP_LIST: [&str; 4] = ["font", "font-size", "line-height", "letter-spacing"];

/// Effective conversion options for one stylesheet
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Unit appended to converted values
    pub unit: String,
    /// Pixels per output unit
    pub root_value: f64,
    /// Decimals kept after rounding
    pub unit_precision: u32,
    /// Rules whose selector matches any entry are left alone
    pub selector_black_list: Vec<MatchRule>,
    /// Property filter, see [`crate::filter::PropMatcher`]
    pub prop_list: Vec<String>,
    /// Overwrite values in place instead of adding a fallback-preserving copy
    pub replace: bool,
    /// Also convert `@media` parameters
    pub media_query: bool,
    /// Literals smaller than this (in pixels) are kept
    pub min_pixel_value: f64,
    /// Files whose path matches any entry are skipped
    pub exclude_files: Vec<MatchRule>,
    /// Custom replacement hook
    #[serde(skip)]
    pub px_replace: Option<PxReplace>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            unit: DEFAULT_UNIT.to_string(),
            root_value: DEFAULT_ROOT_VALUE,
            unit_precision: DEFAULT_UNIT_PRECISION,
            selector_black_list: Vec::new(),
            prop_list: DEFAULT_PROP_LIST.iter().map(|s| s.to_string()).collect(),
            replace: true,
            media_query: false,
            min_pixel_value: 0.0,
            exclude_files: Vec::new(),
            px_replace: None,
        }
    }
}

impl Options {
    /// Check value ranges, returning one message per problem
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.root_value.is_finite() && self.root_value > 0.0) {
            errors.push(format!("rootValue must be a positive number, got {}", self.root_value));
        }
        if self.unit_precision > MAX_UNIT_PRECISION {
            errors.push(format!(
                "unitPrecision must be at most {}, got {}",
                MAX_UNIT_PRECISION, self.unit_precision
            ));
        }
        if !self.min_pixel_value.is_finite() {
            errors.push(format!("minPixelValue must be a finite number, got {}", self.min_pixel_value));
        }
        if self.unit.trim().is_empty() {
            errors.push("unit must not be empty".to_string());
        }

        errors
    }

    /// True if `path` matches an `excludeFiles` entry
    pub fn excludes(&self, path: &str) -> bool {
        crate::pattern::any_match(&self.exclude_files, path)
    }
}

/// Caller-supplied options; unset fields fall back to [`Options::default`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector_black_list: Option<Vec<MatchRule>>,
    #[serde(default, alias = "prop_list", skip_serializing_if = "Option::is_none")]
    pub prop_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_query: Option<bool>,
    #[serde(default, alias = "min_pixel_value", skip_serializing_if = "Option::is_none")]
    pub min_pixel_value: Option<f64>,
    #[serde(default, alias = "exclude_files", skip_serializing_if = "Option::is_none")]
    pub exclude_files: Option<Vec<MatchRule>>,
    #[serde(skip)]
    pub px_replace: Option<PxReplace>,
}

impl RawOptions {
    /// Merge onto the defaults, field by field
    pub fn resolve(&self) -> Options {
        let defaults = Options::default();
        Options {
            unit: self.unit.clone().unwrap_or(defaults.unit),
            root_value: self.root_value.unwrap_or(defaults.root_value),
            unit_precision: self.unit_precision.unwrap_or(defaults.unit_precision),
            selector_black_list: self
                .selector_black_list
                .clone()
                .unwrap_or(defaults.selector_black_list),
            prop_list: self.prop_list.clone().unwrap_or(defaults.prop_list),
            replace: self.replace.unwrap_or(defaults.replace),
            media_query: self.media_query.unwrap_or(defaults.media_query),
            min_pixel_value: self.min_pixel_value.unwrap_or(defaults.min_pixel_value),
            exclude_files: self.exclude_files.clone().unwrap_or(defaults.exclude_files),
            px_replace: self.px_replace.clone().or(defaults.px_replace),
        }
    }
}
