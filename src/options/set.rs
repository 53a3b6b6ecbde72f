//! Ordered option sets and per-file selection

use serde_json::Value;

use super::legacy::normalize_legacy_keys;
use super::loader::ConfigError;
use super::schema::{Options, RawOptions};
use crate::pattern::MatchRule;

impl RawOptions {
    /// Decode one option record, translating legacy keys first
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(mut map) = value else {
            return Err(ConfigError::Shape(format!("expected an options object, got {}", value)));
        };
        normalize_legacy_keys(&mut map);
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

/// Option values given on the command line, applied to every entry of a set
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub unit: Option<String>,
    pub root_value: Option<f64>,
    pub unit_precision: Option<u32>,
    pub selector_black_list: Option<Vec<MatchRule>>,
    pub prop_list: Option<Vec<String>>,
    pub replace: Option<bool>,
    pub media_query: Option<bool>,
    pub min_pixel_value: Option<f64>,
    pub exclude_files: Option<Vec<MatchRule>>,
}

impl CliOverrides {
    fn apply(&self, raw: &mut RawOptions) {
        if let Some(unit) = &self.unit {
            raw.unit = Some(unit.clone());
        }
        if let Some(root_value) = self.root_value {
            raw.root_value = Some(root_value);
        }
        if let Some(precision) = self.unit_precision {
            raw.unit_precision = Some(precision);
        }
        if let Some(list) = &self.selector_black_list {
            raw.selector_black_list = Some(list.clone());
        }
        if let Some(list) = &self.prop_list {
            raw.prop_list = Some(list.clone());
        }
        if let Some(replace) = self.replace {
            raw.replace = Some(replace);
        }
        if let Some(media_query) = self.media_query {
            raw.media_query = Some(media_query);
        }
        if let Some(min) = self.min_pixel_value {
            raw.min_pixel_value = Some(min);
        }
        if let Some(list) = &self.exclude_files {
            raw.exclude_files = Some(list.clone());
        }
    }
}

/// Ordered candidate options.
///
/// For a given file the **last** entry whose `excludeFiles` does not match
/// the file path is the effective one.
#[derive(Debug, Clone)]
pub struct OptionSet {
    entries: Vec<RawOptions>,
}

impl Default for OptionSet {
    /// A single entry with every option at its default
    fn default() -> Self {
        Self { entries: vec![RawOptions::default()] }
    }
}

impl From<RawOptions> for OptionSet {
    fn from(raw: RawOptions) -> Self {
        Self { entries: vec![raw] }
    }
}

impl OptionSet {
    /// Build a set, validating every entry
    pub fn new(entries: Vec<RawOptions>) -> Result<Self, ConfigError> {
        let set = Self { entries };
        set.validate()?;
        Ok(set)
    }

    /// Decode a set from an object, an array, or `{ "options": [...] }`
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) if matches!(map.get("options"), Some(Value::Array(_))) => {
                match map.remove("options") {
                    Some(Value::Array(items)) if map.is_empty() => items,
                    _ => {
                        return Err(ConfigError::Shape(
                            "'options' cannot be mixed with top-level option keys".to_string(),
                        ))
                    }
                }
            }
            other => vec![other],
        };

        let entries = items.into_iter().map(RawOptions::from_value).collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let multiple = self.entries.len() > 1;
        let errors: Vec<String> = self
            .entries
            .iter()
            .enumerate()
            .flat_map(|(i, raw)| {
                raw.resolve().validate().into_iter().map(move |e| {
                    if multiple {
                        format!("options[{}]: {}", i, e)
                    } else {
                        e
                    }
                })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Number of candidate entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the set has no entries (nothing will ever be selected)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw entries, in order
    pub fn entries(&self) -> &[RawOptions] {
        &self.entries
    }

    /// Apply command-line overrides to every entry
    pub fn apply_overrides(&mut self, overrides: &CliOverrides) -> Result<(), ConfigError> {
        for raw in &mut self.entries {
            overrides.apply(raw);
        }
        self.validate()
    }

    /// Pick the effective options for `file_path`.
    ///
    /// Returns `None` when every entry excludes the file or the set is empty.
    /// A stylesheet without a path (stdin) is never excluded.
    pub fn select(&self, file_path: Option<&str>) -> Option<Options> {
        let mut selected = None;

        for raw in &self.entries {
            let options = raw.resolve();
            if file_path.is_some_and(|path| options.excludes(path)) {
                continue;
            }
            selected = Some(options);
        }

        selected
    }
}
