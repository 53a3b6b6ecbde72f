//! px2unit - rewrite pixel lengths in CSS into rem (or any linear unit)
//!
//! This library provides:
//! - Pixel literal conversion with precision control and a minimum threshold
//! - Property (`propList`) and selector denylist filtering
//! - Ordered option sets with per-file exclusion and legacy key support
//! - A minimal stylesheet tree and the transform that walks it, writing
//!   edits back without reformatting the rest of the file
//!
//! ```
//! use px2unit::{transform_css, OptionSet, RawOptions};
//!
//! let options = OptionSet::from(RawOptions {
//!     prop_list: Some(vec!["*".to_string()]),
//!     ..Default::default()
//! });
//! let out = transform_css(".a { margin: 8px 16px; }", Some("a.css"), &options).unwrap();
//! assert_eq!(out.css, ".a { margin: 0.5rem 1rem; }");
//! ```

pub mod cli;
pub mod filter;
pub mod options;
pub mod pattern;
pub mod pixel;
pub mod report;
pub mod stylesheet;
pub mod transform;

pub use filter::{selector_is_denylisted, PropMatcher};
pub use options::{CliOverrides, ConfigError, OptionSet, Options, RawOptions};
pub use pattern::MatchRule;
pub use pixel::{convert, PxReplace, PxReplaceFn, PxReplacer};
pub use stylesheet::{ParseError, Stylesheet};
pub use transform::{transform_css, transform_stylesheet, TransformOutput, TransformReport, Transformer};
