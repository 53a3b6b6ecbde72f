//! Pixel literal matching and conversion
//!
//! Finds `<number>px` literals in a CSS value (or media query) and rewrites
//! them as `<number / root_value><unit>`. Quoted strings and `url(...)` are
//! copied through untouched.
//!
//! # Example
//!
//! ```
//! use px2unit::{convert, Options};
//!
//! let options = Options::default();
//! assert_eq!(convert("16px", &options), "1rem");
//! assert_eq!(convert("0 15px", &options), "0 0.9375rem");
//! assert_eq!(convert("0px", &options), "0");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::options::{Options, MAX_UNIT_PRECISION};

/// A replacement function: pixel value in, replacement text out
pub type PxReplaceFn = Arc<dyn Fn(f64) -> String + Send + Sync>;

/// Custom replacement hook.
///
/// The factory is called once with the effective options. Returning
/// `Some(f)` makes `f` the conversion for every literal in the file (the
/// built-in rounding and `minPixelValue` threshold no longer apply).
/// Returning `None` keeps the built-in conversion.
#[derive(Clone)]
pub struct PxReplace(Arc<dyn Fn(&Options) -> Option<PxReplaceFn> + Send + Sync>);

impl PxReplace {
    /// Wrap a replacement factory
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Options) -> Option<PxReplaceFn> + Send + Sync + 'static,
    {
        Self(Arc::new(factory))
    }

    /// Shorthand for a hook that always replaces with `f`
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        let f: PxReplaceFn = Arc::new(f);
        Self::new(move |_| Some(Arc::clone(&f)))
    }

    fn resolve(&self, options: &Options) -> Option<PxReplaceFn> {
        (self.0)(options)
    }
}

impl fmt::Debug for PxReplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PxReplace(..)")
    }
}

/// Strings and `url()` are matched first so their contents are skipped.
/// Group 1 is the signed number of a pixel literal.
const PX_PATTERN: &str = r#""[^"]*"|'[^']*'|url\([^)]*\)|([-+]?\d*\.?\d+)px"#;

fn px_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PX_PATTERN).expect("pixel pattern is a valid regex"))
}

#[derive(Clone)]
enum Strategy {
    Builtin { root_value: f64, unit_precision: u32, min_pixel_value: f64, unit: String },
    Custom(PxReplaceFn),
}

/// Converter bound to one effective configuration
#[derive(Clone)]
pub struct PxReplacer {
    strategy: Strategy,
}

impl fmt::Debug for PxReplacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.strategy {
            Strategy::Builtin { root_value, unit_precision, min_pixel_value, unit } => f
                .debug_struct("PxReplacer")
                .field("root_value", root_value)
                .field("unit_precision", unit_precision)
                .field("min_pixel_value", min_pixel_value)
                .field("unit", unit)
                .finish(),
            Strategy::Custom(_) => f.write_str("PxReplacer(custom)"),
        }
    }
}

impl PxReplacer {
    /// Build the converter for `options`, consulting the `px_replace` hook
    pub fn new(options: &Options) -> Self {
        if let Some(custom) = options.px_replace.as_ref().and_then(|hook| hook.resolve(options)) {
            return Self { strategy: Strategy::Custom(custom) };
        }

        Self {
            strategy: Strategy::Builtin {
                root_value: options.root_value,
                unit_precision: options.unit_precision,
                min_pixel_value: options.min_pixel_value,
                unit: options.unit.clone(),
            },
        }
    }

    /// Replace every pixel literal in `text`
    pub fn replace_all(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in px_regex().captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&text[last..whole.start()]);

            match caps.get(1) {
                Some(number) if is_standalone(text, whole.start(), whole.end()) => {
                    out.push_str(&self.replace_literal(whole.as_str(), number.as_str()));
                }
                _ => out.push_str(whole.as_str()),
            }

            last = whole.end();
        }

        out.push_str(&text[last..]);
        out
    }

    fn replace_literal(&self, matched: &str, number: &str) -> String {
        let Ok(pixels) = number.parse::<f64>() else {
            return matched.to_string();
        };

        match &self.strategy {
            Strategy::Custom(f) => f(pixels),
            Strategy::Builtin { root_value, unit_precision, min_pixel_value, unit } => {
                if pixels.abs() < *min_pixel_value {
                    return matched.to_string();
                }
                let fixed = to_fixed(pixels / root_value, *unit_precision);
                if fixed == 0.0 {
                    "0".to_string()
                } else {
                    format!("{}{}", fixed, unit)
                }
            }
        }
    }
}

/// A literal must not continue an identifier on the left (`h1px`, `a-2px`)
/// or run into letters on the right (`2pxs`).
fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_alphabetic()) && !after.is_some_and(|c| c.is_ascii_alphabetic())
}

/// Round to `precision` decimals.
///
/// Truncates at one extra digit first, then rounds that digit half-up, so
/// values such as `0.9375` are not disturbed by binary representation error.
/// Halves round toward positive infinity, negative values included.
/// `precision` is capped at [`MAX_UNIT_PRECISION`].
pub fn to_fixed(number: f64, precision: u32) -> f64 {
    let exponent = precision.min(MAX_UNIT_PRECISION) as i32 + 1;
    let multiplier = 10f64.powi(exponent);
    let whole = (number * multiplier).floor();
    round_half_up(whole / 10.0) * 10.0 / multiplier
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Convert every pixel literal in `text` using `options`
pub fn convert(text: &str, options: &Options) -> String {
    PxReplacer::new(options).replace_all(text)
}
