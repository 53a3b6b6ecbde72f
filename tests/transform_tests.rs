//! Library-level transform tests
//!
//! Exercises option selection, filtering and the duplicate guard through the
//! public API.

use std::fs;
use std::path::Path;

use px2unit::options::{load_config_file, parse_config_str, ConfigFormat};
use px2unit::{
    transform_css, MatchRule, OptionSet, Options, PxReplace, RawOptions, Stylesheet, Transformer,
};

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/css").join(name);
    fs::read_to_string(path).unwrap()
}

fn all_props() -> RawOptions {
    RawOptions { prop_list: Some(vec!["*".to_string()]), ..Default::default() }
}

fn convert(css: &str, options: RawOptions) -> String {
    transform_css(css, None, &OptionSet::from(options)).unwrap().css
}

// ============================================================================
// Fixtures
// ============================================================================

#[test]
fn test_fixture_stylesheet() {
    let config = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/css/px2unit.json5");
    let options = load_config_file(&config).unwrap();

    let out = transform_css(&fixture("input.css"), Some("input.css"), &options).unwrap();
    assert_eq!(out.css, fixture("expected.css"));

    let report = out.report.unwrap();
    assert_eq!(report.replaced, 4);
    assert_eq!(report.skipped_property, 1);
    assert_eq!(report.skipped_selector, 1);
    assert_eq!(report.media_queries, 1);
}

#[test]
fn test_fixture_output_is_stable() {
    let config = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/css/px2unit.json5");
    let options = load_config_file(&config).unwrap();

    let out = transform_css(&fixture("expected.css"), None, &options).unwrap();
    assert!(!out.changed());
    assert_eq!(out.css, fixture("expected.css"));
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_values_converted() {
    let css = ".a { margin: 0 0 20px 20px; font-size: 15px; top: -32px; }";
    assert_eq!(
        convert(css, all_props()),
        ".a { margin: 0 0 1.25rem 1.25rem; font-size: 0.9375rem; top: -2rem; }"
    );
}

#[test]
fn test_untouched_formatting_survives() {
    let css = "a{color:red}\n\n\n.b { font-size: 16px }\n/* note */\n@import url(x.css);\n";
    assert_eq!(
        convert(css, RawOptions::default()),
        "a{color:red}\n\n\n.b { font-size: 1rem }\n/* note */\n@import url(x.css);\n"
    );
}

#[test]
fn test_px_in_strings_and_urls_untouched() {
    let css = ".a { content: \"16px\"; background: url(img-16px.png) 16px 0; }";
    assert_eq!(
        convert(css, all_props()),
        ".a { content: \"16px\"; background: url(img-16px.png) 1rem 0; }"
    );
}

#[test]
fn test_uppercase_px_untouched() {
    let css = ".a { width: 32PX; }";
    assert_eq!(convert(css, all_props()), css);
}

#[test]
fn test_unit_precision_and_min_pixel_value() {
    let options = RawOptions { unit_precision: Some(2), min_pixel_value: Some(2.0), ..all_props() };
    assert_eq!(
        convert(".a { border: 1px solid; padding: 3px; }", options),
        ".a { border: 1px solid; padding: 0.19rem; }"
    );
}

#[test]
fn test_custom_unit_and_root_value() {
    let options = RawOptions { unit: Some("vw".to_string()), root_value: Some(3.75), ..all_props() };
    assert_eq!(convert(".a { width: 75px; }", options), ".a { width: 20vw; }");
}

#[test]
fn test_px_replace_hook() {
    let options = RawOptions {
        px_replace: Some(PxReplace::with(|px| format!("calc({} * var(--px))", px))),
        ..all_props()
    };
    assert_eq!(convert(".a { top: 4px; }", options), ".a { top: calc(4 * var(--px)); }");
}

// ============================================================================
// Property and selector filters
// ============================================================================

#[test]
fn test_prop_list_wildcards_and_negation() {
    let options = RawOptions {
        prop_list: Some(vec!["*".to_string(), "!border*".to_string(), "!*-radius".to_string()]),
        ..Default::default()
    };
    let css = ".a { margin: 16px; border-width: 16px; corner-radius: 16px; }";
    assert_eq!(
        convert(css, options),
        ".a { margin: 1rem; border-width: 16px; corner-radius: 16px; }"
    );
}

#[test]
fn test_prop_list_exact_negation_beats_wildcard() {
    let options = RawOptions {
        prop_list: Some(vec!["*position*".to_string(), "!background-position".to_string()]),
        ..Default::default()
    };
    let css = ".a { background-position: 16px; mask-position: 16px; }";
    assert_eq!(convert(css, options), ".a { background-position: 16px; mask-position: 1rem; }");
}

#[test]
fn test_selector_black_list_regex() {
    let options = RawOptions {
        selector_black_list: Some(vec![MatchRule::pattern("^body$").unwrap()]),
        ..all_props()
    };
    let css = "body { top: 16px; } body .a { top: 16px; }";
    assert_eq!(convert(css, options), "body { top: 16px; } body .a { top: 1rem; }");
}

// ============================================================================
// Replace vs insert
// ============================================================================

#[test]
fn test_insert_mode_keeps_fallback() {
    let options = RawOptions { replace: Some(false), ..all_props() };
    assert_eq!(convert(".a { top: 16px; }", options), ".a { top: 16px; top: 1rem; }");
}

#[test]
fn test_duplicate_guard_both_modes() {
    let css = ".a { font-size: 16px; font-size: 1rem; }";
    for replace in [true, false] {
        let options = RawOptions { replace: Some(replace), ..Default::default() };
        let out = transform_css(css, None, &OptionSet::from(options)).unwrap();
        assert_eq!(out.css, css);
        assert_eq!(out.report.unwrap().skipped_duplicate, 1);
    }
}

#[test]
fn test_insert_mode_multiline_copy_keeps_indent() {
    let options = RawOptions { replace: Some(false), ..all_props() };
    let css = ".a {\n    margin: 0 8px;\n    color: red;\n}\n";
    assert_eq!(convert(css, options), ".a {\n    margin: 0 8px;\n    margin: 0 0.5rem;\n    color: red;\n}\n");
}

#[test]
fn test_second_run_changes_nothing() {
    let set = OptionSet::from(all_props());
    let first = transform_css(".a { margin: 8px; }", None, &set).unwrap();
    let second = transform_css(&first.css, None, &set).unwrap();
    assert!(first.changed());
    assert!(!second.changed());
}

// ============================================================================
// Option sets
// ============================================================================

#[test]
fn test_last_non_excluded_entry_wins() {
    let set = parse_config_str(
        r#"[
            { "rootValue": 10, "propList": ["*"] },
            { "rootValue": 20, "propList": ["*"], "excludeFiles": ["legacy/"] }
        ]"#,
        ConfigFormat::Json,
    )
    .unwrap();

    let css = ".a { top: 40px; }";
    assert_eq!(transform_css(css, Some("src/a.css"), &set).unwrap().css, ".a { top: 2rem; }");
    assert_eq!(transform_css(css, Some("legacy/a.css"), &set).unwrap().css, ".a { top: 4rem; }");
    // no path: nothing is excluded
    assert_eq!(transform_css(css, None, &set).unwrap().css, ".a { top: 2rem; }");
}

#[test]
fn test_every_entry_excluded() {
    let set = OptionSet::from(RawOptions {
        exclude_files: Some(vec![MatchRule::pattern(r"\.min\.css$").unwrap()]),
        ..all_props()
    });
    let out = transform_css(".a { top: 16px; }", Some("dist/app.min.css"), &set).unwrap();
    assert_eq!(out.report, None);
    assert_eq!(out.css, ".a { top: 16px; }");
}

#[test]
fn test_legacy_keys() {
    let set = parse_config_str(
        r#"{ "root_value": 10, "unit_precision": 1, "prop_white_list": ["width"], "media_query": true }"#,
        ConfigFormat::Json,
    )
    .unwrap();
    let css = "@media (max-width: 100px) { .a { width: 15px; height: 15px; } }";
    assert_eq!(
        transform_css(css, None, &set).unwrap().css,
        "@media (max-width: 10rem) { .a { width: 1.5rem; height: 15px; } }"
    );
}

#[test]
fn test_legacy_empty_white_list_means_all() {
    let set = parse_config_str(r#"{ "prop_white_list": [] }"#, ConfigFormat::Json).unwrap();
    let css = ".a { height: 16px; }";
    assert_eq!(transform_css(css, None, &set).unwrap().css, ".a { height: 1rem; }");
}

#[test]
fn test_unknown_option_rejected() {
    assert!(parse_config_str(r#"{ "rootvalue": 10 }"#, ConfigFormat::Json).is_err());
}

#[test]
fn test_invalid_root_value_rejected() {
    assert!(parse_config_str("rootValue = 0\n", ConfigFormat::Toml).is_err());
}

// ============================================================================
// Tree API
// ============================================================================

#[test]
fn test_transformer_on_parsed_tree() {
    let mut sheet = Stylesheet::parse(".a { font-size: 20px; }").unwrap().with_source("a.css");
    let report = Transformer::new(Options::default()).run(&mut sheet);
    assert_eq!(report.replaced, 1);
    assert_eq!(sheet.declarations()[0].value, "1.25rem");
}
