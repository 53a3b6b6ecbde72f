//! Stylesheet transform
//!
//! Walks every declaration in document order and, when enabled, every
//! `@media` rule, converting pixel literals with the effective options.

use serde::{Deserialize, Serialize};

use crate::filter::{selector_is_denylisted, PropMatcher};
use crate::options::{OptionSet, Options};
use crate::pixel::PxReplacer;
use crate::stylesheet::{Node, ParseError, Stylesheet};

/// What a transform run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformReport {
    /// Declarations visited (inserted copies are not visited)
    pub declarations: usize,
    /// Declarations rewritten in place
    pub replaced: usize,
    /// Converted copies inserted after the original
    pub inserted: usize,
    /// Declarations whose property is not in `propList`
    pub skipped_property: usize,
    /// Declarations under a denylisted selector
    pub skipped_selector: usize,
    /// Declarations whose converted form already exists in the rule
    pub skipped_duplicate: usize,
    /// `@media` parameters rewritten
    pub media_queries: usize,
}

impl TransformReport {
    /// Number of edits made to the tree
    pub fn changes(&self) -> usize {
        self.replaced + self.inserted + self.media_queries
    }
}

/// Converter bound to one effective configuration
#[derive(Debug, Clone)]
pub struct Transformer {
    options: Options,
    replacer: PxReplacer,
    props: PropMatcher,
}

impl Transformer {
    /// Compile the pixel replacer and property matcher for `options`
    pub fn new(options: Options) -> Self {
        let replacer = PxReplacer::new(&options);
        let props = PropMatcher::new(&options.prop_list);
        Self { options, replacer, props }
    }

    /// The effective options this transformer was built with
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Convert a single value, ignoring property and selector filters
    pub fn convert_value(&self, value: &str) -> String {
        if value.contains("px") {
            self.replacer.replace_all(value)
        } else {
            value.to_string()
        }
    }

    /// Transform `sheet` in place
    pub fn run(&self, sheet: &mut Stylesheet) -> TransformReport {
        let mut report = TransformReport::default();

        self.walk(&mut sheet.nodes, None, &mut report);

        if self.options.media_query {
            sheet.walk_at_rules_mut("media", |at| {
                if at.params.contains("px") {
                    let params = self.replacer.replace_all(&at.params);
                    if params != at.params {
                        at.params = params;
                        report.media_queries += 1;
                    }
                }
            });
        }

        report
    }

    fn walk(&self, nodes: &mut Vec<Node>, selector: Option<&str>, report: &mut TransformReport) {
        let mut i = 0;

        while i < nodes.len() {
            if matches!(nodes[i], Node::Decl(_)) {
                if self.visit_declaration(nodes, i, selector, report) {
                    // step over the inserted copy
                    i += 1;
                }
            } else {
                match &mut nodes[i] {
                    Node::Rule(rule) => self.walk(&mut rule.nodes, Some(rule.selector.as_str()), report),
                    Node::AtRule(at) => {
                        if let Some(children) = at.nodes.as_mut() {
                            self.walk(children, None, report);
                        }
                    }
                    Node::Decl(_) | Node::Comment(_) => {}
                }
            }
            i += 1;
        }
    }

    /// Returns true if a copy was inserted at `i + 1`
    fn visit_declaration(
        &self,
        nodes: &mut Vec<Node>,
        i: usize,
        selector: Option<&str>,
        report: &mut TransformReport,
    ) -> bool {
        let Node::Decl(decl) = &nodes[i] else {
            return false;
        };
        report.declarations += 1;

        if !decl.value.contains("px") {
            return false;
        }
        if !self.props.matches(&decl.prop) {
            report.skipped_property += 1;
            return false;
        }
        if selector_is_denylisted(selector, &self.options.selector_black_list) {
            report.skipped_selector += 1;
            return false;
        }

        let value = self.replacer.replace_all(&decl.value);

        if declaration_exists(nodes, &decl.prop, &value) {
            report.skipped_duplicate += 1;
            return false;
        }

        if self.options.replace {
            if let Node::Decl(decl) = &mut nodes[i] {
                decl.value = value;
            }
            report.replaced += 1;
            false
        } else {
            let copy = decl.with_value(value);
            nodes.insert(i + 1, Node::Decl(copy));
            report.inserted += 1;
            true
        }
    }
}

fn declaration_exists(nodes: &[Node], prop: &str, value: &str) -> bool {
    nodes.iter().any(|node| matches!(node, Node::Decl(d) if d.prop == prop && d.value == value))
}

/// Transform `sheet` with the options selected for its source path.
///
/// Returns `None` when every option entry excludes the file.
pub fn transform_stylesheet(sheet: &mut Stylesheet, options: &OptionSet) -> Option<TransformReport> {
    let effective = options.select(sheet.source.as_deref())?;
    Some(Transformer::new(effective).run(sheet))
}

/// Result of [`transform_css`]
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    /// Transformed CSS. Text outside the edited values is kept byte for byte.
    pub css: String,
    /// `None` if the file was excluded
    pub report: Option<TransformReport>,
}

impl TransformOutput {
    /// True when the file was transformed and at least one edit was made
    pub fn changed(&self) -> bool {
        self.report.is_some_and(|r| r.changes() > 0)
    }
}

/// Parse and transform CSS text, splicing the edits back into it
///
/// # Example
///
/// ```
/// use px2unit::{transform_css, OptionSet};
///
/// let out = transform_css("h1 { font-size: 32px; }", Some("app.css"), &OptionSet::default()).unwrap();
/// assert_eq!(out.css, "h1 { font-size: 2rem; }");
/// ```
pub fn transform_css(css: &str, source: Option<&str>, options: &OptionSet) -> Result<TransformOutput, ParseError> {
    let mut sheet = Stylesheet::parse(css)?;
    sheet.source = source.map(str::to_string);

    let report = transform_stylesheet(&mut sheet, options);
    let css = match report {
        Some(r) if r.changes() > 0 => sheet.patch(css),
        _ => css.to_string(),
    };

    Ok(TransformOutput { css, report })
}
