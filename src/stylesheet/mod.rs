//! Minimal CSS tree
//!
//! Just enough structure for pixel conversion: rules with selectors,
//! at-rules with raw parameter strings, declarations and comments. Values
//! and selectors are kept as raw text.
//!
//! # Example
//!
//! ```
//! use px2unit::Stylesheet;
//!
//! let sheet = Stylesheet::parse("a { margin: 0 8px; }").unwrap();
//! let decls = sheet.declarations();
//! assert_eq!(decls[0].prop, "margin");
//! assert_eq!(decls[0].value, "0 8px");
//! ```

mod parser;
mod patch;
mod printer;

use std::fmt;
use std::ops::Range;

pub use parser::ParseError;

/// A parsed stylesheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    /// Path of the file this sheet was read from, used for `excludeFiles`
    pub source: Option<String>,
    /// Top-level nodes in document order
    pub nodes: Vec<Node>,
}

/// A node in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Decl(Declaration),
    /// Comment text between `/*` and `*/`
    Comment(String),
}

/// A style rule: `selector { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
}

/// An at-rule: `@name params;` or `@name params { ... }`
///
/// Equality ignores `params_span`.
#[derive(Debug, Clone)]
pub struct AtRule {
    /// Name without the `@`
    pub name: String,
    pub params: String,
    /// `None` for statement at-rules such as `@import`
    pub nodes: Option<Vec<Node>>,
    /// Byte range of `params` in the parsed text; `None` for nodes built in code
    pub params_span: Option<Range<usize>>,
}

impl PartialEq for AtRule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params && self.nodes == other.nodes
    }
}

/// Byte offsets of a parsed declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclSpan {
    /// Start of the property name
    pub start: usize,
    /// Start of the value
    pub value_start: usize,
    /// End of the value, before any `!important`
    pub value_end: usize,
    /// End of the declaration text, before any `;`
    pub end: usize,
    /// Offset of the terminating `;`, if there is one
    pub semicolon: Option<usize>,
}

/// A property declaration
///
/// Equality ignores `span`.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub prop: String,
    /// Value without `!important`
    pub value: String,
    pub important: bool,
    /// Where the declaration was read from; `None` for nodes built in code
    pub span: Option<DeclSpan>,
}

impl PartialEq for Declaration {
    fn eq(&self, other: &Self) -> bool {
        self.prop == other.prop && self.value == other.value && self.important == other.important
    }
}

impl Declaration {
    pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Self { prop: prop.into(), value: value.into(), important: false, span: None }
    }

    /// Mark the declaration `!important`
    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }

    /// Copy of this declaration with a different value. The copy has no span.
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self { prop: self.prop.clone(), value: value.into(), important: self.important, span: None }
    }
}

impl From<Declaration> for Node {
    fn from(decl: Declaration) -> Self {
        Node::Decl(decl)
    }
}

impl Rule {
    pub fn new(selector: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self { selector: selector.into(), nodes }
    }
}

impl Stylesheet {
    /// Parse CSS text
    pub fn parse(css: &str) -> Result<Self, ParseError> {
        let nodes = parser::Parser::new(css).parse()?;
        Ok(Self { source: None, nodes })
    }

    /// Attach the source path
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Serialize back to CSS in normalized form
    pub fn to_css(&self) -> String {
        printer::print(&self.nodes)
    }

    /// Write the tree back over `original`, the text it was parsed from.
    ///
    /// Only changed declaration values and at-rule params are rewritten, and
    /// a declaration added right after a parsed one is spliced in with the
    /// same indentation. Every other byte is kept. Falls back to
    /// [`Stylesheet::to_css`] when the tree holds nodes that cannot be placed
    /// in the original text.
    pub fn patch(&self, original: &str) -> String {
        patch::patch(original, &self.nodes).unwrap_or_else(|| self.to_css())
    }

    /// Every declaration, depth-first in document order
    pub fn declarations(&self) -> Vec<&Declaration> {
        fn collect<'a>(nodes: &'a [Node], out: &mut Vec<&'a Declaration>) {
            for node in nodes {
                match node {
                    Node::Decl(decl) => out.push(decl),
                    Node::Rule(rule) => collect(&rule.nodes, out),
                    Node::AtRule(AtRule { nodes: Some(children), .. }) => collect(children, out),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.nodes, &mut out);
        out
    }

    /// Every at-rule with the given name, depth-first in document order
    pub fn at_rules(&self, name: &str) -> Vec<&AtRule> {
        fn collect<'a>(nodes: &'a [Node], name: &str, out: &mut Vec<&'a AtRule>) {
            for node in nodes {
                match node {
                    Node::AtRule(at) => {
                        if at.name == name {
                            out.push(at);
                        }
                        if let Some(children) = &at.nodes {
                            collect(children, name, out);
                        }
                    }
                    Node::Rule(rule) => collect(&rule.nodes, name, out),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.nodes, name, &mut out);
        out
    }

    /// Visit every at-rule with the given name, depth-first
    pub fn walk_at_rules_mut<F: FnMut(&mut AtRule)>(&mut self, name: &str, mut f: F) {
        fn walk(nodes: &mut [Node], name: &str, f: &mut dyn FnMut(&mut AtRule)) {
            for node in nodes {
                match node {
                    Node::AtRule(at) => {
                        if at.name == name {
                            f(at);
                        }
                        if let Some(children) = at.nodes.as_mut() {
                            walk(children, name, f);
                        }
                    }
                    Node::Rule(rule) => walk(&mut rule.nodes, name, f),
                    _ => {}
                }
            }
        }

        walk(&mut self.nodes, name, &mut f);
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarations_in_document_order() {
        let sheet = Stylesheet::parse(
            "a { top: 1px; } @media print { b { left: 2px; } } @font-face { src: x; } c { right: 3px; }",
        )
        .unwrap();
        let props: Vec<&str> = sheet.declarations().iter().map(|d| d.prop.as_str()).collect();
        assert_eq!(props, vec!["top", "left", "src", "right"]);
    }

    #[test]
    fn test_at_rules_nested() {
        let sheet = Stylesheet::parse(
            "@media (min-width: 1px) { @media (max-width: 2px) { a { b: c; } } } @import 'x.css';",
        )
        .unwrap();
        let params: Vec<&str> = sheet.at_rules("media").iter().map(|a| a.params.as_str()).collect();
        assert_eq!(params, vec!["(min-width: 1px)", "(max-width: 2px)"]);
        assert_eq!(sheet.at_rules("import").len(), 1);
    }

    #[test]
    fn test_walk_at_rules_mut() {
        let mut sheet = Stylesheet::parse("@media screen { @supports (x: y) { } } @media print { }").unwrap();
        let mut seen = 0;
        sheet.walk_at_rules_mut("media", |at| {
            at.params = at.params.to_uppercase();
            seen += 1;
        });
        assert_eq!(seen, 2);
        let params: Vec<&str> = sheet.at_rules("media").iter().map(|a| a.params.as_str()).collect();
        assert_eq!(params, vec!["SCREEN", "PRINT"]);
        assert_eq!(sheet.at_rules("supports")[0].params, "(x: y)");
    }

    #[test]
    fn test_with_value_keeps_important() {
        let decl = Stylesheet::parse("a { width: 10px !important }").unwrap().declarations()[0].clone();
        assert!(decl.span.is_some());
        let copy = decl.with_value("1rem");
        assert_eq!(copy.span, None);
        assert_eq!(copy.prop, "width");
        assert_eq!(copy.value, "1rem");
        assert!(copy.important);
    }

    #[test]
    fn test_equality_ignores_spans() {
        let sheet = Stylesheet::parse("a { width: 10px !important; }").unwrap();
        assert_eq!(sheet.declarations()[0], &Declaration::new("width", "10px").important());
    }

    #[test]
    fn test_patch_without_edits_is_identity() {
        let css = "a{top:1px}\n\n/* keep */\n@media  (min-width:10px)  {\n\tb { left : 2px ; }\n}\n";
        let sheet = Stylesheet::parse(css).unwrap();
        assert_eq!(sheet.patch(css), css);
    }

    #[test]
    fn test_patch_falls_back_for_built_nodes() {
        let css = "a { top: 1px; }";
        let mut sheet = Stylesheet::parse(css).unwrap();
        sheet.nodes.insert(0, Node::Rule(Rule::new("b", vec![Declaration::new("left", "0").into()])));
        assert_eq!(sheet.patch(css), sheet.to_css());
    }

    #[test]
    fn test_display_matches_to_css() {
        let sheet = Stylesheet::parse("a{b:c}").unwrap();
        assert_eq!(sheet.to_string(), sheet.to_css());
    }
}
