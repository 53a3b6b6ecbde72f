//! Splice an edited tree back into its source text
//!
//! Parsed declarations and at-rules carry byte spans. Only the spans whose
//! content changed are rewritten, and a declaration added right after a
//! parsed one is written next to it. Every other byte of the source is kept.

use super::{DeclSpan, Declaration, Node};

struct Edit {
    at: usize,
    end: usize,
    text: String,
}

/// Apply the tree's edits to `original`.
///
/// Returns `None` when a node cannot be placed in the source, such as a
/// declaration built in code with no parsed sibling before it.
pub(super) fn patch(original: &str, nodes: &[Node]) -> Option<String> {
    let mut edits = Vec::new();
    collect(original, nodes, &mut edits)?;
    // stable: copies inserted at the same offset keep tree order
    edits.sort_by_key(|edit| (edit.at, edit.end));

    let mut out = String::with_capacity(original.len() + edits.iter().map(|e| e.text.len()).sum::<usize>());
    let mut cursor = 0;
    for edit in edits {
        if edit.at < cursor {
            return None;
        }
        out.push_str(original.get(cursor..edit.at)?);
        out.push_str(&edit.text);
        cursor = edit.end;
    }
    out.push_str(original.get(cursor..)?);

    Some(out)
}

fn collect(original: &str, nodes: &[Node], edits: &mut Vec<Edit>) -> Option<()> {
    let mut anchor: Option<(&Declaration, DeclSpan)> = None;

    for node in nodes {
        match node {
            Node::Decl(decl) => match decl.span {
                Some(span) => {
                    edits.extend(rewrite(original, decl, span)?);
                    anchor = Some((decl, span));
                }
                None => {
                    let (base, span) = anchor?;
                    edits.push(copy_after(original, base, span, decl)?);
                }
            },
            Node::Rule(rule) => {
                collect(original, &rule.nodes, edits)?;
                anchor = None;
            }
            Node::AtRule(at) => {
                let span = at.params_span.clone()?;
                if original.get(span.clone())? != at.params {
                    edits.push(Edit { at: span.start, end: span.end, text: at.params.clone() });
                }
                if let Some(children) = &at.nodes {
                    collect(original, children, edits)?;
                }
                anchor = None;
            }
            Node::Comment(_) => anchor = None,
        }
    }

    Some(())
}

/// Edit for a parsed declaration whose content changed, if any.
fn rewrite(original: &str, decl: &Declaration, span: DeclSpan) -> Option<Option<Edit>> {
    let prop = original.get(span.start..span.value_start)?.split(':').next()?.trim();
    let was_important = span.value_end < span.end;

    if prop != decl.prop || was_important != decl.important {
        return Some(Some(Edit { at: span.start, end: span.end, text: render(decl) }));
    }

    let value = original.get(span.value_start..span.value_end)?;
    Some((value != decl.value).then(|| Edit {
        at: span.value_start,
        end: span.value_end,
        text: decl.value.clone(),
    }))
}

/// Insert `copy` after the parsed declaration `base`, written the way `base` is.
fn copy_after(original: &str, base: &Declaration, span: DeclSpan, copy: &Declaration) -> Option<Edit> {
    let body = if copy.prop == base.prop && copy.important == base.important {
        let head = original.get(span.start..span.value_start)?;
        let tail = original.get(span.value_end..span.end)?;
        format!("{}{}{}", head, copy.value, tail)
    } else {
        render(copy)
    };

    let indent = indent_before(original, span.start)?;
    let (at, text) = match span.semicolon {
        Some(semicolon) => (semicolon + 1, format!("{}{};", indent, body)),
        None => (span.end, format!(";{}{}", indent, body)),
    };

    Some(Edit { at, end: at, text })
}

fn render(decl: &Declaration) -> String {
    let important = if decl.important { " !important" } else { "" };
    format!("{}: {}{}", decl.prop, decl.value, important)
}

/// Whitespace in front of `at`, from the last line break if there is one.
fn indent_before(original: &str, at: usize) -> Option<&str> {
    let before = original.get(..at)?;
    let whitespace = &before[before.trim_end().len()..];
    Some(match whitespace.rfind('\n') {
        Some(newline) => &whitespace[newline..],
        None => whitespace,
    })
}
