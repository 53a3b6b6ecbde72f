//! Stylesheet serialization
//!
//! Output is normalized: two-space indentation, one declaration per line,
//! and a blank line around top-level blocks.

use super::{AtRule, Node};

pub(super) fn print(nodes: &[Node]) -> String {
    let mut out = String::new();

    for (i, node) in nodes.iter().enumerate() {
        if i > 0 && (is_block(node) || is_block(&nodes[i - 1])) {
            out.push('\n');
        }
        write_node(&mut out, node, 0);
    }

    out
}

fn is_block(node: &Node) -> bool {
    matches!(node, Node::Rule(_) | Node::AtRule(AtRule { nodes: Some(_), .. }))
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);

    match node {
        Node::Rule(rule) => {
            out.push_str(&format!("{}{} {{\n", indent, rule.selector));
            write_children(out, &rule.nodes, depth + 1);
            out.push_str(&format!("{}}}\n", indent));
        }
        Node::AtRule(at) => {
            out.push_str(&indent);
            out.push('@');
            out.push_str(&at.name);
            if !at.params.is_empty() {
                out.push(' ');
                out.push_str(&at.params);
            }
            match &at.nodes {
                Some(children) => {
                    out.push_str(" {\n");
                    write_children(out, children, depth + 1);
                    out.push_str(&format!("{}}}\n", indent));
                }
                None => out.push_str(";\n"),
            }
        }
        Node::Decl(decl) => {
            let important = if decl.important { " !important" } else { "" };
            out.push_str(&format!("{}{}: {}{};\n", indent, decl.prop, decl.value, important));
        }
        Node::Comment(text) => out.push_str(&format!("{}/*{}*/\n", indent, text)),
    }
}

fn write_children(out: &mut String, nodes: &[Node], depth: usize) {
    for node in nodes {
        write_node(out, node, depth);
    }
}
