//! Stylesheet parser
//!
//! A forgiving single-pass scanner. Strings, comments and parentheses are
//! respected when looking for `;`, `{` and `}`, so `url(data:...;base64,...)`
//! and `content: "}"` do not split statements.

use thiserror::Error;

use super::{AtRule, DeclSpan, Declaration, Node, Rule};

/// Stylesheet syntax error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A `{` without a matching `}`
    #[error("line {line}: unclosed block")]
    UnclosedBlock { line: usize },
    /// A `/*` without a matching `*/`
    #[error("line {line}: unclosed comment")]
    UnclosedComment { line: usize },
    /// A quote without a matching quote
    #[error("line {line}: unclosed string")]
    UnclosedString { line: usize },
    /// A `}` with no open block
    #[error("line {line}: unexpected '}}'")]
    UnexpectedClose { line: usize },
    /// A statement that is neither a rule nor `prop: value`
    #[error("line {line}: expected 'property: value', found '{text}'")]
    MissingColon { line: usize, text: String },
}

pub(super) struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0 }
    }

    pub(super) fn parse(mut self) -> Result<Vec<Node>, ParseError> {
        self.parse_nodes(None)
    }

    fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn line_at(&self, pos: usize) -> usize {
        self.bytes[..pos.min(self.bytes.len())].iter().filter(|&&b| b == b'\n').count() + 1
    }

    fn skip_whitespace(&mut self) {
        while !self.eof() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn starts_comment(&self, at: usize) -> bool {
        self.bytes.get(at) == Some(&b'/') && self.bytes.get(at + 1) == Some(&b'*')
    }

    /// Parse nodes until end of input (`open` is `None`) or the `}` closing
    /// the block opened at byte offset `open`.
    fn parse_nodes(&mut self, open: Option<usize>) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();

        loop {
            self.skip_whitespace();

            if self.eof() {
                return match open {
                    Some(at) => Err(ParseError::UnclosedBlock { line: self.line_at(at) }),
                    None => Ok(nodes),
                };
            }

            if self.starts_comment(self.pos) {
                nodes.push(Node::Comment(self.parse_comment()?));
                continue;
            }

            match self.bytes[self.pos] {
                b'}' => {
                    if open.is_none() {
                        return Err(ParseError::UnexpectedClose { line: self.line_at(self.pos) });
                    }
                    self.pos += 1;
                    return Ok(nodes);
                }
                b';' => self.pos += 1,
                b'@' => nodes.push(self.parse_at_rule()?),
                _ => nodes.push(self.parse_rule_or_declaration()?),
            }
        }
    }

    fn parse_comment(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let body_start = start + 2;
        match self.src[body_start..].find("*/") {
            Some(offset) => {
                let body_end = body_start + offset;
                self.pos = body_end + 2;
                Ok(self.src[body_start..body_end].to_string())
            }
            None => Err(ParseError::UnclosedComment { line: self.line_at(start) }),
        }
    }

    fn parse_at_rule(&mut self) -> Result<Node, ParseError> {
        self.pos += 1; // '@'
        let name_start = self.pos;
        while !self.eof() {
            let b = self.bytes[self.pos];
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let name = self.src[name_start..self.pos].to_string();

        let (end, terminator) = self.scan_statement(self.pos)?;
        let raw = &self.src[self.pos..end];
        let params_start = self.pos + (raw.len() - raw.trim_start().len());
        let params = raw.trim().to_string();
        let params_span = params_start..params_start + params.len();

        let nodes = match terminator {
            Some(b'{') => {
                self.pos = end + 1;
                Some(self.parse_nodes(Some(end))?)
            }
            Some(b';') => {
                self.pos = end + 1;
                None
            }
            _ => {
                self.pos = end;
                None
            }
        };

        Ok(Node::AtRule(AtRule { name, params, nodes, params_span: Some(params_span) }))
    }

    fn parse_rule_or_declaration(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        let (end, terminator) = self.scan_statement(start)?;
        let text = &self.src[start..end];

        if terminator == Some(b'{') {
            self.pos = end + 1;
            let nodes = self.parse_nodes(Some(end))?;
            return Ok(Node::Rule(Rule::new(text.trim(), nodes)));
        }

        let semicolon = (terminator == Some(b';')).then_some(end);
        self.pos = if semicolon.is_some() { end + 1 } else { end };
        self.parse_declaration(start, end, semicolon).map(Node::Decl)
    }

    /// Split `src[start..end]` into property, value and `!important`,
    /// keeping the byte offsets of each part.
    fn parse_declaration(
        &self,
        start: usize,
        end: usize,
        semicolon: Option<usize>,
    ) -> Result<Declaration, ParseError> {
        let text = &self.src[start..end];
        let trimmed = text.trim();
        let Some((prop, rest)) = trimmed.split_once(':') else {
            let line = self.line_at(start);
            return Err(ParseError::MissingColon { line, text: trimmed.to_string() });
        };

        let decl_start = start + (text.len() - text.trim_start().len());
        let value_start = decl_start + prop.len() + 1 + (rest.len() - rest.trim_start().len());
        let (value, important) = split_important(rest.trim());

        Ok(Declaration {
            prop: prop.trim().to_string(),
            value: value.to_string(),
            important,
            span: Some(DeclSpan {
                start: decl_start,
                value_start,
                value_end: value_start + value.len(),
                end: decl_start + trimmed.len(),
                semicolon,
            }),
        })
    }

    /// Find the first top-level `;`, `{` or `}` at or after `from`.
    ///
    /// Returns its offset and the byte, or the input length and `None`.
    fn scan_statement(&self, from: usize) -> Result<(usize, Option<u8>), ParseError> {
        let mut i = from;
        let mut depth = 0usize;

        while i < self.bytes.len() {
            match self.bytes[i] {
                quote @ (b'"' | b'\'') => i = self.skip_string(i, quote)?,
                b'/' if self.starts_comment(i) => match self.src[i + 2..].find("*/") {
                    Some(offset) => i += 2 + offset + 2,
                    None => return Err(ParseError::UnclosedComment { line: self.line_at(i) }),
                },
                b'(' => {
                    depth += 1;
                    i += 1;
                }
                b')' => {
                    depth = depth.saturating_sub(1);
                    i += 1;
                }
                b @ (b';' | b'{' | b'}') if depth == 0 => return Ok((i, Some(b))),
                _ => i += 1,
            }
        }

        Ok((self.bytes.len(), None))
    }

    /// Skip a quoted string starting at `start`; returns the offset after the
    /// closing quote.
    fn skip_string(&self, start: usize, quote: u8) -> Result<usize, ParseError> {
        let mut i = start + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b if b == quote => return Ok(i + 1),
                _ => i += 1,
            }
        }
        Err(ParseError::UnclosedString { line: self.line_at(start) })
    }
}

fn split_important(value: &str) -> (&str, bool) {
    if let Some(bang) = value.rfind('!') {
        if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
            return (value[..bang].trim_end(), true);
        }
    }
    (value, false)
}
