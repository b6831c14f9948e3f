//! Handler doc comment parsing.
//!
//! A doc comment is normalized into [`AnnotationLine`]s: comment leaders and
//! `*` markers are stripped and empty lines dropped. The first text line is
//! the title, the text lines that follow it (up to the first tag) are the
//! extended description, and every `@input` / `@output` line anywhere in the
//! block is parsed as a [`Directive`].
//!
//! Directive grammar, tokens separated by whitespace:
//!
//! ```text
//! directive  := ("@input" | "@output") type [name]
//! type       := scalar | structured
//! scalar     := any token without '\'        (name is mandatory)
//! structured := any token containing '\'     (name is optional)
//! ```

use crate::error::{Error, Result};
use log::debug;

/// Scalar type keywords understood by the example generator.
///
/// Unknown keywords are kept verbatim in [`ScalarType::Other`] and documented
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Other(String),
}

impl ScalarType {
    pub fn parse(token: &str) -> Self {
        match token {
            "string" => ScalarType::String,
            "integer" => ScalarType::Integer,
            "float" => ScalarType::Float,
            "boolean" => ScalarType::Boolean,
            "array" => ScalarType::Array,
            other => ScalarType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Boolean => "boolean",
            ScalarType::Array => "array",
            ScalarType::Other(token) => token,
        }
    }
}

/// The type token of a directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeToken {
    Scalar(ScalarType),
    /// Fully-qualified structured type identifier, as written
    Structured(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Input,
    Output,
}

impl DirectiveKind {
    /// Keyword as written in a doc comment
    pub fn keyword(&self) -> &'static str {
        match self {
            DirectiveKind::Input => "@input",
            DirectiveKind::Output => "@output",
        }
    }
}

/// A parsed `@input` / `@output` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub type_token: TypeToken,
    /// Always present for scalars; optional for structured types
    pub field_name: Option<String>,
    /// 1-based line within the doc comment
    pub line: usize,
}

/// One normalized, non-empty doc comment line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationLine {
    /// Free text; never starts with `@`
    Text(String),
    Directive(Directive),
    /// Any other `@` tag (`@param`, `@return`, ...), ignored by the generator
    Tag(String),
}

/// Result of parsing one handler doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    /// First text line with trailing periods stripped
    pub title: Option<String>,
    /// Text lines following the title, up to the first tag
    pub details: Vec<String>,
    /// All directives in source order
    pub directives: Vec<Directive>,
}

impl DocBlock {
    /// Operation description: the title, then a blank line and the details.
    pub fn description(&self) -> String {
        match (&self.title, self.details.is_empty()) {
            (None, _) => String::new(),
            (Some(title), true) => title.clone(),
            (Some(title), false) => format!("{}\n\n{}", title, self.details.join("\n")),
        }
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Directive> {
        self.directives
            .iter()
            .filter(|d| d.kind == DirectiveKind::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Directive> {
        self.directives
            .iter()
            .filter(|d| d.kind == DirectiveKind::Output)
    }
}

/// Doc comment parser
pub struct AnnotationParser;

impl AnnotationParser {
    /// Parse a raw doc comment (with or without `/** */` delimiters).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDirective`] for the first `@input` / `@output`
    /// line that does not match the directive grammar.
    pub fn parse(doc_comment: &str) -> Result<DocBlock> {
        let lines = Self::lines(doc_comment)?;

        let mut block = DocBlock::default();
        let mut iter = lines.into_iter().peekable();

        if let Some(AnnotationLine::Text(first)) = iter.peek() {
            block.title = Some(first.trim_end_matches('.').to_string());
            iter.next();

            while let Some(AnnotationLine::Text(line)) = iter.peek() {
                block.details.push(line.clone());
                iter.next();
            }
        }

        for line in iter {
            match line {
                AnnotationLine::Directive(directive) => block.directives.push(directive),
                AnnotationLine::Tag(tag) => debug!("Ignoring tag: {}", tag),
                AnnotationLine::Text(_) => {}
            }
        }

        debug!(
            "Parsed doc block: title={:?}, {} directive(s)",
            block.title,
            block.directives.len()
        );
        Ok(block)
    }

    /// Normalize and classify every non-empty line of a doc comment.
    pub fn lines(doc_comment: &str) -> Result<Vec<AnnotationLine>> {
        let mut result = Vec::new();

        for (index, raw) in doc_comment.lines().enumerate() {
            let line_no = index + 1;
            let Some((offset, content)) = normalize(raw) else {
                continue;
            };

            let tokens = tokenize(content, raw[..offset].chars().count() + 1);
            let keyword = tokens[0].1;

            let kind = match keyword {
                "@input" => Some(DirectiveKind::Input),
                "@output" => Some(DirectiveKind::Output),
                _ => None,
            };

            let line = match kind {
                Some(kind) => AnnotationLine::Directive(parse_directive(kind, &tokens, content, line_no)?),
                None if keyword.starts_with('@') => AnnotationLine::Tag(content.to_string()),
                None => AnnotationLine::Text(content.to_string()),
            };
            result.push(line);
        }

        Ok(result)
    }
}

/// Strip comment delimiters and `*` markers. Returns the byte offset of the
/// content within `raw` and the content itself, or `None` for blank lines.
fn normalize(raw: &str) -> Option<(usize, &str)> {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("/**") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("/*") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("*/") {
        s = rest;
    }
    let s = s.trim_start_matches('*').trim();

    if s.is_empty() {
        return None;
    }

    // `s` is a subslice of `raw`
    let offset = s.as_ptr() as usize - raw.as_ptr() as usize;
    Some((offset, s))
}

/// Whitespace tokens paired with their 1-based column in the raw line.
fn tokenize(content: &str, first_column: usize) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in content.char_indices() {
        match (c.is_whitespace(), start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                tokens.push((s, &content[s..i]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push((s, &content[s..]));
    }

    tokens
        .into_iter()
        .map(|(byte, token)| (first_column + content[..byte].chars().count(), token))
        .collect()
}

fn parse_directive(
    kind: DirectiveKind,
    tokens: &[(usize, &str)],
    content: &str,
    line: usize,
) -> Result<Directive> {
    let malformed = |column: usize, reason: String| Error::MalformedDirective {
        line,
        column,
        directive: content.to_string(),
        reason,
    };

    let end_column = |(column, token): (usize, &str)| column + token.chars().count();

    let Some(&(_, type_str)) = tokens.get(1) else {
        return Err(malformed(
            end_column(tokens[0]),
            format!("expected a type after `{}`", kind.keyword()),
        ));
    };

    let type_token = if type_str.contains('\\') {
        TypeToken::Structured(type_str.to_string())
    } else {
        TypeToken::Scalar(ScalarType::parse(type_str))
    };

    let field_name = tokens.get(2).map(|&(_, name)| name.to_string());

    if let TypeToken::Scalar(_) = type_token {
        if field_name.is_none() {
            return Err(malformed(
                end_column(tokens[1]),
                format!("expected a field name after scalar type `{}`", type_str),
            ));
        }
    }

    if let Some(&(column, extra)) = tokens.get(3) {
        return Err(malformed(column, format!("unexpected token `{}`", extra)));
    }

    Ok(Directive {
        kind,
        type_token,
        field_name,
        line,
    })
}
