//! Link trees and the parenthesized notation they are written in.
//!
//! A [`Link`] is an optional identifier plus an ordered list of child links.
//! Text is parsed and formatted by the [`links_notation`] crate; this module
//! converts between its [`LiNo`] tree and [`Link`], and knows nothing about
//! [`Value`](crate::Value). The object codec builds and walks these trees.
//!
//! A bare reference becomes a leaf, a parenthesized link becomes a group
//! (named when written `(id: a b)`), and each top-level line is one link.
//!
//! ```rust
//! use lino_codec::link::{format_links, parse, Link};
//!
//! let links = parse("(int 42)").unwrap();
//! assert_eq!(links, vec![Link::group(vec![Link::leaf("int"), Link::leaf("42")])]);
//! assert_eq!(format_links(&links), "(int 42)");
//! ```

use crate::{Error, Result};
use links_notation::LiNo;

/// A node in a link tree.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Link {
    pub id: Option<String>,
    pub values: Vec<Link>,
}

impl Link {
    /// A childless link carrying only an identifier.
    pub fn leaf(id: impl Into<String>) -> Self {
        Link {
            id: Some(id.into()),
            values: Vec::new(),
        }
    }

    /// An anonymous link with the given children.
    pub fn group(values: Vec<Link>) -> Self {
        Link { id: None, values }
    }

    /// A named link with the given children.
    pub fn named(id: impl Into<String>, values: Vec<Link>) -> Self {
        Link {
            id: Some(id.into()),
            values,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.values.is_empty()
    }

    /// Identifier of the first child, if that child has one.
    #[must_use]
    pub fn first_id(&self) -> Option<&str> {
        self.values.first().and_then(|link| link.id.as_deref())
    }

    /// Identifier of the child at `index`, if present.
    #[must_use]
    pub fn child_id(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|link| link.id.as_deref())
    }
}

impl From<LiNo<String>> for Link {
    fn from(lino: LiNo<String>) -> Self {
        match lino {
            LiNo::Ref(id) => Link::leaf(id),
            // `(x)` is a group holding `x`, never the bare reference
            LiNo::Link { id: Some(id), values } if values.is_empty() => {
                Link::group(vec![Link::leaf(id)])
            }
            LiNo::Link { id, values } => Link {
                id,
                values: values.into_iter().map(Link::from).collect(),
            },
        }
    }
}

impl From<&Link> for LiNo<String> {
    fn from(link: &Link) -> Self {
        match (&link.id, link.values.is_empty()) {
            (Some(id), true) => LiNo::Ref(id.clone()),
            (id, _) => LiNo::Link {
                id: id.clone(),
                values: link.values.iter().map(LiNo::from).collect(),
            },
        }
    }
}

/// Parses notation text into its top-level links.
///
/// Blank input yields an empty vector.
///
/// # Errors
///
/// [`Error::Syntax`] for unbalanced parentheses and unterminated quotes,
/// [`Error::Notation`] for anything else the notation parser rejects.
pub fn parse(input: &str) -> Result<Vec<Link>> {
    parse_bounded(input, None)
}

/// [`parse`] that first rejects text nested past what `max_depth`
/// containers can produce.
pub(crate) fn parse_bounded(input: &str, max_depth: Option<usize>) -> Result<Vec<Link>> {
    check_nesting(input, max_depth)?;
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document = links_notation::parse_lino(input).map_err(Error::notation)?;
    let lines = match document {
        LiNo::Link { id: None, values } => values,
        other => vec![other],
    };
    Ok(lines.into_iter().map(top_level).collect())
}

/// A line holding exactly one parenthesized link is that link.
fn top_level(line: LiNo<String>) -> Link {
    match line {
        LiNo::Link { id: None, mut values }
            if values.len() == 1 && matches!(values[0], LiNo::Link { .. }) =>
        {
            Link::from(values.remove(0))
        }
        other => Link::from(other),
    }
}

/// Writes links as notation text, one top-level link per line.
#[must_use]
pub fn format_links(links: &[Link]) -> String {
    links
        .iter()
        .map(format_link)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a single link.
#[must_use]
pub fn format_link(link: &Link) -> String {
    LiNo::from(link).to_string()
}

/// Scans parenthesis nesting without building a tree. Quoted tokens are
/// skipped.
///
/// `d` nested containers take at most `2d + 1` nested parentheses: one per
/// container, one per dict entry, one for the innermost scalar. Anything
/// deeper fails with [`Error::DepthLimitExceeded`] before the recursive
/// parser sees it.
///
/// # Errors
///
/// [`Error::Syntax`] for unbalanced parentheses and unterminated quotes.
fn check_nesting(input: &str, max_depth: Option<usize>) -> Result<()> {
    let max_parens = max_depth.map(|limit| (limit, limit.saturating_mul(2).saturating_add(1)));
    let mut open_at: Vec<(usize, usize)> = Vec::new();
    let mut line = 1;
    let mut col = 0;
    let mut quote: Option<(char, usize, usize)> = None;
    let mut token_start = true;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }

        if let Some((q, ..)) = quote {
            if ch == q {
                if chars.peek() == Some(&q) {
                    chars.next();
                    col += 1;
                } else {
                    quote = None;
                }
            }
            continue;
        }

        match ch {
            '"' | '\'' | '`' if token_start => quote = Some((ch, line, col)),
            '(' => {
                if let Some((limit, max_parens)) = max_parens {
                    if open_at.len() >= max_parens {
                        return Err(Error::DepthLimitExceeded { limit });
                    }
                }
                open_at.push((line, col));
            }
            ')' => {
                if open_at.pop().is_none() {
                    return Err(Error::syntax(line, col, "unexpected ')'"));
                }
            }
            _ => {}
        }
        token_start = ch.is_whitespace() || matches!(ch, '(' | ')' | ':');
    }

    if let Some((q, line, col)) = quote {
        return Err(Error::syntax(line, col, &format!("unterminated {} quote", q)));
    }
    if let Some((line, col)) = open_at.pop() {
        return Err(Error::syntax(line, col, "unclosed '('"));
    }
    Ok(())
}
