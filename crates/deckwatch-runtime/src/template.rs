//! Bracket-token templating.
//!
//! A template is free-form text with token lists such as `[TWR, ACCEL]`.
//! [`render`] replaces every delimited list with the resolved values joined by
//! a single space.  Text outside delimiters is copied verbatim.
//!
//! # Quoting
//!
//! Delimiters and the separator are single characters read from TOML
//! strings, so a backslash is configured as `"\\"`.  There is no in-template
//! escape: a start delimiter with no end delimiter after it is passed
//! through unchanged, as is everything after it.

use std::mem::discriminant;

use serde::{Deserialize, Serialize};

/// Delimiter configuration for templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSyntax {
    pub start: char,
    pub end: char,
    pub separator: char,
    /// Prefix of the surface-selector token, e.g. `SURFACE=2`.
    pub surface_prefix: String,
}

impl Default for TemplateSyntax {
    fn default() -> Self {
        Self {
            start: '[',
            end: ']',
            separator: ',',
            surface_prefix: "SURFACE=".to_string(),
        }
    }
}

/// A recognized template token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Twr,
    Accel,
    CanHover,
    StopDist,
    BrakeDist,
    AltDist,
    Earthlike,
    Pertram,
    /// Marks a light as a beacon.  Renders as nothing.
    Rotating,
    /// 1-based surface selector.  `None` when the prefix is not followed by a
    /// digit.  Renders as nothing.
    Surface(Option<u8>),
}

impl Token {
    /// Parse one trimmed sub-token, ignoring ASCII case.
    pub fn parse(raw: &str, syntax: &TemplateSyntax) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        let prefix = syntax.surface_prefix.to_ascii_uppercase();
        if !prefix.is_empty() && upper.starts_with(&prefix) {
            let index = upper[prefix.len()..]
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
                .map(|d| d as u8);
            return Some(Token::Surface(index));
        }
        let token = match upper.as_str() {
            "TWR" => Token::Twr,
            "ACCEL" => Token::Accel,
            "CANHOVER" => Token::CanHover,
            "STOPDIST" => Token::StopDist,
            "BRAKEDIST" => Token::BrakeDist,
            "ALTDIST" => Token::AltDist,
            "EARTHLIKE" => Token::Earthlike,
            "PERTRAM" => Token::Pertram,
            "ROTATING" => Token::Rotating,
            _ => return None,
        };
        Some(token)
    }
}

/// Produces the display string for a recognized token.
pub trait TokenResolver {
    fn resolve(&self, token: Token) -> String;
}

/// Render every delimited token list in `template`.
///
/// # Example
///
/// ```
/// use deckwatch_runtime::template::{render, TemplateSyntax, Token, TokenResolver};
///
/// struct Fixed;
/// impl TokenResolver for Fixed {
///     fn resolve(&self, token: Token) -> String {
///         format!("{token:?}")
///     }
/// }
///
/// let out = render("TWR: [twr, accel]!", &TemplateSyntax::default(), &Fixed);
/// assert_eq!(out, "TWR: Twr Accel!");
/// ```
pub fn render(template: &str, syntax: &TemplateSyntax, resolver: &dyn TokenResolver) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((before, inner, after)) = next_span(rest, syntax) {
        out.push_str(before);
        out.push_str(&expand_token_list(inner, syntax, resolver));
        rest = after;
    }
    out.push_str(rest);
    out
}

/// Recognized tokens in `template`, upper-cased and de-duplicated by kind.
///
/// Two surface selectors with different indices count as one token; the
/// first one wins.
pub fn extract_tokens(template: &str, syntax: &TemplateSyntax) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut rest = template;
    while let Some((_, inner, after)) = next_span(rest, syntax) {
        for token in inner
            .split(syntax.separator)
            .filter_map(|raw| Token::parse(raw, syntax))
        {
            if !tokens.iter().any(|t| discriminant(t) == discriminant(&token)) {
                tokens.push(token);
            }
        }
        rest = after;
    }
    tokens
}

/// Drop every line that mentions `identifier` (ASCII case-insensitive) and
/// remove carriage returns.
pub fn strip_identifier_lines(text: &str, identifier: &str) -> String {
    let needle = identifier.to_ascii_lowercase();
    text.replace('\r', "")
        .split('\n')
        .filter(|line| needle.is_empty() || !line.to_ascii_lowercase().contains(&needle))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `text` around its next delimited span: `(before, inner, after)`.
fn next_span<'t>(text: &'t str, syntax: &TemplateSyntax) -> Option<(&'t str, &'t str, &'t str)> {
    let start = text.find(syntax.start)?;
    let body = &text[start + syntax.start.len_utf8()..];
    let end = body.find(syntax.end)?;
    Some((
        &text[..start],
        &body[..end],
        &body[end + syntax.end.len_utf8()..],
    ))
}

fn expand_token_list(inner: &str, syntax: &TemplateSyntax, resolver: &dyn TokenResolver) -> String {
    inner
        .split(syntax.separator)
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| match Token::parse(raw, syntax) {
            Some(token) => resolver.resolve(token),
            None => format!("Unrecognized argument token {{{raw}}}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
