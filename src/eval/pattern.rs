//! Wildcard path patterns with numbered captures.
//!
//! `*` matches any run of characters other than a path separator and `?`
//! exactly one such character. Every wildcard is a capture; rename rules refer
//! to the n-th capture as `?n` (or `!n` for a second pattern), n in `1..=9`.

use crate::util::{HdEvalError, HdEvalResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Literal(char),
    Star,
    One,
}

/// Parsed wildcard pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WildcardPattern {
    source: String,
    tokens: Vec<Token>,
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

impl WildcardPattern {
    /// Parses `pattern`; every character other than `*` and `?` is literal.
    pub fn new(pattern: &str) -> Self {
        let tokens = pattern
            .chars()
            .map(|c| match c {
                '*' => Token::Star,
                '?' => Token::One,
                other => Token::Literal(other),
            })
            .collect();
        Self {
            source: pattern.to_string(),
            tokens,
        }
    }

    /// The pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern contains any wildcard.
    pub fn has_wildcards(&self) -> bool {
        self.tokens.iter().any(|t| !matches!(t, Token::Literal(_)))
    }

    /// Whether `text` matches the whole pattern.
    pub fn matches(&self, text: &str) -> bool {
        self.captures(text).is_some()
    }

    /// Returns the wildcard captures for `text`, preferring longer leading
    /// `*` matches, or `None` if `text` does not match.
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        let chars: Vec<char> = text.chars().collect();
        let mut caps = Vec::new();
        if match_from(&self.tokens, 0, &chars, 0, &mut caps) {
            Some(caps)
        } else {
            None
        }
    }

    /// Rewrites `text`, which must match this pattern, through `rule`.
    ///
    /// `{marker}n` in `rule` is replaced by the n-th capture; a marker
    /// followed by anything other than a digit `1..=9` is kept as is. A rule
    /// without markers is returned verbatim.
    pub fn rename(&self, text: &str, rule: &str, marker: char) -> HdEvalResult<String> {
        if !rule.contains(marker) {
            return Ok(rule.to_string());
        }
        let caps = self
            .captures(text)
            .ok_or_else(|| HdEvalError::PatternMismatch {
                pattern: self.source.clone(),
                path: text.to_string(),
            })?;

        let mut out = String::with_capacity(rule.len());
        let mut chars = rule.chars().peekable();
        while let Some(c) = chars.next() {
            if c != marker {
                out.push(c);
                continue;
            }
            match chars.peek().and_then(|d| d.to_digit(10)) {
                Some(n) if n >= 1 => {
                    chars.next();
                    let cap = caps.get(n as usize - 1).ok_or(HdEvalError::InvalidConfig {
                        reason: "rename rule refers to a wildcard the pattern does not have",
                    })?;
                    out.push_str(cap);
                }
                _ => out.push(c),
            }
        }
        Ok(out)
    }
}

fn match_from(
    tokens: &[Token],
    ti: usize,
    text: &[char],
    xi: usize,
    caps: &mut Vec<String>,
) -> bool {
    let Some(&token) = tokens.get(ti) else {
        return xi == text.len();
    };
    match token {
        Token::Literal(c) => {
            text.get(xi) == Some(&c) && match_from(tokens, ti + 1, text, xi + 1, caps)
        }
        Token::One => match text.get(xi) {
            Some(&c) if !is_separator(c) => {
                caps.push(c.to_string());
                if match_from(tokens, ti + 1, text, xi + 1, caps) {
                    return true;
                }
                caps.pop();
                false
            }
            _ => false,
        },
        Token::Star => {
            let run_end = text[xi..]
                .iter()
                .position(|&c| is_separator(c))
                .map_or(text.len(), |p| xi + p);
            for end in (xi..=run_end).rev() {
                caps.push(text[xi..end].iter().collect());
                if match_from(tokens, ti + 1, text, end, caps) {
                    return true;
                }
                caps.pop();
            }
            false
        }
    }
}
