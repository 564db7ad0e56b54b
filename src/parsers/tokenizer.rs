//! Line tokenizer for `.tlog` text.
//!
//! Each physical line is trimmed, cut at the first `#`, and split on
//! whitespace. Lines left with no tokens are dropped. The physical line
//! number is kept so diagnostics can point back into the file.

use rayon::prelude::*;

/// One non-empty line of whitespace-separated tokens
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenLine {
    number: usize,
    tokens: Vec<String>,
}

impl TokenLine {
    /// Tokenize a single physical line. Returns `None` for blank and
    /// comment-only lines.
    pub fn from_raw(number: usize, raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let content = match trimmed.find('#') {
            Some(idx) => &trimmed[..idx],
            None => trimmed,
        };

        let tokens: Vec<String> = content.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return None;
        }

        Some(Self { number, tokens })
    }

    /// 1-based physical line number
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// First token. Token lines are never empty.
    pub fn head(&self) -> &str {
        &self.tokens[0]
    }

    /// Tokens after the first
    pub fn rest(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// True if any token is exactly `token`
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl std::fmt::Display for TokenLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Split file contents into token lines, preserving file order
pub fn tokenize(contents: &str) -> Vec<TokenLine> {
    let raw_lines: Vec<&str> = contents.lines().collect();

    raw_lines
        .par_iter()
        .enumerate()
        .filter_map(|(idx, raw)| TokenLine::from_raw(idx + 1, raw))
        .collect()
}
