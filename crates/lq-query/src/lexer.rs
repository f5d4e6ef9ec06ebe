//! Lexical normalization.
//!
//! Rewrites raw input into a single-space-delimited token stream. The stages run
//! in a fixed order, each feeding the next:
//!
//! 1. infix splitting: punctuation such as `(`, `)`, `"`, `|` becomes its own token
//! 2. scope splitting: `title : x` becomes `title: x`; stray colons become spaces
//! 3. prefix splitting: `-word` becomes `- word`
//! 4. whitespace collapse: runs of whitespace become one space, ends are trimmed
//!
//! None of the stages can fail. Input that contains nothing but whitespace
//! normalizes to `None`.

use std::borrow::Cow;

use regex::Captures;

use crate::config::ParserConfig;

/// Applies the normalization stages for one configuration.
pub struct Lexer<'a> {
    /// Configuration supplying split characters and scope names.
    config: &'a ParserConfig,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer for the given configuration.
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    /// Runs all stages, returning `None` when nothing but whitespace remains.
    pub fn normalize(&self, input: &str) -> Option<String> {
        let infixed = self.split_infix(input);
        let scoped = self.split_scopes(&infixed);
        let prefixed = self.split_prefix(&scoped);
        collapse_whitespace(&prefixed)
    }

    /// Normalizes the input and splits it into tokens.
    pub fn tokens(&self, input: &str) -> Vec<String> {
        self.normalize(input)
            .map(|s| s.split(' ').map(String::from).collect())
            .unwrap_or_default()
    }

    /// Surrounds every infix character with spaces.
    fn split_infix(&self, input: &str) -> String {
        let infix = self.config.infix_chars();
        let mut out = String::with_capacity(input.len() + 8);
        for ch in input.chars() {
            if infix.contains(&ch) {
                out.push(' ');
                out.push(ch);
                out.push(' ');
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Rewrites `<scope> :` to a canonical `<scope>: ` token and drops bare colons.
    ///
    /// Only active when scope names are configured.
    fn split_scopes<'s>(&self, input: &'s str) -> Cow<'s, str> {
        let Some(pattern) = self.config.scope_pattern() else {
            return Cow::Borrowed(input);
        };

        pattern.replace_all(input, |caps: &Captures<'_>| match caps.name("name") {
            Some(name) => {
                let canonical = self
                    .config
                    .canonical_scope(name.as_str())
                    .unwrap_or(name.as_str());
                format!(" {canonical}: ")
            }
            None => String::from(" "),
        })
    }

    /// Splits a prefix marker off the word it precedes.
    ///
    /// A marker is split only at the start of a word and only when something
    /// other than whitespace follows it, so `a-b` and a trailing `-` are kept.
    fn split_prefix(&self, input: &str) -> String {
        let prefix = self.config.prefix_chars();
        let mut out = String::with_capacity(input.len() + 8);
        let mut at_word_start = true;
        let mut chars = input.chars().peekable();

        while let Some(ch) = chars.next() {
            out.push(ch);
            let followed_by_word = chars.peek().is_some_and(|next| !next.is_whitespace());
            if at_word_start && prefix.contains(&ch) && followed_by_word {
                out.push(' ');
                // The next character starts a fresh word, so stacked markers
                // (`--a`) are split one by one.
                at_word_start = true;
            } else {
                at_word_start = ch.is_whitespace();
            }
        }
        out
    }
}

/// Collapses whitespace runs to one ASCII space and trims the ends.
fn collapse_whitespace(input: &str) -> Option<String> {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Normalizes a query string with the given configuration.
pub fn normalize(config: &ParserConfig, input: &str) -> Option<String> {
    Lexer::new(config).normalize(input)
}

/// Normalizes a query string and splits it into tokens.
pub fn tokenize(config: &ParserConfig, input: &str) -> Vec<String> {
    Lexer::new(config).tokens(input)
}
