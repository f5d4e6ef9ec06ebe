//! Token matchers.
//!
//! Every token class the parser recognizes (OR, AND, NOT, quotes, parentheses) is
//! described by a [`Matcher`], so the parser never cares whether a class was
//! configured as literal spellings, single characters or a regular expression.

use regex::Regex;

use crate::error::QueryError;

/// Prefix marking a matcher specification as a regular expression.
const PATTERN_PREFIX: &str = "r/";

/// Suffix closing a regular expression specification.
const PATTERN_SUFFIX: &str = "/";

/// Recognizes one class of tokens.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Matches any of the listed spellings exactly.
    Exact(Vec<String>),
    /// Matches a single-character token drawn from the set.
    Chars(Vec<char>),
    /// Matches when the whole token matches the expression.
    Pattern(Regex),
    /// Matches when any inner matcher does.
    Any(Vec<Self>),
}

impl Matcher {
    /// Creates an exact matcher from literal spellings.
    pub fn exact<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exact(tokens.into_iter().map(Into::into).collect())
    }

    /// Creates a matcher for single-character tokens.
    pub fn chars(chars: &[char]) -> Self {
        Self::Chars(chars.to_vec())
    }

    /// Compiles a regular expression anchored to the whole token.
    pub fn pattern(pattern: &str) -> Result<Self, QueryError> {
        Regex::new(&format!("^(?:{pattern})$"))
            .map(Self::Pattern)
            .map_err(|source| QueryError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Parses a single specification.
    ///
    /// `r/.../` denotes a regular expression; anything else is a literal token.
    pub fn parse(spec: &str) -> Result<Self, QueryError> {
        match spec
            .strip_prefix(PATTERN_PREFIX)
            .and_then(|rest| rest.strip_suffix(PATTERN_SUFFIX))
        {
            Some(pattern) => Self::pattern(pattern),
            None => Ok(Self::exact([spec])),
        }
    }

    /// Parses a list of specifications into one matcher.
    ///
    /// Literal spellings are grouped into a single exact matcher that keeps the
    /// order they were listed in.
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self, QueryError> {
        let mut literals = Vec::new();
        let mut patterns = Vec::new();
        for spec in specs {
            match Self::parse(spec.as_ref())? {
                Self::Exact(words) => literals.extend(words),
                other => patterns.push(other),
            }
        }

        if patterns.is_empty() {
            return Ok(Self::Exact(literals));
        }
        let mut all = Vec::with_capacity(patterns.len() + 1);
        if !literals.is_empty() {
            all.push(Self::Exact(literals));
        }
        all.extend(patterns);
        Ok(Self::Any(all))
    }

    /// Returns true if the token belongs to this class.
    pub fn matches(&self, token: &str) -> bool {
        match self {
            Self::Exact(words) => words.iter().any(|w| w == token),
            Self::Chars(chars) => {
                let mut it = token.chars();
                matches!((it.next(), it.next()), (Some(c), None) if chars.contains(&c))
            }
            Self::Pattern(re) => re.is_match(token),
            Self::Any(inner) => inner.iter().any(|m| m.matches(token)),
        }
    }

    /// Returns the preferred literal spelling, if the matcher has one.
    pub fn canonical(&self) -> Option<String> {
        match self {
            Self::Exact(words) => words.first().cloned(),
            Self::Chars(chars) => chars.first().map(char::to_string),
            Self::Pattern(_) => None,
            Self::Any(inner) => inner.iter().find_map(Self::canonical),
        }
    }

    /// Returns the specification strings this matcher was built from.
    pub fn specs(&self) -> Vec<String> {
        match self {
            Self::Exact(words) => words.clone(),
            Self::Chars(chars) => chars.iter().map(char::to_string).collect(),
            Self::Pattern(re) => {
                let anchored = re.as_str();
                let inner = anchored
                    .strip_prefix("^(?:")
                    .and_then(|s| s.strip_suffix(")$"))
                    .unwrap_or(anchored);
                vec![format!("{PATTERN_PREFIX}{inner}{PATTERN_SUFFIX}")]
            }
            Self::Any(inner) => inner.iter().flat_map(Self::specs).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_whole_token() {
        let m = Matcher::exact(["|", "OR"]);
        assert!(m.matches("OR"));
        assert!(m.matches("|"));
        assert!(!m.matches("or"));
        assert!(!m.matches("ORE"));
    }

    #[test]
    fn chars_match_single_character_tokens() {
        let m = Matcher::chars(&['(', '[']);
        assert!(m.matches("("));
        assert!(m.matches("["));
        assert!(!m.matches("(("));
        assert!(!m.matches(""));
    }

    #[test]
    fn pattern_is_anchored() {
        let m = Matcher::pattern("(?i)or").unwrap();
        assert!(m.matches("Or"));
        assert!(!m.matches("word"));
    }

    #[test]
    fn parse_recognizes_pattern_syntax() {
        let m = Matcher::parse("r/[+]+/").unwrap();
        assert!(m.matches("++"));
        assert!(!m.matches("r/[+]+/"));

        let literal = Matcher::parse("AND").unwrap();
        assert!(literal.matches("AND"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = Matcher::parse("r/(/").unwrap_err();
        assert!(matches!(err, QueryError::InvalidPattern { .. }));
    }

    #[test]
    fn from_specs_mixes_literals_and_patterns() {
        let m = Matcher::from_specs(&["|", "r/(?i)or/"]).unwrap();
        assert!(m.matches("|"));
        assert!(m.matches("oR"));
        assert_eq!(m.canonical().as_deref(), Some("|"));
        assert_eq!(m.specs(), vec!["|".to_string(), "r/(?i)or/".to_string()]);
    }

    #[test]
    fn canonical_of_pattern_is_none() {
        let m = Matcher::pattern("x+").unwrap();
        assert_eq!(m.canonical(), None);
    }
}
