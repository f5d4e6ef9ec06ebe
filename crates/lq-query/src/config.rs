//! Parser and normalizer configuration.
//!
//! A [`ParserConfig`] is built once through [`ParserConfigBuilder`] and never
//! changes afterwards, so one configuration can be shared by parsers running on
//! different threads. [`Policy`] holds the tree normalizer's switches.

use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{ast::Connective, error::QueryError, matcher::Matcher};

/// Operators known to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// Negation.
    Not,
    /// Named scope prefix.
    Scope,
}

impl OperatorKind {
    /// Unary operators take their operand from the right only.
    pub fn is_unary(self) -> bool {
        matches!(self, Self::Not | Self::Scope)
    }
}

impl From<Connective> for OperatorKind {
    fn from(op: Connective) -> Self {
        match op {
            Connective::And => Self::And,
            Connective::Or => Self::Or,
        }
    }
}

impl FromStr for OperatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            "not" => Ok(Self::Not),
            "scope" => Ok(Self::Scope),
            other => Err(format!("unknown operator: {other}")),
        }
    }
}

/// Binding strength of each operator. Higher binds tighter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precedence {
    /// Explicit entries.
    table: BTreeMap<OperatorKind, i32>,
    /// Used for operators without an entry.
    fallback: i32,
}

impl Precedence {
    /// Creates an empty table where every operator has the fallback precedence.
    pub fn new(fallback: i32) -> Self {
        Self {
            table: BTreeMap::new(),
            fallback,
        }
    }

    /// Default table for the given default operator.
    ///
    /// The default operator gets the lowest precedence so that implicit
    /// conjunctions or disjunctions never split an explicit operator.
    pub fn for_default(default: Connective) -> Self {
        let (low, high) = match default {
            Connective::And => (OperatorKind::And, OperatorKind::Or),
            Connective::Or => (OperatorKind::Or, OperatorKind::And),
        };
        Self::new(30).with(low, 10).with(high, 20).with(OperatorKind::Not, 30)
    }

    /// Sets the precedence of one operator.
    pub fn with(mut self, kind: OperatorKind, value: i32) -> Self {
        self.table.insert(kind, value);
        self
    }

    /// Returns the precedence of an operator.
    pub fn get(&self, kind: OperatorKind) -> i32 {
        self.table.get(&kind).copied().unwrap_or(self.fallback)
    }
}

impl Default for Precedence {
    fn default() -> Self {
        Self::for_default(Connective::And)
    }
}

/// Rewrites a literal token; returning `None` drops it.
pub type TermHook = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Immutable parser configuration.
#[derive(Clone)]
pub struct ParserConfig {
    /// Operator inserted between adjacent operands.
    default_operator: Connective,
    /// Operator binding strengths.
    precedence: Precedence,
    /// OR tokens.
    or: Matcher,
    /// AND tokens.
    and: Matcher,
    /// NOT tokens.
    not: Matcher,
    /// Quote tokens (the same token opens and closes a phrase).
    quote: Matcher,
    /// Opening parenthesis tokens.
    open_paren: Matcher,
    /// Closing parenthesis tokens.
    close_paren: Matcher,
    /// Characters split into their own token wherever they appear.
    infix: Vec<char>,
    /// Characters split off the front of a word.
    prefix: Vec<char>,
    /// Recognized scope names, in their canonical spelling.
    scopes: Vec<String>,
    /// Whether scope names must match case exactly.
    case_sensitive_scopes: bool,
    /// Compiled scope-prefix recognizer, present when scopes are configured.
    scope_pattern: Option<Regex>,
    /// Per-term rewrite.
    term_hook: Option<TermHook>,
    /// Per-phrase-token rewrite.
    phrase_hook: Option<TermHook>,
}

impl ParserConfig {
    /// Starts building a configuration from the defaults.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }

    /// Returns the operator inserted between adjacent operands.
    pub fn default_operator(&self) -> Connective {
        self.default_operator
    }

    /// Returns the precedence table.
    pub fn precedence(&self) -> &Precedence {
        &self.precedence
    }

    /// Returns the OR matcher.
    pub fn or_matcher(&self) -> &Matcher {
        &self.or
    }

    /// Returns the AND matcher.
    pub fn and_matcher(&self) -> &Matcher {
        &self.and
    }

    /// Returns the NOT matcher.
    pub fn not_matcher(&self) -> &Matcher {
        &self.not
    }

    /// Returns the quote matcher.
    pub fn quote_matcher(&self) -> &Matcher {
        &self.quote
    }

    /// Returns the opening parenthesis matcher.
    pub fn open_paren_matcher(&self) -> &Matcher {
        &self.open_paren
    }

    /// Returns the closing parenthesis matcher.
    pub fn close_paren_matcher(&self) -> &Matcher {
        &self.close_paren
    }

    /// Returns the infix split characters.
    pub fn infix_chars(&self) -> &[char] {
        &self.infix
    }

    /// Returns the prefix split characters.
    pub fn prefix_chars(&self) -> &[char] {
        &self.prefix
    }

    /// Returns the configured scope names.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Returns the compiled scope-prefix recognizer.
    ///
    /// Group `name` captures a recognized scope name; a match without it is a
    /// bare `:` separator.
    pub fn scope_pattern(&self) -> Option<&Regex> {
        self.scope_pattern.as_ref()
    }

    /// Looks up the canonical spelling of a scope name.
    pub fn canonical_scope(&self, name: &str) -> Option<&str> {
        self.scopes
            .iter()
            .find(|s| {
                if self.case_sensitive_scopes {
                    s.as_str() == name
                } else {
                    s.to_lowercase() == name.to_lowercase()
                }
            })
            .map(String::as_str)
    }

    /// Applies the term hook to a literal token.
    pub fn normalize_term(&self, token: &str) -> Option<String> {
        match &self.term_hook {
            Some(hook) => hook(token),
            None => Some(token.to_string()),
        }
    }

    /// Applies the phrase hook to a token inside a phrase.
    pub fn normalize_phrase_token(&self, token: &str) -> Option<String> {
        match &self.phrase_hook {
            Some(hook) => hook(token),
            None => Some(token.to_string()),
        }
    }

    /// Returns true if the token is a parenthesis of either kind.
    pub fn is_paren(&self, token: &str) -> bool {
        self.open_paren.matches(token) || self.close_paren.matches(token)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_operator: Connective::And,
            precedence: Precedence::default(),
            or: Matcher::exact(["|", "OR"]),
            and: Matcher::exact(["&", "AND"]),
            not: Matcher::exact(["-", "NOT"]),
            quote: Matcher::chars(&['"']),
            open_paren: Matcher::chars(&['(']),
            close_paren: Matcher::chars(&[')']),
            infix: vec!['(', ')', '"', '|', '&'],
            prefix: vec!['-'],
            scopes: Vec::new(),
            case_sensitive_scopes: false,
            scope_pattern: None,
            term_hook: None,
            phrase_hook: None,
        }
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("default_operator", &self.default_operator)
            .field("precedence", &self.precedence)
            .field("or", &self.or)
            .field("and", &self.and)
            .field("not", &self.not)
            .field("quote", &self.quote)
            .field("open_paren", &self.open_paren)
            .field("close_paren", &self.close_paren)
            .field("infix", &self.infix)
            .field("prefix", &self.prefix)
            .field("scopes", &self.scopes)
            .field("case_sensitive_scopes", &self.case_sensitive_scopes)
            .field("term_hook", &self.term_hook.is_some())
            .field("phrase_hook", &self.phrase_hook.is_some())
            .finish()
    }
}

/// Builder for [`ParserConfig`].
#[derive(Clone)]
pub struct ParserConfigBuilder {
    /// Requested default operator, validated in `build`.
    default_operator: OperatorKind,
    /// Explicit precedence table; derived from the default operator when unset.
    precedence: Option<Precedence>,
    /// Configuration being assembled.
    config: ParserConfig,
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        Self {
            default_operator: OperatorKind::And,
            precedence: None,
            config: ParserConfig::default(),
        }
    }
}

impl ParserConfigBuilder {
    /// Sets the default operator. Only `And` and `Or` are accepted by `build`.
    pub fn default_operator(mut self, op: OperatorKind) -> Self {
        self.default_operator = op;
        self
    }

    /// Sets the precedence table.
    pub fn precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = Some(precedence);
        self
    }

    /// Sets the OR matcher.
    pub fn or(mut self, matcher: Matcher) -> Self {
        self.config.or = matcher;
        self
    }

    /// Sets the AND matcher.
    pub fn and(mut self, matcher: Matcher) -> Self {
        self.config.and = matcher;
        self
    }

    /// Sets the NOT matcher.
    pub fn not(mut self, matcher: Matcher) -> Self {
        self.config.not = matcher;
        self
    }

    /// Sets the quote matcher.
    pub fn quote(mut self, matcher: Matcher) -> Self {
        self.config.quote = matcher;
        self
    }

    /// Sets the parenthesis matchers.
    pub fn parens(mut self, open: Matcher, close: Matcher) -> Self {
        self.config.open_paren = open;
        self.config.close_paren = close;
        self
    }

    /// Sets the infix split characters.
    pub fn infix(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.config.infix = chars.into_iter().collect();
        self
    }

    /// Sets the prefix split characters.
    pub fn prefix(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.config.prefix = chars.into_iter().collect();
        self
    }

    /// Sets the recognized scope names.
    pub fn scopes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.scopes = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether scope names must match case exactly.
    pub fn case_sensitive_scopes(mut self, yes: bool) -> Self {
        self.config.case_sensitive_scopes = yes;
        self
    }

    /// Installs a hook applied to every literal term.
    pub fn term_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.config.term_hook = Some(Arc::new(hook));
        self
    }

    /// Installs a hook applied to every token inside a phrase.
    pub fn phrase_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.config.phrase_hook = Some(Arc::new(hook));
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<ParserConfig, QueryError> {
        let default_operator = match self.default_operator {
            OperatorKind::And => Connective::And,
            OperatorKind::Or => Connective::Or,
            other => return Err(QueryError::InvalidDefaultOperator(other)),
        };
        let precedence = self
            .precedence
            .unwrap_or_else(|| Precedence::for_default(default_operator));
        let scope_pattern =
            compile_scope_pattern(&self.config.scopes, self.config.case_sensitive_scopes)?;

        Ok(ParserConfig {
            default_operator,
            precedence,
            scope_pattern,
            ..self.config
        })
    }
}

/// Compiles the recognizer for `<name>:` prefixes and bare colons.
fn compile_scope_pattern(
    scopes: &[String],
    case_sensitive: bool,
) -> Result<Option<Regex>, QueryError> {
    if scopes.is_empty() {
        return Ok(None);
    }

    // A name must start a word: `\b` before a word character, `\B` before
    // anything else so that `@tag` is found after whitespace but not in `a@tag`.
    let names = scopes
        .iter()
        .map(|s| {
            let starts_word = s.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_');
            let anchor = if starts_word { r"\b" } else { r"\B" };
            format!("{anchor}{}", regex::escape(s))
        })
        .collect::<Vec<_>>()
        .join("|");
    let flags = if case_sensitive { "" } else { "(?i)" };
    let pattern = format!(r"{flags}(?P<name>{names})\s*:|:");
    Regex::new(&pattern)
        .map(Some)
        .map_err(|source| QueryError::InvalidPattern { pattern, source })
}

/// How a negated scope is treated by the normalizer.
///
/// Reads from a name (`"allow"`, `"invert"`, `"drop"`, with `"false"` as a
/// synonym for `"drop"`) or a boolean, where `false` means drop and `true`
/// means allow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "NotScopeSetting")]
pub enum NotScope {
    /// Leave `Not(Scope(..))` untouched.
    #[default]
    Allow,
    /// Rewrite `Not(Scope(name, x))` to `Scope(name, Not(x))`.
    Invert,
    /// Remove scopes found under a negation.
    Drop,
}

impl FromStr for NotScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "invert" => Ok(Self::Invert),
            "drop" | "false" => Ok(Self::Drop),
            other => Err(format!("unknown not/scope policy: {other}")),
        }
    }
}

/// Serialized forms accepted for [`NotScope`].
#[derive(Deserialize)]
#[serde(untagged)]
enum NotScopeSetting {
    /// `false` drops negated scopes, `true` leaves them alone.
    Flag(bool),
    /// A policy name.
    Name(String),
}

impl TryFrom<NotScopeSetting> for NotScope {
    type Error = String;

    fn try_from(setting: NotScopeSetting) -> Result<Self, Self::Error> {
        match setting {
            NotScopeSetting::Flag(false) => Ok(Self::Drop),
            NotScopeSetting::Flag(true) => Ok(Self::Allow),
            NotScopeSetting::Name(name) => name.parse(),
        }
    }
}

/// Tree normalizer policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Keep scopes nested inside other scopes.
    pub allow_nested_scope: bool,
    /// Keep negations nested inside other negations.
    pub allow_nested_not: bool,
    /// Keep negations that no sibling constraint narrows.
    pub allow_unconstrained_not: bool,
    /// Whether a scope over a constraint counts as a constraint.
    pub scope_is_constraint: bool,
    /// Treatment of scopes under a negation.
    pub not_scope: NotScope,
    /// Scopes may only be combined through `And`.
    pub scope_and_only: bool,
    /// Scopes may only appear at the top level or one level deep.
    pub scope_top_only: bool,
}

impl Policy {
    /// Policy for backends whose NOT is a binary "except" operator.
    pub fn strict() -> Self {
        Self {
            allow_unconstrained_not: false,
            ..Self::default()
        }
    }

    /// Whether the scope placement pass has anything to enforce.
    pub fn needs_placement_pass(&self) -> bool {
        self.scope_and_only || self.scope_top_only || self.not_scope != NotScope::Allow
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allow_nested_scope: false,
            allow_nested_not: false,
            allow_unconstrained_not: true,
            scope_is_constraint: true,
            not_scope: NotScope::Allow,
            scope_and_only: false,
            scope_top_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = ParserConfig::builder().build().unwrap();
        assert_eq!(config.default_operator(), Connective::And);
        assert!(config.or_matcher().matches("|"));
        assert!(config.not_matcher().matches("-"));
        assert_eq!(config.precedence().get(OperatorKind::And), 10);
        assert_eq!(config.precedence().get(OperatorKind::Or), 20);
    }

    #[test]
    fn rejects_unary_default_operator() {
        let err = ParserConfig::builder()
            .default_operator(OperatorKind::Not)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::InvalidDefaultOperator(OperatorKind::Not)
        ));

        let err = ParserConfig::builder()
            .default_operator(OperatorKind::Scope)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::InvalidDefaultOperator(OperatorKind::Scope)
        ));
    }

    #[test]
    fn default_or_gets_lowest_precedence() {
        let config = ParserConfig::builder()
            .default_operator(OperatorKind::Or)
            .build()
            .unwrap();
        let p = config.precedence();
        assert!(p.get(OperatorKind::Or) < p.get(OperatorKind::And));
    }

    #[test]
    fn precedence_fallback_covers_scopes() {
        let p = Precedence::new(7).with(OperatorKind::Or, 1);
        assert_eq!(p.get(OperatorKind::Scope), 7);
        assert_eq!(p.get(OperatorKind::Or), 1);
    }

    #[test]
    fn canonical_scope_lookup() {
        let config = ParserConfig::builder()
            .scopes(["Title", "body"])
            .build()
            .unwrap();
        assert_eq!(config.canonical_scope("TITLE"), Some("Title"));
        assert_eq!(config.canonical_scope("tags"), None);

        let strict = ParserConfig::builder()
            .scopes(["Title"])
            .case_sensitive_scopes(true)
            .build()
            .unwrap();
        assert_eq!(strict.canonical_scope("title"), None);
        assert_eq!(strict.canonical_scope("Title"), Some("Title"));
    }

    #[test]
    fn hooks_apply() {
        let config = ParserConfig::builder()
            .term_hook(|t| Some(t.to_uppercase()))
            .phrase_hook(|t| (t != "x").then(|| t.to_string()))
            .build()
            .unwrap();
        assert_eq!(config.normalize_term("ab").as_deref(), Some("AB"));
        assert_eq!(config.normalize_phrase_token("x"), None);
    }

    #[test]
    fn config_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParserConfig>();
    }

    #[test]
    fn not_scope_from_str() {
        assert_eq!("invert".parse::<NotScope>().unwrap(), NotScope::Invert);
        assert_eq!("false".parse::<NotScope>().unwrap(), NotScope::Drop);
        assert!("sideways".parse::<NotScope>().is_err());
    }

    #[test]
    fn strict_policy_disallows_unconstrained_not() {
        assert!(!Policy::strict().allow_unconstrained_not);
        assert!(!Policy::default().needs_placement_pass());
        let invert = Policy {
            not_scope: NotScope::Invert,
            ..Policy::default()
        };
        assert!(invert.needs_placement_pass());
    }
}
