//! The Lexer Generator (spec.md §4.2): compiles an ordered list of
//! `(pattern, action)` pairs into a callable that repeatedly consumes a
//! prefix of a `Scanner`'s remaining input.
//!
//! Grounded on `original_source/lex.py`'s `generate(tokens)` closure and
//! `original_source/sly/lex.py`'s refinement (`match = None` per outer
//! iteration, restarting the scan on a skip action). Ported from Python's
//! `re` module to the `regex` crate, each pattern anchored with `\A` so it
//! only matches at the true start of the remaining input.

use std::rc::Rc;

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::alias::expand_pattern;
use crate::error::{ConfigError, LexError};
use crate::scanner::Scanner;

/// A pattern's action (spec.md §4.2): given the scanner — `text`/`leng`
/// already set to the match — either emit a token kind or, by returning
/// `None`, skip the match and have the outer scan loop restart. Because the
/// closure receives the scanner itself, it may set `lval`, inspect the
/// matched text to choose the token kind dynamically (e.g. a keyword table
/// deciding between `IF`/`WHILE`/`ID` from a single identifier pattern), or
/// decide to skip conditionally.
pub type Action<T, V> = Rc<dyn Fn(&mut Scanner<V>) -> Option<T>>;

/// One `(pattern, action)` pair, in the declaration order the Lexer Generator
/// tries patterns (first match wins).
pub struct TokenSpec<T, V> {
    pattern: String,
    action: Action<T, V>,
}

impl<T, V> TokenSpec<T, V>
where
    T: Clone + 'static,
    V: 'static,
{
    /// A pattern whose match is always skipped (no token emitted) — the
    /// mechanism whitespace and comments use to disappear transparently.
    pub fn skip(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            action: Rc::new(|_scanner: &mut Scanner<V>| None),
        }
    }

    /// A pattern that always emits token kind `kind`, with `value` computing
    /// the semantic value from the matched lexeme. The common case, built on
    /// top of `dynamic` below.
    pub fn token(pattern: impl Into<String>, kind: T, value: impl Fn(&str) -> V + 'static) -> Self {
        Self::dynamic(pattern, move |scanner: &mut Scanner<V>| {
            scanner.lval = value(&scanner.text);
            Some(kind.clone())
        })
    }

    /// A pattern whose action is a full callable over the scanner: it may
    /// choose the token kind itself, set `lval`, or return `None` to skip.
    pub fn dynamic(pattern: impl Into<String>, action: impl Fn(&mut Scanner<V>) -> Option<T> + 'static) -> Self {
        Self {
            pattern: pattern.into(),
            action: Rc::new(action),
        }
    }
}

struct Compiled<T, V> {
    regex: Regex,
    action: Action<T, V>,
}

/// The compiled lexer: one `Regex` per `TokenSpec`, in declaration order.
pub struct Lexer<T, V> {
    patterns: Vec<Compiled<T, V>>,
}

/// Compile `specs` into a `Lexer`, expanding any `{name}` alias references in
/// each pattern against `aliases` first.
pub fn generate_lexer<T, V>(
    specs: Vec<TokenSpec<T, V>>,
    aliases: Option<&IndexMap<String, String>>,
) -> Result<Lexer<T, V>, ConfigError> {
    let empty = IndexMap::new();
    let aliases = aliases.unwrap_or(&empty);

    let mut patterns = Vec::with_capacity(specs.len());
    for spec in specs {
        let expanded = expand_pattern(&spec.pattern, aliases)?;
        let regex = Regex::new(&format!(r"\A(?:{expanded})")).map_err(|e| ConfigError::InvalidPattern {
            pattern: spec.pattern.clone(),
            message: e.to_string(),
        })?;
        patterns.push(Compiled {
            regex,
            action: spec.action,
        });
    }

    debug!(patterns = patterns.len(), "lexer compiled");
    Ok(Lexer { patterns })
}

impl<T, V> Lexer<T, V> {
    /// Scan the next token, mutating `scanner`'s `input`, `text`, `leng`,
    /// `lval`, `lineno`, and `column`. Returns `Ok(None)` once `scanner.input`
    /// is exhausted; the Parser Driver substitutes `$end` for that case.
    pub fn scan(&self, scanner: &mut Scanner<V>) -> Result<Option<T>, LexError> {
        loop {
            if scanner.input.is_empty() {
                return Ok(None);
            }

            let found = self
                .patterns
                .iter()
                .find_map(|p| p.regex.find(&scanner.input).map(|m| (m.end(), p)));

            let Some((end, compiled)) = found else {
                return Err(LexError::NoMatch {
                    line: scanner.lineno,
                    column: scanner.column,
                    prefix: scanner.input.chars().take(16).collect(),
                });
            };

            let text = scanner.input[..end].to_string();
            scanner.input = scanner.input[end..].to_string();
            scanner.set_text(text);

            match (compiled.action)(scanner) {
                None => continue,
                Some(kind) => return Ok(Some(kind)),
            }
        }
    }
}
