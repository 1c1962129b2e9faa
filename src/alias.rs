//! The Regex Alias Expander (spec.md §4.1): resolves `{name}` references
//! inside a pattern against a table of named sub-patterns, transitively and
//! with cycle detection.

use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use crate::error::ConfigError;

fn brace_ref() -> Regex {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex")
}

/// Fully expand every alias in `aliases` against the others, transitively.
/// Returns a map from alias name to its fully expanded pattern.
pub fn expand_aliases(
    aliases: &IndexMap<String, String>,
) -> Result<IndexMap<String, String>, ConfigError> {
    let mut memo = IndexMap::new();
    for name in aliases.keys() {
        expand_named(name, aliases, &mut memo, &mut IndexSet::new())?;
    }
    Ok(memo)
}

/// Expand `{name}` references inside an arbitrary pattern (typically a token
/// regex, not itself a named alias) against `aliases`.
pub fn expand_pattern(pattern: &str, aliases: &IndexMap<String, String>) -> Result<String, ConfigError> {
    let mut memo = IndexMap::new();
    substitute(pattern, aliases, &mut memo, &mut IndexSet::new())
}

fn expand_named(
    name: &str,
    aliases: &IndexMap<String, String>,
    memo: &mut IndexMap<String, String>,
    visiting: &mut IndexSet<String>,
) -> Result<String, ConfigError> {
    if let Some(cached) = memo.get(name) {
        return Ok(cached.clone());
    }
    let raw = aliases
        .get(name)
        .ok_or_else(|| ConfigError::UnknownAlias(name.to_string()))?;
    if !visiting.insert(name.to_string()) {
        return Err(ConfigError::AliasCycle(name.to_string()));
    }
    let expanded = substitute(raw, aliases, memo, visiting)?;
    visiting.shift_remove(name);
    memo.insert(name.to_string(), expanded.clone());
    Ok(expanded)
}

fn substitute(
    pattern: &str,
    aliases: &IndexMap<String, String>,
    memo: &mut IndexMap<String, String>,
    visiting: &mut IndexSet<String>,
) -> Result<String, ConfigError> {
    let brace_ref = brace_ref();
    let mut result = String::new();
    let mut rest = pattern;
    while let Some(m) = brace_ref.find(rest) {
        result.push_str(&rest[..m.start()]);
        let name = &rest[m.start() + 1..m.end() - 1];
        let expansion = expand_named(name, aliases, memo, visiting)?;
        result.push_str("(?:");
        result.push_str(&expansion);
        result.push(')');
        rest = &rest[m.end()..];
    }
    result.push_str(rest);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> IndexMap<String, String> {
        [
            ("digit".to_string(), r"[0-9]".to_string()),
            ("int".to_string(), r"{digit}+".to_string()),
            ("float".to_string(), r"{int}\.{int}".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn expands_transitively() {
        let expanded = expand_aliases(&aliases()).unwrap();
        assert_eq!(expanded["digit"], "[0-9]");
        assert_eq!(expanded["int"], "(?:[0-9])+");
        assert_eq!(expanded["float"], r"(?:(?:[0-9])+)\.(?:(?:[0-9])+)");
    }

    #[test]
    fn expand_pattern_against_table() {
        let expanded = expand_pattern(r"{int}px", &aliases()).unwrap();
        assert_eq!(expanded, "(?:(?:[0-9])+)px");
    }

    #[test]
    fn unknown_alias_is_an_error() {
        let err = expand_pattern("{missing}", &aliases()).unwrap_err();
        assert_eq!(err, ConfigError::UnknownAlias("missing".to_string()));
    }

    #[test]
    fn cyclic_alias_is_an_error() {
        let cyclic: IndexMap<String, String> = [
            ("a".to_string(), "{b}".to_string()),
            ("b".to_string(), "{a}".to_string()),
        ]
        .into_iter()
        .collect();
        let err = expand_aliases(&cyclic).unwrap_err();
        assert!(matches!(err, ConfigError::AliasCycle(_)));
    }
}
