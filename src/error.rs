use thiserror::Error;

use crate::symbol::Symbol;

/// Errors raised while compiling a grammar, a token specification, or an alias
/// table — anything discovered before a single byte of input is scanned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown alias {{{0}}}")]
    UnknownAlias(String),

    #[error("cyclic alias reference involving {{{0}}}")]
    AliasCycle(String),

    #[error("invalid regular expression for pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("grammar defines reserved symbol {0}")]
    ReservedSymbol(String),

    #[error("grammar has no rules")]
    EmptyGrammar,

    #[error(
        "reduce/reduce conflict in state {state} on lookahead {symbol}: rules {rule_a} and {rule_b}"
    )]
    ReduceReduceConflict {
        state: usize,
        symbol: Symbol,
        rule_a: usize,
        rule_b: usize,
    },
}

/// Errors raised by the generated lexer while scanning input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("no pattern matches input at {line}:{column}: {prefix:?}")]
    NoMatch {
        line: usize,
        column: usize,
        prefix: String,
    },
}

/// Errors raised by the parser driver while consuming tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("syntax error at {line}:{column} near {text:?}; expected one of {expected:?}")]
    Syntax {
        line: usize,
        column: usize,
        text: String,
        expected: Vec<String>,
    },

    #[error("internal error: missing goto for state {state} and symbol {symbol}")]
    MissingGoto { state: usize, symbol: Symbol },

    #[error("internal error: rule reducer failed: {0}")]
    Reducer(String),
}
