//! The Parser Driver (spec.md §4.4): the classic shift-reduce loop over a
//! Grammar Compiler-produced `Table`, managing the dual state/value stack.
//!
//! Grounded on the teacher's `LrParser::parse` (`yalp/src/lr/mod.rs`) for the
//! shift/reduce/accept dispatch shape, and on `original_source/sly/yacc.py`'s
//! `parse`/`push`/`pop` for the exact stack bookkeeping this crate
//! generalizes from a pair of Python lists (`ssp`, `vsp`) into `Vec<StateId>`
//! / `Vec<V>`.

use std::fmt;

use tracing::debug;

use crate::error::ParseError;
use crate::item::StateId;
use crate::lexer::Lexer;
use crate::lr::{Action, Table};
use crate::rule::Rule;
use crate::scanner::Scanner;
use crate::symbol::Symbol;

/// Drives a compiled `Table` against a `Lexer`, producing the start rule's
/// semantic value or the first syntax error encountered.
///
/// Not reentrant: `parse` takes `&mut self` and owns the scanner for the
/// duration of one input (spec.md §5).
pub struct Parser<T, V, E> {
    table: Table,
    rules: Vec<Rule<V, E>>,
    lexer: Lexer<T, V>,
}

impl<T, V, E> Parser<T, V, E>
where
    T: AsRef<str> + Clone,
    V: Default + Clone,
    E: fmt::Display,
{
    pub fn new(table: Table, rules: Vec<Rule<V, E>>, lexer: Lexer<T, V>) -> Self {
        Self {
            table,
            rules,
            lexer,
        }
    }

    fn next_symbol(&self, scanner: &mut Scanner<V>) -> Result<Symbol, ParseError> {
        match self.lexer.scan(scanner)? {
            Some(kind) => Ok(Symbol::terminal(kind.as_ref())),
            None => Ok(Symbol::end()),
        }
    }

    /// Parse `input` to completion, returning the value the augmented rule's
    /// `Accept` action leaves on the value stack.
    pub fn parse(&mut self, input: String) -> Result<V, ParseError> {
        let mut scanner = Scanner::new(input);
        let mut ssp: Vec<StateId> = vec![0];
        let mut vsp: Vec<V> = Vec::new();

        let mut lookahead = self.next_symbol(&mut scanner)?;
        let mut lookahead_value = scanner.lval.clone();

        loop {
            let state = *ssp.last().expect("state stack is never empty");
            let row = self
                .table
                .get(state)
                .unwrap_or_else(|| panic!("parser state {state} out of range"));

            match row.action(&lookahead).copied() {
                Some(Action::Shift(to)) => {
                    debug!(state, %lookahead, to, "shift");
                    ssp.push(to);
                    vsp.push(lookahead_value.clone());
                    lookahead = self.next_symbol(&mut scanner)?;
                    lookahead_value = scanner.lval.clone();
                }
                Some(Action::Reduce(rule_id)) => {
                    let rule = &self.rules[rule_id];
                    debug!(state, rule = %rule, "reduce");
                    let arity = rule.rhs.len();
                    let args = vsp.split_off(vsp.len() - arity);
                    ssp.truncate(ssp.len() - arity);

                    let value = rule
                        .reduce(&args)
                        .map_err(|e| ParseError::Reducer(e.to_string()))?;

                    let top = *ssp.last().expect("state stack is never empty");
                    let goto = self
                        .table
                        .get(top)
                        .and_then(|r| r.goto(&rule.lhs))
                        .ok_or_else(|| ParseError::MissingGoto {
                            state: top,
                            symbol: rule.lhs.clone(),
                        })?;
                    ssp.push(goto);
                    vsp.push(value);
                }
                Some(Action::Accept) => {
                    debug!("accept");
                    let rule = &self.rules[0];
                    let arity = rule.rhs.len();
                    let args = vsp.split_off(vsp.len() - arity);
                    return rule
                        .reduce(&args)
                        .map_err(|e| ParseError::Reducer(e.to_string()));
                }
                None => {
                    let expected = row
                        .actions()
                        .map(|(symbol, _)| symbol.to_string())
                        .collect();
                    return Err(ParseError::Syntax {
                        line: scanner.lineno,
                        column: scanner.column,
                        text: scanner.text.clone(),
                        expected,
                    });
                }
            }
        }
    }
}
