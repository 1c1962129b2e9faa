use std::fmt;
use std::rc::Rc;

use itertools::Itertools as _;

use crate::symbol::Symbol;

/// A rule's reducer: given the semantic values of its RHS symbols in
/// left-to-right order, produce the semantic value of the LHS.
///
/// Generalizes the teacher's `RuleReducer` (`yalp/src/rule.rs`), a `fn`
/// pointer, to a boxed closure: user reducers routinely close over external
/// state (symbol tables, interners) that a bare `fn` cannot capture.
pub type Reducer<V, E> = Rc<dyn Fn(&[V]) -> Result<V, E>>;

/// The rule's stable index in the augmented rule list (spec.md §3: rule 0 is
/// always `$accept -> start $end`).
pub type RuleId = usize;

/// A single grammar production `lhs -> rhs`, with an optional reducer.
///
/// When `reducer` is `None`, the Parser Driver falls back to the default
/// reducer (spec.md §9 Open Question 4, resolved in DESIGN.md): the first RHS
/// value when the RHS is non-empty, otherwise `V::default()`.
pub struct Rule<V, E> {
    pub id: RuleId,
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    pub reducer: Option<Reducer<V, E>>,
}

impl<V, E> Clone for Rule<V, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            lhs: self.lhs.clone(),
            rhs: self.rhs.clone(),
            reducer: self.reducer.clone(),
        }
    }
}

impl<V, E> fmt::Debug for Rule<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule {{ id: {}, lhs: {:?}, rhs: {:?}, reducer: {} }}",
            self.id,
            self.lhs,
            self.rhs,
            if self.reducer.is_some() {
                "Some(_)"
            } else {
                "None"
            }
        )
    }
}

impl<V, E> fmt::Display for Rule<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rhs.is_empty() {
            write!(f, "({}) {} -> {}", self.id, self.lhs, crate::symbol::EMPTY)
        } else {
            write!(
                f,
                "({}) {} -> {}",
                self.id,
                self.lhs,
                self.rhs.iter().map(ToString::to_string).join(" ")
            )
        }
    }
}

impl<V, E> Rule<V, E> {
    pub fn new(id: RuleId, lhs: Symbol, rhs: Vec<Symbol>, reducer: Option<Reducer<V, E>>) -> Self {
        Self {
            id,
            lhs,
            rhs,
            reducer,
        }
    }

    /// Apply the rule's reducer, or the default fallback if none was given.
    pub fn reduce(&self, args: &[V]) -> Result<V, E>
    where
        V: Default + Clone,
    {
        match &self.reducer {
            Some(reducer) => reducer(args),
            None => Ok(args.first().cloned().unwrap_or_default()),
        }
    }
}
