use std::fmt;

use crate::rule::RuleId;
use crate::item::StateId;

/// A single ACTION-table cell, per spec.md §3: `{shift, reduce(r), accept}`.
///
/// Grounded on `yalp-core/src/lr/action.rs`'s `Action` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    Reduce(RuleId),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(to) => write!(f, "s{to}"),
            Action::Reduce(rule) => write!(f, "r{rule}"),
            Action::Accept => write!(f, "acc"),
        }
    }
}
