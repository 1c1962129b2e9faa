use indexmap::IndexSet;

use crate::rule::Rule;
use crate::symbol::Symbol;

/// A canonical state's index in the collection built by the Grammar Compiler.
pub type StateId = usize;

/// An LR(0) item: a rule paired with a "dot" position marking how much of the
/// RHS has been matched. `0 <= dot <= rhs.len()`.
///
/// Generalizes the teacher's `Item<'syntax, 'gen, K>` (`core/src/item.rs`),
/// fixed here at `K = 0` (no canonical-LR(1) lookahead sets — a Non-goal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    pub rule: usize,
    pub dot: usize,
}

impl Item {
    pub fn new(rule: usize, dot: usize) -> Self {
        Self { rule, dot }
    }

    /// The symbol immediately after the dot, or `None` if the item is exhausted.
    pub fn next_symbol<'r, V, E>(&self, rules: &'r [Rule<V, E>]) -> Option<&'r Symbol> {
        rules[self.rule].rhs.get(self.dot)
    }

    pub fn is_exhausted<V, E>(&self, rules: &[Rule<V, E>]) -> bool {
        self.dot >= rules[self.rule].rhs.len()
    }

    /// The item with the dot advanced by one.
    pub fn advanced(&self) -> Self {
        Self {
            rule: self.rule,
            dot: self.dot + 1,
        }
    }
}

/// A deduplicated, insertion-ordered collection of items: one canonical
/// state. Ordered so that canonical-collection construction (spec.md §4.3
/// step 8) and any resulting conflict report are deterministic across runs.
pub type ItemSet = IndexSet<Item>;

/// `closure(I)`: add `(k, 0)` for every rule `k` whose LHS is the symbol
/// immediately after the dot of some item already in the set, to a fixpoint.
///
/// Grounded on `core/src/item.rs`'s `ItemSet::close` (worklist over the
/// kernel) and `original_source/sly/yacc.py`'s `closure` (same fixpoint,
/// expressed as a flat list scan).
pub fn closure<V, E>(items: ItemSet, rules: &[Rule<V, E>]) -> ItemSet {
    let mut set = items;
    let mut worklist: Vec<Item> = set.iter().copied().collect();

    while let Some(item) = worklist.pop() {
        let Some(symbol) = item.next_symbol(rules) else {
            continue;
        };
        if symbol.is_terminal() {
            continue;
        }
        for (rule_id, rule) in rules.iter().enumerate() {
            if &rule.lhs == symbol {
                let new_item = Item::new(rule_id, 0);
                if set.insert(new_item) {
                    worklist.push(new_item);
                }
            }
        }
    }

    set
}

/// `goto(I, X) = closure({ (i, j+1) : (i, j) ∈ I ∧ rhs[i][j] = X })`.
pub fn goto<V, E>(items: &ItemSet, symbol: &Symbol, rules: &[Rule<V, E>]) -> ItemSet {
    let moved: ItemSet = items
        .iter()
        .filter(|item| item.next_symbol(rules) == Some(symbol))
        .map(Item::advanced)
        .collect();

    closure(moved, rules)
}
