//! The Grammar Compiler (spec.md §4.3): from a user grammar, builds the
//! augmented rule list, FIRST/FOLLOW sets, the canonical collection of LR(0)
//! item sets, and the resulting ACTION/GOTO table.
//!
//! Grounded on `original_source/sly/yacc.py`'s `first`/`follow`/`closure`/
//! `get_goto`/`states`/`action` (the fixpoint algorithms, including the
//! FOLLOW tail-propagation loop spec.md's Open Question 2 asks for) and on
//! `yalp/src/grammar.rs` for the `Grammar`/`GrammarError` naming split.

use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::item::{self, Item, ItemSet, StateId};
use crate::lr::{Action, Row, Table};
use crate::rule::{Reducer, Rule};
use crate::symbol::{self, Symbol};

/// One user-supplied production, before augmentation and symbol classification.
pub struct RuleSpec<V, E> {
    pub lhs: String,
    pub rhs: Vec<String>,
    pub reducer: Option<Reducer<V, E>>,
}

impl<V, E> RuleSpec<V, E> {
    pub fn new(lhs: impl Into<String>, rhs: Vec<String>, reducer: Option<Reducer<V, E>>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs,
            reducer,
        }
    }

    /// Build a `RuleSpec` from an RHS given as a single string, split on
    /// `sep` (spec.md §4.3's "rhs as a single string to be split on a
    /// configurable separator").
    pub fn from_str_rhs(lhs: impl Into<String>, rhs: &str, sep: &str, reducer: Option<Reducer<V, E>>) -> Self {
        Self::new(lhs, split_rhs(rhs, sep), reducer)
    }
}

/// Split a single-string RHS on `sep` into symbol names, the convenience form
/// spec.md §4.3 describes ("a single string to be split on a configurable
/// separator"). The default separator is a single ASCII space.
pub fn split_rhs(rhs: &str, sep: &str) -> Vec<String> {
    if rhs.is_empty() {
        Vec::new()
    } else {
        rhs.split(sep).map(str::to_owned).collect()
    }
}

/// One alternative for a nonterminal in the map form of a grammar: its RHS
/// plus an optional reducer.
pub type Alternative<V, E> = (Vec<String>, Option<Reducer<V, E>>);

/// A grammar accepted as a map of nonterminal -> alternatives, normalized
/// here into a flat, ordered `Vec<RuleSpec>` (spec.md §4.3's "accepted as
/// either list or map").
pub fn from_map<V, E>(grammar: IndexMap<String, Vec<Alternative<V, E>>>) -> Vec<RuleSpec<V, E>> {
    let mut rules = Vec::new();
    for (lhs, alternatives) in grammar {
        for (rhs, reducer) in alternatives {
            rules.push(RuleSpec::new(lhs.clone(), rhs, reducer));
        }
    }
    rules
}

/// The compiled grammar: the augmented rule list plus its classified symbol
/// universe. Immutable once built; `compile` derives a `Table` from it.
pub struct Grammar<V, E> {
    rules: Vec<Rule<V, E>>,
    terminals: Vec<Symbol>,
    nonterminals: Vec<Symbol>,
}

impl<V, E> std::fmt::Debug for Grammar<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("rules", &self.rules)
            .field("terminals", &self.terminals)
            .field("nonterminals", &self.nonterminals)
            .finish()
    }
}

impl<V, E> Grammar<V, E> {
    /// Build a grammar from the map form (nonterminal -> alternatives)
    /// instead of a flat rule list, normalizing via `from_map` first
    /// (spec.md §4.3's "accepted as either list or map").
    pub fn from_map(grammar: IndexMap<String, Vec<Alternative<V, E>>>, start: &str) -> Result<Self, ConfigError> {
        Self::new(from_map(grammar), start)
    }

    /// Build the augmented rule list and classify every symbol into terminal
    /// or nonterminal (spec.md §4.3 steps 1 and 3).
    pub fn new(rules: Vec<RuleSpec<V, E>>, start: &str) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::EmptyGrammar);
        }

        for spec in &rules {
            if Symbol::terminal(&spec.lhs).is_reserved() {
                return Err(ConfigError::ReservedSymbol(spec.lhs.clone()));
            }
            for s in &spec.rhs {
                if s == symbol::ACCEPT {
                    return Err(ConfigError::ReservedSymbol(s.clone()));
                }
            }
        }

        let nonterminal_ids: IndexSet<String> = rules.iter().map(|r| r.lhs.clone()).collect();

        let to_symbol = |id: &str| -> Symbol {
            if nonterminal_ids.contains(id) {
                Symbol::nonterminal(id)
            } else {
                Symbol::terminal(id)
            }
        };

        let mut compiled = Vec::with_capacity(rules.len() + 1);
        compiled.push(Rule::new(
            0,
            Symbol::accept(),
            vec![Symbol::nonterminal(start), Symbol::end()],
            None,
        ));

        for (idx, spec) in rules.into_iter().enumerate() {
            compiled.push(Rule::new(
                idx + 1,
                Symbol::nonterminal(&spec.lhs),
                spec.rhs.iter().map(|s| to_symbol(s)).collect(),
                spec.reducer,
            ));
        }

        let mut terminals = IndexSet::new();
        let mut nonterminals = IndexSet::new();
        nonterminals.insert(Symbol::accept());
        for rule in &compiled {
            if !rule.lhs.is_accept() {
                nonterminals.insert(rule.lhs.clone());
            }
            for sym in &rule.rhs {
                if sym.is_nonterminal() {
                    nonterminals.insert(sym.clone());
                } else {
                    terminals.insert(sym.clone());
                }
            }
        }
        terminals.insert(Symbol::end());

        debug!(
            rules = compiled.len(),
            terminals = terminals.len(),
            nonterminals = nonterminals.len(),
            "grammar augmented and classified"
        );

        Ok(Self {
            rules: compiled,
            terminals: terminals.into_iter().collect(),
            nonterminals: nonterminals.into_iter().collect(),
        })
    }

    pub fn rules(&self) -> &[Rule<V, E>] {
        &self.rules
    }

    /// FIRST(X): terminals (and possibly `%empty`) that can begin a
    /// derivation of X. Computed depth-first with memoization, matching
    /// `original_source/sly/yacc.py`'s `first`.
    pub fn first_sets(&self) -> IndexMap<Symbol, IndexSet<Symbol>> {
        let mut memo: IndexMap<Symbol, IndexSet<Symbol>> = IndexMap::new();
        for sym in self.terminals.iter().chain(self.nonterminals.iter()) {
            self.first_of(sym, &mut memo, &mut IndexSet::new());
        }
        memo
    }

    fn first_of(
        &self,
        sym: &Symbol,
        memo: &mut IndexMap<Symbol, IndexSet<Symbol>>,
        in_progress: &mut IndexSet<Symbol>,
    ) -> IndexSet<Symbol> {
        if let Some(cached) = memo.get(sym) {
            return cached.clone();
        }
        if sym.is_terminal() {
            let set: IndexSet<Symbol> = [sym.clone()].into_iter().collect();
            memo.insert(sym.clone(), set.clone());
            return set;
        }
        if !in_progress.insert(sym.clone()) {
            // left-recursive nonterminal already being computed; contribute
            // nothing further up this particular call chain.
            return IndexSet::new();
        }

        let mut set = IndexSet::new();
        for rule in self.rules.iter().filter(|r| &r.lhs == sym) {
            if rule.rhs.is_empty() {
                set.insert(Symbol::empty());
                continue;
            }
            for rhs_sym in &rule.rhs {
                let sub = self.first_of(rhs_sym, memo, in_progress);
                let has_empty = sub.contains(&Symbol::empty());
                set.extend(sub.into_iter().filter(|s| !s.is_empty_marker()));
                if !has_empty {
                    break;
                }
                if rhs_sym == rule.rhs.last().unwrap() {
                    set.insert(Symbol::empty());
                }
            }
        }

        in_progress.shift_remove(sym);
        memo.insert(sym.clone(), set.clone());
        set
    }

    /// FOLLOW(X): terminals that may immediately follow X in some sentential
    /// form. Computed from the direct-neighbor pass plus the tail-propagation
    /// fixpoint (spec.md §9 Open Question 2; `sly/yacc.py`'s `follow`).
    pub fn follow_sets(&self) -> IndexMap<Symbol, IndexSet<Symbol>> {
        let first = self.first_sets();
        let mut follow: IndexMap<Symbol, IndexSet<Symbol>> = IndexMap::new();
        follow.insert(Symbol::accept(), [Symbol::end()].into_iter().collect());
        for nt in &self.nonterminals {
            follow.entry(nt.clone()).or_default();
        }

        for rule in &self.rules {
            for i in 0..rule.rhs.len().saturating_sub(1) {
                let s = &rule.rhs[i];
                let t = &rule.rhs[i + 1];
                let entry = follow.entry(s.clone()).or_default();
                if t.is_nonterminal() {
                    if let Some(first_t) = first.get(t) {
                        entry.extend(first_t.iter().filter(|s| !s.is_empty_marker()).cloned());
                    }
                } else {
                    entry.insert(t.clone());
                }
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for rule in &self.rules {
                let Some(last) = rule.rhs.last() else {
                    continue;
                };
                if !last.is_nonterminal() {
                    continue;
                }
                let lhs_follow = follow.get(&rule.lhs).cloned().unwrap_or_default();
                let entry = follow.entry(last.clone()).or_default();
                for t in lhs_follow {
                    if entry.insert(t) {
                        changed = true;
                    }
                }
            }
        }

        follow
    }

    /// Build the canonical collection of item sets and the resulting
    /// ACTION/GOTO table (spec.md §4.3 steps 6-9). Fatal on reduce/reduce
    /// conflicts; shift/reduce conflicts are resolved in favor of shift and
    /// logged as warnings.
    pub fn compile(&self) -> Result<Table, ConfigError> {
        let follow = self.follow_sets();

        let start_kernel: ItemSet = [Item::new(0, 0)].into_iter().collect();
        let mut states: Vec<ItemSet> = vec![item::closure(start_kernel, &self.rules)];
        let mut edges: Vec<(StateId, Symbol, StateId)> = Vec::new();

        let symbols: Vec<Symbol> = self
            .nonterminals
            .iter()
            .chain(self.terminals.iter())
            .cloned()
            .collect();

        let mut frontier = 0;
        while frontier < states.len() {
            let current = states[frontier].clone();
            for sym in &symbols {
                let target = item::goto(&current, sym, &self.rules);
                if target.is_empty() {
                    continue;
                }
                let existing = states.iter().position(|s| s == &target);
                let to = match existing {
                    Some(id) => id,
                    None => {
                        states.push(target);
                        states.len() - 1
                    }
                };
                edges.push((frontier, sym.clone(), to));
            }
            frontier += 1;
        }

        debug!(states = states.len(), "canonical collection built");

        let mut conflicts = 0usize;
        let mut rows = Vec::with_capacity(states.len());

        for (state_id, items) in states.iter().enumerate() {
            let mut row = Row::default();

            for sym in &symbols {
                if let Some(to) = edges
                    .iter()
                    .find(|(from, s, _)| *from == state_id && s == sym)
                    .map(|(_, _, to)| *to)
                {
                    if sym.is_terminal() {
                        row.insert_action(sym.clone(), Action::Shift(to));
                    } else {
                        row.insert_goto(sym.clone(), to);
                    }
                }
            }

            for item in items {
                if !item.is_exhausted(&self.rules) {
                    continue;
                }
                let rule = &self.rules[item.rule];
                if rule.lhs.is_accept() {
                    row.insert_action(Symbol::end(), Action::Accept);
                    continue;
                }
                let Some(lookaheads) = follow.get(&rule.lhs) else {
                    continue;
                };
                for terminal in lookaheads {
                    match row.action(terminal) {
                        Some(Action::Reduce(other)) if *other != rule.id => {
                            return Err(ConfigError::ReduceReduceConflict {
                                state: state_id,
                                symbol: terminal.clone(),
                                rule_a: (*other).min(rule.id),
                                rule_b: (*other).max(rule.id),
                            });
                        }
                        Some(Action::Shift(_)) => {
                            conflicts += 1;
                            warn!(
                                state = state_id,
                                symbol = %terminal,
                                rule = %rule,
                                "shift/reduce conflict, preferring shift"
                            );
                        }
                        _ => {
                            row.insert_action(terminal.clone(), Action::Reduce(rule.id));
                        }
                    }
                }
            }

            rows.push(row);
        }

        if conflicts > 0 {
            warn!(count = conflicts, "grammar has shift/reduce conflicts");
        }

        Ok(Table {
            terminals: self.terminals.clone(),
            nonterminals: self.nonterminals.clone(),
            rows,
        })
    }
}

/// Build a `Reducer` from a plain closure, for callers that don't need to
/// share a reducer across rules.
pub fn reducer<V, E>(f: impl Fn(&[V]) -> Result<V, E> + 'static) -> Reducer<V, E> {
    Rc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar_s1() -> Grammar<i64, String> {
        // E -> E '+' T | T
        // T -> T '*' F | F
        // F -> '(' E ')' | 'id'
        let rules = vec![
            RuleSpec::new(
                "E",
                vec!["E".into(), "+".into(), "T".into()],
                Some(reducer(|v: &[i64]| Ok(v[0] + v[2]))),
            ),
            RuleSpec::new("E", vec!["T".into()], None),
            RuleSpec::new(
                "T",
                vec!["T".into(), "*".into(), "F".into()],
                Some(reducer(|v: &[i64]| Ok(v[0] * v[2]))),
            ),
            RuleSpec::new("T", vec!["F".into()], None),
            RuleSpec::new(
                "F",
                vec!["(".into(), "E".into(), ")".into()],
                Some(reducer(|v: &[i64]| Ok(v[1]))),
            ),
            RuleSpec::new("F", vec!["id".into()], None),
        ];
        Grammar::new(rules, "E").unwrap()
    }

    #[test]
    fn first_sets_of_arithmetic_grammar() {
        let g = grammar_s1();
        let first = g.first_sets();
        let f_e = &first[&Symbol::nonterminal("E")];
        assert!(f_e.contains(&Symbol::terminal("id")));
        assert!(f_e.contains(&Symbol::terminal("(")));
        assert_eq!(f_e.len(), 2);
    }

    #[test]
    fn follow_sets_of_arithmetic_grammar() {
        let g = grammar_s1();
        let follow = g.follow_sets();
        let follow_e = &follow[&Symbol::nonterminal("E")];
        assert!(follow_e.contains(&Symbol::terminal("+")));
        assert!(follow_e.contains(&Symbol::terminal(")")));
        assert!(follow_e.contains(&Symbol::end()));
    }

    #[test]
    fn compiles_without_conflicts() {
        let g = grammar_s1();
        let table = g.compile().unwrap();
        assert!(table.num_states() > 0);
    }

    #[test]
    fn epsilon_production_adds_empty_to_first_and_propagates_follow() {
        // S -> A B ; A -> 'a' | <empty> ; B -> 'b'
        let rules = vec![
            RuleSpec::new("S", vec!["A".into(), "B".into()], None),
            RuleSpec::new("A", vec!["a".into()], None),
            RuleSpec::new("A", vec![], None),
            RuleSpec::new("B", vec!["b".into()], None),
        ];
        let g: Grammar<i64, String> = Grammar::new(rules, "S").unwrap();
        let first = g.first_sets();
        assert!(first[&Symbol::nonterminal("A")].contains(&Symbol::empty()));
        let follow = g.follow_sets();
        assert!(follow[&Symbol::nonterminal("A")].contains(&Symbol::terminal("b")));
        let table = g.compile().unwrap();
        assert!(table.num_states() > 0);
    }

    #[test]
    fn reduce_reduce_conflict_is_fatal() {
        // Ambiguous: S -> A | B ; A -> 'x' ; B -> 'x'
        let rules = vec![
            RuleSpec::new("S", vec!["A".into()], None),
            RuleSpec::new("S", vec!["B".into()], None),
            RuleSpec::new("A", vec!["x".into()], None),
            RuleSpec::new("B", vec!["x".into()], None),
        ];
        let g: Grammar<i64, String> = Grammar::new(rules, "S").unwrap();
        let err = g.compile().unwrap_err();
        assert!(matches!(err, ConfigError::ReduceReduceConflict { .. }));
    }

    #[test]
    fn shift_reduce_conflict_resolves_to_shift() {
        // dangling-else: S -> 'if' S 'else' S | 'if' S | 'x'
        let rules = vec![
            RuleSpec::new(
                "S",
                vec!["if".into(), "S".into(), "else".into(), "S".into()],
                None,
            ),
            RuleSpec::new("S", vec!["if".into(), "S".into()], None),
            RuleSpec::new("S", vec!["x".into()], None),
        ];
        let g: Grammar<i64, String> = Grammar::new(rules, "S").unwrap();
        let table = g.compile().unwrap();
        let resolves_to_shift = (0..table.num_states()).any(|id| {
            matches!(
                table.get(id).unwrap().action(&Symbol::terminal("else")),
                Some(Action::Shift(_))
            )
        });
        assert!(resolves_to_shift);
    }

    #[test]
    fn left_recursive_grammar_terminates_and_compiles() {
        // A -> A 'a' | 'a'
        let rules = vec![
            RuleSpec::new("A", vec!["A".into(), "a".into()], None),
            RuleSpec::new("A", vec!["a".into()], None),
        ];
        let g: Grammar<i64, String> = Grammar::new(rules, "A").unwrap();
        let table = g.compile().unwrap();
        assert!(table.num_states() > 0);
    }

    #[test]
    fn rejects_reserved_symbol_as_nonterminal() {
        let rules = vec![RuleSpec::new(symbol::ACCEPT, vec!["a".into()], None)];
        let err = Grammar::<i64, String>::new(rules, symbol::ACCEPT).unwrap_err();
        assert!(matches!(err, ConfigError::ReservedSymbol(_)));
    }

    #[test]
    fn split_rhs_splits_on_the_given_separator() {
        assert_eq!(split_rhs("E + T", " "), vec!["E", "+", "T"]);
        assert_eq!(split_rhs("E,+,T", ","), vec!["E", "+", "T"]);
        assert_eq!(split_rhs("", " "), Vec::<String>::new());
    }

    #[test]
    fn from_str_rhs_builds_a_rule_spec_by_splitting_the_rhs_string() {
        let spec: RuleSpec<i64, String> = RuleSpec::from_str_rhs("E", "E + T", " ", None);
        assert_eq!(spec.lhs, "E");
        assert_eq!(spec.rhs, vec!["E", "+", "T"]);
    }

    #[test]
    fn compiles_an_equivalent_table_from_the_map_form_as_from_the_list_form() {
        // Same S1 grammar as `grammar_s1`, but supplied as a map of
        // nonterminal -> alternatives instead of a flat rule list.
        let mut grammar: IndexMap<String, Vec<Alternative<i64, String>>> = IndexMap::new();
        grammar.insert(
            "E".to_string(),
            vec![
                (
                    vec!["E".into(), "+".into(), "T".into()],
                    Some(reducer(|v: &[i64]| Ok(v[0] + v[2]))),
                ),
                (vec!["T".into()], None),
            ],
        );
        grammar.insert(
            "T".to_string(),
            vec![
                (
                    vec!["T".into(), "*".into(), "F".into()],
                    Some(reducer(|v: &[i64]| Ok(v[0] * v[2]))),
                ),
                (vec!["F".into()], None),
            ],
        );
        grammar.insert(
            "F".to_string(),
            vec![
                (vec!["(".into(), "E".into(), ")".into()], Some(reducer(|v: &[i64]| Ok(v[1])))),
                (vec!["id".into()], None),
            ],
        );

        let from_map: Grammar<i64, String> = Grammar::from_map(grammar, "E").unwrap();
        let from_list = grammar_s1();

        assert_eq!(from_map.compile().unwrap().num_states(), from_list.compile().unwrap().num_states());
    }
}
