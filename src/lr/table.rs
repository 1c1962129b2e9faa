use std::fmt;

use indexmap::IndexMap;
use prettytable::{row, Cell, Table as PtTable};

use crate::item::StateId;
use crate::symbol::Symbol;

use super::Action;

/// One ACTION/GOTO row: everything the Parser Driver needs to look up for a
/// single state.
///
/// Grounded on `yalp/src/lr/table.rs`'s `Row`, generalized from a
/// `HashMap<&Symbol, _>` (borrowing into a `const` grammar) to an owned,
/// insertion-ordered `IndexMap<Symbol, _>`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Row {
    actions: IndexMap<Symbol, Action>,
    goto: IndexMap<Symbol, StateId>,
}

impl Row {
    pub fn action(&self, symbol: &Symbol) -> Option<&Action> {
        self.actions.get(symbol)
    }

    pub fn goto(&self, symbol: &Symbol) -> Option<StateId> {
        self.goto.get(symbol).copied()
    }

    pub fn insert_action(&mut self, symbol: Symbol, action: Action) {
        self.actions.insert(symbol, action);
    }

    pub fn insert_goto(&mut self, symbol: Symbol, state: StateId) {
        self.goto.insert(symbol, state);
    }

    pub fn actions(&self) -> impl Iterator<Item = (&Symbol, &Action)> {
        self.actions.iter()
    }
}

/// The compiled ACTION/GOTO table: one `Row` per canonical state.
///
/// Grounded on `yalp/src/lr/table.rs`'s `LrTable`, including its
/// `prettytable`-backed `Display` for dumping a generated table while
/// debugging a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub(crate) terminals: Vec<Symbol>,
    pub(crate) nonterminals: Vec<Symbol>,
    pub(crate) rows: Vec<Row>,
}

impl Table {
    pub fn get(&self, state: StateId) -> Option<&Row> {
        self.rows.get(state)
    }

    pub fn num_states(&self) -> usize {
        self.rows.len()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = PtTable::new();

        let mut header = row!["#"];
        for sym in self.terminals.iter().chain(self.nonterminals.iter()) {
            header.add_cell(Cell::new(sym.id()));
        }
        table.add_row(header);

        for (id, row) in self.rows.iter().enumerate() {
            let mut cells = vec![id.to_string()];
            for sym in &self.terminals {
                cells.push(
                    row.action(sym)
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                );
            }
            for sym in &self.nonterminals {
                cells.push(
                    row.goto(sym)
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                );
            }
            table.add_row(cells.into());
        }

        write!(f, "{table}")
    }
}
