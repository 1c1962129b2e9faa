//! The Scanner State (spec.md §4.5): the mutable object shared between the
//! Lexer Generator's output and the Parser Driver.
//!
//! Generalizes the teacher's `Span`+`Token` pair (`yalp/src/lexer.rs`) into
//! the single object spec.md requires the lexer and parser to share, and
//! ports `original_source/sly/yacc.py`'s `set_text` property setter to a
//! plain method.

/// Remaining input, last matched lexeme, current semantic value, and
/// position. The lexer mutates every field except `lval`'s type parameter
/// identity; the parser only reads.
#[derive(Debug, Clone)]
pub struct Scanner<V> {
    /// The unconsumed suffix of the original input.
    pub input: String,
    /// The most recently matched lexeme.
    pub text: String,
    /// `text.len()`, kept alongside it the way `original_source/sly/lex.py`
    /// tracks `lexpos`/`lexmatch` as a pair rather than recomputing.
    pub leng: usize,
    /// The semantic value produced for the most recently matched lexeme.
    pub lval: V,
    /// 1-based line number (spec.md §6).
    pub lineno: usize,
    /// 1-based column number, reset to 1 after each newline.
    pub column: usize,
}

impl<V: Default> Scanner<V> {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            text: String::new(),
            leng: 0,
            lval: V::default(),
            lineno: 1,
            column: 1,
        }
    }
}

impl<V> Scanner<V> {
    /// Record a newly matched lexeme. `lineno`/`column` are advanced by
    /// walking the *previous* `text` first, so they report the position at
    /// the start of the lexeme just matched, not its end.
    pub fn set_text(&mut self, text: String) {
        for ch in self.text.chars() {
            if ch == '\n' {
                self.lineno += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.leng = text.len();
        self.text = text;
    }
}
