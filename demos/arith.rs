//! End-to-end demo (spec.md §8 scenario S1): a four-rule arithmetic grammar,
//! a five-token lexer with whitespace skipping, compiled into a table and
//! driven to evaluate a handful of expressions.

use lrgen::grammar::{reducer, Grammar, RuleSpec};
use lrgen::lexer::{generate_lexer, TokenSpec};
use lrgen::Parser;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Num,
    Plus,
    Star,
    LParen,
    RParen,
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        match self {
            Token::Num => "id",
            Token::Plus => "+",
            Token::Star => "*",
            Token::LParen => "(",
            Token::RParen => ")",
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let rules = vec![
        RuleSpec::new(
            "E",
            vec!["E".into(), "+".into(), "T".into()],
            Some(reducer(|v: &[i64]| Ok::<_, String>(v[0] + v[2]))),
        ),
        RuleSpec::new("E", vec!["T".into()], None),
        RuleSpec::new(
            "T",
            vec!["T".into(), "*".into(), "F".into()],
            Some(reducer(|v: &[i64]| Ok::<_, String>(v[0] * v[2]))),
        ),
        RuleSpec::new("T", vec!["F".into()], None),
        RuleSpec::new(
            "F",
            vec!["(".into(), "E".into(), ")".into()],
            Some(reducer(|v: &[i64]| Ok::<_, String>(v[1]))),
        ),
        RuleSpec::new("F", vec!["id".into()], None),
    ];

    let grammar: Grammar<i64, String> = Grammar::new(rules, "E").expect("valid grammar");
    let table = grammar.compile().expect("conflict-free grammar");
    println!("{table}");

    let lexer = generate_lexer(
        vec![
            TokenSpec::skip(r"\s+"),
            TokenSpec::token(r"[0-9]+", Token::Num, |s| s.parse().expect("digits")),
            TokenSpec::token(r"\+", Token::Plus, |_| 0),
            TokenSpec::token(r"\*", Token::Star, |_| 0),
            TokenSpec::token(r"\(", Token::LParen, |_| 0),
            TokenSpec::token(r"\)", Token::RParen, |_| 0),
        ],
        None,
    )
    .expect("valid token patterns");

    let mut parser = Parser::new(table, grammar.rules().to_vec(), lexer);

    for input in ["2 + 3 * 4", "(2 + 3) * 4", "1 + 2 + 3"] {
        match parser.parse(input.to_string()) {
            Ok(value) => println!("{input} = {value}"),
            Err(err) => println!("{input}: error: {err}"),
        }
    }
}
