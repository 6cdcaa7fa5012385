//! Tokenizer for rule text.
//!
//! The teacher crate (`ouros`) never hand-rolls a lexer of its own — real
//! Python tokenizing is delegated to the external `ruff_python_parser`
//! crate. Since this language needs a hand-rolled lexer, we borrow the
//! idiom the retrieval pack uses for that instead: a `logos`-derived token
//! enum (see e.g. the Perl tree-sitter lexer in the pack), which gives us
//! byte-span tracking for free.
//!
//! `{{`/`}}` are deliberately *not* distinct tokens — `Lexer::Lbrace` and
//! `Lexer::Rbrace` are emitted one `{`/`}` at a time; the parser recognizes
//! the doubled sentinel positionally (only right after the top-level
//! expression), which is the only place spec.md says it's meaningful. This
//! sidesteps the ambiguity with a rule whose entire body is a literal
//! nested set, e.g. `{{1,2},{3,4}}`.

use logos::Logos;

use crate::error::{ParseError, SourceLoc};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("in")]
    In,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("True")]
    True,
    #[token("False")]
    False,
    #[token("None")]
    None,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"0[xX][0-9a-fA-F_]+", |lex| parse_radix_int(lex.slice(), 2, 16))]
    #[regex(r"0[oO][0-7_]+", |lex| parse_radix_int(lex.slice(), 2, 8))]
    #[regex(r"0[bB][01_]+", |lex| parse_radix_int(lex.slice(), 2, 2))]
    #[regex(r"[0-9][0-9_]*", |lex| lex.slice().replace('_', "").parse::<i64>().ok())]
    Int(i64),

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    Float(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^'\\\n]|\\.)*'", |lex| unescape(lex.slice()))]
    Str(String),

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("=")]
    Assign,

    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    #[token("**")]
    Pow,
    #[token("//")]
    FloorDiv,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("&")]
    Amp,
    #[token("~")]
    Tilde,
}

fn parse_radix_int(slice: &str, skip: usize, radix: u32) -> Option<i64> {
    let digits = slice[skip..].replace('_', "");
    i64::from_str_radix(&digits, radix).ok()
}

fn unescape(slice: &str) -> Option<String> {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            other => out.push(other),
        }
    }
    Some(out)
}

/// A token annotated with its 1-indexed source location, for diagnostics.
#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub loc: SourceLoc,
}

/// Runs the lexer to completion, converting any unrecognized byte sequence
/// into a `ParseError::UnexpectedToken`.
pub fn tokenize(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut lexer = Token::lexer(src);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let loc = offset_to_loc(src, span.start);
        match result {
            Ok(token) => out.push(Spanned { token, loc }),
            Err(()) => {
                return Err(ParseError::UnexpectedToken { loc, found: lexer.slice().to_string() });
            }
        }
    }
    Ok(out)
}

fn offset_to_loc(src: &str, offset: usize) -> SourceLoc {
    let mut line = 1u32;
    let mut col = 1u32;
    for ch in src[..offset].chars() {
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    SourceLoc { line, column: col }
}
