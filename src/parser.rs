//! Recursive-descent / precedence-climbing parser producing a `ParsedRule`.
//!
//! Implements the precedence table from spec.md §4.3 (ternary, or, and,
//! not, chained comparisons, `|`, `^`, `&`, shifts, `+ -`, `* / // %`,
//! unary, `**`, trailers, atoms) directly as one function per level, the
//! way a hand-rolled descent parser is laid out in the retrieval pack
//! (e.g. the `rlox` bytecode compiler's precedence table, adapted here to
//! explicit per-level functions rather than a Pratt dispatch table since
//! the grammar has no user-extensible operators).

use crate::ast::{BinOp, BoolOp, CmpOp, Expr, Lit, ParsedRule, UnOp};
use crate::error::{ParseError, SourceLoc};
use crate::lexer::{tokenize, Spanned, Token};

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

/// Parses a complete rule: `expression [ "{{" attr_assign ("," attr_assign)* "}}" ]`.
pub fn parse_rule(src: &str) -> Result<ParsedRule, ParseError> {
    let tokens = tokenize(src)?;
    let mut p = Parser { tokens, pos: 0 };
    let verdict = p.parse_ternary()?;

    let attrs = if p.peek_is(&Token::LBrace) && p.peek_ahead_is(1, &Token::LBrace) {
        p.advance();
        p.advance();
        let attrs = p.parse_attr_block()?;
        p.expect(&Token::RBrace, "`}` closing the attribute block")?;
        p.expect(&Token::RBrace, "`}` closing the attribute block")?;
        attrs
    } else {
        Vec::new()
    };

    if let Some(tok) = p.tokens.get(p.pos) {
        return Err(ParseError::TrailingContent { loc: tok.loc });
    }
    Ok(ParsedRule { verdict, attrs })
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_is(&self, t: &Token) -> bool {
        self.peek() == Some(t)
    }

    fn peek_ahead_is(&self, n: usize, t: &Token) -> bool {
        self.tokens.get(self.pos + n).map(|s| &s.token) == Some(t)
    }

    fn loc(&self) -> SourceLoc {
        self.tokens.get(self.pos).map(|s| s.loc).unwrap_or(SourceLoc { line: 0, column: 0 })
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).map(|s| s.token.clone());
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, t: &Token, what: &'static str) -> Result<(), ParseError> {
        if self.peek_is(t) {
            self.advance();
            Ok(())
        } else {
            let loc = self.loc();
            let found = self.describe_current();
            Err(ParseError::Expected { loc, expected: what, found })
        }
    }

    fn describe_current(&self) -> String {
        match self.peek() {
            Some(t) => format!("{t:?}"),
            None => "end of input".to_string(),
        }
    }

    fn parse_attr_block(&mut self) -> Result<Vec<(String, Expr)>, ParseError> {
        let mut attrs: Vec<(String, Expr)> = Vec::new();
        loop {
            let loc = self.loc();
            let name = match self.advance() {
                Some(Token::Ident(name)) => name,
                other => {
                    return Err(ParseError::Expected {
                        loc,
                        expected: "attribute name",
                        found: other.map(|t| format!("{t:?}")).unwrap_or_else(|| "end of input".into()),
                    })
                }
            };
            if name.starts_with('_') {
                return Err(ParseError::ReservedAttrName { loc, name });
            }
            if attrs.iter().any(|(n, _)| n == &name) {
                return Err(ParseError::DuplicateAttrName { loc, name });
            }
            self.expect(&Token::Assign, "`=`")?;
            let value = self.parse_ternary()?;
            attrs.push((name, value));
            if self.peek_is(&Token::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(attrs)
    }

    // 1. ternary
    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let body = self.parse_or()?;
        if self.peek_is(&Token::If) {
            self.advance();
            let cond = self.parse_or()?;
            self.expect(&Token::Else, "`else`")?;
            let orelse = self.parse_ternary()?;
            Ok(Expr::Ternary(Box::new(body), Box::new(cond), Box::new(orelse)))
        } else {
            Ok(body)
        }
    }

    // 2. or
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.peek_is(&Token::Or) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Bool(BoolOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // 3. and
    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_not()?;
        while self.peek_is(&Token::And) {
            self.advance();
            let rhs = self.parse_not()?;
            lhs = Expr::Bool(BoolOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // 4. not
    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.peek_is(&Token::Not) {
            self.advance();
            let operand = self.parse_not()?;
            Ok(Expr::Not(Box::new(operand)))
        } else {
            self.parse_comparison()
        }
    }

    // 5. comparisons (chained)
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_bitor()?;
        let mut comparators = Vec::new();
        loop {
            let op = if self.peek_is(&Token::Eq) {
                Some(CmpOp::Eq)
            } else if self.peek_is(&Token::Ne) {
                Some(CmpOp::Ne)
            } else if self.peek_is(&Token::Lt) {
                Some(CmpOp::Lt)
            } else if self.peek_is(&Token::Le) {
                Some(CmpOp::Le)
            } else if self.peek_is(&Token::Gt) {
                Some(CmpOp::Gt)
            } else if self.peek_is(&Token::Ge) {
                Some(CmpOp::Ge)
            } else if self.peek_is(&Token::In) {
                Some(CmpOp::In)
            } else if self.peek_is(&Token::Not) && self.peek_ahead_is(1, &Token::In) {
                Some(CmpOp::NotIn)
            } else {
                None
            };
            match op {
                Some(CmpOp::NotIn) => {
                    self.advance();
                    self.advance();
                    let rhs = self.parse_bitor()?;
                    comparators.push((CmpOp::NotIn, rhs));
                }
                Some(op) => {
                    self.advance();
                    let rhs = self.parse_bitor()?;
                    comparators.push((op, rhs));
                }
                None => break,
            }
        }
        if comparators.is_empty() {
            Ok(lhs)
        } else {
            Ok(Expr::Compare(Box::new(lhs), comparators))
        }
    }

    // 6. |
    fn parse_bitor(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_bitxor()?;
        while self.peek_is(&Token::Pipe) {
            self.advance();
            let rhs = self.parse_bitxor()?;
            lhs = Expr::Bin(BinOp::BitOr, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // 7. ^
    fn parse_bitxor(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_bitand()?;
        while self.peek_is(&Token::Caret) {
            self.advance();
            let rhs = self.parse_bitand()?;
            lhs = Expr::Bin(BinOp::BitXor, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // 8. &
    fn parse_bitand(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_shift()?;
        while self.peek_is(&Token::Amp) {
            self.advance();
            let rhs = self.parse_shift()?;
            lhs = Expr::Bin(BinOp::BitAnd, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // 9. << >>
    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_addsub()?;
        loop {
            let op = if self.peek_is(&Token::Shl) {
                Some(BinOp::Shl)
            } else if self.peek_is(&Token::Shr) {
                Some(BinOp::Shr)
            } else {
                None
            };
            match op {
                Some(op) => {
                    self.advance();
                    let rhs = self.parse_addsub()?;
                    lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
                }
                None => return Ok(lhs),
            }
        }
    }

    // 10. + -
    fn parse_addsub(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = if self.peek_is(&Token::Plus) {
                Some(BinOp::Add)
            } else if self.peek_is(&Token::Minus) {
                Some(BinOp::Sub)
            } else {
                None
            };
            match op {
                Some(op) => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
                }
                None => return Ok(lhs),
            }
        }
    }

    // 11. * / // %
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = if self.peek_is(&Token::Star) {
                Some(BinOp::Mul)
            } else if self.peek_is(&Token::FloorDiv) {
                Some(BinOp::FloorDiv)
            } else if self.peek_is(&Token::Slash) {
                Some(BinOp::Div)
            } else if self.peek_is(&Token::Percent) {
                Some(BinOp::Mod)
            } else {
                None
            };
            match op {
                Some(op) => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
                }
                None => return Ok(lhs),
            }
        }
    }

    // 12. unary + - ~ (binds looser than ** so that -2**2 == -4)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = if self.peek_is(&Token::Minus) {
            Some(UnOp::Neg)
        } else if self.peek_is(&Token::Plus) {
            Some(UnOp::Pos)
        } else if self.peek_is(&Token::Tilde) {
            Some(UnOp::Invert)
        } else {
            None
        };
        match op {
            Some(op) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary(op, Box::new(operand)))
            }
            None => self.parse_power(),
        }
    }

    // 13. ** (right-associative; exponent may itself be unary, e.g. 2**-1)
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_trailer()?;
        if self.peek_is(&Token::Pow) {
            self.advance();
            let exp = self.parse_unary()?;
            Ok(Expr::Bin(BinOp::Pow, Box::new(base), Box::new(exp)))
        } else {
            Ok(base)
        }
    }

    // 14. trailers: .name  [expr]  (args)
    fn parse_trailer(&mut self) -> Result<Expr, ParseError> {
        let mut base = self.parse_atom()?;
        loop {
            if self.peek_is(&Token::Dot) {
                self.advance();
                let loc = self.loc();
                match self.advance() {
                    Some(Token::Ident(name)) => base = Expr::Attr(Box::new(base), name),
                    other => {
                        return Err(ParseError::Expected {
                            loc,
                            expected: "attribute name",
                            found: other.map(|t| format!("{t:?}")).unwrap_or_else(|| "end of input".into()),
                        })
                    }
                }
            } else if self.peek_is(&Token::LBracket) {
                self.advance();
                let index = self.parse_ternary()?;
                self.expect(&Token::RBracket, "`]`")?;
                base = Expr::Subscript(Box::new(base), Box::new(index));
            } else if self.peek_is(&Token::LParen) {
                self.advance();
                let mut args = Vec::new();
                if !self.peek_is(&Token::RParen) {
                    loop {
                        args.push(self.parse_ternary()?);
                        if self.peek_is(&Token::Comma) {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                self.expect(&Token::RParen, "`)`")?;
                base = Expr::Call(Box::new(base), args);
            } else {
                break;
            }
        }
        Ok(base)
    }

    // 15. atoms: literal, name, parenthesized expr, non-empty set literal
    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let loc = self.loc();
        match self.advance() {
            Some(Token::Int(i)) => Ok(Expr::Lit(Lit::Int(i))),
            Some(Token::Float(f)) => Ok(Expr::Lit(Lit::Float(f))),
            Some(Token::Str(s)) => Ok(Expr::Lit(Lit::Str(s))),
            Some(Token::True) => Ok(Expr::Lit(Lit::Bool(true))),
            Some(Token::False) => Ok(Expr::Lit(Lit::Bool(false))),
            Some(Token::None) => Ok(Expr::Lit(Lit::None)),
            Some(Token::Ident(name)) => Ok(Expr::Name(name)),
            Some(Token::LParen) => {
                let inner = self.parse_ternary()?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(inner)
            }
            Some(Token::LBrace) => {
                if self.peek_is(&Token::RBrace) {
                    return Err(ParseError::EmptySetLiteral { loc });
                }
                let mut items = Vec::new();
                loop {
                    items.push(self.parse_ternary()?);
                    if self.peek_is(&Token::Comma) {
                        self.advance();
                        if self.peek_is(&Token::RBrace) {
                            break;
                        }
                        continue;
                    }
                    break;
                }
                self.expect(&Token::RBrace, "`}`")?;
                Ok(Expr::SetLit(items))
            }
            other => Err(ParseError::Expected {
                loc,
                expected: "an expression",
                found: other.map(|t| format!("{t:?}")).unwrap_or_else(|| "end of input".into()),
            }),
        }
    }
}

