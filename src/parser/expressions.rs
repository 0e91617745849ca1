//! Expressions
//!
//! Binary operators are parsed by precedence climbing; everything else by
//! recursive descent in [`Parser::parse_primary`].
//!
//! # Precedence
//!
//! ```text
//! 7   * /
//! 6   + -
//! 5   << >>
//! 4   < <= > >=
//! 3   == !=
//! 2   &
//! 1   ^
//! 0   |
//! -1  &&
//! -2  ||
//! ```
//!
//! Every operator is left associative. A full expression starts at the
//! lowest level (-2); a parenthesized sub-expression restarts at level 1, so
//! `|`, `&&` and `||` cannot appear directly inside bare parentheses.
//!
//! # Primaries
//!
//! - `!e` and `~e`, whose operand is itself a primary
//! - `-e`: folds into a negative literal, a negated place, or `0 - e`
//! - `( e )`
//! - numbers, calls `f(a, b)`, and places `a`, `a.b.c`, `a[i]`, `a.b[i]`
//!
//! A constant index is checked against the declared size of the array when
//! the array is known.

use crate::errors::CompileError;
use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::Parser;

/// Threshold for a full expression
pub const MIN_PRECEDENCE: i32 = -2;
/// Threshold inside parentheses
pub const PAREN_PRECEDENCE: i32 = 1;

/// Binary operator spelled by `token`, if any
fn binary_op(token: &Token) -> Option<BinOp> {
    let op = match token {
        Token::Star(_) => BinOp::Mul,
        Token::Slash(_) => BinOp::Div,
        Token::Plus(_) => BinOp::Add,
        Token::Minus(_) => BinOp::Sub,
        Token::LtLt(_) => BinOp::Shl,
        Token::GtGt(_) => BinOp::Shr,
        Token::Lt(_) => BinOp::Lt,
        Token::Le(_) => BinOp::Le,
        Token::Gt(_) => BinOp::Gt,
        Token::Ge(_) => BinOp::Ge,
        Token::EqEq(_) => BinOp::Eq,
        Token::NotEq(_) => BinOp::Ne,
        Token::Amp(_) => BinOp::BitAnd,
        Token::Caret(_) => BinOp::BitXor,
        Token::Pipe(_) => BinOp::BitOr,
        Token::AndAnd(_) => BinOp::And,
        Token::OrOr(_) => BinOp::Or,
        _ => return None,
    };
    Some(op)
}

impl Parser {
    /// Parse a full expression
    pub fn parse_expression(&mut self) -> Result<Expr, CompileError> {
        self.parse_expression_prec(MIN_PRECEDENCE)
    }

    /// Precedence climbing: fold operators binding at least `min_prec`
    pub(crate) fn parse_expression_prec(&mut self, min_prec: i32) -> Result<Expr, CompileError> {
        let mut left = self.parse_primary()?;

        while let Some(op) = binary_op(self.peek()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            let loc = self.current_location();
            self.advance();

            let right = self.parse_expression_prec(prec + 1)?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location: loc,
            };
        }

        Ok(left)
    }

    pub(crate) fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::Bang(_) | Token::Tilde(_) => {
                let op = if matches!(self.advance(), Token::Bang(_)) {
                    UnOp::Not
                } else {
                    UnOp::BitNot
                };
                let operand = self.parse_primary()?;
                Ok(Expr::UnaryOp {
                    op,
                    operand: Box::new(operand),
                    location: loc,
                })
            }
            Token::Minus(_) => {
                self.advance();
                let operand = self.parse_primary()?;
                Ok(negate(operand, loc))
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression_prec(PAREN_PRECEDENCE)?;
                self.expect_rparen("after expression")?;
                Ok(expr)
            }
            Token::Number(text, _) => {
                self.advance();
                Ok(Expr::Number {
                    text,
                    location: loc,
                })
            }
            Token::Ident(name, _) => {
                if matches!(self.peek_ahead(1), Some(Token::LParen(_))) {
                    self.advance(); // name
                    self.advance(); // (
                    self.parse_call(name, loc)
                } else {
                    self.parse_place()
                }
            }
            Token::StringLiteral(..) => Err(CompileError::syntax(
                "String literals are not supported",
                loc,
            )),
            other => Err(CompileError::syntax(
                format!("Expected expression, found {}", other),
                loc,
            )),
        }
    }

    /// Arguments after `name(` through the closing `)`
    fn parse_call(&mut self, name: String, loc: SourceLocation) -> Result<Expr, CompileError> {
        let mut args = Vec::new();

        if !self.check(&Token::RParen(self.current_location())) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
        }

        self.expect_rparen("after call arguments")?;
        Ok(Expr::Call {
            name,
            args,
            location: loc,
        })
    }

    /// Identifier, optional `.field` chain, optional single `[index]`
    pub(crate) fn parse_place(&mut self) -> Result<Expr, CompileError> {
        let loc = self.current_location();
        let name = self.expect_identifier()?;
        let mut place = Expr::Identifier {
            name,
            location: loc,
        };

        while self.match_token(&Token::Dot(self.current_location())) {
            let field = self.expect_identifier()?;
            place = Expr::FieldAccess {
                base: Box::new(place),
                field,
                location: loc,
            };
        }

        if self.match_token(&Token::LBracket(self.current_location())) {
            let index = self.parse_expression()?;
            self.expect_token(
                &Token::RBracket(self.current_location()),
                "Expected ']' after array index",
            )?;
            self.check_constant_index(&place, &index, loc)?;
            place = Expr::IndexAccess {
                base: Box::new(place),
                index: Box::new(index),
                location: loc,
            };
        }

        Ok(place)
    }

    /// Reject a literal index outside the declared size of a known array
    fn check_constant_index(&self, base: &Expr, index: &Expr, loc: SourceLocation) -> Result<(), CompileError> {
        let (Some(value), Some(name)) = (index.integer_literal(), base.flattened_name()) else {
            return Ok(());
        };
        let Some(size) = self.symbols.arrays.size(&name) else {
            return Ok(());
        };

        if value < 0 || value as u64 >= size as u64 {
            return Err(CompileError::ArrayIndexOutOfBounds {
                index: value,
                name,
                size,
                location: loc,
            });
        }
        Ok(())
    }
}

/// Unary minus: literals fold, places negate, anything else is `0 - e`
fn negate(operand: Expr, loc: SourceLocation) -> Expr {
    match operand {
        Expr::Number { text, .. } => {
            let text = match text.strip_prefix('-') {
                Some(positive) => positive.to_string(),
                None => format!("-{}", text),
            };
            Expr::Number {
                text,
                location: loc,
            }
        }
        place if place.is_place() => Expr::Negate {
            operand: Box::new(place),
            location: loc,
        },
        other => Expr::BinaryOp {
            op: BinOp::Sub,
            left: Box::new(Expr::number(0, loc)),
            right: Box::new(other),
            location: loc,
        },
    }
}
