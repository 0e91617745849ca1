//! Expression lowering
//!
//! Vectors carry no arithmetic meaning in VHDL, so operands are cast where
//! an operator needs one:
//!
//! | source            | VHDL                                                  |
//! |-------------------|-------------------------------------------------------|
//! | `-5`              | `to_signed(-5, 32)`                                   |
//! | `-x`              | `-unsigned(x)`                                        |
//! | `a < 3`           | `unsigned(a) < to_unsigned(3, 32)`                    |
//! | `a == b`, `a != b`| `unsigned(a) = unsigned(b)`, `... /= ...`             |
//! | `a && b`          | `(unsigned(a) /= 0 and unsigned(b) /= 0)`             |
//! | `a & b`           | `unsigned(a) and unsigned(b)`                         |
//! | `a << n`          | `shift_left(unsigned(a), to_integer(unsigned(n)))`    |
//! | `!c`              | `not (c)` or `(unsigned(c) = 0)`                      |
//! | `~a`              | `not unsigned(a)`                                     |
//! | `p.x`, `a[i]`     | `p.x`, `a(i)`                                         |
//!
//! `&&` and `||` become plain gates: both sides are always evaluated.

use crate::codegen::VhdlGenerator;
use crate::diagnostics::{Category, Diagnostic};
use crate::parser::ast::*;

/// Width used for integer literal casts
pub const LITERAL_WIDTH: usize = 32;

fn is_arithmetic(op: BinOp) -> bool {
    matches!(op, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
}

fn comparison_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Eq => "=",
        BinOp::Ne => "/=",
        other => other.symbol(),
    }
}

impl VhdlGenerator<'_> {
    /// Lower an expression to VHDL text
    pub fn expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Number { text, .. } => {
                if text.starts_with('-') {
                    format!("to_signed({}, {})", text, LITERAL_WIDTH)
                } else {
                    text.clone()
                }
            }
            Expr::Identifier { name, .. } => self.names.lookup(name),
            Expr::FieldAccess { base, field, .. } => format!("{}.{}", self.expr(base), field),
            Expr::IndexAccess { base, index, .. } => {
                format!("{}({})", self.expr(base), self.expr(index))
            }
            Expr::Negate { operand, .. } => format!("-unsigned({})", self.expr(operand)),
            Expr::BinaryOp {
                op, left, right, ..
            } => self.binary(*op, left, right),
            Expr::UnaryOp {
                op: UnOp::Not,
                operand,
                ..
            } => {
                if operand.is_boolean() {
                    format!("not ({})", self.expr(operand))
                } else {
                    format!("({} = 0)", self.operand(operand))
                }
            }
            Expr::UnaryOp {
                op: UnOp::BitNot,
                operand,
                ..
            } => format!("not {}", self.operand(operand)),
            Expr::Call {
                name,
                args,
                location,
            } => {
                if !self.functions.contains(name.as_str()) {
                    let diag = Diagnostic::warning(
                        Category::Codegen,
                        format!("Call to undefined function '{}' emitted as-is", name),
                    )
                    .at(*location);
                    self.report(diag);
                }
                let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("{}({})", name, args.join(", "))
            }
        }
    }

    /// Cast an operand to a numeric type
    pub fn operand(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Number { text, .. } if text.starts_with('-') => {
                format!("to_signed({}, {})", text, LITERAL_WIDTH)
            }
            Expr::Number { text, .. } => format!("to_unsigned({}, {})", text, LITERAL_WIDTH),
            other => format!("unsigned({})", self.expr(other)),
        }
    }

    /// Turn an expression into a condition usable by `if`/`while`
    pub fn condition(&mut self, expr: &Expr) -> String {
        if expr.is_boolean() {
            self.expr(expr)
        } else {
            format!("{} /= 0", self.operand(expr))
        }
    }

    fn binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> String {
        match op {
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => format!(
                "{} {} {}",
                self.operand(left),
                comparison_symbol(op),
                self.operand(right)
            ),
            BinOp::And | BinOp::Or => {
                let gate = if op == BinOp::And { "and" } else { "or" };
                format!("({} {} {})", self.gate_input(left), gate, self.gate_input(right))
            }
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => {
                let gate = match op {
                    BinOp::BitAnd => "and",
                    BinOp::BitOr => "or",
                    _ => "xor",
                };
                format!("{} {} {}", self.operand(left), gate, self.operand(right))
            }
            BinOp::Shl | BinOp::Shr => {
                let func = if op == BinOp::Shl {
                    "shift_left"
                } else {
                    "shift_right"
                };
                // Literal amounts are emitted as naturals
                let amount = match right.integer_literal() {
                    Some(n) if n >= 0 => n.to_string(),
                    _ => format!("to_integer({})", self.operand(right)),
                };
                format!("{}({}, {})", func, self.operand(left), amount)
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                let lhs = self.infix_operand(op, left, false);
                let rhs = self.infix_operand(op, right, true);
                format!("{} {} {}", lhs, op.symbol(), rhs)
            }
        }
    }

    fn gate_input(&mut self, expr: &Expr) -> String {
        if expr.is_boolean() {
            format!("({})", self.expr(expr))
        } else {
            format!("{} /= 0", self.operand(expr))
        }
    }

    /// Parenthesize a child of an infix operator unless it binds tighter
    fn infix_operand(&mut self, parent: BinOp, child: &Expr, is_right: bool) -> String {
        let text = self.expr(child);
        let needs_parens = match child {
            Expr::BinaryOp { op, .. } if is_arithmetic(*op) => {
                op.precedence() < parent.precedence()
                    || (is_right && op.precedence() == parent.precedence())
            }
            Expr::BinaryOp { .. } | Expr::Negate { .. } => true,
            _ => false,
        };
        if needs_parens {
            format!("({})", text)
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::codegen::VhdlGenerator;
    use crate::parser::Parser;
    use crate::symbols::SymbolTables;

    fn lower(source: &str) -> String {
        let mut parser = Parser::new(source).expect("lexing failed");
        let expr = parser.parse_expression().expect("parsing failed");
        let symbols = SymbolTables::new();
        let mut generator = VhdlGenerator::new(&symbols);
        generator.expr(&expr)
    }

    #[test]
    fn test_literals_and_names() {
        assert_eq!(lower("42"), "42");
        assert_eq!(lower("-5"), "to_signed(-5, 32)");
        assert_eq!(lower("-x"), "-unsigned(x)");
        assert_eq!(lower("result"), "result_local");
        assert_eq!(lower("p.x"), "p.x");
        assert_eq!(lower("arr[i]"), "arr(i)");
    }

    #[test]
    fn test_comparisons_cast_operands() {
        assert_eq!(lower("a < 3"), "unsigned(a) < to_unsigned(3, 32)");
        assert_eq!(lower("a == -1"), "unsigned(a) = to_signed(-1, 32)");
        assert_eq!(lower("a != b"), "unsigned(a) /= unsigned(b)");
    }

    #[test]
    fn test_logical_gates() {
        assert_eq!(
            lower("a > 0 && b"),
            "((unsigned(a) > to_unsigned(0, 32)) and unsigned(b) /= 0)"
        );
        assert_eq!(lower("a || b"), "(unsigned(a) /= 0 or unsigned(b) /= 0)");
    }

    #[test]
    fn test_bitwise_and_shifts() {
        assert_eq!(lower("a & b"), "unsigned(a) and unsigned(b)");
        assert_eq!(lower("a ^ b"), "unsigned(a) xor unsigned(b)");
        assert_eq!(lower("a << 2"), "shift_left(unsigned(a), 2)");
        assert_eq!(
            lower("a >> n"),
            "shift_right(unsigned(a), to_integer(unsigned(n)))"
        );
    }

    #[test]
    fn test_unary_not() {
        assert_eq!(lower("!(a < b)"), "not (unsigned(a) < unsigned(b))");
        assert_eq!(lower("!a"), "(unsigned(a) = 0)");
        assert_eq!(lower("!!a"), "not ((unsigned(a) = 0))");
        assert_eq!(lower("~a"), "not unsigned(a)");
    }

    #[test]
    fn test_infix_grouping_survives() {
        assert_eq!(lower("(a + b) * c"), "(a + b) * c");
        assert_eq!(lower("a - (b - c)"), "a - (b - c)");
        assert_eq!(lower("a - b - c"), "a - b - c");
        assert_eq!(lower("a + b * c"), "a + b * c");
        assert_eq!(lower("-(a + b)"), "0 - (a + b)");
    }
}
