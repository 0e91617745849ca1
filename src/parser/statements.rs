//! Statements inside function bodies
//!
//! Covered forms:
//!
//! - Variable declarations: `int x = 42;`, `int buf[4] = {1, 2};`,
//!   `struct Point p = {1, 2};`
//! - Assignments: `x = e;`, `p.x = e;`, `buf[i] = e;`, `x++;`
//! - Control flow: `if`/`else if`/`else`, `while`, `for`
//! - `return`, `break`, `continue`
//! - Bare expression statements such as calls
//!
//! # Grammar
//!
//! ```text
//! statement  ::= var_decl | assignment | if_stmt | while_stmt | for_stmt
//!              | return_stmt | "break" ";" | "continue" ";"
//!              | "{" statement* "}" | ";" | expr ";"
//! assignment ::= place ("=" expr | "++" | "--") ";"
//! for_stmt   ::= "for" "(" [var_decl | assignment] [expr] ";" [step] ")" body
//! step       ::= place ("++" | "--" | "=" expr) | ("++" | "--") place
//! ```
//!
//! `x++` and `x--` are rewritten to `x = x + 1` and `x = x - 1` as they are
//! parsed. `break` and `continue` are rejected unless a loop body is open.

use crate::errors::CompileError;
use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::Parser;

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves).
    /// Nested bare blocks are spliced into the enclosing list.
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<Statement>, CompileError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            if self.match_token(&Token::LBrace(self.current_location())) {
                let nested = self.parse_block_statements()?;
                self.expect_rbrace("after block")?;
                statements.extend(nested);
                continue;
            }
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, CompileError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::Return(_) => {
                self.advance();
                self.parse_return_statement(loc)
            }
            Token::If(_) => {
                self.advance();
                self.parse_if_statement(loc)
            }
            Token::While(_) => {
                self.advance();
                self.parse_while_statement(loc)
            }
            Token::For(_) => {
                self.advance();
                self.parse_for_statement(loc)
            }
            Token::Break(_) => {
                self.advance();
                self.check_inside_loop("break", loc)?;
                self.expect_semicolon("after 'break'")?;
                Ok(Statement::Break { location: loc })
            }
            Token::Continue(_) => {
                self.advance();
                self.check_inside_loop("continue", loc)?;
                self.expect_semicolon("after 'continue'")?;
                Ok(Statement::Continue { location: loc })
            }
            Token::PlusPlus(_) | Token::MinusMinus(_) => {
                let step = self.parse_step()?;
                self.expect_semicolon("after increment")?;
                Ok(Statement::Assignment(step))
            }
            Token::Ident(..) => self.parse_assignment_or_expression(),
            _ if self.is_type_keyword() => {
                let decl = self.parse_variable_declaration()?;
                Ok(Statement::VarDecl(decl))
            }
            other => Err(CompileError::syntax(
                format!("Unexpected {} at start of statement", other),
                loc,
            )),
        }
    }

    fn check_inside_loop(&self, keyword: &'static str, loc: SourceLocation) -> Result<(), CompileError> {
        if self.loop_depth == 0 {
            return Err(CompileError::JumpOutsideLoop {
                keyword,
                location: loc,
            });
        }
        Ok(())
    }

    /// Body of an `if`, `else` or loop: a braced block or a single statement
    fn parse_body(&mut self, ctx: &str) -> Result<Vec<Statement>, CompileError> {
        if self.match_token(&Token::LBrace(self.current_location())) {
            let body = self.parse_block_statements()?;
            self.expect_rbrace(ctx)?;
            Ok(body)
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// Parse a loop body with the loop depth raised
    fn parse_loop_body(&mut self, ctx: &str) -> Result<Vec<Statement>, CompileError> {
        self.loop_depth += 1;
        let body = self.parse_body(ctx);
        self.loop_depth -= 1;
        body
    }

    /// Parse variable declaration: type name [ '[' N ']' ] [ = init ] ;
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<VarDecl, CompileError> {
        let loc = self.current_location();
        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;

        if ty == TypeName::Void {
            return Err(CompileError::declaration(
                format!("Variable '{}' cannot be void", name),
                loc,
            ));
        }

        let array_len = if self.match_token(&Token::LBracket(self.current_location())) {
            let size = self.parse_array_size(&name)?;
            self.expect_token(
                &Token::RBracket(self.current_location()),
                "Expected ']' after array size",
            )?;
            self.symbols.arrays.register(&name, size);
            Some(size)
        } else {
            None
        };

        let init = if self.match_token(&Token::Eq(self.current_location())) {
            Some(self.parse_initializer(&name, &ty, array_len, loc)?)
        } else {
            None
        };

        self.expect_semicolon("after variable declaration")?;

        Ok(VarDecl {
            name,
            ty,
            array_len,
            init,
            location: loc,
        })
    }

    fn parse_array_size(&mut self, name: &str) -> Result<usize, CompileError> {
        let loc = self.current_location();
        match self.peek_token() {
            Token::Number(text, _) => {
                self.advance();
                text.parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| {
                        CompileError::declaration(
                            format!(
                                "Array size of '{}' must be a positive integer constant, found {}",
                                name, text
                            ),
                            loc,
                        )
                    })
            }
            other => Err(CompileError::declaration(
                format!("Expected array size after '[', found {}", other),
                loc,
            )),
        }
    }

    fn parse_initializer(
        &mut self,
        name: &str,
        ty: &TypeName,
        array_len: Option<usize>,
        loc: SourceLocation,
    ) -> Result<Initializer, CompileError> {
        if !self.match_token(&Token::LBrace(self.current_location())) {
            if array_len.is_some() {
                return Err(CompileError::declaration(
                    format!("Array '{}' must be initialized with a brace list", name),
                    loc,
                ));
            }
            return Ok(Initializer::Expr(self.parse_expression()?));
        }

        let elements = self.parse_initializer_list()?;

        if let Some(len) = array_len {
            if elements.len() > len {
                return Err(CompileError::declaration(
                    format!(
                        "Too many initializers for '{}': {} given, size is {}",
                        name,
                        elements.len(),
                        len
                    ),
                    loc,
                ));
            }
            return Ok(Initializer::Array(elements));
        }

        match ty {
            TypeName::Struct(struct_name) => {
                let field_count = self
                    .symbols
                    .structs
                    .lookup(struct_name)
                    .map_or(0, |info| info.fields.len());
                if elements.len() > field_count {
                    return Err(CompileError::declaration(
                        format!(
                            "Too many initializers for struct '{}': {} given, {} fields",
                            struct_name,
                            elements.len(),
                            field_count
                        ),
                        loc,
                    ));
                }
                Ok(Initializer::Struct(elements))
            }
            _ => Err(CompileError::declaration(
                format!("Brace initializer used for scalar '{}'", name),
                loc,
            )),
        }
    }

    /// Elements after an opening '{' up to and including the closing '}'
    fn parse_initializer_list(&mut self) -> Result<Vec<Expr>, CompileError> {
        let mut elements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) {
            elements.push(self.parse_expression()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_rbrace("after initializer list")?;
        Ok(elements)
    }

    /// A statement starting with an identifier: an assignment when a place is
    /// followed by `=`, `++` or `--`, otherwise a bare expression.
    fn parse_assignment_or_expression(&mut self) -> Result<Statement, CompileError> {
        let start = self.position;
        let loc = self.current_location();

        if !matches!(self.peek_ahead(1), Some(Token::LParen(_))) {
            let target = self.parse_place()?;
            match self.peek_token() {
                Token::Eq(_) => {
                    self.advance();
                    let value = self.parse_expression()?;
                    self.expect_semicolon("after assignment")?;
                    return Ok(Statement::Assignment(Assignment {
                        target,
                        value,
                        location: loc,
                    }));
                }
                Token::PlusPlus(_) | Token::MinusMinus(_) => {
                    let step = self.finish_postfix_step(target, loc);
                    self.expect_semicolon("after increment")?;
                    return Ok(Statement::Assignment(step));
                }
                _ => self.position = start,
            }
        }

        let expr = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        Ok(Statement::Expression(expr))
    }

    /// Parse return statement: return [expr];
    fn parse_return_statement(&mut self, loc: SourceLocation) -> Result<Statement, CompileError> {
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(Statement::Return {
                value: None,
                location: loc,
            });
        }

        let value = self.parse_expression()?;
        self.expect_semicolon("after return value")?;
        Ok(Statement::Return {
            value: Some(value),
            location: loc,
        })
    }

    /// Parse if statement with any number of `else if` arms
    fn parse_if_statement(&mut self, loc: SourceLocation) -> Result<Statement, CompileError> {
        let (condition, then_body) = self.parse_conditional_arm("if")?;

        let mut else_ifs = Vec::new();
        let mut else_body = None;

        while self.match_token(&Token::Else(self.current_location())) {
            if self.match_token(&Token::If(self.current_location())) {
                let (condition, body) = self.parse_conditional_arm("else if")?;
                else_ifs.push(ElseIf { condition, body });
            } else {
                else_body = Some(self.parse_body("after else body")?);
                break;
            }
        }

        Ok(Statement::If(IfStmt {
            condition,
            then_body,
            else_ifs,
            else_body,
            location: loc,
        }))
    }

    fn parse_conditional_arm(&mut self, keyword: &str) -> Result<(Expr, Vec<Statement>), CompileError> {
        self.expect_lparen(&format!("after '{}'", keyword))?;
        let condition = self.parse_expression()?;
        self.expect_rparen(&format!("after {} condition", keyword))?;
        let body = self.parse_body(&format!("after {} body", keyword))?;
        Ok((condition, body))
    }

    /// Parse while loop
    fn parse_while_statement(&mut self, loc: SourceLocation) -> Result<Statement, CompileError> {
        self.expect_lparen("after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after while condition")?;

        let body = self.parse_loop_body("after while body")?;

        Ok(Statement::While(WhileStmt {
            condition,
            body,
            location: loc,
        }))
    }

    /// Parse for loop
    fn parse_for_statement(&mut self, loc: SourceLocation) -> Result<Statement, CompileError> {
        self.expect_lparen("after 'for'")?;

        // Init
        let init = if self.match_token(&Token::Semicolon(self.current_location())) {
            None
        } else if self.is_type_keyword() {
            Some(Box::new(Statement::VarDecl(self.parse_variable_declaration()?)))
        } else if matches!(self.peek(), Token::Ident(..)) {
            let init_loc = self.current_location();
            let target = self.parse_place()?;
            self.expect_token(
                &Token::Eq(self.current_location()),
                "Expected '=' in for initializer",
            )?;
            let value = self.parse_expression()?;
            self.expect_semicolon("after for initializer")?;
            Some(Box::new(Statement::Assignment(Assignment {
                target,
                value,
                location: init_loc,
            })))
        } else {
            return Err(CompileError::syntax(
                format!(
                    "Expected declaration or assignment in for initializer, found {}",
                    self.peek()
                ),
                self.current_location(),
            ));
        };

        // Condition
        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon("after for condition")?;

        // Increment
        let increment = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(self.parse_step()?)
        };
        self.expect_rparen("after for clauses")?;

        let body = self.parse_loop_body("after for body")?;

        Ok(Statement::For(ForStmt {
            init,
            condition,
            increment,
            body,
            location: loc,
        }))
    }

    /// `x++`, `x--`, `++x`, `--x` or `x = expr`, without the terminator
    fn parse_step(&mut self) -> Result<Assignment, CompileError> {
        let loc = self.current_location();

        let prefix = match self.peek() {
            Token::PlusPlus(_) => Some(BinOp::Add),
            Token::MinusMinus(_) => Some(BinOp::Sub),
            _ => None,
        };
        if let Some(op) = prefix {
            self.advance();
            let target = self.parse_place()?;
            return Ok(step_assignment(target, op, loc));
        }

        let target = self.parse_place()?;
        match self.peek_token() {
            Token::PlusPlus(_) | Token::MinusMinus(_) => Ok(self.finish_postfix_step(target, loc)),
            Token::Eq(_) => {
                self.advance();
                let value = self.parse_expression()?;
                Ok(Assignment {
                    target,
                    value,
                    location: loc,
                })
            }
            other => Err(CompileError::syntax(
                format!("Expected '++', '--' or '=' in increment, found {}", other),
                self.current_location(),
            )),
        }
    }

    /// Consume a trailing `++`/`--` and lower it
    fn finish_postfix_step(&mut self, target: Expr, loc: SourceLocation) -> Assignment {
        let op = match self.advance() {
            Token::MinusMinus(_) => BinOp::Sub,
            _ => BinOp::Add,
        };
        step_assignment(target, op, loc)
    }
}

/// `x = x + 1` / `x = x - 1`
fn step_assignment(target: Expr, op: BinOp, loc: SourceLocation) -> Assignment {
    let value = Expr::BinaryOp {
        op,
        left: Box::new(target.clone()),
        right: Box::new(Expr::number(1, loc)),
        location: loc,
    };
    Assignment {
        target,
        value,
        location: loc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(source: &str) -> Vec<Statement> {
        let mut parser = Parser::new(source).expect("lexing failed");
        let program = parser.parse_program().expect("parsing failed");
        let body = program
            .functions()
            .next()
            .map(|f| f.body.clone())
            .expect("no function");
        body
    }

    #[test]
    fn test_postfix_increment_statement() {
        let body = body_of("void f() { int i; i++; }");
        match &body[1] {
            Statement::Assignment(Assignment { target, value, .. }) => {
                assert_eq!(target.flattened_name().as_deref(), Some("i"));
                assert!(matches!(value, Expr::BinaryOp { op: BinOp::Add, .. }));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_else_if_chain() {
        let body = body_of(
            "int f(int a) { if (a < 1) { return 1; } else if (a < 2) { return 2; } else if (a < 3) { return 3; } else { return 4; } }",
        );
        match &body[0] {
            Statement::If(stmt) => {
                assert_eq!(stmt.else_ifs.len(), 2);
                assert!(stmt.else_body.is_some());
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_blocks_are_spliced() {
        let body = body_of("int f() { int a; { int b; { int c; } } ; return a; }");
        assert_eq!(body.len(), 4);
    }

    #[test]
    fn test_call_statement_is_expression() {
        let body = body_of("int g(int x) { return x; }\nint f() { g(1); return 0; }");
        // first function is g
        assert!(matches!(body[0], Statement::Return { .. }));

        let mut parser = Parser::new("int f() { g(1); return 0; }").unwrap();
        let program = parser.parse_program().unwrap();
        let f = program.find_function("f").unwrap();
        assert!(matches!(f.body[0], Statement::Expression(Expr::Call { .. })));
    }

    #[test]
    fn test_array_initializer_too_long() {
        let mut parser = Parser::new("void f() { int a[2] = {1, 2, 3}; }").unwrap();
        assert!(matches!(
            parser.parse_program(),
            Err(CompileError::InvalidDeclaration { .. })
        ));
    }

    #[test]
    fn test_array_size_must_be_number() {
        let mut parser = Parser::new("void f() { int n; int a[n]; }").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert_eq!(err.message(), "Expected array size after '[', found identifier 'n'");
    }

    #[test]
    fn test_missing_semicolon_is_fatal() {
        let mut parser = Parser::new("void f() { int a = 1 int b; }").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert!(matches!(err, CompileError::Syntax { .. }));
        assert_eq!(err.location().column, 22);
    }
}
