//! The [`Parser`] type: token cursor, `expect_*` helpers and the
//! [`Parser::parse_program`] entry point.
//!
//! # Layout
//!
//! Productions are spread over sibling modules that each extend `Parser`:
//! - `declarations`: top-level struct and function declarations
//! - `statements`: statements inside function bodies
//! - `expressions`: expressions with precedence climbing
//!
//! # Compilation state
//!
//! Everything that outlives a single production lives on the parser itself:
//! the token cursor, the loop nesting depth used to validate `break` and
//! `continue`, the [`SymbolTables`] and the warnings collected so far.
//! Nothing is global, so two parsers never share declarations.

use crate::diagnostics::{Category, Diagnostic};
use crate::errors::CompileError;
use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token};
use crate::symbols::SymbolTables;

/// Recursive descent parser for the C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) loop_depth: usize,
    pub(crate) symbols: SymbolTables,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, CompileError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        let mut parser = Self::from_tokens(tokens);
        parser.diagnostics = lexer.take_diagnostics();
        Ok(parser)
    }

    /// Build a parser over an already lexed stream. An end-of-file token is
    /// appended when the stream lacks one.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token::Eof(_))) {
            let loc = tokens.last().map(Token::location).unwrap_or_default();
            tokens.push(Token::Eof(loc));
        }
        Self {
            tokens,
            position: 0,
            loop_depth: 0,
            symbols: SymbolTables::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Parse the entire program (top-level declarations)
    pub fn parse_program(&mut self) -> Result<Program, CompileError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            if let Some(item) = self.parse_top_level_declaration()? {
                program.items.push(item);
            }
        }

        log::debug!(
            "parsed {} top-level declarations ({} structs registered)",
            program.items.len(),
            self.symbols.structs.len()
        );
        Ok(program)
    }

    pub fn symbols(&self) -> &SymbolTables {
        &self.symbols
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Hand over the symbol tables and collected warnings.
    pub fn finish(self) -> (SymbolTables, Vec<Diagnostic>) {
        (self.symbols, self.diagnostics)
    }

    // Cursor and reporting helpers

    pub(crate) fn warn(&mut self, message: impl Into<String>, location: SourceLocation) {
        let diag = Diagnostic::warning(Category::Parser, message).at(location);
        diag.log();
        self.diagnostics.push(diag);
    }

    /// Keywords that may start a declaration inside a function body
    pub(crate) fn is_type_keyword(&self) -> bool {
        matches!(
            self.peek(),
            Token::Int(_) | Token::Float(_) | Token::Double(_) | Token::Char(_) | Token::Struct(_)
        )
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.peek().clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    /// Skip tokens up to and including the next `;`
    pub(crate) fn skip_past_semicolon(&mut self) {
        while !self.is_at_end() {
            if matches!(self.advance(), Token::Semicolon(_)) {
                break;
            }
        }
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), CompileError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(CompileError::syntax(
                format!("{}, found {}", message, self.peek()),
                self.current_location(),
            ))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), CompileError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), CompileError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), CompileError> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            &format!("Expected '{{' {ctx}"),
        )
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), CompileError> {
        self.expect_token(
            &Token::RBrace(self.current_location()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), CompileError> {
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, CompileError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            let found = self.peek();
            let message = if found.is_keyword() {
                format!("Expected identifier, found reserved word {}", found)
            } else {
                format!("Expected identifier, found {}", found)
            };
            Err(CompileError::syntax(message, self.current_location()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_and_struct_items() {
        let source = "struct Point { int x; int y; };\nint main() { return 0; }";
        let mut parser = Parser::new(source).expect("lexing failed");
        let program = parser.parse_program().expect("parsing failed");

        let Some(Item::Struct(point)) = program.items.first() else {
            panic!("Expected struct first, got {:?}", program.items);
        };
        assert_eq!(point.name, "Point");
        assert_eq!(point.fields.len(), 2);

        let main = program.find_function("main").expect("missing main");
        assert!(main.params.is_empty());
        assert_eq!(main.return_type, TypeName::Int);
        assert!(matches!(main.body.as_slice(), [Statement::Return { value: Some(_), .. }]));

        assert!(parser.symbols().structs.find_struct("Point").is_some());
    }

    #[test]
    fn test_from_tokens_appends_eof() {
        let loc = SourceLocation::new(1, 1);
        let parser = Parser::from_tokens(vec![Token::Int(loc)]);
        assert!(matches!(parser.tokens.last(), Some(Token::Eof(_))));

        let mut empty = Parser::from_tokens(Vec::new());
        assert!(empty.parse_program().unwrap().items.is_empty());
    }

    #[test]
    fn test_expect_reports_found_token() {
        let mut parser = Parser::new("int main() { return 0 }").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert_eq!(
            err.message(),
            "Expected ';' after return value, found '}'"
        );
    }

    #[test]
    fn test_top_level_junk_is_skipped_with_warning() {
        let mut parser = Parser::new("42; int main() { return 0; }").unwrap();
        let program = parser.parse_program().unwrap();
        assert_eq!(program.functions().count(), 1);
        assert!(!parser.diagnostics().is_empty());
    }
}
