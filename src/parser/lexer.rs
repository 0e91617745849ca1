//! Lexer for the C subset
//!
//! Turns source text into a flat [`Token`] vector ending in [`Token::Eof`].
//! Keywords and operators are recognised through the [`KEYWORDS`] and
//! [`SYMBOLS`] tables, which also provide the spelling used in messages.
//! There is no preprocessor: `#` lines are skipped and reported as warnings.

use std::fmt;
use std::mem::discriminant;

use super::ast::SourceLocation;
use crate::diagnostics::{Category, Diagnostic};
use crate::errors::CompileError;

/// A lexical token. Every variant carries the [`SourceLocation`] of its first
/// character.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Digits and dots, kept as written (`42`, `3.25`)
    Number(String, SourceLocation),
    /// Recognised so the parser can reject it with a clear message
    StringLiteral(String, SourceLocation),
    Ident(String, SourceLocation),

    /// Type keywords
    Int(SourceLocation),
    Float(SourceLocation),
    Double(SourceLocation),
    Char(SourceLocation),
    Void(SourceLocation),
    Struct(SourceLocation),

    /// Control flow keywords
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    For(SourceLocation),
    Break(SourceLocation),
    Continue(SourceLocation),
    Return(SourceLocation),

    /// Operators
    Plus(SourceLocation),
    Minus(SourceLocation),
    Star(SourceLocation),
    Slash(SourceLocation),
    Percent(SourceLocation),
    EqEq(SourceLocation),
    NotEq(SourceLocation),
    Lt(SourceLocation),
    Le(SourceLocation),
    Gt(SourceLocation),
    Ge(SourceLocation),
    AndAnd(SourceLocation),
    OrOr(SourceLocation),
    Bang(SourceLocation),
    Amp(SourceLocation),
    Pipe(SourceLocation),
    Caret(SourceLocation),
    Tilde(SourceLocation),
    LtLt(SourceLocation),
    GtGt(SourceLocation),
    Eq(SourceLocation),
    PlusPlus(SourceLocation),
    MinusMinus(SourceLocation),
    Dot(SourceLocation),

    /// Punctuation
    LParen(SourceLocation),
    RParen(SourceLocation),
    LBrace(SourceLocation),
    RBrace(SourceLocation),
    LBracket(SourceLocation),
    RBracket(SourceLocation),
    Semicolon(SourceLocation),
    Comma(SourceLocation),

    Eof(SourceLocation),
}

/// Builds a fixed-spelling token at a location
pub type Constructor = fn(SourceLocation) -> Token;

/// Reserved words of the dialect
pub const KEYWORDS: &[(&str, Constructor)] = &[
    ("int", Token::Int),
    ("float", Token::Float),
    ("double", Token::Double),
    ("char", Token::Char),
    ("void", Token::Void),
    ("struct", Token::Struct),
    ("if", Token::If),
    ("else", Token::Else),
    ("while", Token::While),
    ("for", Token::For),
    ("break", Token::Break),
    ("continue", Token::Continue),
    ("return", Token::Return),
];

/// Operators and punctuation, two-character spellings first so that the
/// longest match wins
pub const SYMBOLS: &[(&str, Constructor)] = &[
    ("++", Token::PlusPlus),
    ("--", Token::MinusMinus),
    ("==", Token::EqEq),
    ("!=", Token::NotEq),
    ("<=", Token::Le),
    (">=", Token::Ge),
    ("<<", Token::LtLt),
    (">>", Token::GtGt),
    ("&&", Token::AndAnd),
    ("||", Token::OrOr),
    ("+", Token::Plus),
    ("-", Token::Minus),
    ("*", Token::Star),
    ("/", Token::Slash),
    ("%", Token::Percent),
    ("=", Token::Eq),
    ("<", Token::Lt),
    (">", Token::Gt),
    ("!", Token::Bang),
    ("&", Token::Amp),
    ("|", Token::Pipe),
    ("^", Token::Caret),
    ("~", Token::Tilde),
    (".", Token::Dot),
    ("(", Token::LParen),
    (")", Token::RParen),
    ("{", Token::LBrace),
    ("}", Token::RBrace),
    ("[", Token::LBracket),
    ("]", Token::RBracket),
    (";", Token::Semicolon),
    (",", Token::Comma),
];

impl Token {
    pub fn location(&self) -> SourceLocation {
        use Token::*;
        match *self {
            Number(_, loc) | StringLiteral(_, loc) | Ident(_, loc) => loc,
            Int(loc) | Float(loc) | Double(loc) | Char(loc) | Void(loc) | Struct(loc) => loc,
            If(loc) | Else(loc) | While(loc) | For(loc) | Break(loc) | Continue(loc)
            | Return(loc) => loc,
            Plus(loc) | Minus(loc) | Star(loc) | Slash(loc) | Percent(loc) | EqEq(loc)
            | NotEq(loc) | Lt(loc) | Le(loc) | Gt(loc) | Ge(loc) | AndAnd(loc) | OrOr(loc)
            | Bang(loc) | Amp(loc) | Pipe(loc) | Caret(loc) | Tilde(loc) | LtLt(loc)
            | GtGt(loc) | Eq(loc) | PlusPlus(loc) | MinusMinus(loc) | Dot(loc) => loc,
            LParen(loc) | RParen(loc) | LBrace(loc) | RBrace(loc) | LBracket(loc)
            | RBracket(loc) | Semicolon(loc) | Comma(loc) | Eof(loc) => loc,
        }
    }

    pub fn is_keyword(&self) -> bool {
        find_spelling(KEYWORDS, self).is_some()
    }

    /// Fixed source text of a keyword, operator or punctuation token
    pub fn spelling(&self) -> Option<&'static str> {
        find_spelling(KEYWORDS, self).or_else(|| find_spelling(SYMBOLS, self))
    }
}

fn find_spelling(table: &[(&'static str, Constructor)], token: &Token) -> Option<&'static str> {
    let kind = discriminant(token);
    table
        .iter()
        .find(|(_, make)| discriminant(&make(SourceLocation::default())) == kind)
        .map(|(text, _)| *text)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(text, _) => write!(f, "number {}", text),
            Token::StringLiteral(text, _) => write!(f, "string literal \"{}\"", text),
            Token::Ident(name, _) => write!(f, "identifier '{}'", name),
            Token::Eof(_) => f.write_str("end of file"),
            other => match other.spelling() {
                Some(text) => write!(f, "'{}'", text),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

fn lex_error(message: impl Into<String>, location: SourceLocation) -> CompileError {
    CompileError::Lex {
        message: message.into(),
        location,
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            input: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the whole input. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => break,
                Some('#') => self.skip_directive(),
                Some(_) => tokens.push(self.next_token()?),
            }
        }
        tokens.push(Token::Eof(self.current_location()));

        log::debug!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }

    /// Warnings collected while tokenizing
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn next_token(&mut self) -> Result<Token, CompileError> {
        let loc = self.current_location();

        match self.peek() {
            Some('"') => {
                self.advance();
                return self.string_literal(loc);
            }
            Some(c) if c.is_ascii_digit() => {
                let text = self.take_while(|c| c.is_ascii_digit() || c == '.');
                return Ok(Token::Number(text, loc));
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let word = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                return Ok(match KEYWORDS.iter().find(|(kw, _)| *kw == word) {
                    Some((_, make)) => make(loc),
                    None => Token::Ident(word, loc),
                });
            }
            _ => {}
        }

        for (text, make) in SYMBOLS {
            if self.lookahead_is(text) {
                for _ in 0..text.len() {
                    self.advance();
                }
                return Ok(make(loc));
            }
        }

        let ch = self.peek().unwrap_or('\0');
        Err(lex_error(format!("Unexpected character: '{}'", ch), loc))
    }

    fn lookahead_is(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(|&c| accept(c)) {
            text.push(c);
            self.advance();
        }
        text
    }

    /// Body of a string literal, after the opening quote. Escapes are kept
    /// verbatim.
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, CompileError> {
        let mut text = String::new();

        loop {
            match self.advance() {
                Some('"') => return Ok(Token::StringLiteral(text, loc)),
                Some('\\') => {
                    text.push('\\');
                    if let Some(escaped) = self.advance() {
                        text.push(escaped);
                    }
                }
                Some('\n') | None => return Err(lex_error("Unterminated string literal", loc)),
                Some(c) => text.push(c),
            }
        }
    }

    /// Whitespace, `//` line comments and `/* */` block comments
    fn skip_trivia(&mut self) -> Result<(), CompileError> {
        loop {
            if self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            } else if self.lookahead_is("//") {
                self.skip_line();
            } else if self.lookahead_is("/*") {
                let start = self.current_location();
                self.advance();
                self.advance();
                while !self.lookahead_is("*/") {
                    if self.advance().is_none() {
                        return Err(lex_error("Unterminated block comment", start));
                    }
                }
                self.advance();
                self.advance();
            } else {
                return Ok(());
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.advance() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_directive(&mut self) {
        let loc = self.current_location();
        let start = self.position;
        self.skip_line();

        let directive: String = self.input[start..self.position].iter().collect();
        let diag = Diagnostic::warning(
            Category::Lexer,
            format!("Preprocessor directive ignored: {}", directive.trim_end()),
        )
        .at(loc);
        diag.log();
        self.diagnostics.push(diag);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
