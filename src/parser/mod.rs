//! C-subset source parser
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: the [`Parser`] cursor and helpers, extended by
//!   `declarations`, `statements` and `expressions`
//! - [`ast`]: AST node definitions
//! - [`tree`]: indented AST dump
//!
//! # Supported Subset
//!
//! - Types: `int`, `float`, `double`, `char`, `void`, structs, fixed-size arrays
//! - Statements: declarations, assignments, `if`/`else if`/`else`, `while`,
//!   `for`, `return`, `break`, `continue`
//! - Expressions: arithmetic, comparison, logical, bitwise, shifts, calls
//! - No preprocessor, no pointers, no global variables
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! Array sizes and struct layouts are recorded in [`crate::symbols`] while parsing.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;
pub mod tree;

pub use expressions::{MIN_PRECEDENCE, PAREN_PRECEDENCE};
pub use parse::Parser;
