//! Fatal compilation errors
//!
//! Every error here stops the compilation before any VHDL is produced. The
//! variants map one-to-one onto the diagnostic categories reported by the
//! command-line driver (see [`crate::diagnostics`]).

use crate::diagnostics::Category;
use crate::parser::ast::SourceLocation;

/// Errors that abort a compilation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// Unexpected character, unterminated comment or string
    #[error("Lexer error at line {}, column {}: {message}", .location.line, .location.column)]
    Lex {
        message: String,
        location: SourceLocation,
    },

    /// A structurally required token is missing
    #[error("Parse error at line {}, column {}: {message}", .location.line, .location.column)]
    Syntax {
        message: String,
        location: SourceLocation,
    },

    /// Constant array index outside the declared size
    #[error(
        "Array index {index} out of bounds for '{name}' with size {size} (line {})",
        .location.line
    )]
    ArrayIndexOutOfBounds {
        index: i64,
        name: String,
        size: usize,
        location: SourceLocation,
    },

    /// `break` or `continue` outside any loop body
    #[error("'{keyword}' not within a loop (line {})", .location.line)]
    JumpOutsideLoop {
        keyword: &'static str,
        location: SourceLocation,
    },

    /// Malformed array or struct declaration, undefined or redefined struct
    #[error("Invalid declaration at line {}, column {}: {message}", .location.line, .location.column)]
    InvalidDeclaration {
        message: String,
        location: SourceLocation,
    },
}

impl CompileError {
    pub(crate) fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        CompileError::Syntax {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn declaration(
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        CompileError::InvalidDeclaration {
            message: message.into(),
            location,
        }
    }

    /// Where in the source the error was detected
    pub fn location(&self) -> SourceLocation {
        match self {
            CompileError::Lex { location, .. }
            | CompileError::Syntax { location, .. }
            | CompileError::ArrayIndexOutOfBounds { location, .. }
            | CompileError::JumpOutsideLoop { location, .. }
            | CompileError::InvalidDeclaration { location, .. } => *location,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            CompileError::Lex { .. } => Category::Lexer,
            CompileError::Syntax { .. } => Category::Parser,
            CompileError::ArrayIndexOutOfBounds { .. }
            | CompileError::JumpOutsideLoop { .. }
            | CompileError::InvalidDeclaration { .. } => Category::Semantic,
        }
    }

    /// The bare message without the location prefix
    pub fn message(&self) -> String {
        match self {
            CompileError::Lex { message, .. }
            | CompileError::Syntax { message, .. }
            | CompileError::InvalidDeclaration { message, .. } => message.clone(),
            CompileError::ArrayIndexOutOfBounds {
                index, name, size, ..
            } => format!("Array index {index} out of bounds for '{name}' with size {size}"),
            CompileError::JumpOutsideLoop { keyword, .. } => {
                format!("'{keyword}' not within a loop")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_message_names_index_array_and_size() {
        let err = CompileError::ArrayIndexOutOfBounds {
            index: 5,
            name: "arr".to_string(),
            size: 3,
            location: SourceLocation::new(4, 9),
        };
        assert_eq!(
            err.message(),
            "Array index 5 out of bounds for 'arr' with size 3"
        );
        assert_eq!(err.category(), Category::Semantic);
        assert_eq!(err.location().line, 4);
    }

    #[test]
    fn test_syntax_display_includes_position() {
        let err = CompileError::syntax("Expected ';'", SourceLocation::new(2, 7));
        assert_eq!(
            err.to_string(),
            "Parse error at line 2, column 7: Expected ';'"
        );
        assert_eq!(err.category(), Category::Parser);
    }
}
