//! Top-level declarations
//!
//! Covered forms:
//!
//! - Struct definitions: `struct Name { ... };`
//! - Function definitions: `int add(int a, int b) { ... }`
//! - Type names and function parameters
//!
//! # Grammar
//!
//! ```text
//! declaration  ::= struct_def | function_def
//! struct_def   ::= "struct" identifier "{" (type identifier ";")+ "}" ";"
//! function_def ::= type identifier "(" params ")" "{" statements "}"
//! params       ::= "" | "void" | type identifier ("," type identifier)*
//! type         ::= "int" | "float" | "double" | "char" | "void"
//!                | "struct" identifier
//! ```
//!
//! Global variables, prototypes and stray tokens are not declarations in
//! this dialect: they are reported as warnings and skipped.

use crate::errors::CompileError;
use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::Parser;

impl Parser {
    /// Parse one top-level declaration. `Ok(None)` means the tokens were
    /// skipped with a warning.
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<Option<Item>, CompileError> {
        let loc = self.current_location();

        // Distinguish:
        //   struct Name { ... };           <- struct definition
        //   struct Name func_name(...) ... <- function with struct return type
        let type_len = match self.peek() {
            Token::Struct(_) => match (self.peek_ahead(1), self.peek_ahead(2)) {
                (Some(Token::Ident(..)), Some(Token::LBrace(_))) => {
                    self.advance(); // consume 'struct'
                    return self.parse_struct_definition().map(|decl| Some(Item::Struct(decl)));
                }
                (Some(Token::Ident(..)), _) => 2,
                _ => {
                    self.warn("Expected struct name after 'struct'", loc);
                    self.advance();
                    return Ok(None);
                }
            },
            Token::Int(_) | Token::Float(_) | Token::Double(_) | Token::Char(_) | Token::Void(_) => 1,
            other => {
                let message = format!("Skipping unexpected {} at top level", other);
                self.warn(message, loc);
                self.advance();
                return Ok(None);
            }
        };

        match (self.peek_ahead(type_len), self.peek_ahead(type_len + 1)) {
            (Some(Token::Ident(..)), Some(Token::LParen(_))) => self
                .parse_function_definition()
                .map(|func| func.map(Item::Function)),
            (Some(Token::Ident(..)), _) => {
                self.warn("Global variable declarations not yet implemented", loc);
                self.skip_past_semicolon();
                Ok(None)
            }
            (found, _) => {
                let message = match found {
                    Some(token) => format!("Expected identifier after type, found {}", token),
                    None => "Expected identifier after type".to_string(),
                };
                self.warn(message, loc);
                self.advance();
                Ok(None)
            }
        }
    }

    /// Parse struct definition: struct Name { fields };
    pub(crate) fn parse_struct_definition(&mut self) -> Result<StructDecl, CompileError> {
        let loc = self.current_location();
        let name = self.expect_identifier()?;

        if self.symbols.structs.find_struct(&name).is_some() {
            return Err(CompileError::declaration(
                format!("Redefinition of struct '{}'", name),
                loc,
            ));
        }

        self.expect_lbrace("after struct name")?;

        let mut fields: Vec<Field> = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            let field_loc = self.current_location();
            let ty = self.parse_type()?;
            let field_name = self.expect_identifier()?;

            if ty == TypeName::Void {
                return Err(CompileError::declaration(
                    format!("Field '{}' of struct '{}' cannot be void", field_name, name),
                    field_loc,
                ));
            }
            if fields.iter().any(|f| f.name == field_name) {
                return Err(CompileError::declaration(
                    format!("Duplicate field '{}' in struct '{}'", field_name, name),
                    field_loc,
                ));
            }
            self.expect_semicolon("after struct field")?;

            fields.push(Field {
                name: field_name,
                ty,
            });
        }

        self.expect_rbrace("after struct fields")?;
        self.expect_semicolon("after struct definition")?;

        if fields.is_empty() {
            return Err(CompileError::declaration(
                format!("Struct '{}' has no fields", name),
                loc,
            ));
        }

        let index = self.symbols.structs.register_struct(&name);
        for field in &fields {
            self.symbols.structs.add_field(index, &field.name, field.ty.clone());
        }
        log::debug!("registered struct '{}' with {} fields", name, fields.len());

        Ok(StructDecl {
            name,
            fields,
            location: loc,
        })
    }

    /// Parse function definition: type name(params) { body }
    ///
    /// A prototype (`type name(params);`) is skipped with a warning.
    pub(crate) fn parse_function_definition(&mut self) -> Result<Option<FunctionDecl>, CompileError> {
        let return_type = self.parse_type()?;
        let loc = self.current_location();
        let name = self.expect_identifier()?;

        self.expect_lparen("after function name")?;

        // Array names are local to the function being parsed
        self.symbols.arrays.clear();
        let params = self.parse_parameter_list()?;

        self.expect_rparen("after parameters")?;

        if self.match_token(&Token::Semicolon(self.current_location())) {
            self.warn(format!("Function prototype for '{}' ignored", name), loc);
            return Ok(None);
        }

        self.expect_lbrace("before function body")?;

        self.loop_depth = 0;
        let body = self.parse_block_statements()?;

        self.expect_rbrace("after function body")?;

        log::debug!(
            "parsed function '{}' ({} parameters, {} statements)",
            name,
            params.len(),
            body.len()
        );

        Ok(Some(FunctionDecl {
            name,
            return_type,
            params,
            body,
            location: loc,
        }))
    }

    /// Parse parameter list: (type name, type name, ...)
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, CompileError> {
        let mut params: Vec<Param> = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        // (void) means no parameters
        if matches!(self.peek(), Token::Void(_))
            && matches!(self.peek_ahead(1), Some(Token::RParen(_)))
        {
            self.advance();
            return Ok(params);
        }

        loop {
            let loc = self.current_location();
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;

            if ty == TypeName::Void {
                return Err(CompileError::declaration(
                    format!("Parameter '{}' cannot be void", name),
                    loc,
                ));
            }
            if self.check(&Token::LBracket(self.current_location())) {
                return Err(CompileError::declaration(
                    format!("Array parameter '{}' is not supported", name),
                    loc,
                ));
            }
            if params.iter().any(|p| p.name == name) {
                return Err(CompileError::declaration(
                    format!("Duplicate parameter '{}'", name),
                    loc,
                ));
            }

            params.push(Param {
                name,
                ty,
                location: loc,
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse a type name. Struct types must already be defined.
    pub(crate) fn parse_type(&mut self) -> Result<TypeName, CompileError> {
        let loc = self.current_location();
        let ty = match self.peek_token() {
            Token::Int(_) => TypeName::Int,
            Token::Float(_) => TypeName::Float,
            Token::Double(_) => TypeName::Double,
            Token::Char(_) => TypeName::Char,
            Token::Void(_) => TypeName::Void,
            Token::Struct(_) => {
                self.advance();
                let name = self.expect_identifier()?;
                if self.symbols.structs.find_struct(&name).is_none() {
                    return Err(CompileError::declaration(
                        format!("Undefined struct '{}'", name),
                        loc,
                    ));
                }
                return Ok(TypeName::Struct(name));
            }
            other => {
                return Err(CompileError::syntax(
                    format!("Expected type, found {}", other),
                    loc,
                ));
            }
        };
        self.advance();
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (Result<Program, CompileError>, Parser) {
        let mut parser = Parser::new(source).expect("lexing failed");
        let result = parser.parse_program();
        (result, parser)
    }

    #[test]
    fn test_struct_return_function() {
        let (result, _) = parse(
            "struct P { int x; int y; };\nstruct P make(int a) { struct P p; return p; }",
        );
        let program = result.unwrap();
        let func = program.find_function("make").unwrap();
        assert_eq!(func.return_type, TypeName::Struct("P".to_string()));
        assert_eq!(func.params[0].ty, TypeName::Int);
    }

    #[test]
    fn test_global_variable_is_skipped_with_warning() {
        let (result, parser) = parse("int counter = 3;\nint f() { return 1; }");
        let program = result.unwrap();
        assert_eq!(program.items.len(), 1);
        assert!(parser
            .diagnostics()
            .iter()
            .any(|d| d.message == "Global variable declarations not yet implemented"));
    }

    #[test]
    fn test_prototype_is_skipped() {
        let (result, parser) = parse("int f(int a);\nint f(int a) { return a; }");
        assert_eq!(result.unwrap().items.len(), 1);
        assert_eq!(parser.diagnostics().len(), 1);
    }

    #[test]
    fn test_void_parameter_list() {
        let (result, _) = parse("void tick(void) { }");
        let program = result.unwrap();
        let func = program.find_function("tick").unwrap();
        assert!(func.params.is_empty());
        assert_eq!(func.return_type, TypeName::Void);
    }

    #[test]
    fn test_undefined_struct_is_rejected() {
        let (result, _) = parse("int f(struct Nope n) { return 0; }");
        assert!(matches!(
            result,
            Err(CompileError::InvalidDeclaration { ref message, .. }) if message == "Undefined struct 'Nope'"
        ));
    }

    #[test]
    fn test_struct_redefinition_is_rejected() {
        let (result, _) = parse("struct A { int x; };\nstruct A { int y; };");
        assert!(matches!(result, Err(CompileError::InvalidDeclaration { .. })));
    }

    #[test]
    fn test_struct_missing_semicolon_is_fatal() {
        let (result, _) = parse("struct A { int x; }\nint f() { return 0; }");
        assert!(matches!(result, Err(CompileError::Syntax { .. })));
    }

    #[test]
    fn test_nested_struct_field() {
        let (result, parser) =
            parse("struct In { char c; };\nstruct Out { struct In inner; double d; };");
        result.unwrap();
        assert_eq!(
            parser.symbols().structs.field_type("Out", "inner"),
            Some(&TypeName::Struct("In".to_string()))
        );
    }
}
