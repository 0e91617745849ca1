//! Architecture declarations: one signal per local variable
//!
//! Locals are gathered from the whole function body, including nested
//! branches, loop bodies and `for` initializers. The first declaration of a
//! name wins. A local that shadows a parameter is declared under its renamed
//! signal.
//!
//! ```text
//!   signal sum : std_logic_vector(31 downto 0);
//!   signal p : Point_t;
//!   type buf_type is array (0 to 3) of std_logic_vector(31 downto 0);
//!   -- Array initialization
//!   constant buf_init : buf_type := ("0...01", "0...10", "0...00", "0...00");
//!   signal buf : buf_type := buf_init;
//! ```

use rustc_hash::FxHashSet;

use crate::codegen::types::{bit_string, bit_width, uses_bit_strings, vhdl_type};
use crate::codegen::VhdlGenerator;
use crate::diagnostics::{Category, Diagnostic};
use crate::parser::ast::*;

/// Every variable declaration in `statements`, in source order
pub fn collect_locals<'p>(statements: &'p [Statement], out: &mut Vec<&'p VarDecl>) {
    for stmt in statements {
        match stmt {
            Statement::VarDecl(decl) => out.push(decl),
            Statement::If(stmt) => {
                collect_locals(&stmt.then_body, out);
                for arm in &stmt.else_ifs {
                    collect_locals(&arm.body, out);
                }
                if let Some(body) = &stmt.else_body {
                    collect_locals(body, out);
                }
            }
            Statement::While(stmt) => collect_locals(&stmt.body, out),
            Statement::For(stmt) => {
                if let Some(init) = &stmt.init {
                    collect_locals(std::slice::from_ref(init.as_ref()), out);
                }
                collect_locals(&stmt.body, out);
            }
            Statement::Assignment(_)
            | Statement::Return { .. }
            | Statement::Break { .. }
            | Statement::Continue { .. }
            | Statement::Expression(_) => {}
        }
    }
}

impl VhdlGenerator<'_> {
    pub(crate) fn emit_declarations(&mut self, func: &FunctionDecl) {
        let mut locals = Vec::new();
        collect_locals(&func.body, &mut locals);

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for decl in locals {
            if !seen.insert(decl.name.as_str()) {
                log::debug!("'{}' already declared in '{}'", decl.name, func.name);
                continue;
            }
            if let Some(shadow) = self.names.shadow(&decl.name) {
                let diag = Diagnostic::warning(
                    Category::Codegen,
                    format!(
                        "Local '{}' in '{}' shadows a port and is emitted as '{}'",
                        decl.name, func.name, shadow
                    ),
                )
                .at(decl.location);
                self.report(diag);
            }
            self.emit_local(decl);
        }
    }

    fn emit_local(&mut self, decl: &VarDecl) {
        let name = self.names.local(&decl.name);

        let Some(len) = decl.array_len else {
            self.line(1, &format!("signal {} : {};", name, vhdl_type(&decl.ty)));
            return;
        };

        let array_type = format!("{}_type", name);
        self.line(
            1,
            &format!(
                "type {} is array (0 to {}) of {};",
                array_type,
                len - 1,
                vhdl_type(&decl.ty)
            ),
        );

        match &decl.init {
            Some(Initializer::Array(values)) => {
                let elements: Vec<String> = (0..len)
                    .map(|i| self.array_element(&decl.ty, values.get(i)))
                    .collect();
                let aggregate = if elements.len() == 1 {
                    format!("(0 => {})", elements[0])
                } else {
                    format!("({})", elements.join(", "))
                };
                self.line(1, "-- Array initialization");
                self.line(
                    1,
                    &format!("constant {}_init : {} := {};", name, array_type, aggregate),
                );
                self.line(
                    1,
                    &format!("signal {} : {} := {}_init;", name, array_type, name),
                );
            }
            _ => self.line(1, &format!("signal {} : {};", name, array_type)),
        }
    }

    /// One element of an array constant; missing elements are zero
    fn array_element(&mut self, elem: &TypeName, value: Option<&Expr>) -> String {
        match value {
            Some(value) if uses_bit_strings(elem) => match value.integer_literal() {
                Some(n) => bit_string(n, bit_width(elem)),
                None => self.expr(value),
            },
            Some(Expr::Number { text, .. }) => text.clone(),
            Some(value) => self.expr(value),
            None if uses_bit_strings(elem) => bit_string(0, bit_width(elem)),
            None => "(others => '0')".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn test_collect_locals_recurses() {
        let source = "void f(int n) {
            int a;
            if (n) { int b; } else if (n > 1) { int c; } else { int d; }
            while (n) { int e; }
            for (int i = 0; i < n; i++) { int g; }
        }";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        let func = program.find_function("f").unwrap();

        let mut locals = Vec::new();
        collect_locals(&func.body, &mut locals);
        let names: Vec<&str> = locals.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d", "e", "i", "g"]);
    }
}
