//! Statement lowering inside the clocked branch of the process
//!
//! Each statement becomes one or more lines of sequential VHDL, indented
//! two spaces per nesting level. A `for` loop is rewritten as its
//! initializer followed by a `while` loop whose body ends with the increment.

use crate::codegen::expressions::LITERAL_WIDTH;
use crate::codegen::names::RESULT_PORT;
use crate::codegen::VhdlGenerator;
use crate::diagnostics::{Category, Diagnostic};
use crate::parser::ast::*;

impl VhdlGenerator<'_> {
    pub(crate) fn emit_statements(&mut self, statements: &[Statement], level: usize, func: &FunctionDecl) {
        let scope = self.names.enter_block();
        for stmt in statements {
            self.emit_statement(stmt, level, func);
        }
        self.names.leave_block(scope);
    }

    fn emit_statement(&mut self, stmt: &Statement, level: usize, func: &FunctionDecl) {
        match stmt {
            Statement::VarDecl(decl) => self.emit_var_init(decl, level),
            Statement::Assignment(assign) => self.emit_assignment(assign, level),
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.emit_return(value, level, func);
                }
            }
            Statement::If(stmt) => {
                let cond = self.condition(&stmt.condition);
                self.line(level, &format!("if {} then", cond));
                self.emit_statements(&stmt.then_body, level + 1, func);

                for arm in &stmt.else_ifs {
                    let cond = self.condition(&arm.condition);
                    self.line(level, &format!("elsif {} then", cond));
                    self.emit_statements(&arm.body, level + 1, func);
                }

                if let Some(body) = &stmt.else_body {
                    self.line(level, "else");
                    self.emit_statements(body, level + 1, func);
                }
                self.line(level, "end if;");
            }
            Statement::While(stmt) => {
                let cond = self.condition(&stmt.condition);
                self.line(level, &format!("while {} loop", cond));
                self.emit_statements(&stmt.body, level + 1, func);
                self.line(level, "end loop;");
            }
            Statement::For(stmt) => {
                let scope = self.names.enter_block();
                if let Some(init) = &stmt.init {
                    self.emit_statement(init, level, func);
                }
                let cond = match &stmt.condition {
                    Some(cond) => self.condition(cond),
                    None => "true".to_string(),
                };
                self.line(level, &format!("while {} loop", cond));
                self.emit_statements(&stmt.body, level + 1, func);
                if let Some(step) = &stmt.increment {
                    self.emit_assignment(step, level + 1);
                }
                self.line(level, "end loop;");
                self.names.leave_block(scope);
            }
            Statement::Break { .. } => self.line(level, "exit;"),
            Statement::Continue { .. } => self.line(level, "next;"),
            Statement::Expression(expr) => {
                let text = self.expr(expr);
                self.line(level, &format!("-- expression statement not synthesized: {}", text));
                let diag = Diagnostic::warning(
                    Category::Codegen,
                    format!("Expression statement in '{}' has no hardware equivalent", func.name),
                )
                .at(expr.location());
                self.report(diag);
            }
        }
    }

    /// Initial value of a declared variable. Array initializers are carried
    /// by the constant emitted with the declaration.
    fn emit_var_init(&mut self, decl: &VarDecl, level: usize) {
        self.names.declare(&decl.name);
        let target = self.names.lookup(&decl.name);
        match &decl.init {
            Some(Initializer::Expr(value)) => {
                let value = self.expr(value);
                self.line(level, &format!("{} <= {};", target, value));
            }
            Some(Initializer::Struct(values)) => {
                let Some(struct_name) = decl.ty.struct_name() else {
                    return;
                };
                let symbols = self.symbols;
                let Some(info) = symbols.structs.lookup(struct_name) else {
                    return;
                };
                for (i, (field, ty)) in info.fields.iter().enumerate() {
                    let rhs = match (values.get(i), ty) {
                        (Some(Expr::Number { text, .. }), TypeName::Int) => literal_cast(text),
                        (Some(value), _) => self.expr(value),
                        (None, TypeName::Int) => literal_cast("0"),
                        (None, TypeName::Struct(_)) => continue,
                        (None, _) => "(others => '0')".to_string(),
                    };
                    self.line(level, &format!("{}.{} <= {};", target, field, rhs));
                }
            }
            Some(Initializer::Array(_)) | None => {}
        }
    }

    fn emit_assignment(&mut self, assign: &Assignment, level: usize) {
        let target = self.expr(&assign.target);
        let value = self.expr(&assign.value);
        self.line(level, &format!("{} <= {};", target, value));
    }

    fn emit_return(&mut self, value: &Expr, level: usize, func: &FunctionDecl) {
        if let (Some(struct_name), Expr::Identifier { name, .. }) =
            (func.return_type.struct_name(), value)
        {
            let symbols = self.symbols;
            if let Some(info) = symbols.structs.lookup(struct_name) {
                let source = self.names.lookup(name);
                for (field, _) in &info.fields {
                    self.line(
                        level,
                        &format!("{}.{} <= {}.{};", RESULT_PORT, field, source, field),
                    );
                }
                return;
            }
        }

        let value = self.expr(value);
        self.line(level, &format!("{} <= {};", RESULT_PORT, value));
    }
}

/// Cast a numeric literal for an integer record field
fn literal_cast(text: &str) -> String {
    if text.starts_with('-') {
        format!("to_signed({}, {})", text, LITERAL_WIDTH)
    } else {
        format!("to_unsigned({}, {})", text, LITERAL_WIDTH)
    }
}
