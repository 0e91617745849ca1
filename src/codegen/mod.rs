//! VHDL code generation
//!
//! [`VhdlGenerator`] walks a parsed [`Program`] together with the symbol
//! tables filled in by the parser and produces one VHDL text:
//!
//! 1. the IEEE library preamble
//! 2. one record type per struct
//! 3. per function, an entity with `clk`, `reset`, one input port per
//!    parameter and a `result` output port, plus a `behavioral`
//!    architecture holding the locals as signals and the body as a single
//!    clocked process
//!
//! Submodules:
//! - [`types`]: source type → VHDL type, record declarations
//! - [`names`]: renaming of identifiers that collide with ports or shadow
//!   parameters
//! - `declarations`: signals for local variables
//! - `expressions` and `statements`: lowering of the function body

mod declarations;
mod expressions;
pub mod names;
mod statements;
pub mod types;

use rustc_hash::FxHashSet;

use crate::diagnostics::Diagnostic;
use crate::parser::ast::*;
use crate::symbols::SymbolTables;
use names::{SignalNames, RESULT_PORT};
use types::{record_declaration, vhdl_type};

pub use declarations::collect_locals;
pub use expressions::LITERAL_WIDTH;

const PREAMBLE: &str = "-- VHDL generated by compi

library IEEE;
use IEEE.STD_LOGIC_1164.ALL;
use IEEE.NUMERIC_STD.ALL;

";

/// Generates VHDL from a program and its symbol tables
pub struct VhdlGenerator<'a> {
    symbols: &'a SymbolTables,
    /// Functions defined by the program being generated
    functions: FxHashSet<String>,
    /// Signal names of the function being emitted
    names: SignalNames,
    out: String,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> VhdlGenerator<'a> {
    pub fn new(symbols: &'a SymbolTables) -> Self {
        Self {
            symbols,
            functions: FxHashSet::default(),
            names: SignalNames::default(),
            out: String::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Generate the complete VHDL text for `program`
    pub fn generate(&mut self, program: &Program) -> String {
        self.out.clear();
        self.functions = program.functions().map(|f| f.name.clone()).collect();

        self.out.push_str(PREAMBLE);

        let symbols = self.symbols;
        for info in symbols.structs.iter() {
            log::debug!("emitting record for struct '{}'", info.name);
            self.out.push_str(&record_declaration(info));
        }

        for func in program.functions() {
            log::debug!("emitting entity for function '{}'", func.name);
            self.emit_function(func);
        }

        std::mem::take(&mut self.out)
    }

    /// Warnings produced while generating
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub(crate) fn report(&mut self, diag: Diagnostic) {
        diag.log();
        self.diagnostics.push(diag);
    }

    /// Append one line at `level` two-space indents
    pub(crate) fn line(&mut self, level: usize, text: &str) {
        for _ in 0..level {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn emit_function(&mut self, func: &FunctionDecl) {
        self.names = SignalNames::for_function(func);

        self.line(0, &format!("-- Function: {}", func.name));
        self.line(0, &format!("entity {} is", func.name));
        self.line(1, "port (");
        self.line(2, "clk   : in  std_logic;");
        self.line(2, "reset : in  std_logic;");
        for param in &func.params {
            self.line(
                2,
                &format!("{} : in {};", self.names.lookup(&param.name), vhdl_type(&param.ty)),
            );
        }
        self.line(
            2,
            &format!("{} : out {}", RESULT_PORT, vhdl_type(&func.return_type)),
        );
        self.line(1, ");");
        self.line(0, "end entity;");
        self.out.push('\n');

        self.line(0, &format!("architecture behavioral of {} is", func.name));
        self.emit_declarations(func);
        self.line(0, "begin");
        self.line(1, "process(clk, reset)");
        self.line(1, "begin");
        self.line(2, "if reset = '1' then");
        self.line(3, "-- Reset logic (user-defined)");
        self.line(2, "elsif rising_edge(clk) then");
        self.emit_statements(&func.body, 3, func);
        self.line(2, "end if;");
        self.line(1, "end process;");
        self.line(0, "end architecture;");
        self.out.push('\n');
    }
}
