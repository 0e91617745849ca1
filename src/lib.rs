//! # Introduction
//!
//! compi translates a small C subset (functions with typed scalars, fixed-size
//! arrays, structs, full operator precedence, structured control flow) into
//! synchronous VHDL: every source function becomes an entity whose body is
//! a single clocked process.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST + symbol tables → VhdlGenerator → VHDL
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds the AST, recording array
//!    sizes and struct layouts in [`symbols`] and rejecting constant
//!    out-of-bounds indices and stray `break`/`continue` on the way.
//! 2. [`symbols`]: per-compilation array and struct tables.
//! 3. [`codegen`]: lowers the AST to VHDL text.
//! 4. [`diagnostics`]: warnings and rendered errors; fatal errors are
//!    [`errors::CompileError`]s.
//!
//! ## Example
//!
//! ```
//! let out = compi::compile("int twice(int a) { return a + a; }").unwrap();
//! assert!(out.vhdl.contains("entity twice is"));
//! assert!(out.vhdl.contains("result <= a + a;"));
//! ```

pub mod codegen;
pub mod diagnostics;
pub mod errors;
pub mod parser;
pub mod symbols;

use codegen::VhdlGenerator;
use diagnostics::Diagnostic;
use errors::CompileError;
use parser::ast::Program;
use parser::Parser;
use symbols::SymbolTables;

/// Everything a successful compilation produces
#[derive(Debug)]
pub struct Compilation {
    pub program: Program,
    pub symbols: SymbolTables,
    pub vhdl: String,
    /// Non-fatal diagnostics from every stage, in the order they were raised
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse `source` without generating code
pub fn parse(source: &str) -> Result<(Program, SymbolTables, Vec<Diagnostic>), CompileError> {
    let mut parser = Parser::new(source)?;
    let program = parser.parse_program()?;
    let (symbols, diagnostics) = parser.finish();
    Ok((program, symbols, diagnostics))
}

/// Compile `source` to VHDL. Any fatal error aborts with no output.
pub fn compile(source: &str) -> Result<Compilation, CompileError> {
    log::info!("parsing input");
    let (program, symbols, mut diagnostics) = parse(source)?;

    log::info!(
        "generating VHDL for {} functions and {} structs",
        program.functions().count(),
        symbols.structs.len()
    );
    let mut generator = VhdlGenerator::new(&symbols);
    let vhdl = generator.generate(&program);
    diagnostics.extend(generator.into_diagnostics());

    log::info!("compilation finished");
    Ok(Compilation {
        program,
        symbols,
        vhdl,
        diagnostics,
    })
}
