//! Signal naming
//!
//! Every generated entity owns the ports `clk`, `reset` and `result`. A
//! source identifier with one of those names is renamed with a `_local`
//! suffix wherever it is declared, read or written. A local that shadows a
//! parameter gets a renamed signal of its own, visible from its declaration
//! to the end of the enclosing block.
//!
//! Renamed signals never collide with another name of the same function:
//! when `<name>_local` is taken, `_local1`, `_local2` and so on are tried.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::codegen::declarations::collect_locals;
use crate::parser::ast::FunctionDecl;

/// Output port carrying a function's return value
pub const RESULT_PORT: &str = "result";

const RESERVED_PORTS: [&str; 3] = ["clk", "reset", RESULT_PORT];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_PORTS.contains(&name)
}

/// Source identifier → VHDL signal mapping for one function
#[derive(Debug, Default)]
pub struct SignalNames {
    /// Renames that hold for the whole function body
    fixed: FxHashMap<String, String>,
    /// Signals for locals that shadow a parameter
    shadows: FxHashMap<String, String>,
    /// Shadowing locals whose declaration is in scope
    active: FxHashSet<String>,
}

impl SignalNames {
    pub fn for_function(func: &FunctionDecl) -> Self {
        let mut locals = Vec::new();
        collect_locals(&func.body, &mut locals);

        let mut taken: FxHashSet<String> = func
            .params
            .iter()
            .map(|p| p.name.clone())
            .chain(locals.iter().map(|d| d.name.clone()))
            .collect();

        let mut names = Self::default();
        for name in func.params.iter().map(|p| &p.name).chain(locals.iter().map(|d| &d.name)) {
            if is_reserved(name) && !names.fixed.contains_key(name) {
                let fresh = fresh_name(name, &mut taken);
                names.fixed.insert(name.clone(), fresh);
            }
        }

        for decl in &locals {
            let shadows_param = func.params.iter().any(|p| p.name == decl.name);
            if shadows_param && !names.shadows.contains_key(&decl.name) {
                let fresh = fresh_name(&decl.name, &mut taken);
                names.shadows.insert(decl.name.clone(), fresh);
            }
        }
        names
    }

    /// Signal for `name` at the current point of the body
    pub fn lookup(&self, name: &str) -> String {
        if self.active.contains(name) {
            if let Some(shadow) = self.shadows.get(name) {
                return shadow.clone();
            }
        }
        match self.fixed.get(name) {
            Some(renamed) => renamed.clone(),
            None if is_reserved(name) => format!("{}_local", name),
            None => name.to_string(),
        }
    }

    /// Signal declared for a local named `name`
    pub fn local(&self, name: &str) -> String {
        match self.shadows.get(name) {
            Some(shadow) => shadow.clone(),
            None => self.lookup(name),
        }
    }

    /// Renamed signal of a local shadowing a parameter, if `name` is one
    pub fn shadow(&self, name: &str) -> Option<&str> {
        self.shadows.get(name).map(String::as_str)
    }

    /// Bring a shadowing local into scope
    pub fn declare(&mut self, name: &str) {
        if self.shadows.contains_key(name) {
            self.active.insert(name.to_string());
        }
    }

    pub fn enter_block(&self) -> FxHashSet<String> {
        self.active.clone()
    }

    pub fn leave_block(&mut self, saved: FxHashSet<String>) {
        self.active = saved;
    }
}

fn fresh_name(base: &str, taken: &mut FxHashSet<String>) -> String {
    let mut candidate = format!("{}_local", base);
    let mut n = 1;
    while taken.contains(&candidate) {
        candidate = format!("{}_local{}", base, n);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}
