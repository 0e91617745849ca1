//! Symbol tables filled in while parsing
//!
//! - [`ArrayTable`]: declared sizes of the arrays visible in the current
//!   function, cleared whenever a new function's parameters are parsed.
//! - [`StructTable`]: every struct layout seen so far, in declaration order.
//!
//! Both live inside a [`SymbolTables`] value owned by one compilation, so
//! separate compilations never observe each other's declarations.

use rustc_hash::FxHashMap;

use crate::parser::ast::TypeName;

/// Array name → declared element count
#[derive(Debug, Clone, Default)]
pub struct ArrayTable {
    sizes: FxHashMap<String, usize>,
}

impl ArrayTable {
    /// Record a declaration; a later declaration of the same name wins.
    pub fn register(&mut self, name: &str, size: usize) {
        self.sizes.insert(name.to_string(), size);
    }

    pub fn size(&self, name: &str) -> Option<usize> {
        self.sizes.get(name).copied()
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructInfo {
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<(String, TypeName)>,
}

impl StructInfo {
    pub fn field_type(&self, field: &str) -> Option<&TypeName> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, ty)| ty)
    }
}

/// Struct layouts, append-only for the lifetime of a compilation
#[derive(Debug, Clone, Default)]
pub struct StructTable {
    structs: Vec<StructInfo>,
    by_name: FxHashMap<String, usize>,
}

impl StructTable {
    /// Index of the struct called `name`, registering it if new.
    pub fn register_struct(&mut self, name: &str) -> usize {
        if let Some(&index) = self.by_name.get(name) {
            return index;
        }
        let index = self.structs.len();
        self.structs.push(StructInfo {
            name: name.to_string(),
            fields: Vec::new(),
        });
        self.by_name.insert(name.to_string(), index);
        index
    }

    /// Append a field; out-of-range indices are ignored.
    pub fn add_field(&mut self, index: usize, field: &str, ty: TypeName) {
        if let Some(info) = self.structs.get_mut(index) {
            info.fields.push((field.to_string(), ty));
        }
    }

    pub fn find_struct(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, index: usize) -> Option<&StructInfo> {
        self.structs.get(index)
    }

    pub fn lookup(&self, name: &str) -> Option<&StructInfo> {
        self.find_struct(name).and_then(|index| self.get(index))
    }

    pub fn field_type(&self, struct_name: &str, field: &str) -> Option<&TypeName> {
        self.lookup(struct_name)?.field_type(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StructInfo> {
        self.structs.iter()
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

/// All per-compilation symbol state
#[derive(Debug, Clone, Default)]
pub struct SymbolTables {
    pub arrays: ArrayTable,
    pub structs: StructTable,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self::default()
    }
}
