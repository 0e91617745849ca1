// AST (Abstract Syntax Tree) definitions for the C-subset compiler

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Types a declaration can name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Int,
    Float,
    Double,
    Char,
    Void,
    Struct(String), // Struct name
}

impl TypeName {
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            TypeName::Struct(name) => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Int => write!(f, "int"),
            TypeName::Float => write!(f, "float"),
            TypeName::Double => write!(f, "double"),
            TypeName::Char => write!(f, "char"),
            TypeName::Void => write!(f, "void"),
            TypeName::Struct(name) => write!(f, "struct {}", name),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    /// Binding strength used by the precedence-climbing parser.
    /// Higher binds tighter; logical operators sit below zero.
    pub fn precedence(self) -> i32 {
        match self {
            BinOp::Mul | BinOp::Div => 7,
            BinOp::Add | BinOp::Sub => 6,
            BinOp::Shl | BinOp::Shr => 5,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 4,
            BinOp::Eq | BinOp::Ne => 3,
            BinOp::BitAnd => 2,
            BinOp::BitXor => 1,
            BinOp::BitOr => 0,
            BinOp::And => -1,
            BinOp::Or => -2,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    /// Source spelling of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,    // !x
    BitNot, // ~x
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal text; a folded negative literal starts with '-'
    Number {
        text: String,
        location: SourceLocation,
    },
    Identifier {
        name: String,
        location: SourceLocation,
    },
    FieldAccess {
        base: Box<Expr>,
        field: String,
        location: SourceLocation,
    },
    IndexAccess {
        base: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    /// Unary minus applied to an identifier, field or index place
    Negate {
        operand: Box<Expr>,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        name: String,
        args: Vec<Expr>,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn number(value: i64, location: SourceLocation) -> Self {
        Expr::Number {
            text: value.to_string(),
            location,
        }
    }

    pub fn identifier(name: impl Into<String>, location: SourceLocation) -> Self {
        Expr::Identifier {
            name: name.into(),
            location,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Number { location, .. }
            | Expr::Identifier { location, .. }
            | Expr::FieldAccess { location, .. }
            | Expr::IndexAccess { location, .. }
            | Expr::Negate { location, .. }
            | Expr::BinaryOp { location, .. }
            | Expr::UnaryOp { location, .. }
            | Expr::Call { location, .. } => *location,
        }
    }

    /// True for identifiers, field chains and indexed accesses.
    pub fn is_place(&self) -> bool {
        matches!(
            self,
            Expr::Identifier { .. } | Expr::FieldAccess { .. } | Expr::IndexAccess { .. }
        )
    }

    /// Integer value of a numeric literal, if it is one
    pub fn integer_literal(&self) -> Option<i64> {
        match self {
            Expr::Number { text, .. } => text.parse().ok(),
            _ => None,
        }
    }

    /// Comparisons, logical connectives and `!` already yield a truth value.
    pub fn is_boolean(&self) -> bool {
        match self {
            Expr::BinaryOp { op, .. } => op.is_comparison() || op.is_logical(),
            Expr::UnaryOp { op: UnOp::Not, .. } => true,
            _ => false,
        }
    }

    /// Single-string encoding of a place: fields join with `__`,
    /// an index renders as `name[idx]`. `None` for non-places.
    pub fn flattened_name(&self) -> Option<String> {
        match self {
            Expr::Identifier { name, .. } => Some(name.clone()),
            Expr::FieldAccess { base, field, .. } => {
                Some(format!("{}__{}", base.flattened_name()?, field))
            }
            Expr::IndexAccess { base, index, .. } => {
                let idx = match index.as_ref() {
                    Expr::Number { text, .. } => text.clone(),
                    other => other.flattened_name()?,
                };
                Some(format!("{}[{}]", base.flattened_name()?, idx))
            }
            _ => None,
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeName,
    pub location: SourceLocation,
}

/// Struct field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeName,
}

/// Right-hand side of a variable declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    Expr(Expr),
    /// `{a, b, c}` for an array
    Array(Vec<Expr>),
    /// `{a, b}` matched positionally against struct fields
    Struct(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: TypeName,
    pub array_len: Option<usize>,
    pub init: Option<Initializer>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Identifier, field access or index access
    pub target: Expr,
    pub value: Expr,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    pub condition: Expr,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Vec<Statement>,
    pub else_ifs: Vec<ElseIf>,
    pub else_body: Option<Vec<Statement>>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Statement>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    /// Either a declaration or an assignment
    pub init: Option<Box<Statement>>,
    pub condition: Option<Expr>,
    pub increment: Option<Assignment>,
    pub body: Vec<Statement>,
    pub location: SourceLocation,
}

/// Statements inside a function body
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VarDecl(VarDecl),
    Assignment(Assignment),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    /// An expression evaluated for its own sake, e.g. a bare call
    Expression(Expr),
}

impl Statement {
    pub fn location(&self) -> SourceLocation {
        match self {
            Statement::VarDecl(decl) => decl.location,
            Statement::Assignment(assign) => assign.location,
            Statement::If(stmt) => stmt.location,
            Statement::While(stmt) => stmt.location,
            Statement::For(stmt) => stmt.location,
            Statement::Return { location, .. }
            | Statement::Break { location }
            | Statement::Continue { location } => *location,
            Statement::Expression(expr) => expr.location(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<Field>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: TypeName,
    pub params: Vec<Param>,
    pub body: Vec<Statement>,
    pub location: SourceLocation,
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Struct(StructDecl),
    Function(FunctionDecl),
}

/// Program (root of AST)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub items: Vec<Item>,
}

impl Program {
    pub fn new() -> Self {
        Program { items: Vec::new() }
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(func) => Some(func),
            Item::Struct(_) => None,
        })
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Struct(decl) => Some(decl),
            Item::Function(_) => None,
        })
    }

    pub fn find_function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    #[test]
    fn test_field_chain_flattens_with_double_underscore() {
        let expr = Expr::FieldAccess {
            base: Box::new(Expr::FieldAccess {
                base: Box::new(Expr::identifier("outer", loc())),
                field: "inner".to_string(),
                location: loc(),
            }),
            field: "x".to_string(),
            location: loc(),
        };
        assert_eq!(expr.flattened_name().as_deref(), Some("outer__inner__x"));
    }

    #[test]
    fn test_index_flattens_with_brackets() {
        let expr = Expr::IndexAccess {
            base: Box::new(Expr::identifier("arr", loc())),
            index: Box::new(Expr::identifier("i", loc())),
            location: loc(),
        };
        assert_eq!(expr.flattened_name().as_deref(), Some("arr[i]"));
        assert!(expr.is_place());
    }

    #[test]
    fn test_boolean_shape() {
        let cmp = Expr::BinaryOp {
            op: BinOp::Lt,
            left: Box::new(Expr::identifier("a", loc())),
            right: Box::new(Expr::number(1, loc())),
            location: loc(),
        };
        let sum = Expr::BinaryOp {
            op: BinOp::Add,
            left: Box::new(Expr::identifier("a", loc())),
            right: Box::new(Expr::number(1, loc())),
            location: loc(),
        };
        assert!(cmp.is_boolean());
        assert!(!sum.is_boolean());
    }
}
