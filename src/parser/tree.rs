//! Indented tree dump of a parsed [`Program`], used by `--dump-ast`.
//!
//! ```text
//! Program
//! └── Function int add
//!     ├── Param int a
//!     └── Body
//!         └── Return
//!             └── Identifier a
//! ```

use crate::parser::ast::*;

struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    fn branch(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    fn write(&self, prefix: &str, out: &mut String) {
        for (i, child) in self.children.iter().enumerate() {
            let last = i + 1 == self.children.len();
            out.push_str(prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(&child.label);
            out.push('\n');

            let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
            child.write(&nested, out);
        }
    }
}

impl Program {
    /// Render the AST as an indented tree, one node per line.
    pub fn render_tree(&self) -> String {
        let root = TreeNode::branch("Program", self.items.iter().map(item_node).collect());
        let mut out = String::new();
        out.push_str(&root.label);
        out.push('\n');
        root.write("", &mut out);
        out
    }
}

fn item_node(item: &Item) -> TreeNode {
    match item {
        Item::Struct(decl) => TreeNode::branch(
            format!("Struct {}", decl.name),
            decl.fields
                .iter()
                .map(|f| TreeNode::leaf(format!("Field {} {}", f.ty, f.name)))
                .collect(),
        ),
        Item::Function(func) => {
            let mut children: Vec<TreeNode> = func
                .params
                .iter()
                .map(|p| TreeNode::leaf(format!("Param {} {}", p.ty, p.name)))
                .collect();
            children.push(block_node("Body", &func.body));
            TreeNode::branch(format!("Function {} {}", func.return_type, func.name), children)
        }
    }
}

fn block_node(label: &str, statements: &[Statement]) -> TreeNode {
    TreeNode::branch(label, statements.iter().map(statement_node).collect())
}

fn statement_node(stmt: &Statement) -> TreeNode {
    match stmt {
        Statement::VarDecl(decl) => {
            let label = match decl.array_len {
                Some(len) => format!("VarDecl {} {}[{}]", decl.ty, decl.name, len),
                None => format!("VarDecl {} {}", decl.ty, decl.name),
            };
            let children = match &decl.init {
                None => Vec::new(),
                Some(Initializer::Expr(expr)) => vec![expr_node(expr)],
                Some(Initializer::Array(items)) => {
                    vec![TreeNode::branch("ArrayInit", items.iter().map(expr_node).collect())]
                }
                Some(Initializer::Struct(items)) => {
                    vec![TreeNode::branch("StructInit", items.iter().map(expr_node).collect())]
                }
            };
            TreeNode::branch(label, children)
        }
        Statement::Assignment(assign) => assignment_node(assign),
        Statement::If(stmt) => {
            let mut children = vec![
                TreeNode::branch("Condition", vec![expr_node(&stmt.condition)]),
                block_node("Then", &stmt.then_body),
            ];
            for arm in &stmt.else_ifs {
                children.push(TreeNode::branch(
                    "ElseIf",
                    vec![
                        TreeNode::branch("Condition", vec![expr_node(&arm.condition)]),
                        block_node("Then", &arm.body),
                    ],
                ));
            }
            if let Some(body) = &stmt.else_body {
                children.push(block_node("Else", body));
            }
            TreeNode::branch("If", children)
        }
        Statement::While(stmt) => TreeNode::branch(
            "While",
            vec![
                TreeNode::branch("Condition", vec![expr_node(&stmt.condition)]),
                block_node("Body", &stmt.body),
            ],
        ),
        Statement::For(stmt) => {
            let mut children = Vec::new();
            if let Some(init) = &stmt.init {
                children.push(TreeNode::branch("Init", vec![statement_node(init)]));
            }
            if let Some(cond) = &stmt.condition {
                children.push(TreeNode::branch("Condition", vec![expr_node(cond)]));
            }
            if let Some(step) = &stmt.increment {
                children.push(TreeNode::branch("Increment", vec![assignment_node(step)]));
            }
            children.push(block_node("Body", &stmt.body));
            TreeNode::branch("For", children)
        }
        Statement::Return { value, .. } => {
            TreeNode::branch("Return", value.iter().map(expr_node).collect())
        }
        Statement::Break { .. } => TreeNode::leaf("Break"),
        Statement::Continue { .. } => TreeNode::leaf("Continue"),
        Statement::Expression(expr) => TreeNode::branch("ExpressionStatement", vec![expr_node(expr)]),
    }
}

fn assignment_node(assign: &Assignment) -> TreeNode {
    TreeNode::branch(
        "Assignment",
        vec![expr_node(&assign.target), expr_node(&assign.value)],
    )
}

fn expr_node(expr: &Expr) -> TreeNode {
    match expr {
        Expr::Number { text, .. } => TreeNode::leaf(format!("Number {}", text)),
        Expr::Identifier { name, .. } => TreeNode::leaf(format!("Identifier {}", name)),
        Expr::FieldAccess { base, field, .. } => {
            TreeNode::branch(format!("Field .{}", field), vec![expr_node(base)])
        }
        Expr::IndexAccess { base, index, .. } => {
            TreeNode::branch("Index", vec![expr_node(base), expr_node(index)])
        }
        Expr::Negate { operand, .. } => TreeNode::branch("Negate", vec![expr_node(operand)]),
        Expr::BinaryOp {
            op, left, right, ..
        } => TreeNode::branch(
            format!("BinaryOp {}", op.symbol()),
            vec![expr_node(left), expr_node(right)],
        ),
        Expr::UnaryOp { op, operand, .. } => {
            let symbol = match op {
                UnOp::Not => "!",
                UnOp::BitNot => "~",
            };
            TreeNode::branch(format!("UnaryOp {}", symbol), vec![expr_node(operand)])
        }
        Expr::Call { name, args, .. } => {
            TreeNode::branch(format!("Call {}", name), args.iter().map(expr_node).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse::Parser;

    #[test]
    fn test_render_tree() {
        let mut parser = Parser::new("int add(int a) { return a + 1; }").unwrap();
        let program = parser.parse_program().unwrap();

        let expected = "\
Program
└── Function int add
    ├── Param int a
    └── Body
        └── Return
            └── BinaryOp +
                ├── Identifier a
                └── Number 1
";
        assert_eq!(program.render_tree(), expected);
    }
}
