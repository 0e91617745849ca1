// Integration tests for parsing and early validation

use compi::errors::CompileError;
use compi::parser::ast::*;
use compi::parser::Parser;
use rstest::rstest;

fn parse_expr(source: &str) -> Result<Expr, CompileError> {
    let mut parser = Parser::new(source)?;
    parser.parse_expression()
}

fn parse_program(source: &str) -> Result<Program, CompileError> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

fn binary_parts(expr: &Expr) -> (BinOp, &Expr, &Expr) {
    match expr {
        Expr::BinaryOp {
            op, left, right, ..
        } => (*op, left, right),
        other => panic!("Expected binary node, got {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let expr = parse_expr("3 + 4 * 2").expect("Parsing failed");
    let (op, left, right) = binary_parts(&expr);
    assert_eq!(op, BinOp::Add);
    assert_eq!(left.integer_literal(), Some(3));

    let (inner, l, r) = binary_parts(right);
    assert_eq!(inner, BinOp::Mul);
    assert_eq!(l.integer_literal(), Some(4));
    assert_eq!(r.integer_literal(), Some(2));
}

#[test]
fn test_subtraction_is_left_associative() {
    let expr = parse_expr("8 - 4 - 2").expect("Parsing failed");
    let (op, left, right) = binary_parts(&expr);
    assert_eq!(op, BinOp::Sub);
    assert_eq!(right.integer_literal(), Some(2));

    let (inner, l, r) = binary_parts(left);
    assert_eq!(inner, BinOp::Sub);
    assert_eq!(l.integer_literal(), Some(8));
    assert_eq!(r.integer_literal(), Some(4));
}

/// For each pair the first operator binds tighter than the second
#[rstest]
#[case("a * b + c", BinOp::Add)]
#[case("a + b << c", BinOp::Shl)]
#[case("a << b < c", BinOp::Lt)]
#[case("a < b == c", BinOp::Eq)]
#[case("a == b & c", BinOp::BitAnd)]
#[case("a & b ^ c", BinOp::BitXor)]
#[case("a ^ b | c", BinOp::BitOr)]
#[case("a | b && c", BinOp::And)]
#[case("a && b || c", BinOp::Or)]
#[case("c || a && b", BinOp::Or)]
fn test_precedence_ladder(#[case] source: &str, #[case] root: BinOp) {
    let expr = parse_expr(source).expect("Parsing failed");
    let (op, _, _) = binary_parts(&expr);
    assert_eq!(op, root);
}

#[rstest]
#[case("a / b / c")]
#[case("a << b << c")]
#[case("a == b == c")]
#[case("a || b || c")]
fn test_every_operator_is_left_associative(#[case] source: &str) {
    let expr = parse_expr(source).expect("Parsing failed");
    let (_, left, right) = binary_parts(&expr);
    assert!(matches!(left, Expr::BinaryOp { .. }));
    assert!(matches!(right, Expr::Identifier { .. }));
}

#[test]
fn test_bitwise_or_is_rejected_inside_parentheses() {
    let err = parse_expr("(a | b) == 0").unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
    assert_eq!(err.message(), "Expected ')' after expression, found '|'");
}

#[test]
fn test_logical_operators_are_rejected_inside_parentheses() {
    assert!(parse_expr("(a && b)").is_err());
    assert!(parse_expr("(a || b)").is_err());
}

#[test]
fn test_bitwise_and_is_accepted_inside_parentheses() {
    let expr = parse_expr("(a & b) == 0").expect("Parsing failed");
    let (op, left, _) = binary_parts(&expr);
    assert_eq!(op, BinOp::Eq);
    assert!(matches!(left, Expr::BinaryOp { op: BinOp::BitAnd, .. }));
}

#[test]
fn test_conditions_use_full_precedence_range() {
    let source = r#"
        int f(int a, int b) {
            if (a | b) { return 1; }
            while (a && b || a) { a = a - 1; }
            return 0;
        }
    "#;
    parse_program(source).expect("Parsing failed");
}

#[test]
fn test_constant_index_out_of_bounds_on_write() {
    let source = r#"
        int f() {
            int arr[3];
            arr[5] = 1;
            return 0;
        }
    "#;
    match parse_program(source) {
        Err(CompileError::ArrayIndexOutOfBounds {
            index, name, size, ..
        }) => {
            assert_eq!(index, 5);
            assert_eq!(name, "arr");
            assert_eq!(size, 3);
        }
        other => panic!("Expected bounds error, got {:?}", other),
    }
}

#[test]
fn test_constant_index_out_of_bounds_on_read() {
    let source = "int f() { int arr[3]; int x = arr[3]; return x; }";
    let err = parse_program(source).unwrap_err();
    assert_eq!(
        err.message(),
        "Array index 3 out of bounds for 'arr' with size 3"
    );
    assert_eq!(err.location().line, 1);
}

#[test]
fn test_negative_constant_index_is_rejected() {
    let source = "int f() { int arr[3]; arr[-1] = 0; return 0; }";
    assert!(matches!(
        parse_program(source),
        Err(CompileError::ArrayIndexOutOfBounds { index: -1, .. })
    ));
}

#[test]
fn test_variable_index_is_not_checked() {
    let source = "int f(int i) { int arr[3]; arr[i] = 1; arr[2] = arr[i + 7]; return arr[0]; }";
    parse_program(source).expect("Parsing failed");
}

#[test]
fn test_array_sizes_are_local_to_each_function() {
    let source = r#"
        int f() { int buf[2]; buf[1] = 0; return 0; }
        int g() { int buf[8]; buf[7] = 0; return 0; }
        int h() { buf[100] = 0; return 0; }
    "#;
    parse_program(source).expect("Parsing failed");
}

#[test]
fn test_field_access_flattens() {
    let expr = parse_expr("point.x").expect("Parsing failed");
    assert!(matches!(expr, Expr::FieldAccess { ref field, .. } if field == "x"));
    assert_eq!(expr.flattened_name().as_deref(), Some("point__x"));
}

#[test]
fn test_break_outside_loop_is_rejected() {
    let err = parse_program("int f() { break; return 0; }").unwrap_err();
    assert!(matches!(
        err,
        CompileError::JumpOutsideLoop {
            keyword: "break",
            ..
        }
    ));
    assert_eq!(err.message(), "'break' not within a loop");
}

#[test]
fn test_continue_inside_if_outside_loop_is_rejected() {
    let source = "int f(int a) { if (a) { continue; } return 0; }";
    assert!(matches!(
        parse_program(source),
        Err(CompileError::JumpOutsideLoop {
            keyword: "continue",
            ..
        })
    ));
}

#[test]
fn test_break_in_nested_loops_is_accepted() {
    let source = r#"
        int f(int n) {
            while (n) {
                for (int i = 0; i < n; i++) {
                    if (i == 3) { break; }
                    continue;
                }
                break;
            }
            return n;
        }
    "#;
    parse_program(source).expect("Parsing failed");
}

#[test]
fn test_loop_depth_resets_after_loop() {
    let source = "int f(int n) { while (n) { n = n - 1; } break; }";
    assert!(matches!(
        parse_program(source),
        Err(CompileError::JumpOutsideLoop { .. })
    ));
}

#[test]
fn test_for_increment_is_lowered_to_assignment() {
    let source = "int f(int n) { int s = 0; for (int i = 0; i < n; i++) { s = s + i; } return s; }";
    let program = parse_program(source).expect("Parsing failed");
    let func = program.find_function("f").expect("missing function");

    let Statement::For(for_stmt) = &func.body[1] else {
        panic!("Expected for loop, got {:?}", func.body[1]);
    };
    assert!(matches!(
        for_stmt.init.as_deref(),
        Some(Statement::VarDecl(VarDecl { name, .. })) if name == "i"
    ));

    let step = for_stmt.increment.as_ref().expect("missing increment");
    assert_eq!(step.target.flattened_name().as_deref(), Some("i"));
    let (op, left, right) = binary_parts(&step.value);
    assert_eq!(op, BinOp::Add);
    assert_eq!(left.flattened_name().as_deref(), Some("i"));
    assert_eq!(right.integer_literal(), Some(1));
}

#[test]
fn test_for_decrement_and_empty_clauses() {
    let source = "int f(int n) { for (; ; n--) { if (n < 1) { break; } } for (;;) { break; } return n; }";
    let program = parse_program(source).expect("Parsing failed");
    let func = program.find_function("f").expect("missing function");

    let Statement::For(first) = &func.body[0] else {
        panic!("Expected for loop");
    };
    assert!(first.init.is_none());
    assert!(first.condition.is_none());
    let step = first.increment.as_ref().expect("missing increment");
    assert!(matches!(step.value, Expr::BinaryOp { op: BinOp::Sub, .. }));

    let Statement::For(second) = &func.body[1] else {
        panic!("Expected for loop");
    };
    assert!(second.increment.is_none());
}

#[test]
fn test_struct_field_table_is_populated() {
    let source = r#"
        struct Pixel { char r; char g; char b; double weight; };
        int f() { struct Pixel p = {1, 2, 3}; return 0; }
    "#;
    let (program, symbols, _) = compi::parse(source).expect("Parsing failed");
    assert_eq!(program.structs().count(), 1);

    let info = symbols.structs.lookup("Pixel").expect("struct not registered");
    let names: Vec<&str> = info.fields.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["r", "g", "b", "weight"]);
    assert_eq!(symbols.structs.field_type("Pixel", "weight"), Some(&TypeName::Double));
}

#[test]
fn test_struct_initializer_too_long() {
    let source = "struct P { int x; }; int f() { struct P p = {1, 2}; return 0; }";
    assert!(matches!(
        parse_program(source),
        Err(CompileError::InvalidDeclaration { .. })
    ));
}

#[test]
fn test_compilations_do_not_share_tables() {
    let first = "struct A { int x; }; int f() { int buf[4]; return 0; }";
    let second = "struct A { int y; }; int f() { struct A a; return a.y; }";

    let (_, symbols_one, _) = compi::parse(first).expect("first failed");
    let (_, symbols_two, _) = compi::parse(second).expect("second failed");

    assert_eq!(symbols_one.structs.field_type("A", "x"), Some(&TypeName::Int));
    assert_eq!(symbols_two.structs.field_type("A", "x"), None);
    assert_eq!(symbols_two.structs.field_type("A", "y"), Some(&TypeName::Int));
}

#[test]
fn test_unsupported_statement_is_fatal() {
    let source = "int f() { 42; return 0; }";
    let err = parse_program(source).unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
    assert_eq!(err.message(), "Unexpected number 42 at start of statement");
}

#[test]
fn test_string_literal_is_rejected() {
    let err = parse_program("int f() { int x = \"text\"; return x; }").unwrap_err();
    assert_eq!(err.message(), "String literals are not supported");
}
