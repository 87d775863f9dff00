//! Integration tests for the full lex -> parse pipeline, exercised through
//! `shiro_lib::parser::parse_file` the way a caller outside the crate would
//! use it.

use shiro_lib::ast::{BinOpKind, ExprKind, StmtKind, TopLevelDef, TypeExpr};
use shiro_lib::parser::parse_file;

#[test]
fn parses_simple_function() {
    let src = "fn add(a: i32, b: i32) -> i32 {\n    return a + b;\n}\n";
    let (root, diags) = parse_file("add.shiro", src);
    assert!(diags.succeeded(), "{:?}", diags.iter().collect::<Vec<_>>());
    assert_eq!(root.defs.len(), 1);
    let TopLevelDef::Fn(f) = &root.defs[0] else {
        panic!("expected a function definition");
    };
    assert_eq!(f.name, "add");
    assert_eq!(f.params.len(), 2);
    assert!(matches!(f.return_type, Some(TypeExpr::Builtin(_))));
}

#[test]
fn parses_generic_class_with_members_and_methods() {
    let src = r#"
        class Pair<T> {
            var first: T;
            var second: T;

            fn swap() -> void {
                return;
            }
        }
    "#;
    let (root, diags) = parse_file("pair.shiro", src);
    assert!(diags.succeeded(), "{:?}", diags.iter().collect::<Vec<_>>());
    let TopLevelDef::Class(c) = &root.defs[0] else {
        panic!("expected a class definition");
    };
    assert_eq!(c.name, "Pair");
    assert_eq!(c.type_params.len(), 1);
    assert_eq!(c.members.len(), 2);
    assert_eq!(c.methods.len(), 1);
}

#[test]
fn generic_construction_is_disambiguated_from_comparison() {
    let src = "fn make() -> void {\n    var p = Pair<i32, i32>{ first = 1, second = 2 };\n}\n";
    let (root, diags) = parse_file("ctor.shiro", src);
    assert!(diags.succeeded(), "{:?}", diags.iter().collect::<Vec<_>>());
    let TopLevelDef::Fn(f) = &root.defs[0] else {
        panic!("expected a function");
    };
    let StmtKind::Compound(stmts) = &f.body.kind else {
        panic!("expected a compound body");
    };
    let StmtKind::Decl(decl) = &stmts[0].kind else {
        panic!("expected a var decl");
    };
    let init = decl.init.as_ref().expect("initializer");
    assert!(matches!(init.kind, ExprKind::ConstructExpr { .. }));
}

#[test]
fn less_than_without_closing_angle_stays_a_comparison() {
    let src = "fn cmp(a: i32, b: i32) -> bool {\n    return a < b;\n}\n";
    let (root, diags) = parse_file("cmp.shiro", src);
    assert!(diags.succeeded(), "{:?}", diags.iter().collect::<Vec<_>>());
    let TopLevelDef::Fn(f) = &root.defs[0] else {
        panic!("expected a function");
    };
    let StmtKind::Compound(stmts) = &f.body.kind else {
        panic!("expected a compound body");
    };
    let StmtKind::Return(Some(ret)) = &stmts[0].kind else {
        panic!("expected a return statement");
    };
    assert!(matches!(ret.kind, ExprKind::BinOp { op: BinOpKind::Lt, .. }));
}

#[test]
fn struct_literal_is_rejected_inside_if_condition() {
    let src = "fn check() -> void {\n    if (Point { x = 1 }) {\n        return;\n    }\n}\n";
    let (_root, diags) = parse_file("cond.shiro", src);
    assert!(diags.has_errors());
}

#[test]
fn malformed_top_level_item_recovers_and_parses_the_rest() {
    let src = "fn ( ) { }\nfn good() -> void {\n    return;\n}\n";
    let (root, diags) = parse_file("recover.shiro", src);
    assert!(diags.has_errors());
    assert_eq!(root.defs.len(), 1);
    let TopLevelDef::Fn(f) = &root.defs[0] else {
        panic!("expected the recovered function");
    };
    assert_eq!(f.name, "good");
}

#[test]
fn pointer_array_and_view_parameter_types_round_trip() {
    let src = "fn take(p: i32*, a: [i32, 4], v: view[i32]) -> void {\n    return;\n}\n";
    let (root, diags) = parse_file("types.shiro", src);
    assert!(diags.succeeded(), "{:?}", diags.iter().collect::<Vec<_>>());
    let TopLevelDef::Fn(f) = &root.defs[0] else {
        panic!("expected a function");
    };
    assert!(matches!(f.params[0].type_expr, TypeExpr::Pointer(_)));
    assert!(matches!(f.params[1].type_expr, TypeExpr::Array(_, _)));
    assert!(matches!(f.params[2].type_expr, TypeExpr::View(_)));
}
