//! End-to-end scenarios for the two-pass semantic analyzer, run through
//! `shiro_lib::sema::analyze_standalone` the way a single-module build would
//! invoke it.

use shiro_lib::parser::parse_file;
use shiro_lib::sema::{analyze_standalone, SemanticContext};

fn check(src: &str) -> SemanticContext {
    let (root, parse_diags) = parse_file("scenario.shiro", src);
    assert!(parse_diags.succeeded(), "parse failed: {:?}", parse_diags.iter().collect::<Vec<_>>());
    let mut ctx = SemanticContext::new();
    analyze_standalone(&mut ctx, "scenario.shiro", root);
    ctx
}

#[test]
fn well_typed_function_has_no_diagnostics() {
    let ctx = check("fn add(a: i32, b: i32) -> i32 {\n    return a + b;\n}\n");
    assert!(ctx.diagnostics.succeeded(), "{:?}", ctx.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn returning_the_wrong_type_is_an_error() {
    let ctx = check("fn truth() -> bool {\n    return 1;\n}\n");
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn reading_an_uninitialized_variable_is_an_error() {
    let ctx = check("fn f() -> i32 {\n    var x: i32;\n    return x;\n}\n");
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn both_if_branches_assigning_satisfies_definite_assignment() {
    let ctx = check(
        "fn f(cond: bool) -> i32 {\n    var x: i32;\n    if (cond) {\n        x = 1;\n    } else {\n        x = 2;\n    }\n    return x;\n}\n",
    );
    assert!(ctx.diagnostics.succeeded(), "{:?}", ctx.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn only_one_if_branch_assigning_is_an_error() {
    let ctx = check(
        "fn f(cond: bool) -> i32 {\n    var x: i32;\n    if (cond) {\n        x = 1;\n    }\n    return x;\n}\n",
    );
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn class_member_access_type_checks() {
    let ctx = check(
        "class Point {\n    var x: i32;\n    var y: i32;\n}\n\nfn f() -> i32 {\n    var p = Point{ x = 1, y = 2 };\n    return p.x;\n}\n",
    );
    assert!(ctx.diagnostics.succeeded(), "{:?}", ctx.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn calling_an_undefined_function_is_an_error() {
    let ctx = check("fn f() -> void {\n    phantom();\n    return;\n}\n");
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn integer_literal_too_large_for_u64_is_lexically_rejected() {
    let (_root, diags) = parse_file("overflow.shiro", "fn f() -> u64 {\n    return 18446744073709551616;\n}\n");
    assert!(diags.has_errors());
}

#[test]
fn literal_that_does_not_fit_its_suffix_is_an_error() {
    let ctx = check("fn f() -> u8 {\n    return 256u8;\n}\n");
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn negative_literal_cannot_target_an_unsigned_suffix() {
    let ctx = check("fn f() -> void {\n    var x: u32 = -1u32;\n    return;\n}\n");
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn a_void_variable_cannot_be_declared() {
    let ctx = check("fn f() -> void {\n    var x: void;\n    return;\n}\n");
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn an_empty_array_literal_cannot_infer_its_element_type() {
    let ctx = check("fn f() -> void {\n    var xs = [];\n    return;\n}\n");
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn null_cannot_be_assigned_to_a_non_pointer_type() {
    let ctx = check("fn f() -> void {\n    var p: i32 = null;\n    return;\n}\n");
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn null_can_be_assigned_to_a_pointer_type() {
    let ctx = check("fn f() -> void {\n    var p: i32* = null;\n    return;\n}\n");
    assert!(ctx.diagnostics.succeeded(), "{:?}", ctx.diagnostics.iter().collect::<Vec<_>>());
}
