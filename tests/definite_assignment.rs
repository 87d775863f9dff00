//! End-to-end definite-assignment scenarios, checked through the full
//! parse -> analyze pipeline rather than against `DefiniteAssign` directly
//! (that struct's merge algebra already has its own unit tests alongside
//! `shiro_lib::sema::definite_assign`).

use shiro_lib::parser::parse_file;
use shiro_lib::sema::{analyze_standalone, SemanticContext};

fn diagnostics_for(src: &str) -> SemanticContext {
    let (root, parse_diags) = parse_file("assign.shiro", src);
    assert!(parse_diags.succeeded(), "parse failed: {:?}", parse_diags.iter().collect::<Vec<_>>());
    let mut ctx = SemanticContext::new();
    analyze_standalone(&mut ctx, "assign.shiro", root);
    ctx
}

#[test]
fn assignment_before_use_is_accepted() {
    let ctx = diagnostics_for("fn f() -> i32 {\n    var x: i32;\n    x = 1;\n    return x;\n}\n");
    assert!(ctx.diagnostics.succeeded());
}

#[test]
fn a_while_bodys_assignment_does_not_escape_the_loop() {
    let ctx = diagnostics_for(
        "fn f(cond: bool) -> i32 {\n    var x: i32;\n    while (cond) {\n        x = 1;\n    }\n    return x;\n}\n",
    );
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn nested_if_else_both_assigning_on_every_path_is_accepted() {
    let ctx = diagnostics_for(
        "fn f(a: bool, b: bool) -> i32 {\n    var x: i32;\n    if (a) {\n        if (b) {\n            x = 1;\n        } else {\n            x = 2;\n        }\n    } else {\n        x = 3;\n    }\n    return x;\n}\n",
    );
    assert!(ctx.diagnostics.succeeded(), "{:?}", ctx.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn nested_if_missing_an_inner_else_leaves_a_path_unassigned() {
    let ctx = diagnostics_for(
        "fn f(a: bool, b: bool) -> i32 {\n    var x: i32;\n    if (a) {\n        if (b) {\n            x = 1;\n        }\n    } else {\n        x = 2;\n    }\n    return x;\n}\n",
    );
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn an_if_with_no_else_never_definitely_assigns() {
    let ctx = diagnostics_for(
        "fn f(cond: bool) -> i32 {\n    var x: i32;\n    if (cond) {\n        x = 1;\n    }\n    return x;\n}\n",
    );
    assert!(ctx.diagnostics.has_errors());
}

#[test]
fn parameters_are_initialized_on_entry() {
    let ctx = diagnostics_for("fn f(a: i32) -> i32 {\n    return a;\n}\n");
    assert!(ctx.diagnostics.succeeded());
}

#[test]
fn a_variable_declared_with_an_initializer_is_already_assigned() {
    let ctx = diagnostics_for("fn f() -> i32 {\n    var x: i32 = 5;\n    return x;\n}\n");
    assert!(ctx.diagnostics.succeeded());
}
