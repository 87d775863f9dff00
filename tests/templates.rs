//! Template instantiation end to end: generic functions and classes, type
//! inference from call-site arguments, and instance caching observed
//! through the symbol table `analyze_standalone` leaves behind.

use shiro_lib::parser::parse_file;
use shiro_lib::sema::{analyze_standalone, SemanticContext};
use shiro_lib::symbol::SymbolData;

fn check(src: &str) -> SemanticContext {
    let (root, parse_diags) = parse_file("templates.shiro", src);
    assert!(parse_diags.succeeded(), "parse failed: {:?}", parse_diags.iter().collect::<Vec<_>>());
    let mut ctx = SemanticContext::new();
    analyze_standalone(&mut ctx, "templates.shiro", root);
    ctx
}

fn template_instance_count(ctx: &SemanticContext, name: &str) -> usize {
    ctx.symbols
        .scope(ctx.global)
        .local(name)
        .iter()
        .filter_map(|id| match &ctx.symbols.symbol(*id).data {
            SymbolData::Template(t) => Some(t.instances.len()),
            _ => None,
        })
        .next()
        .unwrap_or(0)
}

#[test]
fn generic_function_type_args_are_inferred_from_the_call() {
    let ctx = check(
        "fn identity<T>(x: T) -> T {\n    return x;\n}\n\nfn use_it() -> i32 {\n    return identity(5);\n}\n",
    );
    assert!(ctx.diagnostics.succeeded(), "{:?}", ctx.diagnostics.iter().collect::<Vec<_>>());
    assert_eq!(template_instance_count(&ctx, "identity"), 1);
}

#[test]
fn repeated_calls_with_the_same_type_args_share_one_instance() {
    let ctx = check(
        "fn identity<T>(x: T) -> T {\n    return x;\n}\n\nfn use_it() -> void {\n    identity(1);\n    identity(2);\n    return;\n}\n",
    );
    assert!(ctx.diagnostics.succeeded(), "{:?}", ctx.diagnostics.iter().collect::<Vec<_>>());
    assert_eq!(template_instance_count(&ctx, "identity"), 1);
}

#[test]
fn distinct_type_args_produce_distinct_instances() {
    let ctx = check(
        "fn identity<T>(x: T) -> T {\n    return x;\n}\n\nfn use_it() -> void {\n    identity(1);\n    identity(true);\n    return;\n}\n",
    );
    assert!(ctx.diagnostics.succeeded(), "{:?}", ctx.diagnostics.iter().collect::<Vec<_>>());
    assert_eq!(template_instance_count(&ctx, "identity"), 2);
}

#[test]
fn generic_class_construction_instantiates_its_members() {
    let ctx = check(
        "class Box<T> {\n    var value: T;\n}\n\nfn use_it() -> i32 {\n    var b = Box<i32>{ value = 5 };\n    return b.value;\n}\n",
    );
    assert!(ctx.diagnostics.succeeded(), "{:?}", ctx.diagnostics.iter().collect::<Vec<_>>());
    assert_eq!(template_instance_count(&ctx, "Box"), 1);
}

#[test]
fn calling_a_generic_function_with_the_wrong_arity_is_an_error() {
    let ctx = check("fn identity<T>(x: T) -> T {\n    return x;\n}\n\nfn use_it() -> void {\n    identity(1, 2);\n    return;\n}\n");
    assert!(ctx.diagnostics.has_errors());
}
