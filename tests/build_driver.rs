//! Multi-module build driver scenarios (spec §4.6): manifest reading,
//! dependency ordering, export merging across modules, and the error modes
//! a malformed project surfaces before a single file is parsed.

use std::fs;

use shiro_lib::driver::{BuildError, Builder};

fn write(dir: &std::path::Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn single_module_project_builds_successfully() {
    let project = tempfile::tempdir().unwrap();
    write(
        project.path(),
        "shiro.toml",
        "[project]\nname = \"demo\"\n\n[[bin]]\nname = \"app\"\nsrc = \"src\"\n",
    );
    write(
        project.path(),
        "src/main.shiro",
        "fn main() -> i32 {\n    return 0;\n}\n",
    );

    let mut builder = Builder::from_root(project.path()).unwrap();
    builder.build().unwrap();
    assert!(builder.succeeded(), "{:?}", builder.ctx.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn a_library_exports_a_function_its_dependent_can_call() {
    let project = tempfile::tempdir().unwrap();
    write(
        project.path(),
        "shiro.toml",
        "[project]\nname = \"demo\"\n\n[[bin]]\nname = \"app\"\nsrc = \"src/app\"\n[[bin.dep]]\nname = \"core\"\n\n[[lib]]\nname = \"core\"\nsrc = \"src/core\"\n",
    );
    write(
        project.path(),
        "src/core/lib.shiro",
        "export fn answer() -> i32 {\n    return 42;\n}\n",
    );
    write(
        project.path(),
        "src/app/main.shiro",
        "import core.lib;\n\nfn main() -> i32 {\n    return core.answer();\n}\n",
    );

    let mut builder = Builder::from_root(project.path()).unwrap();
    builder.build().unwrap();
    assert!(builder.succeeded(), "{:?}", builder.ctx.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn calling_an_export_the_dependency_never_declares_is_an_error() {
    let project = tempfile::tempdir().unwrap();
    write(
        project.path(),
        "shiro.toml",
        "[project]\nname = \"demo\"\n\n[[bin]]\nname = \"app\"\nsrc = \"src/app\"\n[[bin.dep]]\nname = \"core\"\n\n[[lib]]\nname = \"core\"\nsrc = \"src/core\"\n",
    );
    write(project.path(), "src/core/lib.shiro", "export fn answer() -> i32 {\n    return 42;\n}\n");
    write(
        project.path(),
        "src/app/main.shiro",
        "import core.lib;\n\nfn main() -> i32 {\n    return core.nonexistent();\n}\n",
    );

    let mut builder = Builder::from_root(project.path()).unwrap();
    builder.build().unwrap();
    assert!(!builder.succeeded());
}

#[test]
fn a_dependency_cycle_is_rejected() {
    let project = tempfile::tempdir().unwrap();
    write(
        project.path(),
        "shiro.toml",
        "[project]\nname = \"demo\"\n\n[[lib]]\nname = \"a\"\nsrc = \"src/a\"\n[[lib.dep]]\nname = \"b\"\n\n[[lib]]\nname = \"b\"\nsrc = \"src/b\"\n[[lib.dep]]\nname = \"a\"\n",
    );
    write(project.path(), "src/a/lib.shiro", "export fn a() -> void {\n    return;\n}\n");
    write(project.path(), "src/b/lib.shiro", "export fn b() -> void {\n    return;\n}\n");

    let mut builder = Builder::from_root(project.path()).unwrap();
    let err = builder.build().unwrap_err();
    assert!(matches!(err, BuildError::DependencyCycle(_)));
}

#[test]
fn a_dependency_on_an_undeclared_module_is_an_error() {
    let project = tempfile::tempdir().unwrap();
    write(
        project.path(),
        "shiro.toml",
        "[project]\nname = \"demo\"\n\n[[bin]]\nname = \"app\"\nsrc = \"src\"\n[[bin.dep]]\nname = \"missing\"\n",
    );
    write(project.path(), "src/main.shiro", "fn main() -> i32 {\n    return 0;\n}\n");

    let mut builder = Builder::from_root(project.path()).unwrap();
    let err = builder.build().unwrap_err();
    assert!(matches!(err, BuildError::UnknownDependency { .. }));
}

#[test]
fn overlapping_module_source_directories_are_rejected_before_parsing() {
    let project = tempfile::tempdir().unwrap();
    write(
        project.path(),
        "shiro.toml",
        "[project]\nname = \"demo\"\n\n[[bin]]\nname = \"app\"\nsrc = \"src\"\n\n[[lib]]\nname = \"core\"\nsrc = \"src\"\n",
    );
    write(project.path(), "src/main.shiro", "fn main() -> i32 {\n    return 0;\n}\n");

    let err = Builder::from_root(project.path()).unwrap_err();
    assert!(matches!(err, BuildError::OverlappingModulePath { .. }));
}

#[test]
fn a_missing_manifest_is_a_clean_error_not_a_panic() {
    let project = tempfile::tempdir().unwrap();
    let err = Builder::from_root(project.path()).unwrap_err();
    assert!(matches!(err, BuildError::Manifest(_)));
}

#[test]
fn a_type_error_in_one_module_is_reported_alongside_everything_else() {
    let project = tempfile::tempdir().unwrap();
    write(
        project.path(),
        "shiro.toml",
        "[project]\nname = \"demo\"\n\n[[bin]]\nname = \"app\"\nsrc = \"src\"\n",
    );
    write(
        project.path(),
        "src/main.shiro",
        "fn main() -> bool {\n    return 1;\n}\n",
    );

    let mut builder = Builder::from_root(project.path()).unwrap();
    builder.build().unwrap();
    assert!(!builder.succeeded());
}
