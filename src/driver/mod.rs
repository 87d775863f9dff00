//! Multi-module build driver (spec §4.6), grounded in
//! `original_source/src/builder/{builder.c,module.c}`: read the manifest,
//! turn each declared module into a [`Module`], then run it through the
//! seven ordered phases spec §4.6 lists — parse, declare, populate
//! dependencies, topo-sort + export-merge, type-check, link.
//!
//! The C original keeps one `hash_table_t` of `module_t` on its `builder_t`
//! and a *separate* `compiler_context_t`/symbol table per module; cross-
//! module references are satisfied by `inject_exports_into_module` copying
//! whole `ast_t*`/symbol entries between them. Here every module instead
//! shares one [`SemanticContext`] (so types and symbols intern to the same
//! `Rc` pointers across module boundaries, which is what makes "equal by
//! the type-system's rules" mean the same thing everywhere — spec §5's
//! "the type cache is a process-wide canonical table"), and each module
//! just gets its own [`ScopeId`] to declare into instead of its own table.
//! `SemanticContext::global` is a plain field precisely so [`Builder`] can
//! point it at whichever module's scope is currently being processed.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, trace};

use crate::ast::{Root, TopLevelDef};
use crate::manifest::{self, Manifest, ManifestError, ModuleKind, ModuleSpec};
use crate::parser::parse_file;
use crate::sema::{self, SemanticContext};
use crate::symbol::{NamespaceData, ScopeId, ScopeKind, Symbol, SymbolData, SymbolKind};

#[derive(Debug)]
pub enum BuildError {
    Manifest(ManifestError),
    /// Two modules' source directories overlap, or a module reuses the
    /// project root itself (spec §4.6 step 1; `verify_module_path`).
    OverlappingModulePath { a: String, b: String },
    /// `[[bin.dep]]`/`[[lib]]` names a module the manifest never declares.
    UnknownDependency { module: String, dependency: String },
    /// Dependency graph has a cycle; the original only `TODO`s this check,
    /// spec §4.6 step 5 requires it to be an error.
    DependencyCycle(Vec<String>),
    Io { path: PathBuf, message: String },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Manifest(e) => write!(f, "manifest error: {e}"),
            BuildError::OverlappingModulePath { a, b } => {
                write!(f, "modules '{a}' and '{b}' have overlapping source directories")
            }
            BuildError::UnknownDependency { module, dependency } => {
                write!(f, "module '{module}' depends on unknown module '{dependency}'")
            }
            BuildError::DependencyCycle(cycle) => {
                write!(f, "dependency cycle: {}", cycle.join(" -> "))
            }
            BuildError::Io { path, message } => write!(f, "{}: {message}", path.display()),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<ManifestError> for BuildError {
    fn from(e: ManifestError) -> Self {
        BuildError::Manifest(e)
    }
}

/// One manifest-declared module: its own parsed files, own home scope in
/// the shared [`SemanticContext`], and bookkeeping for dependency-ordered
/// export merging. Mirrors `module_t`'s fields minus the ones
/// (`parser_t`, `hash_table_t` of types) that are now just borrows into
/// the shared context instead of owned per-module state.
pub struct Module {
    pub name: String,
    pub kind: ModuleKind,
    pub src_dir: PathBuf,
    pub deps: Vec<String>,
    pub roots: Vec<Root>,
    pub global: ScopeId,
    /// Scope other modules' imports are merged from: holds a `Namespace`-
    /// free, flattened copy of every `exported` top-level symbol declared
    /// directly in `global` (spec §4.6 step 5: "merge the exported symbol
    /// tables of each dependency... Collisions are tolerated until used
    /// ambiguously").
    pub exports: ScopeId,
}

pub struct Builder {
    pub project_name: String,
    pub root_dir: PathBuf,
    pub ctx: SemanticContext,
    pub modules: HashMap<String, Module>,
    /// Dependency order computed once during `populate_dependencies`, reused
    /// by every later phase (spec §5: "modules are processed in a
    /// deterministic order derived from the manifest").
    order: Vec<String>,
}

impl Builder {
    /// Phase 1 (spec §4.6 step 1): read the manifest and validate module
    /// paths, mirroring `verify_module_path` — no two modules' source
    /// directories may overlap, and none may be the project root itself.
    pub fn from_root(root_dir: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let root_dir = root_dir.into();
        let manifest = manifest::read_manifest(&root_dir)?;
        Self::from_manifest(root_dir, manifest)
    }

    pub fn from_manifest(root_dir: PathBuf, manifest: Manifest) -> Result<Self, BuildError> {
        verify_module_paths(&root_dir, &manifest)?;

        let mut ctx = SemanticContext::new();
        let mut modules = HashMap::new();
        for spec in &manifest.modules {
            let global = ctx.symbols.new_scope(ScopeKind::Global, None);
            let exports = ctx.symbols.new_scope(ScopeKind::Global, None);
            modules.insert(
                spec.name.clone(),
                Module {
                    name: spec.name.clone(),
                    kind: spec.kind.clone(),
                    src_dir: root_dir.join(&spec.src),
                    deps: spec.deps.clone(),
                    roots: Vec::new(),
                    global,
                    exports,
                },
            );
        }

        Ok(Builder {
            project_name: manifest.project_name,
            root_dir,
            ctx,
            modules,
            order: Vec::new(),
        })
    }

    /// Run every phase spec §4.6 lists, steps 2-7. A phase failing for one
    /// module never stops the others from running, so a single invocation
    /// surfaces every diagnostic across the whole project (spec §4.6: "the
    /// driver returns failure but still attempts to complete the phase for
    /// every module").
    pub fn build(&mut self) -> Result<(), BuildError> {
        self.parse_all();
        self.collect_all();
        let order = self.topo_sort()?;
        self.order = order;
        self.merge_exports();
        self.check_all();
        self.link_all();
        Ok(())
    }

    pub fn succeeded(&self) -> bool {
        self.ctx.diagnostics.succeeded()
    }

    /// Phase 2 (spec §4.6 step 2): for every module, walk its source
    /// directory recursively and parse every `.shiro` file, in the
    /// lexicographic order of the walk (spec §5's ordering guarantee),
    /// mirroring `module_parse_src` / `parse_directory_recursive`.
    fn parse_all(&mut self) {
        for name in self.module_names_in_manifest_order() {
            info!("parsing module '{name}'");
            let src_dir = self.modules[&name].src_dir.clone();
            let files = match collect_shiro_files(&src_dir) {
                Ok(files) => files,
                Err(e) => {
                    self.ctx.error(&name, crate::lexer::Span::default(), format!("could not read module '{name}': {e}"));
                    continue;
                }
            };
            let mut roots = Vec::with_capacity(files.len());
            for path in files {
                let display = path.display().to_string();
                trace!("parsing file '{display}'");
                let source = match fs::read_to_string(&path) {
                    Ok(s) => s,
                    Err(e) => {
                        self.ctx.error(&display, crate::lexer::Span::default(), format!("could not read file: {e}"));
                        continue;
                    }
                };
                let (root, diags) = parse_file(display.clone(), &source);
                self.ctx.diagnostics.extend(diags);
                roots.push(root);
            }
            self.modules.get_mut(&name).unwrap().roots = roots;
        }
    }

    /// Phase 3 (spec §4.6 step 3): declaration collection per module,
    /// mirroring `module_decl_collect`. Each module declares into its own
    /// `global` scope, which is why `ctx.global` is swapped before every
    /// call — `collect_declarations` always declares relative to whatever
    /// scope `ctx.global` currently names.
    fn collect_all(&mut self) {
        for name in self.module_names_in_manifest_order() {
            debug!("collecting declarations for module '{name}'");
            let (global, roots) = {
                let m = &self.modules[&name];
                (m.global, m.roots.clone())
            };
            self.ctx.global = global;
            for root in &roots {
                sema::collect::collect_declarations(&mut self.ctx, &root.file, root);
            }
        }
    }

    /// Phase 4 + 5a (spec §4.6 steps 4-5): populate each module's
    /// dependency list from the manifest (already done in
    /// [`Self::from_manifest`] — the original's `module_populate_dependencies`
    /// is a logging-only stub, since the real data has to come from the
    /// manifest read, done up front here instead) and topologically sort
    /// modules by that dependency graph, detecting cycles the original only
    /// leaves a `TODO` for.
    fn topo_sort(&mut self) -> Result<Vec<String>, BuildError> {
        for (name, module) in &self.modules {
            for dep in &module.deps {
                if !self.modules.contains_key(dep) {
                    return Err(BuildError::UnknownDependency {
                        module: name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let mut order = Vec::with_capacity(self.modules.len());
        let mut permanent = HashSet::new();
        let mut temporary = HashSet::new();

        for name in self.module_names_in_manifest_order() {
            if !permanent.contains(&name) {
                visit(&name, &self.modules, &mut permanent, &mut temporary, &mut order)?;
            }
        }

        Ok(order)
    }

    /// Phase 5b (spec §4.6 step 5): "merge the exported symbol tables of
    /// each dependency into the module's global scope", mirroring
    /// `inject_exports_into_module`. Processed in dependency order so a
    /// transitive dependency's own merged exports are already present by
    /// the time a downstream module needs them (re-exporting isn't
    /// required by the spec, but comes for free from this ordering).
    ///
    /// A dependency is visible as `alias.name` via an `ImportDef` in the
    /// dependent's source (`sema::resolve::check_access`'s `Namespace`
    /// lookup): for every such import this declares a `Namespace` symbol in
    /// the importing module's `global` scope whose `exports` point at the
    /// named dependency's `exports` scope directly — no copying needed
    /// since every module already shares one `SymbolTable`.
    fn merge_exports(&mut self) {
        let order = self.order.clone();
        for name in &order {
            let decl_names: Vec<String> = self.modules[name]
                .roots
                .iter()
                .flat_map(|r| r.defs.iter())
                .filter_map(|def| match def {
                    TopLevelDef::Fn(f) if f.exported => Some(f.name.clone()),
                    TopLevelDef::Class(c) if c.exported => Some(c.name.clone()),
                    _ => None,
                })
                .collect();
            for decl_name in &decl_names {
                self.copy_export(name, decl_name);
            }
        }

        for name in &order {
            let imports: Vec<(String, String)> = self.modules[name]
                .roots
                .iter()
                .flat_map(|r| r.defs.iter())
                .filter_map(|def| match def {
                    TopLevelDef::Import(i) => Some((i.namespace.clone(), i.module.clone())),
                    _ => None,
                })
                .collect();

            for (alias, dep_name) in imports {
                let Some(dep) = self.modules.get(&dep_name) else {
                    self.ctx.error(name, crate::lexer::Span::default(), format!("import of unknown module '{dep_name}'"));
                    continue;
                };
                let exports = dep.exports;
                let global = self.modules[name].global;
                let mut sym = Symbol::new(alias, SymbolKind::Namespace, crate::lexer::Span::default());
                sym.data = SymbolData::Namespace(NamespaceData { exports });
                let _ = self.ctx.symbols.declare(global, sym);
            }
        }
    }

    fn copy_export(&mut self, module: &str, decl_name: &str) {
        let module = &self.modules[module];
        let candidates = self.ctx.symbols.lookup_local(module.global, decl_name);
        let exports = module.exports;
        for id in candidates {
            let symbol = self.ctx.symbols.symbol(id).clone();
            let _ = self.ctx.symbols.declare(exports, symbol);
        }
    }

    /// Phase 6 (spec §4.6 step 6): type-check every module in dependency
    /// order, mirroring `module_compile`.
    fn check_all(&mut self) {
        let order = self.order.clone();
        for name in &order {
            info!("type-checking module '{name}'");
            let (global, roots) = {
                let m = &self.modules[name];
                (m.global, m.roots.clone())
            };
            self.ctx.global = global;
            for root in &roots {
                sema::resolve::resolve_signatures(&mut self.ctx, &root.file, root);
            }
            self.ctx.global = global;
            let mut checked = Vec::with_capacity(roots.len());
            for root in roots {
                let file = root.file.clone();
                checked.push(sema::resolve::check_root(&mut self.ctx, &file, root));
            }
            self.modules.get_mut(name).unwrap().roots = checked;
        }
    }

    /// Phase 7 (spec §4.6 step 7): invoke the link step for each `Binary`
    /// module. Linking and codegen are external collaborators this core
    /// never implements (spec §1/§5 Non-goals: "no linking"); `module_link`
    /// in the original is itself just a kind assertion plus a log line, so
    /// this mirrors that rather than inventing a real linker hook.
    fn link_all(&self) {
        for name in &self.order {
            let module = &self.modules[name];
            if module.kind == ModuleKind::Binary {
                debug!("link step for binary module '{name}' (no-op: linking is out of scope)");
            }
        }
    }

    fn module_names_in_manifest_order(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }
}

fn verify_module_paths(root_dir: &Path, manifest: &Manifest) -> Result<(), BuildError> {
    let mut seen: Vec<(&str, PathBuf)> = Vec::new();
    for m in &manifest.modules {
        let abs = root_dir.join(&m.src);
        if abs == *root_dir {
            return Err(BuildError::OverlappingModulePath { a: m.name.clone(), b: "<project root>".to_string() });
        }
        for (other_name, other_path) in &seen {
            if abs == *other_path || abs.starts_with(other_path) || other_path.starts_with(&abs) {
                return Err(BuildError::OverlappingModulePath { a: m.name.clone(), b: other_name.to_string() });
            }
        }
        seen.push((&m.name, abs));
    }
    Ok(())
}

fn visit(
    name: &str,
    modules: &HashMap<String, Module>,
    permanent: &mut HashSet<String>,
    temporary: &mut HashSet<String>,
    order: &mut Vec<String>,
) -> Result<(), BuildError> {
    if permanent.contains(name) {
        return Ok(());
    }
    if !temporary.insert(name.to_string()) {
        return Err(BuildError::DependencyCycle(vec![name.to_string()]));
    }

    let mut deps: Vec<String> = modules[name].deps.clone();
    deps.sort();
    for dep in &deps {
        visit(dep, modules, permanent, temporary, order).map_err(|e| match e {
            BuildError::DependencyCycle(mut chain) => {
                chain.push(name.to_string());
                BuildError::DependencyCycle(chain)
            }
            other => other,
        })?;
    }

    temporary.remove(name);
    permanent.insert(name.to_string());
    order.push(name.to_string());
    Ok(())
}

/// Recursively walk `dir`, returning every `.shiro` file in lexicographic
/// order (spec §5: "within a module, files are processed in the
/// lexicographic order of the directory walk"), mirroring
/// `parse_directory_recursive` / `ends_with(str, ".shiro")`.
fn collect_shiro_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    walk(dir, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("shiro") {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, ModuleKind, ModuleSpec};

    fn manifest_with(modules: Vec<ModuleSpec>) -> Manifest {
        Manifest { project_name: "demo".to_string(), modules }
    }

    #[test]
    fn detects_overlapping_module_paths() {
        let m = manifest_with(vec![
            ModuleSpec { name: "a".to_string(), kind: ModuleKind::Binary, src: PathBuf::from("src"), deps: vec![] },
            ModuleSpec { name: "b".to_string(), kind: ModuleKind::Library, src: PathBuf::from("src/nested"), deps: vec![] },
        ]);
        let err = verify_module_paths(Path::new("/project"), &m).unwrap_err();
        assert!(matches!(err, BuildError::OverlappingModulePath { .. }));
    }

    #[test]
    fn detects_dependency_cycles() {
        let mut modules = HashMap::new();
        modules.insert(
            "a".to_string(),
            Module {
                name: "a".to_string(),
                kind: ModuleKind::Library,
                src_dir: PathBuf::new(),
                deps: vec!["b".to_string()],
                roots: Vec::new(),
                global: ScopeId(0),
                exports: ScopeId(0),
            },
        );
        modules.insert(
            "b".to_string(),
            Module {
                name: "b".to_string(),
                kind: ModuleKind::Library,
                src_dir: PathBuf::new(),
                deps: vec!["a".to_string()],
                roots: Vec::new(),
                global: ScopeId(0),
                exports: ScopeId(0),
            },
        );
        let mut permanent = HashSet::new();
        let mut temporary = HashSet::new();
        let mut order = Vec::new();
        let err = visit("a", &modules, &mut permanent, &mut temporary, &mut order).unwrap_err();
        assert!(matches!(err, BuildError::DependencyCycle(_)));
    }

    #[test]
    fn topo_sort_orders_dependencies_before_dependents() {
        let mut modules = HashMap::new();
        modules.insert(
            "app".to_string(),
            Module {
                name: "app".to_string(),
                kind: ModuleKind::Binary,
                src_dir: PathBuf::new(),
                deps: vec!["core".to_string()],
                roots: Vec::new(),
                global: ScopeId(0),
                exports: ScopeId(1),
            },
        );
        modules.insert(
            "core".to_string(),
            Module {
                name: "core".to_string(),
                kind: ModuleKind::Library,
                src_dir: PathBuf::new(),
                deps: vec![],
                roots: Vec::new(),
                global: ScopeId(2),
                exports: ScopeId(3),
            },
        );
        let mut permanent = HashSet::new();
        let mut temporary = HashSet::new();
        let mut order = Vec::new();
        visit("app", &modules, &mut permanent, &mut temporary, &mut order).unwrap();
        assert_eq!(order, vec!["core".to_string(), "app".to_string()]);
    }
}
