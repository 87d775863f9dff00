//! Manifest reading (spec §6, §4.6 step 1), grounded in
//! `original_source/src/builder/builder.c`'s `extract_build_instructions`:
//! read the restricted TOML-subset document (see [`toml`]), then project its
//! `[project]` / `[[bin]]` / `[[lib]]` / `[[bin.dep]]` shape into the typed
//! [`Manifest`] the build driver consumes. Structural mistakes the original
//! treats as fatal (`Fatal for the driver; aborts before parsing` per spec
//! §7's "Manifest malformed" row) become [`ManifestError`] here.

mod toml;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    Binary,
    Library,
}

#[derive(Debug, Clone)]
pub struct ModuleSpec {
    pub name: String,
    pub kind: ModuleKind,
    /// Module's source directory, relative to the project root.
    pub src: PathBuf,
    /// Names of other modules this one depends on (`[[bin.dep]]`).
    pub deps: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub project_name: String,
    pub modules: Vec<ModuleSpec>,
}

impl Manifest {
    pub fn module(&self, name: &str) -> Option<&ModuleSpec> {
        self.modules.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    Io { path: PathBuf, message: String },
    Malformed { path: PathBuf, message: String },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Io { path, message } => write!(f, "{}: {message}", path.display()),
            ManifestError::Malformed { path, message } => write!(f, "{}: {message}", path.display()),
        }
    }
}

impl std::error::Error for ManifestError {}

const MANIFEST_FILE_NAME: &str = "shiro.toml";

/// Read `<project_root>/shiro.toml` and project it into a [`Manifest`].
pub fn read_manifest(project_root: &Path) -> Result<Manifest, ManifestError> {
    let path = project_root.join(MANIFEST_FILE_NAME);
    let contents = fs::read_to_string(&path).map_err(|e| ManifestError::Io {
        path: path.clone(),
        message: e.to_string(),
    })?;
    parse_manifest(&contents, &path)
}

fn parse_manifest(contents: &str, path: &Path) -> Result<Manifest, ManifestError> {
    let doc = toml::parse(contents).map_err(|e| ManifestError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let project_name = doc
        .section("project")
        .and_then(|t| t.get("name"))
        .ok_or_else(|| ManifestError::Malformed {
            path: path.to_path_buf(),
            message: "missing required '[project] name = \"...\"'".to_string(),
        })?
        .to_string();

    let mut modules = Vec::new();
    modules.extend(read_modules(doc.array_section("bin"), ModuleKind::Binary, path)?);
    modules.extend(read_modules(doc.array_section("lib"), ModuleKind::Library, path)?);

    if modules.is_empty() {
        return Err(ManifestError::Malformed {
            path: path.to_path_buf(),
            message: "manifest declares no '[[bin]]' or '[[lib]]' modules".to_string(),
        });
    }

    Ok(Manifest { project_name, modules })
}

fn read_modules(entries: &[toml::ArrayEntry], kind: ModuleKind, path: &Path) -> Result<Vec<ModuleSpec>, ManifestError> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.get("name").ok_or_else(|| ManifestError::Malformed {
            path: path.to_path_buf(),
            message: "module entry is missing required 'name'".to_string(),
        })?;
        let src = entry.get("src").ok_or_else(|| ManifestError::Malformed {
            path: path.to_path_buf(),
            message: format!("module '{name}' is missing required 'src'"),
        })?;
        let deps = entry
            .nested("dep")
            .iter()
            .map(|dep| {
                dep.get("name").map(str::to_string).ok_or_else(|| ManifestError::Malformed {
                    path: path.to_path_buf(),
                    message: format!("a '[[{name}.dep]]' entry is missing required 'name'"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        out.push(ModuleSpec {
            name: name.to_string(),
            kind: kind.clone(),
            src: PathBuf::from(src),
            deps,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_single_binary_module() {
        let m = parse_manifest(
            "[project]\nname = \"demo\"\n\n[[bin]]\nname = \"app\"\nsrc = \"src/app\"\n",
            Path::new("shiro.toml"),
        )
        .unwrap();
        assert_eq!(m.project_name, "demo");
        assert_eq!(m.modules.len(), 1);
        assert_eq!(m.modules[0].kind, ModuleKind::Binary);
        assert_eq!(m.modules[0].src, PathBuf::from("src/app"));
        assert!(m.modules[0].deps.is_empty());
    }

    #[test]
    fn reads_dependencies_between_modules() {
        let m = parse_manifest(
            "[project]\nname = \"demo\"\n\n[[bin]]\nname = \"app\"\nsrc = \"src/app\"\n[[bin.dep]]\nname = \"core\"\n\n[[lib]]\nname = \"core\"\nsrc = \"src/core\"\n",
            Path::new("shiro.toml"),
        )
        .unwrap();
        let app = m.module("app").unwrap();
        assert_eq!(app.deps, vec!["core".to_string()]);
        let core = m.module("core").unwrap();
        assert_eq!(core.kind, ModuleKind::Library);
    }

    #[test]
    fn missing_project_name_is_malformed() {
        let err = parse_manifest("[[bin]]\nname = \"app\"\nsrc = \"src\"\n", Path::new("shiro.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }

    #[test]
    fn module_missing_src_is_malformed() {
        let err = parse_manifest("[project]\nname = \"demo\"\n\n[[bin]]\nname = \"app\"\n", Path::new("shiro.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }

    #[test]
    fn no_modules_declared_is_malformed() {
        let err = parse_manifest("[project]\nname = \"demo\"\n", Path::new("shiro.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }
}
