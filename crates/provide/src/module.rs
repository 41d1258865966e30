use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};

use pathdiff::diff_paths;
use serde::Serialize;
use swc_core::common::Span;

use crate::ast::js_ast::JsAst;
use crate::config::ProvideTarget;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub source: String,
    pub resolve_type: ResolveType,
    pub order: usize,
    pub span: Option<Span>,
}

impl Dependency {
    pub fn provided_binding(&self) -> Option<&ProvidedBinding> {
        match &self.resolve_type {
            ResolveType::Provided(binding) => Some(binding),
            _ => None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum ResolveType {
    Import,
    ExportNamed,
    ExportAll,
    Require,
    DynamicImport,
    Provided(ProvidedBinding),
}

impl ResolveType {
    pub fn is_require(&self) -> bool {
        match self {
            ResolveType::Require => true,
            ResolveType::Provided(binding) => binding.require,
            _ => false,
        }
    }
}

/// One identifier bound to its provide target inside a module.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct ProvidedBinding {
    pub identifier: String,
    pub target: ProvideTarget,
    // injected as `const x = require(...)` instead of an import declaration
    pub require: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvideUsage {
    pub provided: Vec<ProvidedBinding>,
    // provide keys referenced in the module but bound locally
    pub shadowed: BTreeSet<String>,
}

/// An injected import edge of the module graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProvideEdge {
    pub from: ModuleId,
    pub identifier: String,
    pub request: String,
    pub export: Option<String>,
    pub to: ModuleId,
}

#[derive(Clone)]
pub struct ModuleInfo {
    pub ast: JsAst,
    pub path: String,
    pub raw: String,
    pub deps: Vec<Dependency>,
    pub provide_usage: ProvideUsage,
    pub is_esm: bool,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModuleId {
    pub id: String,
}

impl ModuleId {
    pub fn new(id: String) -> Self {
        Self { id }
    }

    pub fn relative_path(&self, root: &Path) -> String {
        diff_paths(&self.id, root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|| self.id.clone())
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl From<PathBuf> for ModuleId {
    fn from(path: PathBuf) -> Self {
        Self {
            id: path.to_string_lossy().to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Module {
    pub id: ModuleId,
    pub is_entry: bool,
    pub info: Option<ModuleInfo>,
}

impl Module {
    pub fn new(id: ModuleId, is_entry: bool, info: Option<ModuleInfo>) -> Self {
        Self { id, is_entry, info }
    }

    pub fn add_info(&mut self, info: Option<ModuleInfo>) {
        self.info = info;
    }

    pub fn provide_usage(&self) -> Option<&ProvideUsage> {
        self.info.as_ref().map(|info| &info.provide_usage)
    }
}

impl Debug for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Module id={}", self.id.id)
    }
}
