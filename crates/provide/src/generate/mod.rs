use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Result};
use pathdiff::diff_paths;
use rayon::prelude::*;
use swc_core::common::GLOBALS;
use swc_core::ecma::visit::VisitMutWith;
use tracing::{debug, info};

use crate::compiler::{Compiler, Context};
use crate::module::ModuleId;
use crate::module_graph::ModuleGraph;
use crate::visitors::dep_replacer::DepReplacer;

// modules outside of root are emitted under this directory
const EXTERNAL_DIR: &str = "_external";

/// One emitted module, its path under the output directory and its code
/// with injected imports and rewritten sources.
#[derive(Debug, Clone)]
pub struct EmittedFile {
    pub path: PathBuf,
    pub module_id: ModuleId,
    pub content: String,
}

impl Compiler {
    pub fn generate(&self) -> Result<Vec<EmittedFile>> {
        debug!("generate");
        let t_generate = Instant::now();
        let context = &self.context;
        let module_graph = context.module_graph.read().unwrap();
        let module_graph = &*module_graph;

        let mut module_ids = module_graph.get_module_ids();
        module_ids.sort();
        let files = module_ids
            .par_iter()
            .map(|module_id| generate_module(module_graph, module_id, context))
            .collect::<Result<Vec<_>>>()?;

        if !context.config.output.skip_write {
            self.write_to_dist(&files)?;
        }

        info!(
            "{} modules generated in {}ms.",
            files.len(),
            t_generate.elapsed().as_millis()
        );
        Ok(files)
    }

    fn write_to_dist(&self, files: &[EmittedFile]) -> Result<()> {
        let output = &self.context.config.output.path;
        if self.context.config.clean && output.exists() {
            fs::remove_dir_all(output)?;
        }
        for file in files {
            if let Some(parent) = file.path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        files.par_iter().try_for_each(|file| {
            fs::write(&file.path, &file.content)
                .map_err(|e| anyhow!("write {} failed: {}", file.path.display(), e))
        })
    }
}

fn generate_module(
    module_graph: &ModuleGraph,
    module_id: &ModuleId,
    context: &Context,
) -> Result<EmittedFile> {
    let module = module_graph
        .get_module(module_id)
        .ok_or_else(|| anyhow!("module {} not found in the module graph", module_id.id))?;
    let info = module
        .info
        .as_ref()
        .ok_or_else(|| anyhow!("module {} is not built", module_id.id))?;

    let dist_path = to_dist_path(&module_id.id, context);
    let dist_dir = dist_path
        .parent()
        .ok_or_else(|| anyhow!("invalid dist path {}", dist_path.display()))?;

    let mut to_replace = HashMap::new();
    for (dep_id, dep) in module_graph.get_dependencies(module_id) {
        let dep_dist_path = to_dist_path(&dep_id.id, context);
        let rel_path = diff_paths(&dep_dist_path, dist_dir).ok_or_else(|| {
            anyhow!(
                "failed to get relative path from {:?} to {:?}",
                dep_dist_path,
                dist_dir
            )
        })?;
        let mut replacement = rel_path.to_string_lossy().replace('\\', "/");
        if !replacement.starts_with("./") && !replacement.starts_with("../") {
            replacement.insert_str(0, "./");
        }
        to_replace.insert(dep.source.clone(), replacement);
    }

    let mut ast = info.ast.clone();
    GLOBALS.set(&context.meta.script.globals, || {
        ast.ast.visit_mut_with(&mut DepReplacer {
            to_replace: &to_replace,
            unresolved_mark: ast.unresolved_mark,
        });
    });
    let content = ast.generate()?;

    Ok(EmittedFile {
        path: dist_path,
        module_id: module_id.clone(),
        content,
    })
}

pub fn to_dist_path<P: AsRef<str>>(abs_path: P, context: &Context) -> PathBuf {
    let abs_path = Path::new(abs_path.as_ref());
    let relative_path = diff_paths(abs_path, &context.root)
        .filter(|p| !p.components().any(|c| matches!(c, Component::ParentDir)))
        .unwrap_or_else(|| {
            abs_path
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part),
                    _ => None,
                })
                .fold(PathBuf::from(EXTERNAL_DIR), |path, part| path.join(part))
        });
    normalize_extension(context.config.output.path.join(relative_path))
}

fn normalize_extension(to: PathBuf) -> PathBuf {
    match to.extension().and_then(|ext| ext.to_str()) {
        Some("json") => to.with_extension("json.js"),
        _ => to,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::compiler::Context;
    use crate::config::Config;
    use crate::utils::test_helper::setup_compiler_with_output;

    #[test]
    fn test_to_dist_path() {
        let mut config = Config::default();
        config.output.path = PathBuf::from("/project/dist");
        let context = Context {
            root: PathBuf::from("/project"),
            config,
            ..Default::default()
        };
        assert_eq!(
            to_dist_path("/project/src/a.js", &context),
            PathBuf::from("/project/dist/src/a.js")
        );
        assert_eq!(
            to_dist_path("/project/data.json", &context),
            PathBuf::from("/project/dist/data.json.js")
        );
        assert_eq!(
            to_dist_path("/shared/lib/b.js", &context),
            PathBuf::from("/project/dist/_external/shared/lib/b.js")
        );
    }

    #[test]
    fn test_generate_default_export_bindings() {
        let (compiler, output) = setup_compiler_with_output("test/build/provide-default");
        let compile_output = compiler.compile().unwrap();
        assert_eq!(compile_output.files.len(), 2);

        let index = fs::read_to_string(output.path().join("index.js")).unwrap();
        assert_eq!(
            index.trim(),
            r#"import Mod from "./esm.js";
import Def from "./esm.js";
export const same = Mod === Def;
export const value = Mod() + Def();"#
        );
        let esm = fs::read_to_string(output.path().join("esm.js")).unwrap();
        assert!(esm.contains("export default function answer()"));
        assert!(!esm.contains("import"));
    }

    #[test]
    fn test_generate_commonjs_bindings() {
        let (compiler, output) = setup_compiler_with_output("test/build/provide-cjs");
        compiler.compile().unwrap();
        let index = fs::read_to_string(output.path().join("index.js")).unwrap();
        assert!(index.contains(r#"const utils = require("./utils.js");"#), "{}", index);
        assert!(index.contains(r#"const add = require("./math.js").add;"#), "{}", index);
        assert!(index.contains("module.exports = utils.double(add(1, 2));"));
    }

    #[test]
    fn test_generate_skip_write() {
        let (compiler, output) = setup_compiler_with_output("test/build/provide-default");
        let mut config = compiler.context.config.clone();
        config.output.skip_write = true;
        let compiler = crate::compiler::Compiler::new(config, compiler.context.root.clone()).unwrap();
        let compile_output = compiler.compile().unwrap();
        assert_eq!(compile_output.files.len(), 2);
        assert!(!output.path().join("index.js").exists());
    }
}
