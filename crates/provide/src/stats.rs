use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::compiler::Compiler;
use crate::features::provide::ShadowedProvideWarning;

pub const STATS_FILE: &str = "stats.json";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsJsonDependencyItem {
    pub source: String,
    pub module_id: String,
    // set when the dependency was injected for a provided identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provided: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatsJsonModuleItem {
    pub module_id: String,
    pub entry: bool,
    pub size: u64,
    pub dependencies: Vec<StatsJsonDependencyItem>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsJsonProvideItem {
    pub module_id: String,
    pub identifier: String,
    pub request: String,
    pub export: Option<String>,
    pub resolved: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub built_at: u128,
    pub root_path: PathBuf,
    pub output_path: PathBuf,
    pub modules: Vec<StatsJsonModuleItem>,
    pub provided: Vec<StatsJsonProvideItem>,
    pub warnings: Vec<ShadowedProvideWarning>,
}

impl Compiler {
    pub fn create_stats(&self, warnings: &[ShadowedProvideWarning]) -> Stats {
        let context = &self.context;
        let root = &context.root;
        let module_graph = context.module_graph.read().unwrap();

        let mut modules = module_graph
            .get_modules()
            .into_iter()
            .map(|module| StatsJsonModuleItem {
                module_id: module.id.relative_path(root),
                entry: module.is_entry,
                size: module
                    .info
                    .as_ref()
                    .map(|info| info.raw.len() as u64)
                    .unwrap_or(0),
                dependencies: module_graph
                    .get_dependencies(&module.id)
                    .into_iter()
                    .map(|(id, dep)| StatsJsonDependencyItem {
                        source: dep.source.clone(),
                        module_id: id.relative_path(root),
                        provided: dep.provided_binding().map(|b| b.identifier.clone()),
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();
        modules.sort_by(|a, b| a.module_id.cmp(&b.module_id));

        let provided = module_graph
            .provided_edges()
            .into_iter()
            .map(|edge| StatsJsonProvideItem {
                module_id: edge.from.relative_path(root),
                identifier: edge.identifier,
                request: edge.request,
                export: edge.export,
                resolved: edge.to.relative_path(root),
            })
            .collect();

        let built_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        Stats {
            built_at,
            root_path: root.clone(),
            output_path: context.config.output.path.clone(),
            modules,
            provided,
            warnings: warnings.to_vec(),
        }
    }

    pub fn write_stats(&self, stats: &Stats) -> Result<()> {
        let output = &self.context.config.output.path;
        fs::create_dir_all(output)?;
        let path = output.join(STATS_FILE);
        fs::write(&path, serde_json::to_string_pretty(stats)?)?;
        info!("stats written to {}", path.display());
        Ok(())
    }
}
