use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::compiler::Compiler;
use crate::config::ProvideMap;
use crate::module_graph::ModuleGraph;

/// Provide configuration that never took effect in a build.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ShadowedProvideWarning {
    #[error("provided identifier '{identifier}' is never referenced")]
    Unreferenced { identifier: String },
    #[error("provided identifier '{identifier}' is always shadowed by a local binding")]
    AlwaysShadowed { identifier: String },
}

pub struct ProvideWarnings {}

impl ProvideWarnings {
    /// One warning per configured identifier that was never injected,
    /// sorted by identifier.
    pub fn check(provide: &ProvideMap, module_graph: &ModuleGraph) -> Vec<ShadowedProvideWarning> {
        let mut provided = HashSet::new();
        let mut shadowed = HashSet::new();
        for module in module_graph.get_modules() {
            if let Some(usage) = module.provide_usage() {
                provided.extend(usage.provided.iter().map(|b| b.identifier.as_str()));
                shadowed.extend(usage.shadowed.iter().map(|s| s.as_str()));
            }
        }
        let mut identifiers = provide.identifiers().collect::<Vec<_>>();
        identifiers.sort();
        identifiers
            .into_iter()
            .filter(|identifier| !provided.contains(identifier.as_str()))
            .map(|identifier| {
                let identifier = identifier.clone();
                if shadowed.contains(identifier.as_str()) {
                    ShadowedProvideWarning::AlwaysShadowed { identifier }
                } else {
                    ShadowedProvideWarning::Unreferenced { identifier }
                }
            })
            .collect()
    }
}

impl Compiler {
    pub fn check_provide_usage(&self) -> Vec<ShadowedProvideWarning> {
        let module_graph = self.context.module_graph.read().unwrap();
        ProvideWarnings::check(&self.context.provide, &module_graph)
    }
}

#[cfg(test)]
mod tests {
    use super::ShadowedProvideWarning;
    use crate::utils::test_helper::setup_compiler;

    #[test]
    fn test_shadowed_and_unreferenced() {
        let compiler = setup_compiler("test/build/provide-shadowed", None);
        compiler.build().unwrap();
        assert_eq!(
            compiler.check_provide_usage(),
            vec![
                ShadowedProvideWarning::AlwaysShadowed {
                    identifier: "Local".to_string()
                },
                ShadowedProvideWarning::Unreferenced {
                    identifier: "Unused".to_string()
                },
            ]
        );
        // Mod is free in index.js, shadowed by a parameter in helper.js only
        let edges = compiler.provided_edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].identifier, "Mod");
        assert!(edges[0].from.id.ends_with("index.js"));
    }

    #[test]
    fn test_no_warning_when_everything_is_provided() {
        let compiler = setup_compiler("test/build/provide-default", None);
        compiler.build().unwrap();
        assert!(compiler.check_provide_usage().is_empty());
    }

    #[test]
    fn test_warning_message() {
        let warning = ShadowedProvideWarning::AlwaysShadowed {
            identifier: "Mod".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "provided identifier 'Mod' is always shadowed by a local binding"
        );
        assert_eq!(
            serde_json::to_string(&warning).unwrap(),
            r#"{"kind":"alwaysShadowed","identifier":"Mod"}"#
        );
    }
}
