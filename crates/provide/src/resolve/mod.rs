use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use oxc_resolver::{Alias, AliasValue, ResolveError as OxcResolveError, ResolveOptions, Resolver};
use thiserror::Error;
use tracing::debug;

mod resource;
pub use resource::{ResolvedResource, ResolverResource};

use crate::config::Config;
use crate::module::Dependency;

#[derive(Debug, Error)]
#[error("Resolve {path:?} failed from {from:?}")]
pub struct ResolveError {
    pub path: String,
    pub from: String,
}

/// A provided identifier whose request does not resolve from the module
/// that references it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Can't resolve '{request}' provided as '{identifier}' in '{from}'")]
pub struct ResolutionError {
    pub identifier: String,
    pub request: String,
    pub from: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Module not found: Can't resolve '{request}' in '{from}'")]
pub struct ModuleNotFoundError {
    pub request: String,
    pub from: String,
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum ResolverType {
    Cjs,
    Esm,
}

pub type Resolvers = HashMap<ResolverType, Resolver>;

pub fn resolve(path: &str, dep: &Dependency, resolvers: &Resolvers) -> Result<ResolverResource> {
    let resolver_type = if dep.resolve_type.is_require() {
        ResolverType::Cjs
    } else {
        ResolverType::Esm
    };
    let resolver = resolvers
        .get(&resolver_type)
        .ok_or_else(|| anyhow!("resolver {:?} not found", resolver_type))?;
    do_resolve(path, &dep.source, resolver)
}

fn do_resolve(path: &str, source: &str, resolver: &Resolver) -> Result<ResolverResource> {
    let path = PathBuf::from(path);
    let parent = path.parent().ok_or_else(|| {
        anyhow!(ResolveError {
            path: source.to_string(),
            from: path.to_string_lossy().to_string(),
        })
    })?;
    debug!("parent: {:?}, source: {:?}", parent, source);
    match resolver.resolve(parent, source) {
        Ok(resolution) => {
            if resolution.path().exists() {
                Ok(ResolverResource::Resolved(ResolvedResource(resolution)))
            } else {
                Err(anyhow!(ResolveError {
                    path: source.to_string(),
                    from: path.to_string_lossy().to_string(),
                }))
            }
        }
        Err(OxcResolveError::Ignored(ignored)) => {
            debug!("resolve ignored: {:?}", source);
            Ok(ResolverResource::Ignored(ignored))
        }
        Err(err) => {
            debug!(
                "failed to resolve {} from {} with resolver err: {:?}",
                source,
                path.to_string_lossy(),
                err
            );
            Err(anyhow!(ResolveError {
                path: source.to_string(),
                from: path.to_string_lossy().to_string(),
            }))
        }
    }
}

pub fn get_resolvers(config: &Config) -> Resolvers {
    let cjs_resolver = get_resolver(config, ResolverType::Cjs);
    let esm_resolver = get_resolver(config, ResolverType::Esm);

    let mut resolvers = HashMap::new();
    resolvers.insert(ResolverType::Cjs, cjs_resolver);
    resolvers.insert(ResolverType::Esm, esm_resolver);
    resolvers
}

fn get_resolver(config: &Config, resolver_type: ResolverType) -> Resolver {
    let alias = parse_alias(config.resolve.alias.clone());
    let extensions = config.resolve.extensions.clone();
    let condition = match resolver_type {
        ResolverType::Cjs => "require",
        ResolverType::Esm => "import",
    };
    let options = ResolveOptions {
        alias,
        extensions,
        condition_names: vec![
            condition.to_string(),
            "module".to_string(),
            "default".to_string(),
        ],
        main_fields: vec!["module".to_string(), "main".to_string()],
        alias_fields: vec![vec!["browser".to_string()]],
        ..Default::default()
    };
    Resolver::new(options)
}

fn parse_alias(alias: HashMap<String, String>) -> Alias {
    let mut result = vec![];
    for (key, value) in alias {
        result.push((key, vec![AliasValue::Path(value)]));
    }
    result
}
