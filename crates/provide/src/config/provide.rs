use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::is_valid_identifier;

/// Where a provided identifier comes from.
///
/// In configuration a bare string (or a one element array) binds the module
/// namespace, a `[request, export]` pair binds a single export.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "RawProvideTarget", into = "RawProvideTarget")]
pub enum ProvideTarget {
    Namespace { request: String },
    Named { request: String, export: String },
}

impl ProvideTarget {
    pub fn namespace<S: Into<String>>(request: S) -> Self {
        ProvideTarget::Namespace {
            request: request.into(),
        }
    }

    pub fn named<S: Into<String>, E: Into<String>>(request: S, export: E) -> Self {
        ProvideTarget::Named {
            request: request.into(),
            export: export.into(),
        }
    }

    pub fn request(&self) -> &str {
        match self {
            ProvideTarget::Namespace { request } => request,
            ProvideTarget::Named { request, .. } => request,
        }
    }

    /// `None` means the namespace object is bound.
    pub fn export(&self) -> Option<&str> {
        match self {
            ProvideTarget::Namespace { .. } => None,
            ProvideTarget::Named { export, .. } => Some(export),
        }
    }

    pub fn is_default_export(&self) -> bool {
        self.export() == Some("default")
    }
}

impl fmt::Display for ProvideTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvideTarget::Namespace { request } => write!(f, "{}", request),
            ProvideTarget::Named { request, export } => write!(f, "{}#{}", request, export),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
enum RawProvideTarget {
    Request(String),
    Path(Vec<String>),
}

impl TryFrom<RawProvideTarget> for ProvideTarget {
    type Error = String;

    fn try_from(raw: RawProvideTarget) -> Result<Self, Self::Error> {
        let target = match raw {
            RawProvideTarget::Request(request) => ProvideTarget::namespace(request),
            RawProvideTarget::Path(path) => match path.as_slice() {
                [request] => ProvideTarget::namespace(request.clone()),
                [request, export] => {
                    if export.is_empty() {
                        return Err(format!("empty export name for request '{}'", request));
                    }
                    ProvideTarget::named(request.clone(), export.clone())
                }
                _ => {
                    return Err(format!(
                        "provide value must be \"request\" or [\"request\", \"export\"], got {:?}",
                        path
                    ))
                }
            },
        };
        if target.request().is_empty() {
            return Err("provide request must not be empty".to_string());
        }
        Ok(target)
    }
}

impl From<ProvideTarget> for RawProvideTarget {
    fn from(target: ProvideTarget) -> Self {
        match target {
            ProvideTarget::Namespace { request } => RawProvideTarget::Request(request),
            ProvideTarget::Named { request, export } => RawProvideTarget::Path(vec![request, export]),
        }
    }
}

// format: { identifier: target }
// e.g.
// { "Mod": ["./esm", "default"] }
// { "process": "process" }
pub type Providers = IndexMap<String, ProvideTarget>;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub enum PluginConfig {
    Provide(Providers),
}

/// Identifier to target table consulted by every module of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvideMap {
    providers: Providers,
}

impl ProvideMap {
    /// Registers every table in order, a key seen again replaces the
    /// previous target.
    pub fn from_sources<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = &'a Providers>,
    {
        let mut map = ProvideMap::default();
        for providers in sources {
            for (identifier, target) in providers {
                map.insert(identifier.clone(), target.clone());
            }
        }
        map
    }

    fn insert(&mut self, identifier: String, target: ProvideTarget) {
        if let Some(previous) = self.providers.get(&identifier) {
            if previous != &target {
                debug!(
                    "provide {} overridden: {} -> {}",
                    identifier, previous, target
                );
            }
        }
        self.providers.insert(identifier, target);
    }

    pub fn get(&self, identifier: &str) -> Option<&ProvideTarget> {
        self.providers.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.providers.contains_key(identifier)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &String> {
        self.providers.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProvideTarget)> {
        self.providers.iter()
    }
}

impl FromIterator<(String, ProvideTarget)> for ProvideMap {
    fn from_iter<T: IntoIterator<Item = (String, ProvideTarget)>>(iter: T) -> Self {
        let mut map = ProvideMap::default();
        for (identifier, target) in iter {
            map.insert(identifier, target);
        }
        map
    }
}

pub(crate) fn validate_providers(providers: &Providers) -> Result<(), super::ConfigError> {
    for identifier in providers.keys() {
        if !is_valid_identifier(identifier) {
            return Err(super::ConfigError::InvalidProvideIdentifier(
                identifier.clone(),
            ));
        }
    }
    Ok(())
}

/// Parses the cli form `NAME=REQUEST[#EXPORT]`.
pub fn parse_provide_arg(arg: &str) -> Result<(String, ProvideTarget), String> {
    let (identifier, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=REQUEST[#EXPORT], got '{}'", arg))?;
    if !is_valid_identifier(identifier) {
        return Err(format!("'{}' is not a valid identifier", identifier));
    }
    let target = match value.rsplit_once('#') {
        Some((request, export)) if !request.is_empty() && !export.is_empty() => {
            ProvideTarget::named(request, export)
        }
        Some(_) => return Err(format!("invalid provide value '{}'", value)),
        None if value.is_empty() => return Err(format!("empty request for '{}'", identifier)),
        None => ProvideTarget::namespace(value),
    };
    Ok((identifier.to_string(), target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn providers(json: &str) -> Providers {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deserialize_targets() {
        let p = providers(
            r#"{
                "Mod": ["./esm", "default"],
                "process": "process",
                "utils": ["./utils"]
            }"#,
        );
        assert_eq!(p["Mod"], ProvideTarget::named("./esm", "default"));
        assert_eq!(p["process"], ProvideTarget::namespace("process"));
        assert_eq!(p["utils"], ProvideTarget::namespace("./utils"));
        assert!(p["Mod"].is_default_export());
        assert_eq!(p["utils"].export(), None);
    }

    #[test]
    fn test_deserialize_invalid_shapes() {
        assert!(serde_json::from_str::<Providers>(r#"{"A": ["a", "b", "c"]}"#).is_err());
        assert!(serde_json::from_str::<Providers>(r#"{"A": []}"#).is_err());
        assert!(serde_json::from_str::<Providers>(r#"{"A": ""}"#).is_err());
        assert!(serde_json::from_str::<Providers>(r#"{"A": ["a", ""]}"#).is_err());
        assert!(serde_json::from_str::<Providers>(r#"{"A": 1}"#).is_err());
    }

    #[test]
    fn test_serialize_roundtrips_shape() {
        let json = serde_json::to_string(&ProvideTarget::named("./esm", "default")).unwrap();
        assert_eq!(json, r#"["./esm","default"]"#);
        let json = serde_json::to_string(&ProvideTarget::namespace("process")).unwrap();
        assert_eq!(json, r#""process""#);
    }

    #[test]
    fn test_plugin_config() {
        let plugins: Vec<PluginConfig> =
            serde_json::from_str(r#"[{"provide": {"Def": ["./esm", "default"]}}]"#).unwrap();
        let PluginConfig::Provide(p) = &plugins[0];
        assert_eq!(p["Def"], ProvideTarget::named("./esm", "default"));
    }

    #[test]
    fn test_last_registered_wins() {
        let first = providers(r#"{"Mod": ["./a", "default"], "Def": "./d"}"#);
        let second = providers(r#"{"Mod": ["./b", "Mod"]}"#);
        let map = ProvideMap::from_sources([&first, &second]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Mod"), Some(&ProvideTarget::named("./b", "Mod")));
        assert_eq!(map.get("Def"), Some(&ProvideTarget::namespace("./d")));
        assert!(map.contains("Def"));
        assert!(!map.contains("Other"));
    }

    #[test]
    fn test_same_target_for_distinct_identifiers() {
        let map = ProvideMap::from_sources([&providers(
            r#"{"Mod": ["./esm", "default"], "Def": ["./esm", "default"]}"#,
        )]);
        assert_eq!(map.get("Mod"), map.get("Def"));
        assert_eq!(map.identifiers().collect::<Vec<_>>(), vec!["Mod", "Def"]);
    }

    #[test]
    fn test_validate_providers() {
        assert!(validate_providers(&providers(r#"{"$el": "jquery", "_": "lodash"}"#)).is_ok());
        assert!(validate_providers(&providers(r#"{"a.b": "x"}"#)).is_err());
        assert!(validate_providers(&providers(r#"{"1a": "x"}"#)).is_err());
    }

    #[test]
    fn test_parse_provide_arg() {
        assert_eq!(
            parse_provide_arg("Mod=./esm#default").unwrap(),
            ("Mod".to_string(), ProvideTarget::named("./esm", "default"))
        );
        assert_eq!(
            parse_provide_arg("process=process").unwrap(),
            ("process".to_string(), ProvideTarget::namespace("process"))
        );
        assert!(parse_provide_arg("Mod").is_err());
        assert!(parse_provide_arg("a-b=x").is_err());
        assert!(parse_provide_arg("Mod=./esm#").is_err());
        assert!(parse_provide_arg("Mod=").is_err());
    }
}
