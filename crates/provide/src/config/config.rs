use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use colored::Colorize;
use miette::{miette, Diagnostic, NamedSource, SourceOffset, SourceSpan};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::provide::{validate_providers, PluginConfig, ProvideMap, Providers};

#[derive(Debug, Diagnostic)]
#[diagnostic(code("provide.config.json parsed failed"))]
struct ConfigParseError {
    #[source_code]
    src: NamedSource<String>,
    #[label("Error here.")]
    span: SourceSpan,
    message: String,
}

impl std::error::Error for ConfigParseError {}

impl fmt::Display for ConfigParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn validate_config_file(abs_config_file: &Path) -> miette::Result<()> {
    if abs_config_file.exists() {
        let content = std::fs::read_to_string(abs_config_file).map_err(|e| {
            miette!(
                "Failed to read file '{}': {}",
                abs_config_file.to_string_lossy(),
                e
            )
        })?;
        let result: Result<Value, serde_json::Error> = serde_json::from_str(&content);
        if let Err(e) = result {
            let start = SourceOffset::from_location(&content, e.line(), e.column());
            return Err(ConfigParseError {
                src: NamedSource::new(CONFIG_FILE, content),
                span: SourceSpan::new(start, 1),
                message: e.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("provide identifier '{0}' is not a valid JavaScript identifier")]
    InvalidProvideIdentifier(String),
    #[error("entry:{0} not found")]
    EntryNotFound(String),
    #[error("Entry is empty")]
    EmptyEntry,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    pub path: PathBuf,
    pub skip_write: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ResolveConfig {
    pub alias: HashMap<String, String>,
    pub extensions: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub entry: BTreeMap<String, PathBuf>,
    pub output: OutputConfig,
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub providers: Providers,
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
    pub stats: bool,
    pub clean: bool,
}

pub const CONFIG_FILE: &str = "provide.config.json";
const DEFAULT_CONFIG: &str = r#"
{
    "entry": {},
    "output": { "path": "dist", "skipWrite": false },
    "resolve": {
      "alias": {},
      "extensions": [".js", ".jsx", ".mjs", ".cjs", ".json"]
    },
    "providers": {},
    "plugins": [],
    "stats": false,
    "clean": true
}
"#;

const DEFAULT_ENTRIES: [&str; 4] = ["src/index.js", "index.js", "src/index.mjs", "index.mjs"];

impl Config {
    pub fn new(
        root: &Path,
        default_config: Option<&str>,
        cli_config: Option<&str>,
    ) -> Result<Self> {
        let abs_config_file = root.join(CONFIG_FILE);
        let c = config::Config::builder();
        // default config
        let c = c.add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Json5,
        ));
        // default config from args
        let c = if let Some(default_config) = default_config {
            c.add_source(config::File::from_str(
                default_config,
                config::FileFormat::Json5,
            ))
        } else {
            c
        };
        // validate user config
        validate_config_file(&abs_config_file).map_err(|e| anyhow!("{:?}", e))?;
        // user config
        let c = c.add_source(config::File::from(abs_config_file).required(false));
        // cli config
        let c = if let Some(cli_config) = cli_config {
            c.add_source(config::File::from_str(
                cli_config,
                config::FileFormat::Json5,
            ))
        } else {
            c
        };

        let c = c.build()?;
        let mut config = c
            .try_deserialize::<Config>()
            .map_err(|e| anyhow!("{}: {}", "config error".red(), e.to_string().red()))?;
        config.normalize(root)?;
        Ok(config)
    }

    fn normalize(&mut self, root: &Path) -> Result<()> {
        // normalize output
        if self.output.path.is_relative() {
            self.output.path = root.join(&self.output.path);
        }

        validate_providers(&self.providers)?;
        for PluginConfig::Provide(providers) in &self.plugins {
            validate_providers(providers)?;
        }

        // support default entries
        if self.entry.is_empty() {
            if let Some(file_path) = DEFAULT_ENTRIES
                .iter()
                .map(|p| root.join(p))
                .find(|p| p.exists())
            {
                self.entry.insert("index".to_string(), file_path);
            } else {
                return Err(anyhow!(ConfigError::EmptyEntry));
            }
        }

        // normalize entry
        self.entry = std::mem::take(&mut self.entry)
            .into_iter()
            .map(|(k, v)| match root.join(v).canonicalize() {
                Ok(entry_path) => Ok((k, entry_path)),
                Err(_) => Err(anyhow!(ConfigError::EntryNotFound(k))),
            })
            .collect::<Result<_>>()?;

        // support relative alias
        self.resolve.alias = std::mem::take(&mut self.resolve.alias)
            .into_iter()
            .map(|(k, v)| {
                let v = if v.starts_with('.') {
                    root.join(v).to_string_lossy().to_string()
                } else {
                    v
                };
                (k, v)
            })
            .collect();

        Ok(())
    }

    /// Registers a provide plugin after every configured one.
    pub fn add_provide_plugin(&mut self, providers: Providers) -> Result<()> {
        validate_providers(&providers)?;
        self.plugins.push(PluginConfig::Provide(providers));
        Ok(())
    }

    /// The `providers` shorthand first, then each provide plugin in
    /// registration order.
    pub fn provide_map(&self) -> ProvideMap {
        ProvideMap::from_sources(
            std::iter::once(&self.providers).chain(
                self.plugins
                    .iter()
                    .map(|PluginConfig::Provide(providers)| providers),
            ),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        let c = config::Config::builder();
        let c = c.add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Json5,
        ));
        let c = c.build().unwrap();
        c.try_deserialize::<Config>().unwrap()
    }
}
