#[allow(clippy::module_inception)]
mod config;
mod provide;

pub use config::{Config, ConfigError, OutputConfig, ResolveConfig, CONFIG_FILE};
pub use provide::{parse_provide_arg, PluginConfig, ProvideMap, ProvideTarget, Providers};
