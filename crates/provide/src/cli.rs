use std::path::PathBuf;

use clap::Parser;
use serde_json::{json, Map, Value};

use crate::config::{parse_provide_arg, ProvideTarget, Providers};

#[derive(Parser, Debug)]
#[command(
    name = "provide",
    version,
    about = "Bind free global identifiers to imports of configured modules"
)]
pub struct Cli {
    pub root: PathBuf,
    /// Output directory, relative to root
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Provide an identifier, registered after the configured ones
    #[arg(short, long = "provide", value_name = "NAME=REQUEST[#EXPORT]", value_parser = parse_provide_arg)]
    pub provide: Vec<(String, ProvideTarget)>,
    #[arg(long)]
    pub stats: bool,
    #[arg(long)]
    pub skip_write: bool,
}

impl Cli {
    /// Overrides for the config layered over `provide.config.json`.
    pub fn cli_config(&self) -> Option<String> {
        let mut config = Map::new();
        if let Some(output) = &self.output {
            config.insert("output".to_string(), json!({ "path": output }));
        }
        if self.skip_write {
            let output = config
                .entry("output")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(output) = output {
                output.insert("skipWrite".to_string(), Value::Bool(true));
            }
        }
        if self.stats {
            config.insert("stats".to_string(), Value::Bool(true));
        }
        if config.is_empty() {
            None
        } else {
            Some(Value::Object(config).to_string())
        }
    }

    pub fn providers(&self) -> Providers {
        self.provide.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;
    use crate::config::ProvideTarget;

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from([
            "provide",
            "app",
            "-p",
            "Mod=./esm#default",
            "--provide",
            "process=process",
            "--skip-write",
        ]);
        assert_eq!(cli.root.to_string_lossy(), "app");
        let providers = cli.providers();
        assert_eq!(providers["Mod"], ProvideTarget::named("./esm", "default"));
        assert_eq!(providers["process"], ProvideTarget::namespace("process"));
        assert_eq!(
            cli.cli_config().unwrap(),
            r#"{"output":{"skipWrite":true}}"#
        );
    }

    #[test]
    fn test_no_overrides() {
        let cli = Cli::parse_from(["provide", "app"]);
        assert!(cli.cli_config().is_none());
        assert!(cli.providers().is_empty());
    }

    #[test]
    fn test_invalid_provide_arg() {
        assert!(Cli::try_parse_from(["provide", "app", "-p", "not-valid=x"]).is_err());
    }
}
