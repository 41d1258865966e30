use serde_json::json;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use crate::compiler::Compiler;
use crate::config::Config;

pub fn setup_compiler(base: &str, cli_config: Option<&str>) -> Compiler {
    setup_logger();
    let root = std::env::current_dir().unwrap().join(base);
    let config = Config::new(&root, None, cli_config).unwrap();
    Compiler::new(config, root).unwrap()
}

/// Compiler writing into a temporary output directory.
pub fn setup_compiler_with_output(base: &str) -> (Compiler, TempDir) {
    let output = tempfile::tempdir().unwrap();
    let cli_config = json!({
        "output": { "path": output.path() },
    })
    .to_string();
    (setup_compiler(base, Some(&cli_config)), output)
}

pub fn setup_logger() {
    let _result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .try_init();
}
