use std::process;

use anyhow::Result;
use clap::Parser;
use provide::cli::Cli;
use provide::compiler::Compiler;
use provide::config::Config;
use provide::utils::logger::init_logger;
use tracing::{debug, error, info};

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    debug!("cli: {:?}", cli);
    let root = if cli.root.is_absolute() {
        cli.root.clone()
    } else {
        std::env::current_dir()?.join(&cli.root)
    };

    // config
    let mut config = Config::new(&root, None, cli.cli_config().as_deref())?;
    if !cli.provide.is_empty() {
        config.add_provide_plugin(cli.providers())?;
    }
    debug!("config: {:?}", config);

    // compiler
    let compiler = Compiler::new(config, root)?;
    let output = compiler.compile()?;
    for item in &output.stats.provided {
        info!(
            "{}: {} <- {} ({})",
            item.module_id,
            item.identifier,
            item.request,
            item.export.as_deref().unwrap_or("*")
        );
    }
    Ok(())
}
