//! Command implementations

mod layers;
mod query;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;
use geoquery_core::config::EngineConfig;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    let mut config = EngineConfig::with_defaults();
    if let Some(path) = &cli.config {
        config = config.load_from_file(path)?;
    }
    let config = config.load_from_env();
    config.validate()?;

    let run = match cli.command {
        Commands::Layers(args) => layers::execute(args, &output),
        Commands::Query(args) => query::execute(args, &output, &config),
    };

    if let Err(e) = run {
        output.error(format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}
