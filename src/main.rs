//! Karang - automated SEO article generator for Jekyll blogs.

mod cli;
mod config;
mod credentials;
mod formatter;
mod gemini;
mod generate;
mod images;
mod init;
mod links;
mod post;
mod prompt;
mod publish;
mod scheduler;
mod store;
mod utils;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::GeneratorConfig;
use generate::Generator;
use init::init_project;
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));
    let config_path = root.join(&cli.config);

    if cli.is_init() {
        return init_project(&root, &config_path);
    }

    let config = load_config(&cli, &root, &config_path)?;

    match cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Generate { count } => {
            let mut generator = Generator::new(config)?;
            generator.run(count)?;
            Ok(())
        }
        Commands::Schedule { .. } => scheduler::run_blocking(config),
        Commands::Publish => {
            publish::publish_posts(&config)?;
            Ok(())
        }
        Commands::Status => generate::status(&config),
    }
}

/// Load, resolve and validate configuration, applying CLI overrides.
fn load_config(
    cli: &Cli,
    root: &std::path::Path,
    config_path: &std::path::Path,
) -> Result<GeneratorConfig> {
    let mut config = GeneratorConfig::from_path(config_path)?;
    config.apply_root(root);

    if let Commands::Schedule {
        interval: Some(minutes),
    } = &cli.command
    {
        config.schedule_interval_minutes = *minutes;
    }

    config.validate()?;
    Ok(config)
}
