mod cli;
mod commands;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use octofhir_client_policy::ClientPolicyConfig;

use cli::{Cli, Commands};
use output::print_error;

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let config = match &cli.config {
        Some(path) => ClientPolicyConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => ClientPolicyConfig::default(),
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    observability::init_tracing_with_level(level);

    match &cli.command {
        Commands::Evaluate(args) => {
            commands::evaluate(config, &args.realm_file, &args.context, format)?;
        }
        Commands::Validate(args) => {
            commands::validate(&args.realm_file, format)?;
        }
        Commands::Providers => {
            commands::providers(format)?;
        }
    }

    Ok(())
}
