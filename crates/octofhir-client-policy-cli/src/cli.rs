use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "client-policy")]
#[command(about = "Evaluate and validate OctoFHIR client policies")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Engine configuration file (TOML)
    #[arg(short, long, global = true, env = "CLIENT_POLICY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overrides the configuration; RUST_LOG wins over both)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate the realm's client policies against a context
    Evaluate(EvaluateArgs),
    /// Validate the realm's client policies
    Validate(ValidateArgs),
    /// List registered condition providers
    Providers,
}

#[derive(clap::Args)]
pub struct EvaluateArgs {
    /// Realm snapshot (JSON)
    #[arg(short, long)]
    pub realm_file: PathBuf,
    /// Evaluation context (JSON)
    #[arg(long)]
    pub context: PathBuf,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Realm snapshot (JSON)
    #[arg(short, long)]
    pub realm_file: PathBuf,
}
