use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "csub",
    about = "Build case-insensitive naming tables for configuration substitution",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge JSON documents and NAME=VALUE pairs into one naming table
    Merge(MergeArgs),
    /// Print the value of a single name
    Get(GetArgs),
    /// List every name in a naming table
    List(ListArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// JSON documents merged in order, after any plan sources
    pub sources: Vec<PathBuf>,
    /// Literal value inserted last, replacing any existing value
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
    /// Later sources replace earlier values instead of being ignored
    #[arg(long)]
    pub overwrite: bool,
    /// TOML merge plan
    #[arg(long)]
    pub plan: Option<PathBuf>,
    /// Write the merged document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct GetArgs {
    pub name: String,
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ListArgs {
    pub file: PathBuf,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}
