use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "amp",
    about = "Resolve and fetch packages stored as automerge documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Document store endpoint (`memory:`, `file://<dir>`, or a path)
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve a specifier to its manifest and cache identity
    Resolve(ResolveArgs),
    /// Fetch a package as a .tgz
    Fetch(FetchArgs),
    /// List the files a fetch would produce
    Ls(LsArgs),
    /// Store a local directory as folder/file documents
    Import(ImportArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// `automerge:<id>[/<subpath>]`
    pub specifier: String,
}

#[derive(Args)]
pub struct FetchArgs {
    pub specifier: String,
    /// Where to write the tarball; defaults to `<name>-<version>.tgz`
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct LsArgs {
    pub specifier: String,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Directory to import
    pub path: PathBuf,
    /// Skip entries with this name (repeatable)
    #[arg(long = "ignore", default_values_t = vec![".git".to_string(), "node_modules".to_string()])]
    pub ignore: Vec<String>,
}
