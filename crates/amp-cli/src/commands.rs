use std::path::PathBuf;

use amp_plugin::{AutomergePlugin, PluginConfig, ResolvedPackage};
use amp_store::DirectoryDocumentStore;
use amp_tree::{resolve_walk_root, FileEntry, TreeWalker};
use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use crate::cli::*;
use crate::import::import_dir;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Resolve(args) => cmd_resolve(config, args, format).await,
        Command::Fetch(args) => cmd_fetch(config, args, format).await,
        Command::Ls(args) => cmd_ls(config, args, format).await,
        Command::Import(args) => cmd_import(config, args, format).await,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<PluginConfig> {
    let mut config = match &cli.config {
        Some(path) => PluginConfig::load(path)?,
        None => PluginConfig::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }
    Ok(config)
}

fn open_plugin(config: PluginConfig) -> anyhow::Result<AutomergePlugin> {
    let endpoint = config.store.endpoint.clone();
    AutomergePlugin::for_host(config)
        .with_context(|| format!("cannot open document store {endpoint:?} (try --endpoint file://<dir>)"))
}

/// Shut the plugin down, then hand back the command's result.
async fn finish<T>(plugin: AutomergePlugin, result: anyhow::Result<T>) -> anyhow::Result<T> {
    let closed = plugin.shutdown().await;
    let value = result?;
    closed?;
    Ok(value)
}

async fn cmd_resolve(config: PluginConfig, args: ResolveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let plugin = open_plugin(config)?;
    let result: anyhow::Result<_> = plugin.resolve(&args.specifier).await.map_err(Into::into);
    let resolved = finish(plugin, result).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolved)?),
        OutputFormat::Text => {
            println!(
                "{} {}@{}",
                "✓".green().bold(),
                resolved.manifest_name().bold(),
                resolved.manifest_version()
            );
            println!("  Identity: {}", resolved.id.cyan());
            println!("  Address:  {}", resolved.full_address.yellow());
        }
    }
    Ok(())
}

async fn cmd_fetch(config: PluginConfig, args: FetchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let plugin = open_plugin(config)?;
    let result = fetch_tarball(&plugin, &args).await;
    let (resolved, out, entries) = finish(plugin, result).await?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "id": resolved.id,
                "name": resolved.manifest_name(),
                "version": resolved.manifest_version(),
                "tarball": out,
                "entries": entries,
            }))?
        ),
        OutputFormat::Text => {
            println!(
                "{} Fetched {}@{}",
                "✓".green().bold(),
                resolved.manifest_name().bold(),
                resolved.manifest_version()
            );
            println!("  Tarball: {} ({} entries)", out.display().to_string().yellow(), entries.len());
        }
    }
    Ok(())
}

async fn fetch_tarball(plugin: &AutomergePlugin, args: &FetchArgs) -> anyhow::Result<(ResolvedPackage, PathBuf, Vec<String>)> {
    let resolved = plugin.resolve(&args.specifier).await?;
    let mut handle = plugin.fetch(&resolved.resolution).await?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_tarball_name(resolved.manifest_name(), resolved.manifest_version()));
    let copied = tokio::fs::copy(handle.archive_path(), &out)
        .await
        .with_context(|| format!("writing {}", out.display()));
    let entries = amp_pack::read_entries(handle.archive_path());
    handle.release().await?;
    copied?;
    Ok((resolved, out, entries?))
}

async fn cmd_ls(config: PluginConfig, args: LsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let fan_out = config.store.max_in_flight;
    let default_mode = config.pack.default_mode;
    let plugin = open_plugin(config)?;
    let result = list_files(&plugin, &args.specifier, fan_out).await;
    let files = finish(plugin, result).await?;

    match format {
        OutputFormat::Json => {
            let listing: Vec<_> = files
                .iter()
                .map(|f| {
                    json!({
                        "path": f.relative_path,
                        "size": f.content.len(),
                        "mode": f.mode.unwrap_or(default_mode),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Text => {
            for file in &files {
                let mode = format!("{:o}", file.mode.unwrap_or(default_mode));
                println!("{} {:>8}  {}", mode.dimmed(), file.content.len(), file.relative_path);
            }
            println!("{} files", files.len().to_string().bold());
        }
    }
    Ok(())
}

async fn list_files(plugin: &AutomergePlugin, specifier: &str, fan_out: usize) -> anyhow::Result<Vec<FileEntry>> {
    let address = plugin.parse(specifier)?;
    let root = resolve_walk_root(plugin.client(), &address).await?;
    Ok(TreeWalker::new(plugin.client().clone())
        .with_fan_out(fan_out)
        .walk(&root)
        .await?)
}

async fn cmd_import(config: PluginConfig, args: ImportArgs, format: OutputFormat) -> anyhow::Result<()> {
    let dir = config
        .store
        .local_dir()
        .context("import needs a directory store (pass --endpoint file://<dir>)")?;
    let store = DirectoryDocumentStore::open(&dir)?;
    let summary = import_dir(&store, &args.path, &args.ignore).await?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "root": summary.root,
                "files": summary.files,
                "folders": summary.folders,
                "store": dir,
            }))?
        ),
        OutputFormat::Text => {
            println!(
                "{} Imported {} files in {} folders",
                "✓".green().bold(),
                summary.files,
                summary.folders
            );
            println!("  Root: {}", summary.root.to_string().cyan());
            println!("  Store: {}", dir.display());
        }
    }
    Ok(())
}

/// npm-style tarball name: `@scope/name` + `1.0.0` becomes `scope-name-1.0.0.tgz`.
fn default_tarball_name(name: &str, version: &str) -> PathBuf {
    let name = name.trim_start_matches('@').replace('/', "-");
    PathBuf::from(format!("{name}-{version}.tgz"))
}
