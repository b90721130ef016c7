//! Credweave CLI: aggregate an instance's plugin graphs.
//!
//! Usage:
//!   credweave graph [--instance dir] [--scope owner/name]... [--cache-dir dir]
//!   credweave resolve <reference> [--instance dir]
//!   credweave identities [--instance dir]

use clap::{Parser, Subcommand};
use credweave::aggregate::{self, GraphInput, PluginEntry};
use credweave::{
    Instance, LocalInstance, LoggingTaskReporter, PluginId, ReadOnlyInstance, ReferenceDetector,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "credweave",
    version,
    about = "Plugin graph aggregation with cross-plugin reference resolution"
)]
struct Cli {
    /// Instance directory (containing credweave.yaml)
    #[arg(long, global = true, default_value = ".")]
    instance: PathBuf,
    /// Plugin cache root [default: <instance>/cache]
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every in-scope plugin's graph and update the ledger
    Graph {
        /// Plugin to build (repeatable); all configured plugins if omitted
        #[arg(long = "scope", value_name = "PLUGIN")]
        scope: Vec<PluginId>,
    },
    /// Resolve one reference through the detection cascade
    Resolve {
        /// URL, `@name`, or other textual reference
        reference: String,
    },
    /// List the ledger's identities
    Identities,
}

async fn open_instance(root: PathBuf, cache_dir: Option<PathBuf>) -> Result<LocalInstance, String> {
    let instance = LocalInstance::open(root)
        .await
        .map_err(|e| format!("Failed to open instance: {}", e))?;
    Ok(match cache_dir {
        Some(dir) => instance.with_cache_root(dir),
        None => instance,
    })
}

async fn load_plugins(instance: &LocalInstance) -> Result<Vec<PluginEntry>, String> {
    instance
        .plugin_entries()
        .await
        .map_err(|e| format!("Failed to load plugins: {}", e))
}

async fn cmd_graph(instance: &LocalInstance, scope: Vec<PluginId>) -> Result<(), String> {
    let configured = &instance.config().plugins;
    if let Some(unknown) = scope.iter().find(|id| !configured.contains(id)) {
        return Err(format!("plugin '{}' is not configured in this instance", unknown));
    }
    let scope = if scope.is_empty() {
        configured.clone()
    } else {
        scope
    };

    let plugins = load_plugins(instance).await?;
    let mut ledger = instance.read_ledger().await.map_err(|e| e.to_string())?;
    let reporter = LoggingTaskReporter::new();
    let output = aggregate::graph(
        GraphInput {
            plugins,
            ledger: &mut ledger,
        },
        &scope,
        &reporter,
    )
    .await
    .map_err(|e| e.to_string())?;

    instance
        .write_graph_output(&output)
        .await
        .map_err(|e| format!("Failed to write output: {}", e))?;
    for plugin_output in &output.plugin_outputs {
        let graph = &plugin_output.weighted_graph.graph;
        println!(
            "{:<32}  {:>6} nodes  {:>6} edges",
            plugin_output.plugin_id,
            graph.node_count(),
            graph.edge_count()
        );
    }
    println!("{} identities in ledger", output.ledger.account_count());
    Ok(())
}

async fn cmd_resolve(instance: &LocalInstance, reference: &str) -> Result<(), String> {
    let plugins = load_plugins(instance).await?;
    let ledger = instance.read_ledger().await.map_err(|e| e.to_string())?;
    let detector = aggregate::reference_detector(&plugins, &ledger, &LoggingTaskReporter::new())
        .await
        .map_err(|e| e.to_string())?;
    match detector.resolve(reference) {
        Some(address) => {
            println!("{}", address);
            Ok(())
        }
        None => Err(format!("no plugin or identity matches '{}'", reference)),
    }
}

async fn cmd_identities(instance: &LocalInstance) -> Result<(), String> {
    let ledger = instance.read_ledger().await.map_err(|e| e.to_string())?;
    if ledger.account_count() == 0 {
        println!("No identities.");
        return Ok(());
    }
    println!("{:<36}  {:<24}  {:<12}  {:>7}  {:>6}", "ID", "NAME", "TYPE", "ALIASES", "ACTIVE");
    println!("{}", "-".repeat(93));
    for account in ledger.accounts() {
        let identity = &account.identity;
        println!(
            "{:<36}  {:<24}  {:<12}  {:>7}  {:>6}",
            identity.id.to_string(),
            identity.name.as_str(),
            format!("{:?}", identity.subtype),
            identity.aliases.len(),
            if account.active { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("credweave {}", credweave::VERSION);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };
    let result = rt.block_on(async {
        let instance = open_instance(cli.instance, cli.cache_dir).await?;
        match cli.command {
            Commands::Graph { scope } => cmd_graph(&instance, scope).await,
            Commands::Resolve { reference } => cmd_resolve(&instance, &reference).await,
            Commands::Identities => cmd_identities(&instance).await,
        }
    });
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
