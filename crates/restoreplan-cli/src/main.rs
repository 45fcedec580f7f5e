use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use restoreplan_catalog::{CatalogAdapter, PostgresCatalog};
use restoreplan_core::{ResolverConfig, TableId};
use restoreplan_engine::DependencyResolver;

/// Restoreplan - foreign-key aware backup/restore planning
#[derive(Parser)]
#[command(name = "restoreplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: restoreplan.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the restore order (parents before children) for a set of tables
    RestoreOrder {
        /// Tables as canonical schema.table names
        tables: Vec<String>,
    },

    /// Print the extraction order (children before parents) for a set of tables
    ExtractOrder {
        /// Tables as canonical schema.table names
        tables: Vec<String>,
    },

    /// Detect circular dependencies among a set of tables
    Cycles {
        /// Tables as canonical schema.table names
        tables: Vec<String>,
    },

    /// Show direct and transitive dependencies of one table
    Deps {
        /// Table as a canonical schema.table name
        table: String,
    },

    /// Print the parallel restore plan for a set of tables
    Groups {
        /// Tables as canonical schema.table names
        tables: Vec<String>,
    },

    /// Test the catalog connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = if let Some(config_path) = &cli.config {
        ResolverConfig::from_file(config_path)?
    } else if std::path::Path::new("restoreplan.toml").exists() {
        ResolverConfig::from_file(std::path::Path::new("restoreplan.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        ResolverConfig::default()
    };

    if cli.verbose {
        eprintln!("{} schemas: {:?}", "Scanning".cyan(), config.schemas);
    }

    let catalog = connect_catalog(&config).await?;
    tracing::debug!(catalog = catalog.name(), "catalog adapter ready");

    match cli.command {
        Commands::RestoreOrder { tables } => {
            let resolver = DependencyResolver::new(catalog, config)?;
            let tables = parse_tables(&tables)?;
            let order = resolver.resolve_restore_order(&tables).await?;
            print_order(&order, "Restore order", cli.json)
        }
        Commands::ExtractOrder { tables } => {
            let resolver = DependencyResolver::new(catalog, config)?;
            let tables = parse_tables(&tables)?;
            let order = resolver.resolve_extraction_order(&tables).await?;
            print_order(&order, "Extraction order", cli.json)
        }
        Commands::Cycles { tables } => {
            let resolver = DependencyResolver::new(catalog, config)?;
            let tables = parse_tables(&tables)?;
            let cycles = resolver.detect_circular_dependencies(&tables).await?;
            print_cycles(&cycles, cli.json)
        }
        Commands::Deps { table } => {
            let resolver = DependencyResolver::new(catalog, config)?;
            let table = TableId::parse(&table)?;
            let direct = resolver.dependencies_of(&table).await?;
            let transitive = resolver.all_dependencies(&table).await?;
            print_deps(&table, direct, transitive, cli.json)
        }
        Commands::Groups { tables } => {
            let resolver = DependencyResolver::new(catalog, config)?;
            let tables = parse_tables(&tables)?;
            let groups = resolver.parallel_groups(&tables).await?;
            print_groups(&groups, cli.json)
        }
        Commands::Check => {
            catalog
                .test_connection()
                .await
                .context("catalog connection test failed")?;
            println!("{} {} catalog reachable", "OK".green().bold(), catalog.name());
            Ok(())
        }
    }
}

async fn connect_catalog(config: &ResolverConfig) -> Result<Arc<dyn CatalogAdapter>> {
    let catalog_config = config.catalog.as_ref().ok_or_else(|| {
        anyhow!("No [catalog] section in config: set connection_string in restoreplan.toml")
    })?;

    let catalog = if catalog_config.tls {
        PostgresCatalog::from_connection_string_with_tls(&catalog_config.connection_string).await?
    } else {
        PostgresCatalog::from_connection_string(&catalog_config.connection_string).await?
    };

    Ok(Arc::new(catalog))
}

fn parse_tables(raw: &[String]) -> Result<Vec<TableId>> {
    if raw.is_empty() {
        return Err(anyhow!("At least one schema.table argument is required"));
    }

    raw.iter()
        .map(|name| TableId::parse(name).map_err(Into::into))
        .collect()
}

fn print_order(order: &[TableId], label: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(order)?);
        return Ok(());
    }

    println!("{}:", label.bold());
    for (index, table) in order.iter().enumerate() {
        println!("  {:>3}. {}", index + 1, table);
    }
    Ok(())
}

fn print_cycles(cycles: &std::collections::HashSet<Vec<TableId>>, json: bool) -> Result<()> {
    if json {
        let as_vec: Vec<&Vec<TableId>> = cycles.iter().collect();
        println!("{}", serde_json::to_string_pretty(&as_vec)?);
        return Ok(());
    }

    if cycles.is_empty() {
        println!("{} no circular dependencies found", "OK".green().bold());
        return Ok(());
    }

    println!(
        "{} {} circular dependency chain(s) found:",
        "WARNING".yellow().bold(),
        cycles.len()
    );
    for cycle in cycles {
        let chain: Vec<String> = cycle.iter().map(ToString::to_string).collect();
        println!("  {}", chain.join(" -> ").red());
    }
    Ok(())
}

fn print_deps(
    table: &TableId,
    direct: std::collections::BTreeSet<TableId>,
    transitive: std::collections::HashSet<TableId>,
    json: bool,
) -> Result<()> {
    if json {
        let mut all: Vec<&TableId> = transitive.iter().collect();
        all.sort();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "table": table,
                "direct": direct,
                "transitive": all,
            }))?
        );
        return Ok(());
    }

    println!("{} {}", "Dependencies of".bold(), table);
    println!("  direct:");
    for dep in &direct {
        println!("    {}", dep);
    }
    let mut indirect: Vec<&TableId> = transitive.iter().filter(|d| !direct.contains(d)).collect();
    indirect.sort();
    println!("  transitive only:");
    for dep in indirect {
        println!("    {}", dep);
    }
    Ok(())
}

fn print_groups(groups: &[Vec<TableId>], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(groups)?);
        return Ok(());
    }

    println!("{}:", "Parallel restore plan".bold());
    for (index, group) in groups.iter().enumerate() {
        let members: Vec<String> = group.iter().map(ToString::to_string).collect();
        println!("  group {}: {}", index.to_string().cyan(), members.join(", "));
    }
    println!(
        "{}",
        "Groups must complete strictly in index order.".dimmed()
    );
    Ok(())
}
