//! sieve CLI: load a dataset, then list, run or query its pipelines.

mod loader;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sieve_core::config::EngineConfig;
use sieve_core::model::DataSource;
use sieve_exec::{AdhocQuery, Catalog, Collection, Engine};
use sieve_operators::{Aggregation, FieldPredicate};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sieve")]
#[command(about = "Lazy in-memory query pipelines over a customer/order/product dataset", long_about = None)]
struct Cli {
    /// Dataset file (.json, .yaml or .yml)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Engine config YAML (overrides SIEVE_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Lower bound of the "average" price bracket (overrides config)
    #[arg(long, global = true)]
    average_limit: Option<i64>,

    /// Lower bound of the "expensive" price bracket (overrides config)
    #[arg(long, global = true)]
    expensive_limit: Option<i64>,

    /// Number of turnover thresholds (overrides config)
    #[arg(long, global = true)]
    turnover_examples: Option<u32>,

    /// Large single-order total (overrides config)
    #[arg(long, global = true)]
    large_order_threshold: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the named pipelines
    List,

    /// Run named pipelines and print their results as JSON
    Run {
        /// Pipeline names, e.g. linq1 linq7
        names: Vec<String>,

        /// Run every pipeline in catalog order
        #[arg(long, conflicts_with = "names")]
        all: bool,
    },

    /// Filter, order, group and aggregate one collection
    Query {
        /// customers, orders, suppliers or products
        collection: String,

        /// Predicate such as "units_in_stock > 10" (repeatable)
        #[arg(short = 'w', long = "where")]
        filters: Vec<String>,

        /// Grouping field, outermost first (repeatable)
        #[arg(short, long)]
        group_by: Vec<String>,

        /// Ordering term FIELD[:asc|:desc] (repeatable)
        #[arg(short, long)]
        order_by: Vec<String>,

        /// Aggregation: count, sum:FIELD, avg:FIELD, min:FIELD, max:FIELD
        #[arg(short, long = "agg")]
        aggregations: Vec<String>,
    },

    /// Print the dataset fingerprint
    Fingerprint,
}

/// Overrides read from a `--config` file. Absent keys keep their value.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    average_limit: Option<i64>,
    expensive_limit: Option<i64>,
    turnover_examples: Option<u32>,
    large_order_threshold: Option<i64>,
}

/// Flag overrides, highest priority.
#[derive(Debug, Default)]
struct Overrides {
    average_limit: Option<i64>,
    expensive_limit: Option<i64>,
    turnover_examples: Option<u32>,
    large_order_threshold: Option<i64>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match &cli.command {
        Commands::List => {
            list_pipelines();
            Ok(())
        }
        Commands::Run { names, all } => run_pipelines(&cli, names, *all),
        Commands::Query {
            collection,
            filters,
            group_by,
            order_by,
            aggregations,
        } => run_query(&cli, collection, filters, group_by, order_by, aggregations),
        Commands::Fingerprint => fingerprint(&cli),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SIEVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn list_pipelines() {
    let catalog = Catalog::standard();
    for info in catalog.list() {
        println!("{:<7} [{}] {}", info.name, info.category, info.title);
        println!("        {}", info.description);
    }
}

fn run_pipelines(cli: &Cli, names: &[String], all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = load_source(cli)?;
    let engine = Engine::new(load_config(cli)?, &source)?;
    let catalog = Catalog::standard();

    let names: Vec<String> = if all {
        catalog.list().map(|p| p.name.to_string()).collect()
    } else if names.is_empty() {
        return Err("no pipeline named; pass one or more names or --all".into());
    } else {
        names.to_vec()
    };

    let mut results = Vec::with_capacity(names.len());
    for name in &names {
        let sections = catalog.run(name, &engine)?;
        let title = catalog.get(name).map(|p| p.title).unwrap_or_default();
        results.push(json!({ "pipeline": name, "title": title, "sections": sections }));
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn run_query(
    cli: &Cli,
    collection: &str,
    filters: &[String],
    group_by: &[String],
    order_by: &[String],
    aggregations: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let collection: Collection = collection.parse()?;
    let query = AdhocQuery {
        filters: filters
            .iter()
            .map(|f| f.parse::<FieldPredicate>())
            .collect::<Result<_, _>>()?,
        group_by: group_by.to_vec(),
        order_by: order_by
            .iter()
            .map(|o| AdhocQuery::parse_order(o))
            .collect::<Result<_, _>>()?,
        aggregations: aggregations
            .iter()
            .map(|a| a.parse::<Aggregation>())
            .collect::<Result<_, _>>()?,
    };

    let source = load_source(cli)?;
    let engine = Engine::new(load_config(cli)?, &source)?;
    let rows = engine.adhoc(collection, &query)?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn fingerprint(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let source = load_source(cli)?;
    let hash = source.fingerprint()?;
    println!("{}", hash);
    Ok(())
}

fn load_source(cli: &Cli) -> Result<DataSource, Box<dyn std::error::Error>> {
    let path = cli
        .data
        .as_deref()
        .ok_or("no dataset given; pass --data FILE")?;
    Ok(loader::load(path)?)
}

/// Defaults, then `SIEVE_*` environment, then `--config`, then flags.
fn load_config(cli: &Cli) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut config = EngineConfig::from_env();
    if let Some(path) = &cli.config {
        apply_config_file(&mut config, &read_config_file(path)?);
    }
    apply_overrides(
        &mut config,
        &Overrides {
            average_limit: cli.average_limit,
            expensive_limit: cli.expensive_limit,
            turnover_examples: cli.turnover_examples,
            large_order_threshold: cli.large_order_threshold,
        },
    );
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<ConfigFile, Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&yaml_content)?)
}

fn apply_config_file(cfg: &mut EngineConfig, doc: &ConfigFile) {
    if let Some(v) = doc.average_limit {
        cfg.average_limit = v;
    }
    if let Some(v) = doc.expensive_limit {
        cfg.expensive_limit = v;
    }
    if let Some(v) = doc.turnover_examples {
        cfg.turnover_examples = v;
    }
    if let Some(v) = doc.large_order_threshold {
        cfg.large_order_threshold = v;
    }
}

fn apply_overrides(cfg: &mut EngineConfig, flags: &Overrides) {
    if let Some(v) = flags.average_limit {
        cfg.average_limit = v;
    }
    if let Some(v) = flags.expensive_limit {
        cfg.expensive_limit = v;
    }
    if let Some(v) = flags.turnover_examples {
        cfg.turnover_examples = v;
    }
    if let Some(v) = flags.large_order_threshold {
        cfg.large_order_threshold = v;
    }
}
