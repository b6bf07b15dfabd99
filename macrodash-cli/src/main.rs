//! MacroDash CLI: build, update, inspect and clean the historical data store.
//!
//! Actions:
//! - `--full` / `--update` (optionally with `--source <category>`) run ingestion
//! - `--status` prints the manifest summary
//! - `--clean` removes the store
//! - `--show <category/name> --period <p>` resolves one series the way the
//!   dashboard would

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use macrodash_core::data::SeriesStore;
use macrodash_core::registry::Registry;
use macrodash_core::series::{Category, Period, SeriesKey};
use macrodash_runner::{
    live_adapters, run_ingest, DashConfig, IngestMode, IngestOptions, LogProgress, OutcomeKind,
    Resolution, Resolver, StatusReport,
};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "macrodash",
    about = "MacroDash historical data store: ingest, update, inspect and clean"
)]
struct Cli {
    /// Fetch the entire history of every target and overwrite the store.
    #[arg(long, conflicts_with = "update")]
    full: bool,

    /// Fetch only rows newer than what is stored and merge them.
    #[arg(long)]
    update: bool,

    /// Restrict ingestion to one category (fred, world_bank, market, imf, semi, policy).
    /// On its own it implies --full.
    #[arg(long, value_name = "CATEGORY")]
    source: Option<String>,

    /// Print the manifest summary.
    #[arg(long)]
    status: bool,

    /// Delete the store (Parquet files and manifest).
    #[arg(long)]
    clean: bool,

    /// Resolve one series (e.g. market/^GSPC) and print what the dashboard would get.
    #[arg(long, value_name = "CATEGORY/NAME")]
    show: Option<String>,

    /// Lookback period for --show: 1mo, 3mo, 6mo, 1y, 3y, 5y, 10y, max.
    #[arg(long, default_value = "1y")]
    period: String,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Store root. Overrides `store.root` from the config.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Parallel ingestion workers. Overrides `ingest.workers` from the config.
    #[arg(long)]
    workers: Option<usize>,

    /// Debug-level logging (RUST_LOG still wins when set).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let store = SeriesStore::new(&config.store.root);

    if cli.status {
        return run_status(&store);
    }
    if cli.clean {
        return run_clean(&store);
    }
    if let Some(key) = cli.show.as_deref() {
        return run_show(&config, store, key, &cli.period);
    }

    let scope = cli
        .source
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()?;

    let mode = if cli.update {
        IngestMode::Update
    } else if cli.full || scope.is_some() {
        IngestMode::Full
    } else {
        Cli::command().print_help()?;
        std::process::exit(1);
    };

    run_ingestion(&config, &store, mode, scope)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<DashConfig> {
    let mut config = match &cli.config {
        Some(path) => DashConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DashConfig::default(),
    };

    if let Some(root) = &cli.data_dir {
        config.store.root = root.clone();
    }
    if let Some(workers) = cli.workers {
        config.ingest.workers = workers;
    }
    config.validate().context("invalid configuration")?;

    debug!(
        root = %config.store.root.display(),
        workers = config.ingest.workers,
        "configuration loaded"
    );
    Ok(config)
}

fn run_ingestion(
    config: &DashConfig,
    store: &SeriesStore,
    mode: IngestMode,
    scope: Option<Category>,
) -> Result<()> {
    let registry = Registry::builtin();
    let adapters = live_adapters(config);
    let options = IngestOptions::new(mode)
        .scoped(scope)
        .with_workers(config.ingest.workers);

    let summary = run_ingest(store, &registry, &adapters, &options, &LogProgress)
        .with_context(|| format!("ingestion aborted; store at {}", store.root().display()))?;

    println!("{summary}");
    for outcome in &summary.outcomes {
        if let OutcomeKind::Fallback { reason } | OutcomeKind::EmptyResult { reason } =
            &outcome.kind
        {
            eprintln!("  {}: {reason}", outcome.key);
        }
    }
    Ok(())
}

fn run_status(store: &SeriesStore) -> Result<()> {
    let report = StatusReport::collect(store)
        .with_context(|| format!("failed to read manifest in {}", store.root().display()))?;
    print!("{report}");
    Ok(())
}

fn run_clean(store: &SeriesStore) -> Result<()> {
    let removed = store
        .clean()
        .with_context(|| format!("failed to remove {}", store.root().display()))?;
    if removed {
        println!("Removed {}", store.root().display());
    } else {
        println!("No data directory found.");
    }
    Ok(())
}

fn run_show(config: &DashConfig, store: SeriesStore, key: &str, period: &str) -> Result<()> {
    let key: SeriesKey = key.parse()?;
    let period: Period = period.parse()?;

    let registry = Registry::builtin();
    let Some(spec) = registry.get(&key) else {
        bail!("unknown series '{key}'");
    };

    let resolver = Resolver::from_config(config, store, live_adapters(config));
    let today = chrono::Local::now().date_naive();
    let (table, resolution) = resolver.resolve_on(spec, period, today);

    let source = match resolution {
        Resolution::Store => "store",
        Resolution::Live => "live",
        Resolution::Empty => "nothing (empty)",
    };
    println!("{key} [{}] {period} from {source}", spec.shape);
    println!("  Rows:    {}", table.len());
    println!("  Columns: {}", table.value_columns().join(", "));
    if let Some(range) = table.index_range() {
        let [start, end] = range.labels();
        println!("  Range:   {start} .. {end}");
    }
    Ok(())
}
