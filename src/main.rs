use analytica::config::Config;
use analytica::dataset::DatasetContext;
use analytica::dispatcher::Interpreter;
use analytica::repl::Session;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "analytica")]
#[command(about = "Ask questions about the diamond dataset in plain words")]
#[command(version)]
struct Args {
    /// Cleaned diamond CSV (or set ANALYTICA_DATASET)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Answer a single query and exit instead of starting a session
    #[arg(short, long)]
    query: Option<String>,

    /// Print how the query is interpreted as JSON instead of answering it
    #[arg(long, requires = "query")]
    explain: bool,

    /// Seed for "sample" (or set ANALYTICA_SAMPLE_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Similarity needed for a fuzzy cut-label match, 0.0-1.0
    #[arg(long)]
    fuzzy_threshold: Option<f64>,

    /// Log filter, e.g. "debug" or "analytica=trace" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("analytica=warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = Config::from_env()?;
    if let Some(path) = args.dataset {
        config.dataset_path = path;
    }
    if let Some(seed) = args.seed {
        config.sample_seed = Some(seed);
    }
    if let Some(threshold) = args.fuzzy_threshold {
        config.fuzzy_threshold = threshold;
    }
    config.validate()?;

    info!("Loading dataset from {}", config.dataset_path.display());
    let ctx = DatasetContext::load(&config.dataset_path)
        .with_context(|| format!("could not load {}", config.dataset_path.display()))?;
    let interpreter = Interpreter::new(&ctx, config);

    match args.query {
        Some(query) if args.explain => {
            let report = interpreter.explain(&query)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Some(query) => {
            println!("{}", interpreter.respond(&query)?);
        }
        None => {
            let stdin = io::stdin();
            Session::new(&interpreter, stdin.lock(), io::stdout()).run()?;
        }
    }

    Ok(())
}
