use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use u_placer::anneal::{AnnealConfig, ExitCriterion, MoveBudget};
use u_placer::batch::{circuit_files, load_circuits, run_batch, write_results};
use u_placer::moves::MoveStrategy;
use u_placer::{PlacerError, Result};

#[derive(Parser, Debug)]
#[command(name = "u-placer")]
#[command(version)]
#[command(about = "Place circuit cells on a grid by simulated annealing", long_about = None)]
struct Args {
    /// Circuit file, or a directory of `*.txt` circuits
    #[arg(value_name = "CIRCUIT")]
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Move strategy: plain, windowed, ripple or shuffle
    #[arg(long, value_name = "NAME")]
    strategy: Option<String>,

    /// Range window size as a fraction of the grid
    #[arg(long, value_name = "FLOAT")]
    window: Option<f64>,

    /// Exit criterion: temp, no_improvement or multiple_no_improvement
    #[arg(long, value_name = "NAME")]
    exit: Option<String>,

    /// Fixed number of moves per temperature (default: k*N^(4/3))
    #[arg(long, value_name = "NUM")]
    moves: Option<usize>,

    /// Stop after this many temperature levels (0 = no limit, default 1000)
    #[arg(long, value_name = "NUM")]
    max_levels: Option<usize>,

    /// Count spans as max-min rather than max-min+1
    #[arg(long)]
    exclusive_span: bool,

    /// Drop the routing-track term from the cost
    #[arg(long)]
    no_routing_track: bool,

    /// Write a results log to this file
    #[arg(short, long, value_name = "FILE")]
    results: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: &Path) -> Result<AnnealConfig> {
    let text = fs::read_to_string(path).map_err(|e| PlacerError::io(path, e))?;
    parse_config(&text)
}

fn parse_config(text: &str) -> Result<AnnealConfig> {
    toml::from_str(text).map_err(|e| PlacerError::Config(e.to_string()))
}

/// File settings first, then command line overrides.
fn build_config(args: &Args) -> Result<AnnealConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AnnealConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(name) = &args.strategy {
        config.strategy = name.parse()?;
    }
    if let Some(fraction) = args.window {
        config.strategy = config.strategy.with_fraction(fraction);
    }
    if let Some(name) = &args.exit {
        config.exit = name.parse::<ExitCriterion>()?;
    }
    if let Some(moves) = args.moves {
        config.moves = MoveBudget::Fixed { moves };
    }
    if let Some(n) = args.max_levels {
        config.max_levels = n;
    }
    if args.exclusive_span {
        config.cost.inclusive_span = false;
    }
    if args.no_routing_track {
        config.cost.routing_track = false;
    }
    // Trend samples are only useful to an attached renderer.
    config.record_trend = false;
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;

    let paths = if args.input.is_dir() {
        circuit_files(&args.input)?
    } else {
        vec![args.input.clone()]
    };
    log::info!("{} circuit(s), strategy {}, exit {}", paths.len(), config.strategy, config.exit);

    let circuits = load_circuits(&paths)?;
    let summaries = run_batch(&circuits, &config)?;

    for s in &summaries {
        println!(
            "{}\tcost {} -> {}\t{} moves\t{} levels",
            s.circuit, s.initial_cost, s.final_cost, s.iterations, s.levels
        );
    }

    if let Some(path) = &args.results {
        let label = args
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        write_results(path, &config, &label, &summaries)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
