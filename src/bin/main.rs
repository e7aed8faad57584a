//! tactic-svm Command Line Interface
//!
//! Trains the bag-of-words tactic classifier from scrape files, queries
//! trained checkpoints, and highlights or strips comments from Coq source.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use tactic_svm::api::{ModelInfo, SVC};
use tactic_svm::core::{PredictorError, Result};
use tactic_svm::persistence::Checkpoint;
use tactic_svm::predictor::{PredictorOptions, TacticContext, TacticPredictor, WordBagSVMClassifier};
use tactic_svm::syntax::{strip_comments, syntax_highlight};
use tactic_svm::training::{self, DEFAULT_CONTEXT_FILTER};

#[derive(Parser)]
#[command(name = "tactic-svm")]
#[command(about = "Bag-of-words SVM tactic predictor and Coq highlighter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a classifier from a scrape file
    Train(TrainArgs),
    /// Predict the most likely tactics for a goal
    Predict(PredictArgs),
    /// Display checkpoint information
    Info(InfoArgs),
    /// Highlight Coq source as HTML
    Highlight(SourceArgs),
    /// Remove comments from Coq source
    StripComments(SourceArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Scrape file (one JSON record per line)
    scrape_file: PathBuf,

    /// Output checkpoint file
    save_file: PathBuf,

    /// Which scraped tactics to train on, e.g. "default" or "has-goal+no-semis"
    #[arg(long, default_value = DEFAULT_CONTEXT_FILTER)]
    context_filter: String,

    /// Maximum number of samples to load
    #[arg(long)]
    max_tuples: Option<usize>,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// Convergence tolerance
    #[arg(short, long, default_value = "0.001")]
    epsilon: f64,

    /// Maximum SMO iterations per pairwise machine
    #[arg(short, long, default_value = "10000")]
    max_iterations: usize,

    /// Kernel cache size in MB
    #[arg(long, default_value = "100")]
    cache_size: usize,

    /// Cross-validation folds for probability calibration
    #[arg(long, default_value = "5")]
    probability_folds: usize,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained checkpoint file
    checkpoint: PathBuf,

    /// Goal text to predict for
    #[arg(short, long)]
    goal: String,

    /// Number of tactics to return
    #[arg(short, default_value = "5")]
    k: usize,

    /// Tactic actually used, scored against the predictions
    #[arg(long)]
    correct: Option<String>,
}

#[derive(Args)]
struct InfoArgs {
    /// Checkpoint file
    checkpoint: PathBuf,
}

#[derive(Args)]
struct SourceArgs {
    /// Coq source file
    input: PathBuf,

    /// Output file (prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Info(args) => info_command(args),
        Commands::Highlight(args) => source_command(args, syntax_highlight),
        Commands::StripComments(args) => source_command(args, strip_comments),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Scrape file: {:?}", args.scrape_file);
    info!(
        "Parameters: C={}, epsilon={}, max_iter={}, folds={}",
        args.c, args.epsilon, args.max_iterations, args.probability_folds
    );

    let cache_bytes = args.cache_size.checked_mul(1024 * 1024).ok_or_else(|| {
        PredictorError::InvalidParameter(format!(
            "cache size of {} MB does not fit in memory",
            args.cache_size
        ))
    })?;

    let svc = SVC::new()
        .with_c(args.c)
        .with_epsilon(args.epsilon)
        .with_max_iterations(args.max_iterations)
        .with_cache_size(cache_bytes)
        .with_probability_folds(args.probability_folds);

    let checkpoint = training::train_and_save(
        &args.scrape_file,
        &args.save_file,
        &args.context_filter,
        args.max_tuples,
        svc,
    )?;

    let info = ModelInfo::of(checkpoint.classifier());
    info!(
        "Trained {} stems, {} support vectors",
        info.n_classes, info.n_support_vectors
    );
    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    let options =
        PredictorOptions::new().with(PredictorOptions::FILENAME, args.checkpoint.to_string_lossy());
    let predictor = WordBagSVMClassifier::new(&options)?;
    let context = TacticContext::new(args.goal);

    let predictions = match &args.correct {
        Some(correct) => {
            let (predictions, loss) =
                predictor.predict_k_tactics_with_loss(&context, args.k, correct)?;
            info!("Loss: {loss}");
            predictions
        }
        None => predictor.predict_k_tactics(&context, args.k)?,
    };

    for prediction in &predictions {
        println!("{:.6}\t{}", prediction.probability, prediction.tactic);
    }
    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    let checkpoint = Checkpoint::load_from_file(&args.checkpoint)?;
    checkpoint.print_summary();
    Ok(())
}

fn source_command(args: SourceArgs, transform: fn(&str) -> String) -> Result<()> {
    let source = fs::read_to_string(&args.input)?;
    let output = transform(&source);

    match args.output {
        Some(path) => {
            fs::write(&path, output)?;
            info!("Output written to: {path:?}");
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
