//! Train command - fit and persist the deduction model.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use taxbot_core::{DeductionTrainer, FileModelStore, TrainingSet};

use super::load_config;

/// Arguments for the train command.
#[derive(Args)]
pub struct TrainArgs {
    /// Training data JSON file ({"features": [...], "labels": [...]})
    #[arg(required = true)]
    input: PathBuf,

    /// Output model file (default: from configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of trees
    #[arg(long)]
    trees: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

pub async fn run(args: TrainArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let set = TrainingSet::from_file(&args.input)?;
    println!(
        "{} Loaded {} training profiles",
        style("ℹ").blue(),
        set.len()
    );

    let mut params = config.model.forest_params();
    if let Some(trees) = args.trees {
        params = params.with_estimators(trees);
    }
    if args.max_depth.is_some() {
        params = params.with_max_depth(args.max_depth);
    }
    if let Some(seed) = args.seed {
        params = params.with_seed(seed);
    }
    debug!("Forest parameters: {:?}", params);

    let output_path = args.output.unwrap_or_else(|| config.model.model_path());
    let store = FileModelStore::new(&output_path);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Fitting {} trees...", params.n_estimators));

    let forest = DeductionTrainer::new(params).train_and_persist(&set, &store, None)?;

    spinner.finish_and_clear();

    println!(
        "{} Trained {} trees in {:?}",
        style("✓").green(),
        forest.n_trees(),
        start.elapsed()
    );
    println!(
        "{} Model written to {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}
