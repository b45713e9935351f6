use clap::Parser;
use std::path::PathBuf;
use svarule::{lang::en, pipeline, Config};

/// Trains the classifier on the configured training set.
#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    #[clap(long, short)]
    config: Option<PathBuf>,
    #[clap(long)]
    seed: Option<u64>,
    #[clap(long)]
    data_dir: Option<PathBuf>,
    #[clap(long)]
    model_dir: Option<PathBuf>,
    #[clap(long)]
    epochs: Option<usize>,
}

fn main() -> Result<(), svarule::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();

    let mut config = Config::load(opts.config.as_ref())?;
    if let Some(seed) = opts.seed {
        config.seed = seed;
    }
    if let Some(data_dir) = opts.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(model_dir) = opts.model_dir {
        config.model_dir = model_dir;
    }
    if let Some(epochs) = opts.epochs {
        config.training.epochs = epochs;
    }

    let output = pipeline::create_classifier(&config, &en::tokenizer())?;

    for metrics in &output.history {
        println!(
            "epoch {}: train_loss={:.4} | {}",
            metrics.epoch, metrics.train_loss, metrics.val_metrics
        );
    }
    println!("Best model saved to {}", output.best_dir.display());

    Ok(())
}
