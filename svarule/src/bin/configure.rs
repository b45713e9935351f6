use clap::Parser;
use std::path::PathBuf;
use svarule::{lang::en, pipeline, Config};

/// Extracts, generates and splits the agreement datasets and filters the real-world corpus.
#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    #[clap(long, short)]
    config: Option<PathBuf>,
    #[clap(long)]
    seed: Option<u64>,
    #[clap(long)]
    data_dir: Option<PathBuf>,
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

    let summary = pipeline::configure_data(&config, &en::tokenizer())?;
    println!("{:#?}", summary);

    Ok(())
}
