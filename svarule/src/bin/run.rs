use clap::Parser;
use std::path::PathBuf;
use svarule::{pipeline, Config};

/// Configures the data and trains the classifier where needed, then tests classifier and checker.
#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    #[clap(long, short)]
    config: Option<PathBuf>,
    #[clap(long)]
    data_dir: Option<PathBuf>,
    #[clap(long)]
    model_dir: Option<PathBuf>,
}

fn main() -> Result<(), svarule::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();

    let mut config = Config::load(opts.config.as_ref())?;
    if let Some(data_dir) = opts.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(model_dir) = opts.model_dir {
        config.model_dir = model_dir;
    }

    println!("{}", pipeline::run(&config)?);

    Ok(())
}
