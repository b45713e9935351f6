use clap::Parser;
use std::path::PathBuf;
use svarule::{lang::en, parser, Config};

/// Writes the verb-subject mapping of every sentence in a JSON dataset to a CSV file.
#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// Defaults to the configured test set.
    #[clap(long, short)]
    input: Option<PathBuf>,
    #[clap(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), svarule::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();

    let paths = Config::load(opts.config.as_ref())?.data_paths();
    let input = opts.input.unwrap_or(paths.test_json);
    let output = opts.output.unwrap_or(paths.parsed_csv);

    let rows = parser::parse_json_file(
        &input,
        &output,
        &parser::Parser::default(),
        &en::tokenizer(),
    )?;
    println!("Parsed {} sentences into {}", rows, output.display());

    Ok(())
}
