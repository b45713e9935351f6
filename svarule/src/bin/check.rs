use clap::Parser;
use std::path::PathBuf;
use svarule::{lang::en, AgreementChecker, Classify, LinearClassifier, Model};

/// Checks the subject-verb agreement of a text.
#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    text: String,
    /// A checkpoint directory of a trained classifier to classify the text with as well.
    #[clap(long, short)]
    model: Option<PathBuf>,
}

fn main() -> Result<(), svarule::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();

    let tokenizer = en::tokenizer();
    let checker = AgreementChecker::default();

    let suggestions = checker.suggest(&opts.text, &tokenizer);
    println!("{:#?}", suggestions);
    println!("Corrected: {}", checker.correct(&opts.text, &tokenizer));

    let mut models: Vec<(&str, Model)> = vec![("Checker", checker.into())];
    if let Some(dir) = opts.model {
        models.push(("Classifier", LinearClassifier::from_dir(dir)?.into()));
    }

    for (name, model) in &models {
        match model.classify(&opts.text, &tokenizer) {
            Some(label) => print!("{}: {}", name, label),
            None => print!("{}: could not parse", name),
        }
        if let Model::Linear(classifier) = model {
            let [incorrect, correct] = classifier.probabilities(&opts.text, &tokenizer);
            print!(" (p(0)={:.4}, p(1)={:.4})", incorrect, correct);
        }
        println!();
    }

    Ok(())
}
