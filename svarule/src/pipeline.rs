//! The stages of the full pipeline: data configuration, training and testing.

use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;

use crate::{
    checker::{AgreementChecker, Evaluation},
    classifier::{
        evaluate,
        train::{self, TrainOutput},
        LinearClassifier, Model,
    },
    config::Config,
    dataset, filter,
    generate::Generator,
    lang::en,
    m2,
    tokenizer::Tokenizer,
    Error,
};

/// Sizes of the datasets written by [configure_data].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSummary {
    pub extracted_pairs: usize,
    pub generated_pairs: usize,
    pub train: usize,
    pub valid: usize,
    pub test: usize,
    pub real: usize,
}

/// Extracts pairs from the m2 files, generates as many synthetic pairs as were extracted per
/// file on average, splits both into training, validation and test sets and filters the
/// real-world corpus.
pub fn configure_data(config: &Config, tokenizer: &Tokenizer) -> Result<DataSummary, Error> {
    let paths = config.data_paths();

    let (extracted, average) = m2::extract_pairs(&paths.m2_files, config.extraction.mode)?;
    dataset::write_csv(&paths.extracted_csv, &dataset::pairs_to_sentences(&extracted))?;

    let generator = Generator::new(en::words(), en::inflecter(), config.generation.clone());
    let generated = generator.generate_pairs(average as usize, Some(config.seed));
    dataset::write_csv(&paths.generated_csv, &dataset::pairs_to_sentences(&generated))?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let split = dataset::split_files(&[&paths.extracted_csv, &paths.generated_csv], &mut rng)?;
    dataset::write_json(&paths.train_json, &split.train)?;
    dataset::write_json(&paths.valid_json, &split.valid)?;
    dataset::write_json(&paths.test_json, &split.test)?;

    let real = filter::filter_file(
        &paths.real_corpus,
        &paths.real_json,
        &AgreementChecker::default(),
        tokenizer,
        &config.filter,
    )?;

    Ok(DataSummary {
        extracted_pairs: extracted.len(),
        generated_pairs: generated.len(),
        train: split.train.len(),
        valid: split.valid.len(),
        test: split.test.len(),
        real,
    })
}

/// Trains a classifier on a balanced sample of the training set and saves it to the model
/// directory.
pub fn create_classifier(config: &Config, tokenizer: &Tokenizer) -> Result<TrainOutput, Error> {
    let paths = config.data_paths();

    let train_data = dataset::read_json(&paths.train_json)?;
    let valid_data = dataset::read_json(&paths.valid_json)?;

    let size = config.training.train_size.unwrap_or(train_data.len());
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let sample = dataset::balanced_sample(&train_data, size, &mut rng);

    train::train(
        &sample,
        &valid_data,
        tokenizer,
        &config.training,
        config.seed,
        &config.model_dir,
    )
}

/// Accuracies on the extracted/generated test set and the real-world set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierResults {
    pub test: Option<f64>,
    pub real: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckerResults {
    pub test: Evaluation,
    pub real: Evaluation,
}

pub fn test_classifier(
    classifier: &Model,
    config: &Config,
    tokenizer: &Tokenizer,
) -> Result<ClassifierResults, Error> {
    let paths = config.data_paths();

    let test = evaluate(classifier, &dataset::read_json(&paths.test_json)?, tokenizer);
    let real = evaluate(classifier, &dataset::read_json(&paths.real_json)?, tokenizer);
    info!("classifier on test set: {}", test);
    info!("classifier on real-world set: {}", real);

    Ok(ClassifierResults {
        test: test.accuracy(),
        real: real.accuracy(),
    })
}

pub fn test_checker(
    checker: &AgreementChecker,
    config: &Config,
    tokenizer: &Tokenizer,
) -> Result<CheckerResults, Error> {
    let paths = config.data_paths();

    let test = checker.evaluate(&dataset::read_json(&paths.test_json)?, tokenizer);
    let real = checker.evaluate(&dataset::read_json(&paths.real_json)?, tokenizer);
    info!("checker on test set: {}", test.matrix);
    info!("checker on real-world set: {}", real.matrix);

    Ok(CheckerResults { test, real })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub classifier: ClassifierResults,
    pub checker: CheckerResults,
}

struct Accuracy(Option<f64>);

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(x) => write!(f, "{}", x),
            None => f.write_str("n/a"),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results:")?;
        writeln!(f, "  Extracted/Generated:")?;
        writeln!(f, "    Classifier:        {}", Accuracy(self.classifier.test))?;
        writeln!(f, "    Parser:            {}", Accuracy(self.checker.test.accuracy))?;
        writeln!(f, "      Couldn't parse:  {}", self.checker.test.not_parsed)?;
        writeln!(f, "  Real-World:")?;
        writeln!(f, "    Classifier:        {}", Accuracy(self.classifier.real))?;
        writeln!(f, "    Parser:            {}", Accuracy(self.checker.real.accuracy))?;
        write!(f, "      Couldn't parse:  {}", self.checker.real.not_parsed)
    }
}

/// Configures the data if any dataset is missing, trains if there is no trained model and
/// tests the classifier and the checker.
pub fn run(config: &Config) -> Result<Report, Error> {
    let tokenizer = en::tokenizer();

    if config.data_paths().is_configured() {
        info!("Data already configured");
    } else {
        info!("Configuring data");
        let summary = configure_data(config, &tokenizer)?;
        info!("Data ready: {:?}", summary);
    }

    let model_paths = config.model_paths();
    let classifier: Model = if model_paths.is_trained() {
        info!("Loading classifier from {}", model_paths.best_dir.display());
        LinearClassifier::from_dir(&model_paths.best_dir)?.into()
    } else {
        info!("Training classifier");
        create_classifier(config, &tokenizer)?.classifier.into()
    };

    info!("Testing classifier");
    let classifier_results = test_classifier(&classifier, config, &tokenizer)?;
    info!("Testing checker");
    let checker_results = test_checker(&AgreementChecker::default(), config, &tokenizer)?;

    Ok(Report {
        classifier: classifier_results,
        checker: checker_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterOptions;
    use std::path::Path;

    const M2: &str = "S The dogs runs in the park .
A 2 3|||R:VERB:SVA|||run|||REQUIRED|||-NONE-|||0

S The cat sleep under the tree .
A 2 3|||R:VERB:SVA|||sleeps|||REQUIRED|||-NONE-|||0

S This are a big dog .
A 1 2|||R:VERB:SVA|||is|||REQUIRED|||-NONE-|||0

S The teachers walks to the river .
A 2 3|||R:VERB:SVA|||walk|||REQUIRED|||-NONE-|||0
";

    const CORPUS: &str = "The old dogs run to the river every day. \
        The cat and the dog sleeps in the house near the river. Dogs run.";

    fn config(dir: &Path) -> Config {
        std::fs::write(dir.join("a.m2"), M2).unwrap();
        std::fs::write(dir.join("b.m2"), M2).unwrap();
        std::fs::write(dir.join("corpus.txt"), CORPUS).unwrap();

        let mut config = Config {
            data_dir: dir.to_path_buf(),
            model_dir: dir.join("model"),
            real_corpus: "corpus.txt".into(),
            filter: FilterOptions { min_words: 5 },
            ..Config::default()
        };
        config.extraction.m2_files = vec!["a.m2".into(), "b.m2".into()];
        config
    }

    #[test]
    fn configures_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        let summary = configure_data(&config, &en::tokenizer()).unwrap();

        assert_eq!(summary.extracted_pairs, 8);
        assert_eq!(summary.generated_pairs, 4);
        // 12 pairs: 6 to training, 6 single sentences held out
        assert_eq!(summary.train, 12);
        assert_eq!(summary.valid + summary.test, 6);
        assert_eq!(summary.real, 1);
        assert!(config.data_paths().is_configured());
    }

    #[test]
    fn runs_all_stages() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        let report = run(&config).unwrap();
        assert!(config.model_paths().is_trained());
        assert!(report.classifier.test.is_some());
        assert_eq!(report.checker.real.accuracy, Some(1.0));

        // a second run reuses data and model
        let again = run(&config).unwrap();
        assert_eq!(again, report);

        let text = report.to_string();
        assert!(text.starts_with("Results:\n  Extracted/Generated:\n    Classifier:"));
        assert!(text.contains("  Real-World:\n"));
    }

    #[test]
    fn checker_can_be_tested_as_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let tokenizer = en::tokenizer();
        configure_data(&config, &tokenizer).unwrap();

        let checker = AgreementChecker::default();
        let as_classifier = test_classifier(&checker.clone().into(), &config, &tokenizer).unwrap();
        let results = test_checker(&checker, &config, &tokenizer).unwrap();

        assert_eq!(as_classifier.test, results.test.accuracy);
        assert_eq!(as_classifier.real, results.real.accuracy);
    }

    #[test]
    fn missing_accuracy_is_rendered() {
        let text = Report::default().to_string();
        assert!(text.contains("    Parser:            n/a\n      Couldn't parse:  0\n"));
    }
}
