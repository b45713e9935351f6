//! Mini-batch training of a [LinearClassifier] with per-epoch validation and checkpoints.
//!
//! Every epoch is saved to `<model_dir>/checkpoint-<step>`, the epoch with the lowest validation
//! loss additionally to `<model_dir>/best`. A checkpoint directory holds the model as
//! [MODEL_FILE] and the training arguments as [ARGS_FILE].

use fs_err as fs;
use log::{info, warn};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::{features, Classify, LinearClassifier};
use crate::{
    component::Component,
    metrics::ConfusionMatrix,
    parser::Parser,
    tokenizer::Tokenizer,
    types::{Label, LabeledSentence},
    Error,
};

pub const MODEL_FILE: &str = "model.bin";
pub const ARGS_FILE: &str = "training_args.json";
pub const BEST_DIR: &str = "best";

/// Sentences classified and logged after training.
pub const SAMPLE_SENTENCES: [(&str, Label); 2] = [
    ("The duck walks up to the lemonade stand .", Label::Correct),
    ("The duck walk up to the lemonade stand .", Label::Incorrect),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub l2: f64,
    /// Log the running training loss every this many steps.
    pub logging_steps: usize,
    /// Features seen in fewer training sentences are dropped.
    pub min_count: usize,
    /// Number of training sentences drawn by a balanced sample. All if unset.
    pub train_size: Option<usize>,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            epochs: 1,
            batch_size: 8,
            learning_rate: 0.5,
            l2: 1e-4,
            logging_steps: 50,
            min_count: 1,
            train_size: None,
        }
    }
}

/// Contents of [ARGS_FILE].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingArgs {
    #[serde(flatten)]
    pub options: TrainingOptions,
    pub seed: u64,
    pub epoch: usize,
    pub global_step: usize,
    pub val_loss: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_loss: f64,
    pub val_loss: Option<f64>,
    pub val_metrics: ConfusionMatrix,
}

/// The classifier of the best epoch and the metrics of every epoch.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub classifier: LinearClassifier,
    pub best_dir: PathBuf,
    pub history: Vec<EpochMetrics>,
}

fn encode_all(
    classifier: &LinearClassifier,
    features: &[Vec<String>],
    sentences: &[LabeledSentence],
) -> Vec<(Vec<usize>, Label)> {
    features
        .iter()
        .zip(sentences)
        .map(|(x, sentence)| (classifier.vocabulary().encode(x), sentence.label))
        .collect()
}

fn extract_all(sentences: &[LabeledSentence], tokenizer: &Tokenizer) -> Vec<Vec<String>> {
    let parser = Parser::default();

    sentences
        .iter()
        .map(|x| features::extract(&x.sentence, tokenizer, &parser))
        .collect()
}

fn validate(classifier: &LinearClassifier, data: &[(Vec<usize>, Label)]) -> (Option<f64>, ConfusionMatrix) {
    let mut matrix = ConfusionMatrix::default();

    for (indices, label) in data {
        matrix.add(*label, classifier.predict(indices));
    }

    (classifier.loss(data), matrix)
}

/// Writes the model and training arguments to `dir`, creating it if needed.
pub fn save_checkpoint<P: AsRef<Path>>(
    dir: P,
    classifier: &LinearClassifier,
    args: &TrainingArgs,
) -> Result<(), Error> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    classifier.save(dir.join(MODEL_FILE))?;
    let writer = BufWriter::new(fs::File::create(dir.join(ARGS_FILE))?);
    serde_json::to_writer_pretty(writer, args)?;

    Ok(())
}

pub fn load_args<P: AsRef<Path>>(dir: P) -> Result<TrainingArgs, Error> {
    let text = fs::read_to_string(dir.as_ref().join(ARGS_FILE))?;
    Ok(serde_json::from_str(&text)?)
}

/// Trains a classifier on `train`, validating on `valid` after every epoch.
///
/// Batches are drawn from a permutation seeded by `seed + epoch`, so training is reproducible.
/// If `valid` is empty, the training loss selects the best epoch.
pub fn train<P: AsRef<Path>>(
    train: &[LabeledSentence],
    valid: &[LabeledSentence],
    tokenizer: &Tokenizer,
    options: &TrainingOptions,
    seed: u64,
    model_dir: P,
) -> Result<TrainOutput, Error> {
    if train.is_empty() {
        return Err(Error::EmptyDataset("train".into()));
    }
    if valid.is_empty() {
        warn!("no validation data, selecting the best epoch by training loss");
    }

    let model_dir = model_dir.as_ref();
    let best_dir = model_dir.join(BEST_DIR);

    info!("Extracting features of {} training sentences", train.len());
    let train_features = extract_all(train, tokenizer);
    let valid_features = extract_all(valid, tokenizer);

    let mut classifier = LinearClassifier::new(features::Vocabulary::build(
        &train_features,
        options.min_count,
    ));
    let train_data = encode_all(&classifier, &train_features, train);
    let valid_data = encode_all(&classifier, &valid_features, valid);

    let batch_size = options.batch_size.max(1);
    let logging_steps = options.logging_steps.max(1);

    info!(
        "Training: {} features, lr={}, l2={}, batch={}, epochs={}",
        classifier.vocabulary().len(),
        options.learning_rate,
        options.l2,
        batch_size,
        options.epochs,
    );

    let mut best_loss = f64::MAX;
    let mut best = classifier.clone();
    let mut history = Vec::new();
    let mut global_step = 0;

    for epoch in 0..options.epochs {
        let mut indices: Vec<usize> = (0..train_data.len()).collect();
        indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed.wrapping_add(epoch as u64)));

        let mut epoch_loss = 0.0;
        let mut running_loss = 0.0;
        let mut n_batches = 0;

        for chunk in indices.chunks(batch_size) {
            let batch: Vec<_> = chunk
                .iter()
                .map(|&i| (train_data[i].0.as_slice(), train_data[i].1))
                .collect();

            let loss = classifier.step(&batch, options.learning_rate, options.l2);
            epoch_loss += loss;
            running_loss += loss;
            n_batches += 1;
            global_step += 1;

            if global_step % logging_steps == 0 {
                info!(
                    "step {} | loss={:.4}",
                    global_step,
                    running_loss / logging_steps as f64
                );
                running_loss = 0.0;
            }
        }

        let train_loss = epoch_loss / n_batches.max(1) as f64;
        let (val_loss, val_metrics) = validate(&classifier, &valid_data);
        let selection_loss = val_loss.unwrap_or(train_loss);

        let args = TrainingArgs {
            options: options.clone(),
            seed,
            epoch: epoch + 1,
            global_step,
            val_loss,
        };
        save_checkpoint(
            model_dir.join(format!("checkpoint-{}", global_step)),
            &classifier,
            &args,
        )?;

        let improved = selection_loss < best_loss;
        if improved {
            best_loss = selection_loss;
            best = classifier.clone();
            save_checkpoint(&best_dir, &classifier, &args)?;
        }

        info!(
            "epoch {} | train_loss={:.4} val_loss={:.4}{} | {}",
            epoch + 1,
            train_loss,
            val_loss.unwrap_or(f64::NAN),
            if improved { " *" } else { "" },
            val_metrics,
        );

        history.push(EpochMetrics {
            epoch: epoch + 1,
            train_loss,
            val_loss,
            val_metrics,
        });
    }

    if history.is_empty() {
        save_checkpoint(
            &best_dir,
            &classifier,
            &TrainingArgs {
                options: options.clone(),
                seed,
                epoch: 0,
                global_step,
                val_loss: None,
            },
        )?;
    }

    let (_, final_metrics) = validate(&best, &valid_data);
    info!("Evaluation of the best model: {}", final_metrics);
    info!("Model saved to {}", best_dir.display());

    for (sentence, expected) in SAMPLE_SENTENCES.iter() {
        if let Some(label) = best.classify(sentence, tokenizer) {
            info!("Sentence: '{}' -> SVA: {} (expected {})", sentence, label, expected);
        }
    }

    Ok(TrainOutput {
        classifier: best,
        best_dir,
        history,
    })
}
