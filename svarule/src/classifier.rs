//! Sentence level agreement classifiers.
//!
//! Everything which labels a sentence implements [Classify]. [Model] dispatches over the trained
//! [LinearClassifier] and the rule-based [AgreementChecker].

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    checker::AgreementChecker,
    component::Component,
    metrics::ConfusionMatrix,
    parser::Parser,
    tokenizer::Tokenizer,
    types::{Label, LabeledSentence},
    Error,
};

pub mod features;
pub mod train;

use features::Vocabulary;

#[enum_dispatch]
pub trait Classify {
    /// The label of `text`, `None` if the classifier can not decide.
    fn classify(&self, text: &str, tokenizer: &Tokenizer) -> Option<Label>;
}

#[enum_dispatch(Classify)]
#[derive(Debug, Clone)]
pub enum Model {
    Linear(LinearClassifier),
    Agreement(AgreementChecker),
}

impl Classify for AgreementChecker {
    fn classify(&self, text: &str, tokenizer: &Tokenizer) -> Option<Label> {
        AgreementChecker::classify(self, text, tokenizer)
    }
}

/// Classifies every sentence. Sentences without a prediction are left out.
pub fn evaluate<C: Classify + ?Sized>(
    classifier: &C,
    sentences: &[LabeledSentence],
    tokenizer: &Tokenizer,
) -> ConfusionMatrix {
    let mut matrix = ConfusionMatrix::default();

    for sentence in sentences {
        if let Some(prediction) = classifier.classify(&sentence.sentence, tokenizer) {
            matrix.add(sentence.label, prediction);
        }
    }

    matrix
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x.clamp(-30.0, 30.0)).exp())
}

/// Logistic regression over sparse binary features. The positive class is [Label::Correct].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearClassifier {
    vocabulary: Vocabulary,
    weights: Vec<f64>,
    bias: f64,
    #[serde(skip)]
    parser: Parser,
}

impl Component for LinearClassifier {
    fn name() -> &'static str {
        "classifier"
    }
}

impl LinearClassifier {
    /// An untrained classifier with all weights zero.
    pub fn new(vocabulary: Vocabulary) -> Self {
        LinearClassifier {
            weights: vec![0.0; vocabulary.len()],
            vocabulary,
            bias: 0.0,
            parser: Parser::default(),
        }
    }

    /// Loads the classifier of a checkpoint directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        <Self as Component>::new(dir.as_ref().join(train::MODEL_FILE))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Feature indices of `text`.
    pub fn encode(&self, text: &str, tokenizer: &Tokenizer) -> Vec<usize> {
        self.vocabulary
            .encode(&features::extract(text, tokenizer, &self.parser))
    }

    pub(crate) fn logit(&self, indices: &[usize]) -> f64 {
        self.bias + indices.iter().map(|&i| self.weights[i]).sum::<f64>()
    }

    /// Probability of each label, indexed by [Label::index].
    pub fn probabilities(&self, text: &str, tokenizer: &Tokenizer) -> [f64; 2] {
        let correct = sigmoid(self.logit(&self.encode(text, tokenizer)));
        [1.0 - correct, correct]
    }

    /// One gradient step of the mean log loss over a batch. Returns the mean loss before the step.
    pub(crate) fn step(&mut self, batch: &[(&[usize], Label)], learning_rate: f64, l2: f64) -> f64 {
        if batch.is_empty() {
            return 0.0;
        }

        let n = batch.len() as f64;
        let mut gradients: Vec<(usize, f64)> = Vec::new();
        let mut bias_gradient = 0.0;
        let mut loss = 0.0;

        for (indices, label) in batch {
            let p = sigmoid(self.logit(indices));
            let y = label.as_u8() as f64;

            loss += log_loss(p, y);
            bias_gradient += p - y;
            gradients.extend(indices.iter().map(|&i| (i, p - y)));
        }

        for (i, gradient) in gradients {
            let weight = self.weights[i];
            self.weights[i] = weight - learning_rate * (gradient + l2 * weight) / n;
        }
        self.bias -= learning_rate * bias_gradient / n;

        loss / n
    }

    /// Mean log loss over encoded sentences.
    pub(crate) fn loss(&self, data: &[(Vec<usize>, Label)]) -> Option<f64> {
        if data.is_empty() {
            return None;
        }

        let total: f64 = data
            .iter()
            .map(|(indices, label)| log_loss(sigmoid(self.logit(indices)), label.as_u8() as f64))
            .sum();

        Some(total / data.len() as f64)
    }

    pub(crate) fn predict(&self, indices: &[usize]) -> Label {
        if sigmoid(self.logit(indices)) >= 0.5 {
            Label::Correct
        } else {
            Label::Incorrect
        }
    }
}

fn log_loss(p: f64, y: f64) -> f64 {
    let p = p.clamp(1e-12, 1.0 - 1e-12);
    -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
}

impl Classify for LinearClassifier {
    fn classify(&self, text: &str, tokenizer: &Tokenizer) -> Option<Label> {
        Some(self.predict(&self.encode(text, tokenizer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::en;

    fn vocabulary() -> Vocabulary {
        Vocabulary::build(
            [vec!["agree:true".to_string()], vec!["agree:false".to_string()]].iter(),
            1,
        )
    }

    #[test]
    fn untrained_model_is_undecided() {
        let classifier = LinearClassifier::new(vocabulary());
        let [incorrect, correct] = classifier.probabilities("The dog runs .", &en::tokenizer());

        assert!((incorrect - 0.5).abs() < 1e-9);
        assert!((correct - 0.5).abs() < 1e-9);
    }

    #[test]
    fn steps_reduce_loss() {
        let mut classifier = LinearClassifier::new(vocabulary());
        let data = vec![(vec![0], Label::Correct), (vec![1], Label::Incorrect)];
        let batch: Vec<_> = data.iter().map(|(x, y)| (x.as_slice(), *y)).collect();

        let before = classifier.loss(&data).unwrap();
        for _ in 0..20 {
            classifier.step(&batch, 0.5, 0.0);
        }
        let after = classifier.loss(&data).unwrap();

        assert!(after < before);
        assert_eq!(classifier.predict(&[0]), Label::Correct);
        assert_eq!(classifier.predict(&[1]), Label::Incorrect);
    }

    #[test]
    fn models_dispatch() {
        let tokenizer = en::tokenizer();
        let model: Model = AgreementChecker::default().into();

        assert_eq!(
            model.classify("The dogs runs .", &tokenizer),
            Some(Label::Incorrect)
        );

        let model: Model = LinearClassifier::new(vocabulary()).into();
        assert!(model.classify("The dogs runs .", &tokenizer).is_some());
    }

    #[test]
    fn can_evaluate_classifiers() {
        let sentences = vec![
            LabeledSentence::new("The dogs runs .", Label::Incorrect),
            LabeledSentence::new("The dog runs .", Label::Correct),
            LabeledSentence::new("Under the bridge .", Label::Correct),
        ];
        let matrix = evaluate(&AgreementChecker::default(), &sentences, &en::tokenizer());

        assert_eq!(matrix.total(), 2);
        assert_eq!(matrix.accuracy(), Some(1.0));
    }
}
