//! Accuracy and confusion-matrix metrics for agreement classification.
//!
//! Agreement errors are the positive class: a true positive is an incorrect sentence predicted
//! as incorrect.

use std::fmt;

use crate::types::Label;

/// The fraction of predictions equal to their label. `None` if there are no predictions.
pub fn accuracy(labels: &[Label], predictions: &[Label]) -> Option<f64> {
    ConfusionMatrix::from_predictions(labels, predictions).accuracy()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_count: usize,
}

impl ConfusionMatrix {
    /// Counts pairs of label and prediction. Extra elements of the longer slice are ignored.
    pub fn from_predictions(labels: &[Label], predictions: &[Label]) -> Self {
        let mut matrix = ConfusionMatrix::default();

        for (&label, &prediction) in labels.iter().zip(predictions) {
            matrix.add(label, prediction);
        }

        matrix
    }

    pub fn add(&mut self, label: Label, prediction: Label) {
        match (prediction, label) {
            (Label::Incorrect, Label::Incorrect) => self.tp += 1,
            (Label::Incorrect, Label::Correct) => self.fp += 1,
            (Label::Correct, Label::Correct) => self.tn += 1,
            (Label::Correct, Label::Incorrect) => self.fn_count += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_count
    }

    pub fn accuracy(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some((self.tp + self.tn) as f64 / total as f64),
        }
    }

    pub fn precision(&self) -> f64 {
        if self.tp + self.fp > 0 {
            self.tp as f64 / (self.tp + self.fp) as f64
        } else {
            0.0
        }
    }

    pub fn recall(&self) -> f64 {
        if self.tp + self.fn_count > 0 {
            self.tp as f64 / (self.tp + self.fn_count) as f64
        } else {
            0.0
        }
    }

    pub fn f1(&self) -> f64 {
        let (precision, recall) = (self.precision(), self.recall());

        if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "acc={:.4} prec={:.4} rec={:.4} f1={:.4} (tp={} fp={} tn={} fn={})",
            self.accuracy().unwrap_or(0.0),
            self.precision(),
            self.recall(),
            self.f1(),
            self.tp,
            self.fp,
            self.tn,
            self.fn_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::*;

    #[test]
    fn perfect_predictions() {
        let labels = [Incorrect, Incorrect, Correct, Correct];
        let matrix = ConfusionMatrix::from_predictions(&labels, &labels);

        assert_eq!(matrix.accuracy(), Some(1.0));
        assert!((matrix.f1() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mixed_predictions() {
        // 3 TP, 1 FP, 2 TN, 1 FN
        let predictions = [Incorrect, Incorrect, Incorrect, Incorrect, Correct, Correct, Correct];
        let labels = [Incorrect, Incorrect, Incorrect, Correct, Correct, Correct, Incorrect];
        let matrix = ConfusionMatrix::from_predictions(&labels, &predictions);

        assert_eq!(matrix.tp, 3);
        assert_eq!(matrix.fp, 1);
        assert_eq!(matrix.tn, 2);
        assert_eq!(matrix.fn_count, 1);
        assert!((matrix.accuracy().unwrap() - 5.0 / 7.0).abs() < 1e-9);
        assert!((matrix.precision() - 0.75).abs() < 1e-9);
        assert!((matrix.recall() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn empty_input_has_no_accuracy() {
        assert_eq!(accuracy(&[], &[]), None);
        assert_eq!(ConfusionMatrix::default().f1(), 0.0);
        assert_eq!(
            ConfusionMatrix::default().to_string(),
            "acc=0.0000 prec=0.0000 rec=0.0000 f1=0.0000 (tp=0 fp=0 tn=0 fn=0)"
        );
    }
}
