//! Subject-verb agreement (SVA) datasets, a rule-based agreement checker and a trainable sentence classifier.
//! # Overview
//!
//! svarule has the following core abstractions:
//! - A [Tokenizer][tokenizer::Tokenizer] to split a text into tokens and analyze it by part-of-speech tagging,
//! disambiguation and chunking.
//! - A [Parser][parser::Parser] finding the main verb of each sentence and the subjects it has to agree with.
//! - An [AgreementChecker][checker::AgreementChecker] classifying sentences by comparing verb morphology with subject number.
//! - A [LinearClassifier][classifier::LinearClassifier] trained on labeled sentences.
//! - Data preparation: [m2] corpus extraction, synthetic pair [generate]ion and [dataset] splitting.
//!
//! # Examples
//!
//! Check a sentence:
//!
//! ```
//! use svarule::{checker::AgreementChecker, lang::en, types::Label};
//!
//! let tokenizer = en::tokenizer();
//! let checker = AgreementChecker::default();
//!
//! assert_eq!(checker.classify("The dogs runs in the park .", &tokenizer), Some(Label::Incorrect));
//! assert_eq!(checker.classify("The dogs run in the park .", &tokenizer), Some(Label::Correct));
//! ```
//!
//! Correct a sentence:
//!
//! ```
//! use svarule::{checker::AgreementChecker, lang::en};
//!
//! let tokenizer = en::tokenizer();
//! let checker = AgreementChecker::default();
//!
//! assert_eq!(
//!     checker.correct("The old teacher walk to the river .", &tokenizer),
//!     "The old teacher walks to the river ."
//! );
//! ```

use std::io;

use thiserror::Error;

pub mod checker;
pub mod classifier;
pub mod component;
pub mod config;
pub mod dataset;
pub mod filter;
pub mod generate;
#[macro_use]
pub mod lang;
pub mod m2;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod tokenizer;
pub mod types;
pub(crate) mod utils;
pub mod words;

pub use checker::AgreementChecker;
pub use classifier::{Classify, LinearClassifier, Model};
pub use config::Config;
pub use tokenizer::Tokenizer;

#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// (De)serialization error. Can have occured during deserialization or during serialization.
    #[error(transparent)]
    Serialization(#[from] bincode::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("malformed m2 line {line}: {message}")]
    MalformedM2 { line: usize, message: String },
    #[error("unknown label '{0}'")]
    UnknownLabel(String),
    #[error("{path} has {rows} rows, pairs need an even number")]
    UnevenPairs { path: String, rows: usize },
    #[error("dataset '{0}' is empty")]
    EmptyDataset(String),
}

pub type Result<T> = std::result::Result<T, Error>;
