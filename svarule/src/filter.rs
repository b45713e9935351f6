//! Selection of long, grammatical sentences from running text as a real-world test set.

use fs_err as fs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    dataset,
    tokenizer::Tokenizer,
    types::{Label, LabeledSentence, Suggestion},
    utils, Error,
};

/// A grammar check. A sentence is correct if the check has no suggestions for it.
pub trait Check {
    fn suggest(&self, text: &str, tokenizer: &Tokenizer) -> Vec<Suggestion>;

    fn is_correct(&self, text: &str, tokenizer: &Tokenizer) -> bool {
        self.suggest(text, tokenizer).is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Sentences must have strictly more words than this.
    pub min_words: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions { min_words: 35 }
    }
}

/// Splits `text` into sentences and keeps the long ones `check` accepts, all labeled correct.
/// Sentence final punctuation is removed and double quotes become single quotes.
pub fn filter_sentences<C: Check + ?Sized>(
    text: &str,
    check: &C,
    tokenizer: &Tokenizer,
    options: &FilterOptions,
) -> Vec<LabeledSentence> {
    let text = text.replace('\n', " ");
    let mut n_long = 0;

    let sentences: Vec<_> = utils::split_at_terminals(&text)
        .into_iter()
        .map(str::trim)
        .filter(|sentence| sentence.split_whitespace().count() > options.min_words)
        .filter(|sentence| {
            n_long += 1;
            let correct = check.is_correct(sentence, tokenizer);
            if !correct {
                debug!("rejected {:?}", sentence);
            }
            correct
        })
        .map(|sentence| LabeledSentence::new(utils::escape_quotes(sentence), Label::Correct))
        .collect();

    info!(
        "Kept {} of {} sentences with more than {} words",
        sentences.len(),
        n_long,
        options.min_words
    );
    sentences
}

/// Filters the text file at `input` and writes the kept sentences as JSON to `output`.
pub fn filter_file<P: AsRef<Path>, Q: AsRef<Path>, C: Check + ?Sized>(
    input: P,
    output: Q,
    check: &C,
    tokenizer: &Tokenizer,
    options: &FilterOptions,
) -> Result<usize, Error> {
    info!("Filtering sentences from {}", input.as_ref().display());

    let text = fs::read_to_string(input.as_ref())?;
    let sentences = filter_sentences(&text, check, tokenizer, options);
    dataset::write_json(output, &sentences)?;

    Ok(sentences.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{checker::AgreementChecker, lang::en};

    struct RejectAll;

    impl Check for RejectAll {
        fn suggest(&self, text: &str, _tokenizer: &Tokenizer) -> Vec<Suggestion> {
            vec![Suggestion {
                source: "REJECT".into(),
                message: String::new(),
                start: 0,
                end: text.chars().count(),
                replacements: Vec::new(),
            }]
        }
    }

    const TEXT: &str = "The old dogs run to the river\nevery day. Dogs run! \
        The cat and the dog sleeps in the house near the river? \
        The teacher said \"hello\" to the children in the park.";

    fn options() -> FilterOptions {
        FilterOptions { min_words: 5 }
    }

    #[test]
    fn keeps_long_correct_sentences() {
        let sentences =
            filter_sentences(TEXT, &AgreementChecker::default(), &en::tokenizer(), &options());

        assert_eq!(
            sentences,
            vec![
                LabeledSentence::new("The old dogs run to the river every day", Label::Correct),
                LabeledSentence::new(
                    "The teacher said 'hello' to the children in the park",
                    Label::Correct
                ),
            ]
        );
    }

    #[test]
    fn check_decides() {
        assert!(filter_sentences(TEXT, &RejectAll, &en::tokenizer(), &options()).is_empty());
    }

    #[test]
    fn default_needs_long_sentences() {
        let sentences =
            filter_sentences(TEXT, &AgreementChecker::default(), &en::tokenizer(), &FilterOptions::default());
        assert!(sentences.is_empty());
    }

    #[test]
    fn can_filter_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("corpus.txt");
        let output = dir.path().join("real.json");
        std::fs::write(&input, TEXT).unwrap();

        let n = filter_file(&input, &output, &AgreementChecker::default(), &en::tokenizer(), &options())
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(dataset::read_json(&output).unwrap().len(), 2);
    }
}
