//! Fundamental types used by this crate.

use serde::{Deserialize, Serialize};
use std::{fmt, ops::Range, str::FromStr};

use crate::{tokenizer::chunk::ChunkTag, Error};

/// Whether a sentence has correct subject-verb agreement.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    Incorrect,
    Correct,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Incorrect, Label::Correct];

    pub fn as_u8(self) -> u8 {
        match self {
            Label::Incorrect => 0,
            Label::Correct => 1,
        }
    }

    pub fn index(self) -> usize {
        self.as_u8() as usize
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.as_u8()
    }
}

impl std::convert::TryFrom<u8> for Label {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Incorrect),
            1 => Ok(Label::Correct),
            x => Err(Error::UnknownLabel(x.to_string())),
        }
    }
}

impl FromStr for Label {
    type Err = Error;

    /// Accepts the numeric labels and the older `I` / `C` letters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" | "I" => Ok(Label::Incorrect),
            "1" | "C" => Ok(Label::Correct),
            x => Err(Error::UnknownLabel(x.to_string())),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A sentence with its agreement label.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct LabeledSentence {
    pub sentence: String,
    pub label: Label,
}

impl LabeledSentence {
    pub fn new<S: Into<String>>(sentence: S, label: Label) -> Self {
        LabeledSentence {
            sentence: sentence.into(),
            label,
        }
    }
}

/// Two versions of the same sentence which only differ in the number of one verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentencePair {
    pub incorrect: String,
    pub correct: String,
}

impl SentencePair {
    pub fn new<S: Into<String>>(incorrect: S, correct: S) -> Self {
        SentencePair {
            incorrect: incorrect.into(),
            correct: correct.into(),
        }
    }

    /// The labeled sentences, incorrect first.
    pub fn into_labeled(self) -> [LabeledSentence; 2] {
        [
            LabeledSentence::new(self.incorrect, Label::Incorrect),
            LabeledSentence::new(self.correct, Label::Correct),
        ]
    }
}

/// Lemma and part-of-speech tag associated with a word.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct WordData {
    pub lemma: String,
    pub pos: String,
}

impl WordData {
    pub fn new<S: Into<String>, T: Into<String>>(lemma: S, pos: T) -> Self {
        WordData {
            lemma: lemma.into(),
            pos: pos.into(),
        }
    }
}

/// Contains all the local information about a token i. e.
/// the text itself and the [WordData]s associated with the word.
#[derive(Debug, Clone, PartialEq)]
pub struct Word<'t> {
    pub text: &'t str,
    pub tags: Vec<WordData>,
}

impl<'t> Word<'t> {
    pub fn new_with_tags(text: &'t str, tags: Vec<WordData>) -> Self {
        Word { text, tags }
    }
}

/// A token of a sentence after tagging, disambiguation and chunking.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'t> {
    pub word: Word<'t>,
    pub char_span: Range<usize>,
    pub byte_span: Range<usize>,
    pub has_space_before: bool,
    /// The reading chosen by disambiguation. Always one of `word.tags`.
    pub tag: WordData,
    pub chunk: Option<ChunkTag>,
}

impl<'t> Token<'t> {
    pub fn text(&self) -> &'t str {
        self.word.text
    }

    pub fn lower(&self) -> String {
        self.word.text.to_lowercase()
    }

    pub fn pos(&self) -> &str {
        &self.tag.pos
    }

    pub fn lemma(&self) -> &str {
        &self.tag.lemma
    }

    pub fn is_verb(&self) -> bool {
        self.tag.pos.starts_with("VB") || self.tag.pos == "MD"
    }

    pub fn is_noun(&self) -> bool {
        self.tag.pos.starts_with("NN")
    }

    pub fn is_punct(&self, c: &str) -> bool {
        self.word.text == c
    }
}

impl<'t> AsRef<str> for Token<'t> {
    fn as_ref(&self) -> &str {
        self.word.text
    }
}

/// Suggestion for change in a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The ID of the check this suggestion is from.
    pub source: String,
    /// A human-readable message.
    pub message: String,
    /// The start character index (inclusive).
    pub start: usize,
    /// The end character index (exclusive).
    pub end: usize,
    /// The suggested replacement options for the text.
    pub replacements: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_serialize_as_integers() {
        let sentence = LabeledSentence::new("The cat walks .", Label::Correct);
        let json = serde_json::to_string(&sentence).unwrap();
        assert_eq!(json, r#"{"sentence":"The cat walks .","label":1}"#);

        let back: LabeledSentence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sentence);
    }

    #[test]
    fn labels_parse_from_letters() {
        assert_eq!("I".parse::<Label>().unwrap(), Label::Incorrect);
        assert_eq!("C".parse::<Label>().unwrap(), Label::Correct);
        assert_eq!(" 0".parse::<Label>().unwrap(), Label::Incorrect);
        assert!("2".parse::<Label>().is_err());
        assert!(serde_json::from_str::<Label>("3").is_err());
    }

    #[test]
    fn pair_puts_incorrect_first() {
        let [first, second] = SentencePair::new("The cat walk .", "The cat walks .").into_labeled();
        assert_eq!(first.label, Label::Incorrect);
        assert_eq!(second.sentence, "The cat walks .");
    }
}
