//! Splits text into sentences and tokens and analyzes the tokens.
//!
//! Analysis runs in three steps: [tagging][tag::Tagger], [disambiguation][disambiguate::disambiguate]
//! and [chunking][chunk::Chunker].

use serde::{Deserialize, Serialize};
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

pub mod chunk;
pub mod disambiguate;
pub mod inflect;
pub mod tag;

use chunk::Chunker;
use tag::Tagger;

use crate::{
    component::Component,
    types::{Token, Word},
};

// see https://stackoverflow.com/a/40296745
fn split<F>(text: &str, split_func: F) -> Vec<&str>
where
    F: Fn(char) -> bool,
{
    let mut result = Vec::new();
    let mut last = 0;
    for (index, matched) in text.match_indices(split_func) {
        if last != index {
            result.push(&text[last..index]);
        }
        result.push(matched);
        last = index + matched.len();
    }
    if last < text.len() {
        result.push(&text[last..]);
    }

    result
}

fn get_token_strs(text: &str) -> Vec<&str> {
    split(text, |c: char| {
        c.is_whitespace() || crate::utils::splitting_chars().contains(c)
    })
}

/// A token which has been tagged but not yet disambiguated.
#[derive(Debug, Clone, PartialEq)]
pub struct IncompleteToken<'t> {
    pub word: Word<'t>,
    pub char_span: Range<usize>,
    pub byte_span: Range<usize>,
    pub has_space_before: bool,
    pub is_sentence_start: bool,
}

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct Tokenizer {
    tagger: Tagger,
    chunker: Chunker,
}

impl Component for Tokenizer {
    fn name() -> &'static str {
        "tokenizer"
    }
}

impl Tokenizer {
    pub fn new(tagger: Tagger, chunker: Chunker) -> Self {
        Tokenizer { tagger, chunker }
    }

    pub fn tagger(&self) -> &Tagger {
        &self.tagger
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Splits a text into trimmed, non-empty sentences.
    pub fn sentences<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|x| !x.is_empty())
    }

    /// Tags the tokens of `sentence` without choosing a reading.
    /// Spans are relative to `text`, which `sentence` must be a slice of.
    fn tag<'t>(&self, text: &'t str, sentence: &'t str) -> Vec<IncompleteToken<'t>> {
        let text_start = text.as_ptr() as usize;
        let mut current_char = text[..sentence.as_ptr() as usize - text_start]
            .chars()
            .count();
        let mut is_first = true;

        get_token_strs(sentence)
            .into_iter()
            .filter_map(|x| {
                let char_start = current_char;
                current_char += x.chars().count();

                if x.trim().is_empty() {
                    return None;
                }

                let byte_start = x.as_ptr() as usize - text_start;
                let is_sentence_start = is_first;
                is_first = false;

                Some(IncompleteToken {
                    word: Word::new_with_tags(x, self.tagger.get_tags(x, is_sentence_start)),
                    char_span: char_start..current_char,
                    byte_span: byte_start..byte_start + x.len(),
                    has_space_before: text[..byte_start].ends_with(char::is_whitespace),
                    is_sentence_start,
                })
            })
            .collect()
    }

    fn analyze<'t>(&self, text: &'t str, sentence: &'t str) -> Vec<Token<'t>> {
        let mut tokens = disambiguate::disambiguate(self.tag(text, sentence));
        self.chunker.apply(&mut tokens);
        tokens
    }

    /// Analyzes a text which is known to be a single sentence.
    pub fn tokenize_sentence<'t>(&self, sentence: &'t str) -> Vec<Token<'t>> {
        self.analyze(sentence, sentence)
    }

    /// Splits a text into sentences and analyzes each of them.
    /// Spans are relative to the whole text.
    pub fn tokenize<'t>(&self, text: &'t str) -> Vec<Vec<Token<'t>>> {
        self.sentences(text)
            .map(|sentence| self.analyze(text, sentence))
            .filter(|tokens| !tokens.is_empty())
            .collect()
    }
}
