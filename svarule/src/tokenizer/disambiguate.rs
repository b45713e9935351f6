//! Chooses one reading per token from the candidates assigned by the [Tagger][super::tag::Tagger].
//!
//! A single left-to-right pass: each decision only looks at the readings already chosen to the left
//! and at the candidates of the next token.

use super::IncompleteToken;
use crate::types::{Token, WordData};

const NOMINAL_CONTEXT: &[&str] = &["DT", "PDT", "PRP$", "WP$", "JJ", "JJR", "JJS", "CD", "POS"];
const SUBJECT_CONTEXT: &[&str] = &["NN", "NNS", "NNP", "NNPS", "PRP", "WDT", "WP", "EX"];

const AT_START: &[&str] = &[
    "DT", "PRP", "EX", "NN", "NNS", "NNP", "NNPS", "JJ", "RB", "IN", "WRB", "VB",
];
const AFTER_DETERMINER: &[&str] = &[
    "NN", "NNS", "NNP", "NNPS", "JJ", "JJR", "JJS", "CD", "VBG", "VBN",
];
const AFTER_MODAL: &[&str] = &["VB", "VBP", "RB"];
const AFTER_TO: &[&str] = &["VB", "VBP", "DT", "PRP$", "NN", "NNS", "NNP", "PRP"];
const AFTER_SUBJECT: &[&str] = &[
    "VBZ", "VBP", "VBD", "MD", "VB", "VBN", "RB", "IN", "NN", "NNS",
];
const AFTER_AUXILIARY: &[&str] = &[
    "VBN", "VBG", "VB", "JJ", "RB", "DT", "PRP$", "NN", "NNS", "PRP",
];
const AFTER_VERB: &[&str] = &[
    "DT", "PRP$", "JJ", "NN", "NNS", "NNP", "NNPS", "PRP", "CD", "RB", "IN", "TO", "VBG", "VBN",
];
const AFTER_PREPOSITION: &[&str] = &[
    "DT", "PRP$", "NN", "NNS", "NNP", "NNPS", "JJ", "PRP", "CD", "VBG",
];

fn pick(tags: &[WordData], preferences: &[&str]) -> Option<usize> {
    preferences
        .iter()
        .find_map(|pos| tags.iter().position(|x| x.pos == *pos))
}

fn is_noun_like(pos: &str) -> bool {
    pos.starts_with("NN") || pos == "PRP"
}

fn is_verb(pos: &str) -> bool {
    pos.starts_with("VB") || pos == "MD"
}

/// Index of the closest chosen reading before `i` which is not an adverb.
fn previous(chosen: &[WordData], i: usize) -> Option<usize> {
    (0..i).rev().find(|&j| chosen[j].pos != "RB")
}

fn preferences<'a>(
    prev: Option<&'a WordData>,
    before_conjunction: Option<&'a WordData>,
) -> std::borrow::Cow<'a, [&'a str]> {
    use std::borrow::Cow;

    let prev = match prev {
        Some(prev) => prev,
        None => return Cow::Borrowed(AT_START),
    };
    let pos = prev.pos.as_str();

    if pos == "CC" {
        return match before_conjunction {
            Some(data) if is_noun_like(&data.pos) => Cow::Borrowed(AFTER_PREPOSITION),
            Some(data) if is_verb(&data.pos) => {
                Cow::Owned(vec![data.pos.as_str(), "VBZ", "VBP", "VBD", "VB"])
            }
            Some(data) if data.pos == "JJ" => Cow::Borrowed(AFTER_DETERMINER),
            _ => Cow::Borrowed(AT_START),
        };
    }

    Cow::Borrowed(if NOMINAL_CONTEXT.contains(&pos) {
        AFTER_DETERMINER
    } else if pos == "MD" {
        AFTER_MODAL
    } else if pos == "TO" {
        AFTER_TO
    } else if SUBJECT_CONTEXT.contains(&pos) {
        AFTER_SUBJECT
    } else if is_verb(pos) && matches!(prev.lemma.as_str(), "be" | "have" | "do") {
        AFTER_AUXILIARY
    } else if is_verb(pos) {
        AFTER_VERB
    } else if pos == "IN" {
        AFTER_PREPOSITION
    } else {
        AT_START
    })
}

/// "that" is a relative pronoun after a noun phrase when a verb follows, a determiner
/// before a noun and a complementizer otherwise.
fn choose_that(tags: &[WordData], prev: Option<&WordData>, next: Option<&[WordData]>) -> Option<usize> {
    let next_has = |f: fn(&str) -> bool| next.map_or(false, |tags| tags.iter().any(|x| f(&x.pos)));

    let pos = match prev {
        Some(prev)
            if is_noun_like(&prev.pos) && next_has(|pos| is_verb(pos) || pos == "RB") =>
        {
            "WDT"
        }
        _ if next_has(|pos| pos.starts_with("NN") || pos.starts_with("JJ") || pos == "CD") => {
            "DT"
        }
        None => "DT",
        _ => "IN",
    };

    pick(tags, &[pos])
}

pub fn disambiguate<'t>(tokens: Vec<IncompleteToken<'t>>) -> Vec<Token<'t>> {
    let mut chosen: Vec<WordData> = Vec::with_capacity(tokens.len());

    for i in 0..tokens.len() {
        let tags = &tokens[i].word.tags;

        let index = if tags.len() == 1 {
            0
        } else {
            let prev = previous(&chosen, i);
            let before_conjunction = prev.and_then(|j| previous(&chosen, j));
            let next = tokens.get(i + 1).map(|x| x.word.tags.as_slice());

            let choice = if tokens[i].word.text.eq_ignore_ascii_case("that") {
                choose_that(tags, prev.map(|j| &chosen[j]), next)
            } else {
                pick(
                    tags,
                    &preferences(
                        prev.map(|j| &chosen[j]),
                        before_conjunction.map(|j| &chosen[j]),
                    ),
                )
            };

            choice.unwrap_or(0)
        };

        chosen.push(tags[index].clone());
    }

    tokens
        .into_iter()
        .zip(chosen)
        .map(|(token, tag)| Token {
            word: token.word,
            char_span: token.char_span,
            byte_span: token.byte_span,
            has_space_before: token.has_space_before,
            tag,
            chunk: None,
        })
        .collect()
}
