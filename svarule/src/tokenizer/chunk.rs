//! Groups tagged tokens into noun phrases, verb groups and prepositions.
//!
//! Chunks are stored on the tokens in the usual `B-NP-singular` / `I-NP-plural` / `E-NP-singular`,
//! `B-VP` / `I-VP` and `B-PP` notation. A one-token noun phrase is both `B-` and `E-`.

use serde::{Deserialize, Serialize};
use std::{fmt, ops::Range};

use crate::types::Token;

/// Grammatical number of a noun phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Number {
    Singular,
    Plural,
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Number::Singular => "singular",
            Number::Plural => "plural",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkTag {
    NounPhrase { begin: bool, end: bool, number: Number },
    VerbPhrase { begin: bool },
    PrepPhrase,
}

impl ChunkTag {
    pub fn labels(&self) -> Vec<String> {
        match self {
            ChunkTag::NounPhrase { begin, end, number } => {
                let mut out = Vec::new();

                if *begin {
                    out.push(format!("B-NP-{}", number));
                }
                if *end {
                    out.push(format!("E-NP-{}", number));
                }
                if out.is_empty() {
                    out.push(format!("I-NP-{}", number));
                }

                out
            }
            ChunkTag::VerbPhrase { begin: true } => vec!["B-VP".into()],
            ChunkTag::VerbPhrase { begin: false } => vec!["I-VP".into()],
            ChunkTag::PrepPhrase => vec!["B-PP".into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    NounPhrase(Number),
    VerbPhrase,
    PrepPhrase,
}

/// A chunk as a range of token indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    pub range: Range<usize>,
}

const NP_START: &[&str] = &["DT", "PDT", "PRP$", "WP$", "CD", "JJ", "JJR", "JJS"];
const NP_INNER: &[&str] = &["CD", "JJ", "JJR", "JJS", "POS"];
const PLURAL_PRONOUNS: &[&str] = &["we", "they", "you", "these", "those"];
const PLURAL_DETERMINERS: &[&str] = &["these", "those", "both", "all", "many", "several", "few"];

fn is_auxiliary(token: &Token) -> bool {
    token.pos() == "MD" || matches!(token.lemma(), "be" | "have" | "do")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chunker;

impl Chunker {
    /// Sets the chunk of every token that is part of a noun phrase, verb group or prepositional phrase.
    pub fn apply(&self, tokens: &mut [Token]) {
        let mut i = 0;

        while i < tokens.len() {
            if let Some((end, number)) = self.noun_phrase_at(tokens, i) {
                for (j, token) in tokens[i..end].iter_mut().enumerate() {
                    token.chunk = Some(ChunkTag::NounPhrase {
                        begin: j == 0,
                        end: i + j == end - 1,
                        number,
                    });
                }
                i = end;
            } else if tokens[i].is_verb() {
                let end = self.verb_group_end(tokens, i);
                for (j, token) in tokens[i..end].iter_mut().enumerate() {
                    token.chunk = Some(ChunkTag::VerbPhrase { begin: j == 0 });
                }
                i = end;
            } else {
                if matches!(tokens[i].pos(), "IN" | "TO") {
                    tokens[i].chunk = Some(ChunkTag::PrepPhrase);
                }
                i += 1;
            }
        }
    }

    fn noun_phrase_at(&self, tokens: &[Token], start: usize) -> Option<(usize, Number)> {
        let first = &tokens[start];

        if matches!(first.pos(), "PRP" | "EX") {
            let number = if PLURAL_PRONOUNS.contains(&first.lower().as_str()) {
                Number::Plural
            } else {
                Number::Singular
            };
            return Some((start + 1, number));
        }

        if !first.is_noun() && !NP_START.contains(&first.pos()) {
            return None;
        }

        let mut end = start;
        let mut head = None;

        while end < tokens.len() {
            let token = &tokens[end];

            if token.is_noun() {
                head = Some(end);
            } else if head.is_some() {
                break;
            } else if !(NP_START.contains(&token.pos()) || NP_INNER.contains(&token.pos())) {
                break;
            }

            end += 1;
        }

        let number = match head {
            Some(head) => match tokens[head].pos() {
                "NNS" | "NNPS" => Number::Plural,
                _ => Number::Singular,
            },
            // determiners used as pronouns e. g. "these are", "one of"
            None if end > start && tokens[start..end].iter().all(|x| x.pos() != "JJ") => {
                if PLURAL_DETERMINERS.contains(&tokens[start].lower().as_str()) {
                    Number::Plural
                } else if tokens[start].pos() == "CD" && tokens[start].lower() != "one" {
                    Number::Plural
                } else {
                    Number::Singular
                }
            }
            None => return None,
        };

        Some((end, number))
    }

    fn verb_group_end(&self, tokens: &[Token], start: usize) -> usize {
        let mut end = start + 1;
        let mut last_verb = start;

        while end < tokens.len() && is_auxiliary(&tokens[last_verb]) {
            let token = &tokens[end];

            if token.is_verb() {
                last_verb = end;
            } else if token.pos() != "RB" {
                break;
            }
            end += 1;
        }

        // trailing adverbs belong to the clause, not to the verb group
        last_verb + 1
    }
}

/// Reads the chunks back from tokens that went through a [Chunker].
pub fn spans(tokens: &[Token]) -> Vec<Chunk> {
    let mut out: Vec<Chunk> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match token.chunk {
            Some(ChunkTag::NounPhrase { begin, number, .. }) => {
                if begin {
                    out.push(Chunk {
                        kind: ChunkKind::NounPhrase(number),
                        range: i..i + 1,
                    });
                } else if let Some(last) = out.last_mut() {
                    last.range.end = i + 1;
                }
            }
            Some(ChunkTag::VerbPhrase { begin }) => {
                if begin {
                    out.push(Chunk {
                        kind: ChunkKind::VerbPhrase,
                        range: i..i + 1,
                    });
                } else if let Some(last) = out.last_mut() {
                    last.range.end = i + 1;
                }
            }
            Some(ChunkTag::PrepPhrase) => out.push(Chunk {
                kind: ChunkKind::PrepPhrase,
                range: i..i + 1,
            }),
            None => {}
        }
    }

    out
}
