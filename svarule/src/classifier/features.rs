//! Sparse binary features of a sentence.
//!
//! | prefix   | feature                                         |
//! |----------|-------------------------------------------------|
//! | `w:`     | lower-cased word                                |
//! | `b:`     | lower-cased word bigram, `<s>` / `</s>` padded  |
//! | `t:`     | part-of-speech bigram                           |
//! | `sv:`    | subject number and verb form of each clause     |
//! | `agree:` | whether the verb agrees with its subject        |

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    checker::{agrees, subject_number},
    parser::{Parse, Parser},
    tokenizer::Tokenizer,
    types::Token,
};

const START: &str = "<s>";
const END: &str = "</s>";

fn verb_form(token: &Token) -> String {
    match token.lemma() {
        "be" | "have" | "do" => token.lower(),
        _ => token.pos().to_string(),
    }
}

fn parse_features(parse: &Parse, out: &mut Vec<String>) {
    let words: Vec<_> = parse.tokens.iter().map(Token::lower).collect();

    out.extend(words.iter().map(|x| format!("w:{}", x)));
    out.extend(
        std::iter::once(START)
            .chain(words.iter().map(String::as_str))
            .chain(std::iter::once(END))
            .tuple_windows()
            .map(|(a, b)| format!("b:{} {}", a, b)),
    );
    out.extend(
        parse
            .tokens
            .iter()
            .map(Token::pos)
            .tuple_windows()
            .map(|(a, b)| format!("t:{} {}", a, b)),
    );

    if parse.clauses.is_empty() {
        out.push("sv:none".to_string());
    }

    for clause in &parse.clauses {
        let number = subject_number(parse, clause);
        let verb = &parse.tokens[clause.finite];

        out.push(format!("sv:{}|{}", number, verb_form(verb)));
        out.push(format!("agree:{}", agrees(verb, number)));
    }
}

/// The sorted, deduplicated features of `text`.
pub fn extract(text: &str, tokenizer: &Tokenizer, parser: &Parser) -> Vec<String> {
    let mut out = Vec::new();

    for parse in parser.parse(text, tokenizer) {
        parse_features(&parse, &mut out);
    }

    out.sort();
    out.dedup();
    out
}

/// Maps features to weight indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    features: IndexSet<String>,
}

impl Vocabulary {
    /// Keeps the features occurring in at least `min_count` sentences, in order of appearance.
    pub fn build<I>(sentences: I, min_count: usize) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<[String]>,
    {
        let mut counts: IndexMap<String, usize> = IndexMap::new();

        for features in sentences {
            for feature in features.as_ref() {
                *counts.entry(feature.clone()).or_insert(0) += 1;
            }
        }

        Vocabulary {
            features: counts
                .into_iter()
                .filter(|(_, count)| *count >= min_count)
                .map(|(feature, _)| feature)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, feature: &str) -> Option<usize> {
        self.features.get_index_of(feature)
    }

    /// Indices of the known features. Unknown features are dropped.
    pub fn encode(&self, features: &[String]) -> Vec<usize> {
        features.iter().filter_map(|x| self.get(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::en;

    #[test]
    fn extracts_agreement_features() {
        let features = extract("The dogs runs .", &en::tokenizer(), &Parser);

        assert!(features.contains(&"w:dogs".to_string()));
        assert!(features.contains(&"b:<s> the".to_string()));
        assert!(features.contains(&"b:. </s>".to_string()));
        assert!(features.contains(&"t:NNS VBZ".to_string()));
        assert!(features.contains(&"sv:plural|VBZ".to_string()));
        assert!(features.contains(&"agree:false".to_string()));

        let features = extract("The dogs are happy .", &en::tokenizer(), &Parser);
        assert!(features.contains(&"sv:plural|are".to_string()));
        assert!(features.contains(&"agree:true".to_string()));
    }

    #[test]
    fn unparsed_sentences_are_marked() {
        let features = extract("Under the bridge .", &en::tokenizer(), &Parser);
        assert!(features.contains(&"sv:none".to_string()));
        assert!(!features.iter().any(|x| x.starts_with("agree:")));
    }

    #[test]
    fn vocabulary_respects_min_count() {
        let sentences = vec![
            vec!["w:a".to_string(), "w:b".to_string()],
            vec!["w:b".to_string(), "w:c".to_string()],
        ];

        let vocabulary = Vocabulary::build(&sentences, 2);
        assert_eq!(vocabulary.len(), 1);
        assert_eq!(vocabulary.get("w:b"), Some(0));

        let vocabulary = Vocabulary::build(&sentences, 1);
        assert_eq!(
            vocabulary.encode(&["w:c".to_string(), "w:x".to_string(), "w:a".to_string()]),
            vec![2, 0]
        );
    }
}
