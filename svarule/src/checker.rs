//! Rule-based subject-verb agreement checking.
//!
//! The number of the subject of each clause found by the [Parser] is compared with the form of
//! its finite verb:
//!
//! | verb                          | agrees with                    |
//! |-------------------------------|--------------------------------|
//! | `am`                          | `I`                            |
//! | `is`, `has`, `does`, any VBZ  | third person singular          |
//! | `was`                         | singular and `I`               |
//! | `are`, `were`                 | plural                         |
//! | any other VBP                 | plural and `I`                 |
//! | past tense, modals            | everything                     |
//!
//! Subjects coordinated by "and" are plural, for "or" and "nor" the nearest conjunct decides.

use log::debug;
use std::fmt;

use crate::{
    filter::Check,
    metrics::ConfusionMatrix,
    parser::{Clause, Conjunction, Parse, Parser},
    tokenizer::{
        chunk::{ChunkTag, Number},
        inflect::Inflecter,
        Tokenizer,
    },
    types::{Label, LabeledSentence, Suggestion, Token},
    utils,
};

/// The ID of suggestions made by the [AgreementChecker].
pub const SOURCE: &str = "SUBJECT_VERB_AGREEMENT";

/// Grammatical number and person of a subject, as far as verb agreement is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectNumber {
    /// "I"
    FirstSingular,
    Singular,
    /// Includes "you".
    Plural,
}

impl fmt::Display for SubjectNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubjectNumber::FirstSingular => "first person singular",
            SubjectNumber::Singular => "singular",
            SubjectNumber::Plural => "plural",
        })
    }
}

fn head_number(token: &Token) -> SubjectNumber {
    match token.lower().as_str() {
        "i" => return SubjectNumber::FirstSingular,
        "you" | "we" | "they" => return SubjectNumber::Plural,
        _ => {}
    }

    match token.chunk {
        Some(ChunkTag::NounPhrase {
            number: Number::Plural,
            ..
        }) => SubjectNumber::Plural,
        Some(ChunkTag::NounPhrase { .. }) => SubjectNumber::Singular,
        _ if matches!(token.pos(), "NNS" | "NNPS") => SubjectNumber::Plural,
        _ => SubjectNumber::Singular,
    }
}

/// The number of the subject of `clause`.
pub fn subject_number(parse: &Parse, clause: &Clause) -> SubjectNumber {
    if clause.conjunction == Some(Conjunction::And) && clause.heads.len() > 1 {
        return SubjectNumber::Plural;
    }

    let head = match clause.conjunction {
        Some(Conjunction::Or) => clause.heads.last(),
        _ => clause.heads.first(),
    };

    head.map_or(SubjectNumber::Singular, |&i| head_number(&parse.tokens[i]))
}

/// Whether the finite verb `token` agrees with a subject of the given number.
pub fn agrees(token: &Token, number: SubjectNumber) -> bool {
    use SubjectNumber::*;

    match token.lower().as_str() {
        "am" => number == FirstSingular,
        "is" | "has" | "does" => number == Singular,
        "was" => number != Plural,
        "are" | "were" => number == Plural,
        _ => match token.pos() {
            "VBZ" => number == Singular,
            "VBP" => number != Singular,
            _ => true,
        },
    }
}

/// The form of `token` which agrees with a subject of the given number.
pub fn agreeing_form(token: &Token, number: SubjectNumber, inflecter: &Inflecter) -> Option<String> {
    use SubjectNumber::*;

    let lower = token.lower();
    let form = match (lower.as_str(), number) {
        ("am" | "is" | "are", FirstSingular) => "am".to_string(),
        ("am" | "is" | "are", Singular) => "is".to_string(),
        ("am" | "is" | "are", Plural) => "are".to_string(),
        ("was" | "were", Plural) => "were".to_string(),
        ("was" | "were", _) => "was".to_string(),
        ("has" | "have", Singular) => "has".to_string(),
        ("has" | "have", _) => "have".to_string(),
        ("does" | "do", Singular) => "does".to_string(),
        ("does" | "do", _) => "do".to_string(),
        (_, Singular) if token.pos() == "VBP" => inflecter.third_person(&lower),
        (_, FirstSingular) | (_, Plural) if token.pos() == "VBZ" => inflecter.base_form(&lower),
        _ => return None,
    };

    let text = token.text();
    Some(if utils::is_title_case(text) {
        utils::capitalize(&form)
    } else if text.chars().count() > 1 && utils::is_uppercase(text) {
        form.to_uppercase()
    } else {
        form
    })
}

/// A clause whose verb does not agree with its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disagreement<'a> {
    pub clause: &'a Clause,
    pub number: SubjectNumber,
}

/// Results of checking labeled sentences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Accuracy over the sentences which could be parsed.
    pub accuracy: Option<f64>,
    /// Sentences without any clause.
    pub not_parsed: usize,
    pub matrix: ConfusionMatrix,
}

#[derive(Debug, Clone, Default)]
pub struct AgreementChecker {
    parser: Parser,
}

impl AgreementChecker {
    pub fn new(parser: Parser) -> Self {
        AgreementChecker { parser }
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn disagreements<'a>(&self, parse: &'a Parse) -> Vec<Disagreement<'a>> {
        parse
            .clauses
            .iter()
            .filter_map(|clause| {
                let number = subject_number(parse, clause);

                if agrees(&parse.tokens[clause.finite], number) {
                    None
                } else {
                    Some(Disagreement { clause, number })
                }
            })
            .collect()
    }

    /// `Some(Incorrect)` if any clause of the text disagrees, `Some(Correct)` if all clauses
    /// agree and `None` if no clause was found.
    pub fn classify(&self, text: &str, tokenizer: &Tokenizer) -> Option<Label> {
        let parses = self.parser.parse(text, tokenizer);

        if parses.iter().all(|x| x.clauses.is_empty()) {
            debug!("could not parse {:?}", text);
            return None;
        }

        if parses.iter().any(|x| !self.disagreements(x).is_empty()) {
            Some(Label::Incorrect)
        } else {
            Some(Label::Correct)
        }
    }

    /// One suggestion per disagreeing verb which has an agreeing form.
    pub fn suggest(&self, text: &str, tokenizer: &Tokenizer) -> Vec<Suggestion> {
        let inflecter = tokenizer.tagger().inflecter();
        let mut out = Vec::new();

        for parse in self.parser.parse(text, tokenizer) {
            for disagreement in self.disagreements(&parse) {
                let verb = &parse.tokens[disagreement.clause.finite];

                if let Some(replacement) = agreeing_form(verb, disagreement.number, inflecter) {
                    let subjects: Vec<_> = disagreement
                        .clause
                        .heads
                        .iter()
                        .map(|&i| parse.tokens[i].text())
                        .collect();

                    out.push(Suggestion {
                        source: SOURCE.to_string(),
                        message: format!(
                            "The verb '{}' does not agree with the {} subject '{}'.",
                            verb.text(),
                            disagreement.number,
                            subjects.join(", ")
                        ),
                        start: verb.char_span.start,
                        end: verb.char_span.end,
                        replacements: vec![replacement],
                    });
                }
            }
        }

        out.sort_by_key(|x| x.start);
        out
    }

    /// Replaces every disagreeing verb by its agreeing form.
    pub fn correct(&self, text: &str, tokenizer: &Tokenizer) -> String {
        apply_suggestions(text, &self.suggest(text, tokenizer))
    }

    /// Classifies each sentence. Sentences which can not be parsed are counted separately
    /// and do not take part in the accuracy.
    pub fn evaluate(&self, sentences: &[LabeledSentence], tokenizer: &Tokenizer) -> Evaluation {
        let mut evaluation = Evaluation::default();

        for sentence in sentences {
            match self.classify(&sentence.sentence, tokenizer) {
                Some(prediction) => evaluation.matrix.add(sentence.label, prediction),
                None => evaluation.not_parsed += 1,
            }
        }

        evaluation.accuracy = evaluation.matrix.accuracy();
        evaluation
    }
}

impl Check for AgreementChecker {
    fn suggest(&self, text: &str, tokenizer: &Tokenizer) -> Vec<Suggestion> {
        AgreementChecker::suggest(self, text, tokenizer)
    }
}

/// Applies the first replacement of each suggestion. Suggestions must be sorted by start and
/// must not overlap.
pub fn apply_suggestions(text: &str, suggestions: &[Suggestion]) -> String {
    let mut offset: isize = 0;
    let mut chars: Vec<_> = text.chars().collect();

    for suggestion in suggestions {
        let replacement: Vec<_> = match suggestion.replacements.first() {
            Some(x) => x.chars().collect(),
            None => continue,
        };
        chars.splice(
            (suggestion.start as isize + offset) as usize
                ..(suggestion.end as isize + offset) as usize,
            replacement.iter().cloned(),
        );
        offset = offset + replacement.len() as isize - (suggestion.end - suggestion.start) as isize;
    }

    chars.into_iter().collect()
}
