//! Finds the finite verbs of a sentence and the subjects they have to agree with.
//!
//! The parser works on chunked tokens. A clause is a subject (one or more coordinated noun
//! phrases) followed by post-modifiers and a verb group:
//!
//! ```text
//! [leading clause ,] subject [, subject]* [and|or|nor subject] [modifier]* VERB-GROUP ...
//! ```
//!
//! Post-modifiers are adverbs, prepositional phrases, relative clauses, participles and comma
//! delimited insertions. Coordinated verbs share the subject of the clause before them,
//! coordinated and subordinate clauses after the verb group get their own subject.

use fs_err::File;
use indexmap::IndexMap;
use log::{debug, info};
use std::io::BufWriter;
use std::ops::Range;
use std::path::Path;

use crate::{
    dataset,
    tokenizer::{chunk::ChunkTag, Tokenizer},
    types::Token,
    Error,
};

const SUBORDINATORS: &[&str] = &[
    "because", "when", "although", "though", "after", "before", "since", "if", "while", "unless",
    "until", "once", "whereas", "as",
];
const RELATIVIZERS: &[&str] = &["that", "which", "who", "whom", "whose"];
const CLAUSE_CONJUNCTIONS: &[&str] = &["and", "but", "or", "so", "yet", "nor"];

/// How coordinated subjects are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Main,
    /// A verb coordinated with the verb of the previous clause, sharing its subject.
    CoordinatedVerb,
    /// A clause with its own subject after a conjunction.
    Coordinated,
    /// A clause introduced by a subordinating conjunction.
    Subordinate,
}

/// A subject and its verb group. All indices refer to the tokens of the [Parse].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub kind: ClauseKind,
    /// The noun phrases of the subject, more than one if they are coordinated.
    pub subjects: Vec<Range<usize>>,
    /// The head of each subject noun phrase.
    pub heads: Vec<usize>,
    pub conjunction: Option<Conjunction>,
    pub verb_group: Range<usize>,
    /// The verb which has to agree with the subject.
    pub finite: usize,
}

/// The analysis of one sentence.
#[derive(Debug, Clone)]
pub struct Parse<'t> {
    pub sentence: &'t str,
    pub tokens: Vec<Token<'t>>,
    pub clauses: Vec<Clause>,
}

fn is_finite(token: &Token) -> bool {
    matches!(token.pos(), "VBZ" | "VBP" | "VBD" | "MD")
}

/// A base form heading the verb group of a clause with a subject is a present tense verb,
/// unless it follows a modal or `to`.
fn make_finite(tokens: &mut [Token], clause: &Clause) {
    let i = clause.finite;
    if i != clause.verb_group.start || tokens[i].pos() != "VB" {
        return;
    }
    if let Some(j) = (0..i).rev().find(|&j| tokens[j].pos() != "RB") {
        if matches!(tokens[j].pos(), "MD" | "TO") {
            return;
        }
    }

    let token = &mut tokens[i];
    if let Some(data) = token.word.tags.iter().find(|x| x.pos == "VBP") {
        token.tag = data.clone();
    }
}

fn is_auxiliary(token: &Token) -> bool {
    token.pos() == "MD" || matches!(token.lemma(), "be" | "have" | "do")
}

fn is_word(token: &Token, words: &[&str]) -> bool {
    words.contains(&token.lower().as_str())
}

fn skip_adverbs(tokens: &[Token], mut i: usize) -> usize {
    while i < tokens.len() && tokens[i].pos() == "RB" {
        i += 1;
    }
    i
}

/// End of the noun phrase containing the token at `start`.
fn noun_phrase_end(tokens: &[Token], start: usize) -> Option<usize> {
    match tokens.get(start)?.chunk {
        Some(ChunkTag::NounPhrase { .. }) => {
            let mut end = start + 1;
            while let Some(Some(ChunkTag::NounPhrase { begin: false, .. })) =
                tokens.get(end).map(|x| x.chunk)
            {
                end += 1;
            }
            Some(end)
        }
        _ => None,
    }
}

/// The last noun of the phrase, or its last token.
fn head(tokens: &[Token], range: &Range<usize>) -> usize {
    range
        .clone()
        .rev()
        .find(|&i| tokens[i].is_noun() || matches!(tokens[i].pos(), "PRP" | "EX"))
        .unwrap_or(range.end - 1)
}

fn verb_group_end(tokens: &[Token], start: usize) -> usize {
    let mut end = start + 1;
    while let Some(Some(ChunkTag::VerbPhrase { begin: false })) = tokens.get(end).map(|x| x.chunk)
    {
        end += 1;
    }
    end
}

/// Skips a noun phrase and phrases coordinated with it.
fn skip_noun_phrases(tokens: &[Token], mut i: usize) -> usize {
    if let Some(end) = noun_phrase_end(tokens, i) {
        i = end;

        while i < tokens.len() && tokens[i].pos() == "CC" {
            match noun_phrase_end(tokens, i + 1) {
                Some(end) => i = end,
                None => break,
            }
        }
    }
    i
}

fn skip_prepositional_phrases(tokens: &[Token], mut i: usize) -> usize {
    while i < tokens.len()
        && matches!(tokens[i].pos(), "IN" | "TO")
        && noun_phrase_end(tokens, i + 1).is_some()
    {
        i = skip_noun_phrases(tokens, i + 1);
    }
    i
}

/// Skips the rest of a verb phrase: the verb group, an object and prepositional phrases.
fn skip_verb_phrase(tokens: &[Token], i: usize) -> usize {
    let i = skip_adverbs(tokens, verb_group_end(tokens, i));
    let i = skip_noun_phrases(tokens, i);
    skip_adverbs(tokens, skip_prepositional_phrases(tokens, i))
}

fn has_finite_verb(tokens: &[Token], from: usize) -> bool {
    tokens.iter().skip(from).any(is_finite)
}

struct Subject {
    ranges: Vec<Range<usize>>,
    conjunction: Option<Conjunction>,
    end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Parser;

impl Parser {
    /// A subject starting at `start` including coordinated noun phrases.
    fn subject_at(&self, tokens: &[Token], start: usize) -> Option<Subject> {
        let first = noun_phrase_end(tokens, start)?;
        let mut ranges = vec![start..first];
        let mut conjunction = None;
        let mut i = first;

        while let Some(token) = tokens.get(i) {
            let next = match noun_phrase_end(tokens, i + 1) {
                Some(next) => next,
                None => break,
            };

            if token.pos() == "CC" {
                conjunction = match token.lower().as_str() {
                    "and" => Some(Conjunction::And),
                    "or" | "nor" => Some(Conjunction::Or),
                    _ => break,
                };
            } else if !token.is_punct(",") {
                break;
            }

            ranges.push(i + 1..next);
            i = next;
        }

        // without a conjunction, comma separated phrases are appositions
        if conjunction.is_none() {
            ranges.truncate(1);
            i = first;
        }

        Some(Subject {
            ranges,
            conjunction,
            end: i,
        })
    }

    /// Skips everything between the subject and its verb.
    fn skip_modifiers(&self, tokens: &[Token], mut i: usize) -> usize {
        while let Some(token) = tokens.get(i) {
            if token.pos() == "RB" {
                i += 1;
            } else if is_word(token, RELATIVIZERS) {
                i = skip_noun_phrases(tokens, i + 1);
                i = skip_adverbs(tokens, i);

                if tokens.get(i).map_or(false, Token::is_verb) {
                    i = skip_verb_phrase(tokens, i);
                }
            } else if matches!(token.pos(), "IN" | "TO") && !is_word(token, SUBORDINATORS) {
                if noun_phrase_end(tokens, i + 1).is_none() {
                    break;
                }
                i = skip_noun_phrases(tokens, i + 1);
            } else if token.is_punct(",") {
                let close = match tokens[i + 1..].iter().position(|x| x.is_punct(",")) {
                    Some(offset) => i + 1 + offset,
                    None => break,
                };
                let after = skip_adverbs(tokens, close + 1);

                if !tokens.get(after).map_or(false, is_finite) {
                    break;
                }
                i = close + 1;
            } else if matches!(token.pos(), "VBG" | "VBN") && has_finite_verb(tokens, i + 1) {
                i = skip_verb_phrase(tokens, i);
            } else {
                break;
            }
        }

        i
    }

    fn verb_clause(
        &self,
        tokens: &[Token],
        kind: ClauseKind,
        subject: Subject,
        verb: usize,
    ) -> Clause {
        let end = verb_group_end(tokens, verb);
        let finite = (verb..end)
            .find(|&i| is_finite(&tokens[i]))
            .unwrap_or(verb);

        Clause {
            kind,
            heads: subject.ranges.iter().map(|x| head(tokens, x)).collect(),
            subjects: subject.ranges,
            conjunction: subject.conjunction,
            verb_group: verb..end,
            finite,
        }
    }

    /// A clause whose subject starts right at `start` (after adverbs).
    fn strict_clause_at(&self, tokens: &[Token], start: usize, kind: ClauseKind) -> Option<Clause> {
        let start = skip_adverbs(tokens, start);

        // existential "there": the subject follows the verb
        if tokens.get(start)?.pos() == "EX" && tokens.get(start + 1).map_or(false, Token::is_verb) {
            let verb = start + 1;
            let subject_start = skip_adverbs(tokens, verb_group_end(tokens, verb));
            let subject = self.subject_at(tokens, subject_start)?;

            return Some(self.verb_clause(tokens, kind, subject, verb));
        }

        let subject = self.subject_at(tokens, start)?;
        let verb = self.skip_modifiers(tokens, subject.end);

        if !tokens.get(verb)?.is_verb() {
            return None;
        }

        Some(self.verb_clause(tokens, kind, subject, verb))
    }

    /// The first main clause at or after `start` plus clauses before it which are cut off by a comma.
    fn main_clause_at(&self, tokens: &[Token], start: usize) -> Vec<Clause> {
        let mut i = start;
        while i < tokens.len()
            && (matches!(tokens[i].pos(), "RB" | "CC" | "UH")
                || !tokens[i].text().chars().any(char::is_alphanumeric))
        {
            i += 1;
        }

        let mut out = Vec::new();

        if let Some(token) = tokens.get(i) {
            if matches!(token.pos(), "IN" | "TO" | "WRB") {
                let comma = tokens[i..].iter().position(|x| x.is_punct(",")).map(|x| x + i);

                match comma {
                    Some(comma) => {
                        if is_word(token, SUBORDINATORS) {
                            out.extend(self.strict_clause_at(
                                &tokens[..comma],
                                i + 1,
                                ClauseKind::Subordinate,
                            ));
                        }
                        i = comma + 1;
                    }
                    None if is_word(token, SUBORDINATORS) => i += 1,
                    None => i = skip_prepositional_phrases(tokens, i),
                }
            }
        }

        if let Some(clause) = self.strict_clause_at(tokens, i, ClauseKind::Main) {
            out.push(clause);
        }
        out
    }

    /// Finds all clauses of a tokenized sentence.
    pub fn clauses(&self, tokens: &[Token]) -> Vec<Clause> {
        let mut clauses = self.main_clause_at(tokens, 0);

        let mut i = match clauses.last() {
            Some(clause) if clause.kind == ClauseKind::Main => clause.verb_group.end,
            _ => return clauses,
        };

        while i < tokens.len() {
            let token = &tokens[i];
            let is_conjunction = token.pos() == "CC" && is_word(token, CLAUSE_CONJUNCTIONS);

            if is_conjunction || token.is_punct(";") {
                let next = skip_adverbs(tokens, i + 1);

                if is_conjunction && tokens.get(next).map_or(false, is_finite) {
                    if let Some(previous) = clauses.last() {
                        let subject = Subject {
                            ranges: previous.subjects.clone(),
                            conjunction: previous.conjunction,
                            end: next,
                        };
                        let clause =
                            self.verb_clause(tokens, ClauseKind::CoordinatedVerb, subject, next);
                        i = clause.verb_group.end;
                        clauses.push(clause);
                        continue;
                    }
                }

                if let Some(clause) = self.strict_clause_at(tokens, next, ClauseKind::Coordinated) {
                    i = clause.verb_group.end;
                    clauses.push(clause);
                    continue;
                }
            } else if token.pos() == "IN" && is_word(token, SUBORDINATORS) {
                if let Some(clause) = self.strict_clause_at(tokens, i + 1, ClauseKind::Subordinate) {
                    i = clause.verb_group.end;
                    clauses.push(clause);
                    continue;
                }
            }

            i += 1;
        }

        clauses
    }

    pub fn parse_tokens<'t>(&self, sentence: &'t str, mut tokens: Vec<Token<'t>>) -> Parse<'t> {
        let clauses = self.clauses(&tokens);
        for clause in &clauses {
            make_finite(&mut tokens, clause);
        }
        debug!("{} clauses in {:?}", clauses.len(), sentence);

        Parse {
            sentence,
            tokens,
            clauses,
        }
    }

    /// Parses each sentence of `text`. Token spans are relative to `text`.
    pub fn parse<'t>(&self, text: &'t str, tokenizer: &Tokenizer) -> Vec<Parse<'t>> {
        tokenizer
            .tokenize(text)
            .into_iter()
            .filter_map(|tokens| {
                let start = tokens.first()?.byte_span.start;
                let end = tokens.last()?.byte_span.end;

                Some(self.parse_tokens(&text[start..end], tokens))
            })
            .collect()
    }
}

impl<'t> Parse<'t> {
    /// The auxiliaries of the verb group joined by spaces, the verb itself if there are none.
    pub fn main_verb(&self, clause: &Clause) -> String {
        let group = &self.tokens[clause.verb_group.clone()];
        let last_verb = group.iter().rposition(Token::is_verb).unwrap_or(0);

        let auxiliaries: Vec<_> = group[..last_verb]
            .iter()
            .filter(|x| x.is_verb() && is_auxiliary(x))
            .map(Token::text)
            .collect();

        if auxiliaries.is_empty() {
            group[last_verb].text().to_string()
        } else {
            auxiliaries.join(" ")
        }
    }

    /// Maps the main verb of each clause to the heads of its subjects.
    pub fn verb_subjects(&self) -> IndexMap<String, Vec<String>> {
        let mut out = IndexMap::new();

        for clause in &self.clauses {
            out.insert(
                self.main_verb(clause),
                clause
                    .heads
                    .iter()
                    .map(|&i| self.tokens[i].text().to_string())
                    .collect(),
            );
        }

        out
    }
}

/// Renders a verb-subject map as `verb: subject, subject; verb: subject`.
pub fn format_verb_subjects(map: &IndexMap<String, Vec<String>>) -> String {
    map.iter()
        .map(|(verb, subjects)| format!("{}: {}", verb, subjects.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parses every sentence of a JSON dataset and writes a CSV with the columns
/// `sentence`, `label` and `verb_subject_map`. There is one row per parsed sentence, and each
/// row holds the whole dataset entry.
pub fn parse_json_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    parser: &Parser,
    tokenizer: &Tokenizer,
) -> Result<usize, Error> {
    let data = dataset::read_json(input.as_ref())?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(File::create(output.as_ref())?));
    let mut rows = 0;

    writer.write_record(&["sentence", "label", "verb_subject_map"])?;

    for entry in &data {
        let label = entry.label.to_string();

        for parse in parser.parse(&entry.sentence, tokenizer) {
            let verb_subjects = format_verb_subjects(&parse.verb_subjects());
            writer.write_record(&[
                entry.sentence.as_str(),
                label.as_str(),
                verb_subjects.as_str(),
            ])?;
            rows += 1;
        }
    }

    writer.flush()?;
    info!(
        "Parsed {} sentences, results saved to {}",
        rows,
        output.as_ref().display()
    );

    Ok(rows)
}
