//! Generates synthetic sentence pairs which only differ in the number of the main verb.
//!
//! Sentences follow the template
//!
//! ```text
//! [subordinate ,] subject [relative] [adverb] VERB [adverb] [object] [prepositional] [subordinate] .
//! ```
//!
//! where every part in brackets is optional. The sentence is already tokenized: the comma and
//! the period are separate tokens.

use log::info;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::{
    tokenizer::inflect::Inflecter,
    types::SentencePair,
    utils,
    words::{PartOfSpeech, Words},
};

pub const ADVERBS: &[&str] = &[
    "quickly",
    "slowly",
    "silently",
    "loudly",
    "sadly",
    "happily",
    "gracefully",
    "barely",
    "rarely",
    "often",
    "always",
    "never",
    "sometimes",
    "suddenly",
    "eagerly",
    "quietly",
];

pub const PREPOSITIONS: &[&str] = &[
    "in", "on", "under", "beside", "near", "around", "behind", "inside", "on top of", "of", "over",
    "at", "to", "next to", "by", "onto", "into", "up to",
];

pub const CONNECTORS: &[&str] = &["because", "when", "although", "after", "before", "since"];

/// Probabilities of the optional parts of a generated sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub adjective: f64,
    pub adverb: f64,
    pub adverb_before_verb: f64,
    pub plural_subject: f64,
    pub coordinated_subject: f64,
    pub object: f64,
    pub coordinated_object: f64,
    pub prepositional_phrase: f64,
    pub relative_clause: f64,
    pub relative_clause_object: f64,
    pub subordinate_clause: f64,
    pub subordinate_clause_first: f64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            adjective: 0.4,
            adverb: 0.4,
            adverb_before_verb: 0.5,
            plural_subject: 0.5,
            coordinated_subject: 0.3,
            object: 0.75,
            coordinated_object: 0.25,
            prepositional_phrase: 0.5,
            relative_clause: 0.4,
            relative_clause_object: 0.5,
            subordinate_clause: 0.4,
            subordinate_clause_first: 0.4,
        }
    }
}

/// `gen_bool` with the probability clamped to [0, 1].
fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen_bool(probability.max(0.).min(1.))
}

/// The parts of a sentence except the main verb.
#[derive(Debug, Clone, Default)]
struct Parts {
    subject: String,
    relative: Option<String>,
    adverb: Option<&'static str>,
    object: Option<String>,
    prepositional: Option<String>,
    subordinate: Option<String>,
}

impl Parts {
    /// Joins the parts around `verb`. The placement of the subordinate clause and the adverb
    /// only depends on `layout_seed`, so both sentences of a pair get the same layout.
    fn build(&self, verb: &str, layout_seed: u64, options: &GeneratorOptions) -> String {
        let mut rng = ChaCha8Rng::seed_from_u64(layout_seed);
        let mut parts: Vec<&str> = Vec::new();

        let subordinate_first =
            self.subordinate.is_some() && chance(&mut rng, options.subordinate_clause_first);
        let adverb_first = self.adverb.is_some() && chance(&mut rng, options.adverb_before_verb);

        if subordinate_first {
            parts.extend(self.subordinate.as_deref());
            parts.push(",");
        }

        parts.push(&self.subject);
        parts.extend(self.relative.as_deref());

        if adverb_first {
            parts.extend(self.adverb);
        }
        parts.push(verb);
        if !adverb_first {
            parts.extend(self.adverb);
        }

        parts.extend(self.object.as_deref());
        parts.extend(self.prepositional.as_deref());

        if !subordinate_first {
            parts.extend(self.subordinate.as_deref());
        }

        parts.push(".");
        utils::capitalize(&parts.join(" "))
    }
}

/// Draws random sentence pairs from word lists.
#[derive(Debug, Clone)]
pub struct Generator {
    words: Words,
    inflecter: Inflecter,
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(words: Words, inflecter: Inflecter, options: GeneratorOptions) -> Self {
        Generator {
            words,
            inflecter,
            options,
        }
    }

    /// A random noun as (singular, plural).
    fn noun<R: Rng + ?Sized>(&self, rng: &mut R) -> (String, String) {
        let noun = self.words.random(PartOfSpeech::Noun, rng);
        (noun.to_string(), self.inflecter.plural(noun))
    }

    /// A random verb as (third person singular, base form).
    fn verb<R: Rng + ?Sized>(&self, rng: &mut R) -> (String, String) {
        let verb = self.words.random(PartOfSpeech::Verb, rng);
        (self.inflecter.third_person(verb), verb.to_string())
    }

    fn adjective<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        if chance(rng, self.options.adjective) {
            Some(self.words.random(PartOfSpeech::Adjective, rng).to_string())
        } else {
            None
        }
    }

    fn adverb<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'static str> {
        if chance(rng, self.options.adverb) {
            ADVERBS.choose(rng).copied()
        } else {
            None
        }
    }

    fn simple_noun_phrase<R: Rng + ?Sized>(&self, rng: &mut R, plural: bool) -> String {
        let (singular, plural_form) = self.noun(rng);
        let noun = if plural { plural_form } else { singular };

        match self.adjective(rng) {
            Some(adjective) => format!("the {} {}", adjective, noun),
            None => format!("the {}", noun),
        }
    }

    /// "the [adjective] noun", or two of them joined by "and".
    fn noun_phrase<R: Rng + ?Sized>(&self, rng: &mut R, plural: bool, coordinated: bool) -> String {
        let first = self.simple_noun_phrase(rng, plural);

        if coordinated {
            format!("{} and {}", first, self.simple_noun_phrase(rng, plural))
        } else {
            first
        }
    }

    fn prepositional_phrase<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let (plural, coordinated) = (chance(rng, 0.5), chance(rng, 0.5));
        let object = self.noun_phrase(rng, plural, coordinated);

        format!("{} {}", PREPOSITIONS.choose(rng).unwrap_or(&"in"), object)
    }

    /// "that VERB [object]" with the verb agreeing with the subject.
    fn relative_clause<R: Rng + ?Sized>(&self, rng: &mut R, plural: bool) -> String {
        let (singular, plural_form) = self.verb(rng);
        let verb = if plural { plural_form } else { singular };

        if chance(rng, self.options.relative_clause_object) {
            let (plural, coordinated) = (chance(rng, 0.5), chance(rng, 0.5));
            format!("that {} {}", verb, self.noun_phrase(rng, plural, coordinated))
        } else {
            format!("that {}", verb)
        }
    }

    /// "connector the noun VERB" with its own agreement.
    fn subordinate_clause<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let connector = CONNECTORS.choose(rng).unwrap_or(&"because");
        let noun = self.noun(rng);
        let verb = self.verb(rng);

        if chance(rng, 0.5) {
            format!("{} the {} {}", connector, noun.1, verb.1)
        } else {
            format!("{} the {} {}", connector, noun.0, verb.0)
        }
    }

    /// Generates one pair. The sentences only differ in the number of the main verb.
    pub fn generate_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> SentencePair {
        let options = &self.options;

        let mut plural_subject = chance(rng, options.plural_subject);
        let coordinated_subject = chance(rng, options.coordinated_subject);
        let subject = self.noun_phrase(rng, plural_subject, coordinated_subject);

        // coordinated subjects always take the plural verb
        if coordinated_subject {
            plural_subject = true;
        }

        let (singular_verb, plural_verb) = self.verb(rng);
        let (correct_verb, incorrect_verb) = if plural_subject {
            (plural_verb, singular_verb)
        } else {
            (singular_verb, plural_verb)
        };

        let adverb = self.adverb(rng);
        let object = if chance(rng, options.object) {
            let plural = chance(rng, 0.5);
            let coordinated = chance(rng, options.coordinated_object);
            Some(self.noun_phrase(rng, plural, coordinated))
        } else {
            None
        };
        let prepositional = if chance(rng, options.prepositional_phrase) {
            Some(self.prepositional_phrase(rng))
        } else {
            None
        };
        let relative = if chance(rng, options.relative_clause) {
            Some(self.relative_clause(rng, plural_subject))
        } else {
            None
        };
        let subordinate = if chance(rng, options.subordinate_clause) {
            Some(self.subordinate_clause(rng))
        } else {
            None
        };

        let parts = Parts {
            subject,
            relative,
            adverb,
            object,
            prepositional,
            subordinate,
        };
        let layout_seed = rng.gen();

        SentencePair::new(
            parts.build(&incorrect_verb, layout_seed, options),
            parts.build(&correct_verb, layout_seed, options),
        )
    }

    /// Generates `n` pairs. Reproducible if a seed is given.
    pub fn generate_pairs(&self, n: usize, seed: Option<u64>) -> Vec<SentencePair> {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        info!("Generating {} sentence pairs", n);
        (0..n).map(|_| self.generate_pair(&mut rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::en;
    use itertools::Itertools;

    fn generator() -> Generator {
        Generator::new(en::words(), en::inflecter(), GeneratorOptions::default())
    }

    #[test]
    fn pairs_differ_only_in_verb_number() {
        let generator = generator();
        let inflecter = en::inflecter();

        for pair in generator.generate_pairs(200, Some(0)) {
            let incorrect: Vec<_> = pair.incorrect.split(' ').collect();
            let correct: Vec<_> = pair.correct.split(' ').collect();
            assert_eq!(incorrect.len(), correct.len());

            let differences: Vec<_> = incorrect
                .iter()
                .zip(&correct)
                .filter(|(a, b)| a != b)
                .collect();
            assert_eq!(differences.len(), 1, "{:?}", pair);

            let (a, b) = differences[0];
            assert!(inflecter.third_person(a) == **b || inflecter.third_person(b) == **a);
        }
    }

    #[test]
    fn sentences_are_formatted() {
        for pair in generator().generate_pairs(50, Some(1)) {
            for sentence in [&pair.incorrect, &pair.correct].iter() {
                assert!(sentence.ends_with(" ."));
                assert!(sentence.chars().next().unwrap().is_uppercase());
                assert!(!sentence.contains("  "));
                assert!(!sentence.contains(',') || sentence.contains(" , "));
            }
        }
    }

    #[test]
    fn generation_is_reproducible() {
        let generator = generator();

        assert_eq!(
            generator.generate_pairs(20, Some(42)),
            generator.generate_pairs(20, Some(42))
        );
        assert!(generator
            .generate_pairs(20, Some(42))
            .iter()
            .map(|x| &x.correct)
            .all_unique());
    }

    #[test]
    fn coordinated_subjects_take_plural_verbs() {
        let options = GeneratorOptions {
            coordinated_subject: 1.,
            plural_subject: 0.,
            relative_clause: 0.,
            subordinate_clause: 0.,
            adverb: 0.,
            adjective: 0.,
            ..GeneratorOptions::default()
        };
        let generator = Generator::new(en::words(), en::inflecter(), options);

        for pair in generator.generate_pairs(20, Some(3)) {
            let tokens: Vec<_> = pair.correct.split(' ').collect();
            assert_eq!(tokens[2], "and");
            // "The noun and the noun VERB"
            let verb = tokens[5];
            assert!(en::words().get(PartOfSpeech::Verb).iter().any(|x| x == verb));
        }
    }
}
