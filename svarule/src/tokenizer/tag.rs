//! A dictionary-based tagger with suffix heuristics for unknown words.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;

use super::inflect::Inflecter;
use crate::types::WordData;
use crate::words::{PartOfSpeech, Words};

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "ical", "less", "ish"];
const NOUN_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ness", "ity", "ance", "ence", "ship", "ism", "ist", "er", "or",
];

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct Tagger {
    tags: HashMap<String, Vec<WordData>>,
    inflecter: Inflecter,
}

impl Tagger {
    /// Reads a tag dump with lines of `word<TAB>lemma<TAB>tag`. Lines starting with `#` are skipped.
    pub fn from_reader<R: BufRead>(reader: R, inflecter: Inflecter) -> std::io::Result<Self> {
        let mut tagger = Tagger {
            tags: HashMap::new(),
            inflecter,
        };

        for line in reader.lines() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let parts: Vec<_> = line.split('\t').collect();
            if parts.len() < 3 {
                debug!("skipping malformed tag line: {:?}", line);
                continue;
            }

            tagger.add(parts[0], parts[1], parts[2]);
        }

        Ok(tagger)
    }

    /// Adds a reading for `word`. Readings added first are preferred when no context decides.
    pub fn add(&mut self, word: &str, lemma: &str, pos: &str) {
        let data = WordData::new(lemma, pos);
        let entry = self.tags.entry(word.to_string()).or_insert_with(Vec::new);

        if !entry.contains(&data) {
            entry.push(data);
        }
    }

    /// Adds all inflected forms of the words in the lists.
    pub fn extend_with_words(&mut self, words: &Words) {
        for noun in words.get(PartOfSpeech::Noun) {
            let plural = self.inflecter.plural(noun);
            self.add(noun, noun, "NN");
            self.add(&plural, noun, "NNS");
        }

        for verb in words.get(PartOfSpeech::Verb) {
            let third = self.inflecter.third_person(verb);
            self.add(verb, verb, "VB");
            self.add(verb, verb, "VBP");
            self.add(&third, verb, "VBZ");
        }

        for adjective in words.get(PartOfSpeech::Adjective) {
            self.add(adjective, adjective, "JJ");
        }
    }

    pub fn inflecter(&self) -> &Inflecter {
        &self.inflecter
    }

    pub fn contains(&self, word: &str) -> bool {
        self.tags.contains_key(word)
    }

    fn get_strict_tags(&self, word: &str, add_lower: bool) -> Vec<WordData> {
        let mut tags = self.tags.get(word).cloned().unwrap_or_else(Vec::new);
        let lower = word.to_lowercase();

        if (add_lower || tags.is_empty())
            && word != lower
            && (crate::utils::is_title_case(word) || crate::utils::is_uppercase(word))
        {
            tags.extend(self.tags.get(&lower).cloned().unwrap_or_else(Vec::new));
        }

        tags
    }

    /// Gets the readings of `word`. Never empty: unknown words are tagged by their shape.
    /// `add_lower` should be set for the first word in a sentence.
    pub fn get_tags(&self, word: &str, add_lower: bool) -> Vec<WordData> {
        let tags = self.get_strict_tags(word, add_lower);

        if tags.is_empty() {
            self.guess(word, add_lower)
        } else {
            tags
        }
    }

    fn guess(&self, word: &str, is_sentence_start: bool) -> Vec<WordData> {
        if !word.chars().any(char::is_alphanumeric) {
            return vec![WordData::new(word, word)];
        }

        if word
            .chars()
            .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
        {
            return vec![WordData::new(word, "CD")];
        }

        if !is_sentence_start && crate::utils::is_title_case(word) {
            return vec![WordData::new(word, "NNP")];
        }

        let lower = word.to_lowercase();
        let n_chars = lower.chars().count();

        if let Some(stem) = lower
            .strip_suffix("'s")
            .or_else(|| lower.strip_suffix("’s"))
        {
            return vec![WordData::new(stem, "NN")];
        }

        if n_chars > 3 && lower.ends_with("ly") {
            return vec![WordData::new(lower.as_str(), "RB")];
        }

        if n_chars > 4 && lower.ends_with("ing") {
            return vec![
                WordData::new(lower.as_str(), "VBG"),
                WordData::new(lower.as_str(), "NN"),
            ];
        }

        if n_chars > 3 && lower.ends_with("ed") {
            return vec![
                WordData::new(lower.as_str(), "VBD"),
                WordData::new(lower.as_str(), "VBN"),
                WordData::new(lower.as_str(), "JJ"),
            ];
        }

        if ADJECTIVE_SUFFIXES.iter().any(|x| lower.ends_with(x)) {
            return vec![WordData::new(lower.as_str(), "JJ")];
        }

        if n_chars > 3
            && lower.ends_with('s')
            && !["ss", "us", "is"].iter().any(|x| lower.ends_with(x))
        {
            return vec![
                WordData::new(self.inflecter.singular(&lower), "NNS"),
                WordData::new(self.inflecter.base_form(&lower), "VBZ"),
            ];
        }

        if NOUN_SUFFIXES.iter().any(|x| lower.ends_with(x)) {
            return vec![WordData::new(lower.as_str(), "NN")];
        }

        vec![
            WordData::new(lower.as_str(), "NN"),
            WordData::new(lower.as_str(), "VB"),
            WordData::new(lower.as_str(), "VBP"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger() -> Tagger {
        let dump = "# comment\nthe\tthe\tDT\nwalks\twalk\tVBZ\nwalks\twalk\tNNS\nwalks\twalk\tVBZ\n";
        Tagger::from_reader(dump.as_bytes(), Inflecter::default()).unwrap()
    }

    fn pos(tags: &[WordData]) -> Vec<&str> {
        tags.iter().map(|x| x.pos.as_str()).collect()
    }

    #[test]
    fn can_look_up_words() {
        let tagger = tagger();

        assert_eq!(pos(&tagger.get_tags("walks", false)), vec!["VBZ", "NNS"]);
        assert_eq!(pos(&tagger.get_tags("The", true)), vec!["DT"]);
        assert_eq!(pos(&tagger.get_tags("THE", false)), vec!["DT"]);
    }

    #[test]
    fn can_guess_unknown_words() {
        let tagger = tagger();

        assert_eq!(pos(&tagger.get_tags("gently", false)), vec!["RB"]);
        assert_eq!(pos(&tagger.get_tags("Paris", false)), vec!["NNP"]);
        assert_eq!(pos(&tagger.get_tags(",", false)), vec![","]);
        assert_eq!(pos(&tagger.get_tags("1,000", false)), vec!["CD"]);
        assert_eq!(pos(&tagger.get_tags("jumped", false)), vec!["VBD", "VBN", "JJ"]);

        let tags = tagger.get_tags("parks", false);
        assert_eq!(pos(&tags), vec!["NNS", "VBZ"]);
        assert_eq!(tags[0].lemma, "park");
    }
}
