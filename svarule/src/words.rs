//! Word lists to draw random nouns, verbs and adjectives from.

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
}

/// Nouns are singular, verbs are in base form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Words {
    nouns: Vec<String>,
    verbs: Vec<String>,
    adjectives: Vec<String>,
}

fn read_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_lowercase())
        .collect()
}

impl Words {
    /// Builds the lists from newline separated words. Lines starting with `#` are comments.
    pub fn from_lists(nouns: &str, verbs: &str, adjectives: &str) -> Self {
        Words {
            nouns: read_list(nouns),
            verbs: read_list(verbs),
            adjectives: read_list(adjectives),
        }
    }

    pub fn get(&self, pos: PartOfSpeech) -> &[String] {
        match pos {
            PartOfSpeech::Noun => &self.nouns,
            PartOfSpeech::Verb => &self.verbs,
            PartOfSpeech::Adjective => &self.adjectives,
        }
    }

    /// A random word of the given part of speech. Empty if the list is empty.
    pub fn random<R: Rng + ?Sized>(&self, pos: PartOfSpeech, rng: &mut R) -> &str {
        self.get(pos)
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn can_draw_words() {
        let words = Words::from_lists("# nouns\nDog\n\ncat\n", "walk", "");
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert_eq!(words.get(PartOfSpeech::Noun), &["dog", "cat"]);
        assert!(["dog", "cat"].contains(&words.random(PartOfSpeech::Noun, &mut rng)));
        assert_eq!(words.random(PartOfSpeech::Verb, &mut rng), "walk");
        assert_eq!(words.random(PartOfSpeech::Adjective, &mut rng), "");
    }
}
