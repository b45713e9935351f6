//! Number inflection of English nouns and verbs.
//!
//! Nouns and verbs share the `-s` / `-es` / `-ies` suffix rules: the plural of a noun and the third person
//! singular of a verb are built the same way, irregular forms are looked up first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inflecter {
    inflected: HashMap<String, String>,
    base: HashMap<String, String>,
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn add_s(word: &str) -> String {
    if ["s", "x", "z", "ch", "sh"].iter().any(|x| word.ends_with(x)) {
        return format!("{}es", word);
    }

    let mut chars = word.chars().rev();
    if let (Some('y'), Some(prev)) = (chars.next(), chars.next()) {
        if !is_vowel(prev) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }

    format!("{}s", word)
}

fn strip_s(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }

    for suffix in &["sses", "ches", "shes", "xes", "zes", "uses"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }

    if ["ss", "us", "is"].iter().any(|x| word.ends_with(x)) {
        return word.to_string();
    }

    word.strip_suffix('s').unwrap_or(word).to_string()
}

impl Inflecter {
    /// Reads irregular forms from lines of `base<TAB>inflected`. Lines starting with `#` are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut inflected = HashMap::new();
        let mut base = HashMap::new();

        for line in reader.lines() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let mut parts = line.split('\t');
            if let (Some(word), Some(form)) = (parts.next(), parts.next()) {
                inflected.insert(word.to_string(), form.to_string());
                base.insert(form.to_string(), word.to_string());
            }
        }

        Ok(Inflecter { inflected, base })
    }

    /// The plural of a singular noun.
    pub fn plural(&self, noun: &str) -> String {
        self.inflected
            .get(noun)
            .cloned()
            .unwrap_or_else(|| add_s(noun))
    }

    /// The third person singular present form of a verb in base form.
    pub fn third_person(&self, verb: &str) -> String {
        self.plural(verb)
    }

    /// The singular of a plural noun.
    pub fn singular(&self, noun: &str) -> String {
        self.base.get(noun).cloned().unwrap_or_else(|| strip_s(noun))
    }

    /// The base form of a verb in third person singular present.
    pub fn base_form(&self, verb: &str) -> String {
        self.singular(verb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inflecter() -> Inflecter {
        Inflecter::from_reader("# comment\nchild\tchildren\nhave\thas\nsheep\tsheep\n".as_bytes())
            .unwrap()
    }

    #[test]
    fn can_pluralize() {
        let inflecter = inflecter();

        assert_eq!(inflecter.plural("dog"), "dogs");
        assert_eq!(inflecter.plural("box"), "boxes");
        assert_eq!(inflecter.plural("church"), "churches");
        assert_eq!(inflecter.plural("city"), "cities");
        assert_eq!(inflecter.plural("day"), "days");
        assert_eq!(inflecter.plural("child"), "children");
        assert_eq!(inflecter.plural("sheep"), "sheep");
    }

    #[test]
    fn can_inflect_verbs() {
        let inflecter = inflecter();

        assert_eq!(inflecter.third_person("walk"), "walks");
        assert_eq!(inflecter.third_person("carry"), "carries");
        assert_eq!(inflecter.third_person("watch"), "watches");
        assert_eq!(inflecter.third_person("have"), "has");
        assert_eq!(inflecter.base_form("has"), "have");
        assert_eq!(inflecter.base_form("fixes"), "fix");
    }

    #[test]
    fn can_singularize() {
        let inflecter = inflecter();

        assert_eq!(inflecter.singular("cities"), "city");
        assert_eq!(inflecter.singular("dishes"), "dish");
        assert_eq!(inflecter.singular("buses"), "bus");
        assert_eq!(inflecter.singular("children"), "child");
        assert_eq!(inflecter.singular("glass"), "glass");
        assert_eq!(inflecter.singular("cats"), "cat");
    }
}
