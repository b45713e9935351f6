use lazy_static::lazy_static;
use onig::Regex;

// see https://stackoverflow.com/questions/38406793/why-is-capitalizing-the-first-letter-of-a-string-so-convoluted-in-rust
pub fn apply_to_first<F>(string: &str, func: F) -> String
where
    F: Fn(char) -> String,
{
    let mut c = string.chars();
    match c.next() {
        None => String::new(),
        Some(first) => func(first) + c.as_str(),
    }
}

pub fn capitalize(string: &str) -> String {
    apply_to_first(string, |c| c.to_uppercase().collect())
}

pub fn is_title_case(string: &str) -> bool {
    let mut char_case = string.chars().map(|x| x.is_uppercase());

    char_case.next().unwrap_or(false) && !char_case.any(|x| x)
}

pub fn is_uppercase(string: &str) -> bool {
    !string.chars().any(|x| x.is_lowercase())
}

/// Splits a text at sentence final punctuation, dropping the punctuation.
pub fn split_at_terminals(text: &str) -> Vec<&str> {
    lazy_static! {
        static ref REGEX: Regex = Regex::new(r"[.!?]").unwrap();
    }

    REGEX.split(text).collect()
}

/// Double quotes would terminate the quoted CSV column, so they become single quotes.
pub fn escape_quotes(string: &str) -> String {
    string.replace('"', "'")
}

#[inline]
pub fn splitting_chars() -> &'static str {
    r##"«»’`´‘],.:;!?/\()<=>„“”"+#…*"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_capitalize() {
        assert_eq!(capitalize("the dog ."), "The dog .");
        assert_eq!(capitalize("éclair"), "Éclair");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn can_detect_case() {
        assert!(is_title_case("Walks"));
        assert!(!is_title_case("WALKS"));
        assert!(is_uppercase("WALKS"));
        assert!(!is_uppercase("Walks"));
    }

    #[test]
    fn can_split_at_terminals() {
        assert_eq!(
            split_at_terminals("One. Two! Three? Four"),
            vec!["One", " Two", " Three", " Four"]
        );
    }
}
