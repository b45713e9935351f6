//! Components built from the language data in `storage/`, compiled into the binary.

#[allow(unused)]
macro_rules! embedded {
    ($lang_code:literal, $file_name:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/storage/",
            $lang_code,
            "/",
            $file_name,
            ".txt"
        ))
    };
}

#[allow(unused)]
const ERROR_MSG: &str = "embedded data is pre-tested.";

pub mod en {
    use lazy_static::lazy_static;

    use super::ERROR_MSG;
    use crate::{
        tokenizer::{chunk::Chunker, inflect::Inflecter, tag::Tagger, Tokenizer},
        words::Words,
    };

    lazy_static! {
        static ref TOKENIZER: Tokenizer = Tokenizer::new(tagger(), Chunker::default());
    }

    pub fn inflecter() -> Inflecter {
        Inflecter::from_reader(embedded!("en", "irregular").as_bytes()).expect(ERROR_MSG)
    }

    pub fn words() -> Words {
        Words::from_lists(
            embedded!("en", "nouns"),
            embedded!("en", "verbs"),
            embedded!("en", "adjectives"),
        )
    }

    /// The lexicon extended with every inflected form of the word lists.
    pub fn tagger() -> Tagger {
        let mut tagger =
            Tagger::from_reader(embedded!("en", "tags").as_bytes(), inflecter()).expect(ERROR_MSG);
        tagger.extend_with_words(&words());
        tagger
    }

    pub fn tokenizer() -> Tokenizer {
        TOKENIZER.clone()
    }

}
