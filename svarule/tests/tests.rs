use lazy_static::lazy_static;
use quickcheck_macros::quickcheck;
use svarule::{
    checker::AgreementChecker,
    component::Component,
    dataset,
    generate::{Generator, GeneratorOptions},
    lang::en,
    types::{Label, LabeledSentence},
    Tokenizer,
};

lazy_static! {
    static ref TOKENIZER: Tokenizer = en::tokenizer();
    static ref CHECKER: AgreementChecker = AgreementChecker::default();
}

#[test]
fn can_check_empty_text() {
    assert_eq!(CHECKER.classify("", &*TOKENIZER), None);
    assert!(CHECKER.suggest("", &*TOKENIZER).is_empty());
    assert_eq!(CHECKER.correct("", &*TOKENIZER), "");
}

#[quickcheck]
fn can_check_anything(text: String) -> bool {
    CHECKER.classify(&text, &*TOKENIZER);
    CHECKER.correct(&text, &*TOKENIZER);
    true
}

#[quickcheck]
fn suggestions_are_inside_text(text: String) -> bool {
    let n_chars = text.chars().count();

    CHECKER
        .suggest(&text, &*TOKENIZER)
        .iter()
        .all(|x| x.start < x.end && x.end <= n_chars)
}

#[test]
fn corrects_multiple_sentences() {
    let text = "The dogs runs in the park. The teacher walk to the house. I am happy.";

    assert_eq!(
        CHECKER.correct(text, &*TOKENIZER),
        "The dogs run in the park. The teacher walks to the house. I am happy."
    );
}

#[test]
fn correcting_keeps_case() {
    assert_eq!(
        CHECKER.correct("THE DOGS IS HAPPY .", &*TOKENIZER),
        "THE DOGS ARE HAPPY ."
    );
}

#[test]
fn generated_pairs_can_be_stored() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("generated.csv");
    let json = dir.path().join("generated.json");

    let generator = Generator::new(en::words(), en::inflecter(), GeneratorOptions::default());
    let pairs = generator.generate_pairs(20, Some(3));
    dataset::write_csv(&csv, &dataset::pairs_to_sentences(&pairs)).unwrap();

    let read = dataset::read_pairs(&csv).unwrap();
    assert_eq!(read.len(), 20);
    for ([incorrect, correct], pair) in read.iter().zip(&pairs) {
        assert_eq!(incorrect, &LabeledSentence::new(pair.incorrect.clone(), Label::Incorrect));
        assert_eq!(correct.sentence, pair.correct);
    }

    assert_eq!(dataset::combine(&[&csv], &json).unwrap(), 40);
}

#[test]
fn tokenizer_can_be_stored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokenizer.bin");

    TOKENIZER.save(&path).unwrap();
    let loaded = <Tokenizer as Component>::new(&path).unwrap();

    let text = "The old teacher walks to the river.";
    assert_eq!(loaded.tokenize(text), TOKENIZER.tokenize(text));
}
