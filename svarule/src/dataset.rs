//! Reading, writing and splitting of labeled sentences.
//!
//! Sentences are exchanged as headerless CSV with a quoted sentence column and a numeric label
//! column, or as JSON arrays of `{"sentence": ..., "label": ...}` objects. In the CSV files produced
//! from pairs, consecutive rows belong to the same pair.

use fs_err::File;
use indexmap::IndexMap;
use log::{debug, info};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::{
    types::{Label, LabeledSentence, SentencePair},
    utils, Error,
};

/// Seed of the final shuffle in [balanced_sample].
pub const SAMPLE_SEED: u64 = 42;

/// Labeled sentences of a pair file, incorrect sentence first.
pub fn pairs_to_sentences(pairs: &[SentencePair]) -> Vec<LabeledSentence> {
    pairs
        .iter()
        .flat_map(|pair| pair.clone().into_labeled().to_vec())
        .collect()
}

/// Writes one row per sentence, the sentence always quoted. Double quotes in sentences are
/// replaced by single quotes.
pub fn write_csv<P: AsRef<Path>>(path: P, sentences: &[LabeledSentence]) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(BufWriter::new(File::create(path.as_ref())?));

    for sentence in sentences {
        // no double quotes are left after escaping
        writer.write_record(&[
            format!("\"{}\"", utils::escape_quotes(&sentence.sentence)),
            sentence.label.to_string(),
        ])?;
    }

    writer.flush()?;
    debug!(
        "wrote {} sentences to {}",
        sentences.len(),
        path.as_ref().display()
    );
    Ok(())
}

pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledSentence>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(BufReader::new(File::open(path.as_ref())?));

    let mut out = Vec::new();
    for row in reader.deserialize() {
        let (sentence, label): (String, String) = row?;
        out.push(LabeledSentence::new(sentence, label.parse::<Label>()?));
    }

    Ok(out)
}

/// Reads a CSV file in which consecutive rows form a pair.
pub fn read_pairs<P: AsRef<Path>>(path: P) -> Result<Vec<[LabeledSentence; 2]>, Error> {
    let rows = read_csv(path.as_ref())?;

    if rows.len() % 2 != 0 {
        return Err(Error::UnevenPairs {
            path: path.as_ref().display().to_string(),
            rows: rows.len(),
        });
    }

    let mut rows = rows.into_iter();
    let mut pairs = Vec::new();
    while let (Some(first), Some(second)) = (rows.next(), rows.next()) {
        pairs.push([first, second]);
    }

    Ok(pairs)
}

/// Writes a JSON array indented by four spaces.
pub fn write_json<P: AsRef<Path>>(path: P, sentences: &[LabeledSentence]) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);

    sentences.serialize(&mut serializer)?;
    writer.flush()?;

    debug!(
        "wrote {} sentences to {}",
        sentences.len(),
        path.as_ref().display()
    );
    Ok(())
}

pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledSentence>, Error> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}

/// Training, validation and test sentences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Split {
    pub train: Vec<LabeledSentence>,
    pub valid: Vec<LabeledSentence>,
    pub test: Vec<LabeledSentence>,
}

/// Splits pairs into training, validation and test sentences.
///
/// The pairs are shuffled and the order inside each pair is randomized. The first half of the
/// pairs goes to training with both sentences. Every other pair contributes one random sentence;
/// these are shuffled and halved into validation and test, the test set getting the odd one.
/// No pair has sentences in more than one set and validation and test never contain both
/// sentences of a pair.
pub fn split_pairs<R: Rng + ?Sized>(mut pairs: Vec<[LabeledSentence; 2]>, rng: &mut R) -> Split {
    pairs.shuffle(rng);

    for pair in pairs.iter_mut() {
        if rng.gen_bool(0.5) {
            pair.swap(0, 1);
        }
    }

    let remaining = pairs.split_off(pairs.len() / 2);

    let mut held_out: Vec<LabeledSentence> = remaining
        .into_iter()
        .map(|pair| {
            let [first, second] = pair;
            if rng.gen_bool(0.5) {
                first
            } else {
                second
            }
        })
        .collect();
    held_out.shuffle(rng);

    let test = held_out.split_off(held_out.len() / 2);
    let train: Vec<_> = pairs.into_iter().flat_map(|pair| pair.to_vec()).collect();

    info!(
        "Split into {} training, {} validation and {} test sentences",
        train.len(),
        held_out.len(),
        test.len()
    );

    Split {
        train,
        valid: held_out,
        test,
    }
}

/// Reads all pair files and splits them with [split_pairs].
pub fn split_files<P: AsRef<Path>, R: Rng + ?Sized>(files: &[P], rng: &mut R) -> Result<Split, Error> {
    let mut pairs = Vec::new();

    for path in files {
        pairs.extend(read_pairs(path)?);
    }

    Ok(split_pairs(pairs, rng))
}

/// Concatenates CSV files into one JSON file without splitting. Returns the number of sentences.
pub fn combine<P: AsRef<Path>, Q: AsRef<Path>>(files: &[P], output: Q) -> Result<usize, Error> {
    let mut sentences = Vec::new();

    for path in files {
        sentences.extend(read_csv(path)?);
    }

    write_json(output, &sentences)?;
    Ok(sentences.len())
}

/// Draws `size` sentences with the classes as balanced as possible.
///
/// Each class contributes up to `size / n_classes` sentences, the rest is filled up with random
/// sentences not drawn yet. The result is shuffled with a fixed seed of [SAMPLE_SEED].
pub fn balanced_sample<R: Rng + ?Sized>(
    sentences: &[LabeledSentence],
    size: usize,
    rng: &mut R,
) -> Vec<LabeledSentence> {
    let size = size.min(sentences.len());

    let mut by_label: IndexMap<Label, Vec<usize>> = IndexMap::new();
    for (i, sentence) in sentences.iter().enumerate() {
        by_label.entry(sentence.label).or_insert_with(Vec::new).push(i);
    }

    if by_label.is_empty() {
        return Vec::new();
    }

    let per_class = size / by_label.len();
    let mut chosen = vec![false; sentences.len()];
    let mut indices: Vec<usize> = Vec::with_capacity(size);

    for class_indices in by_label.values() {
        for &i in class_indices.choose_multiple(rng, per_class) {
            chosen[i] = true;
            indices.push(i);
        }
    }

    if indices.len() < size {
        let rest: Vec<usize> = (0..sentences.len()).filter(|&i| !chosen[i]).collect();
        indices.extend(rest.choose_multiple(rng, size - indices.len()));
    }

    indices.shuffle(&mut ChaCha8Rng::seed_from_u64(SAMPLE_SEED));
    indices.into_iter().map(|i| sentences[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pairs(n: usize) -> Vec<[LabeledSentence; 2]> {
        (0..n)
            .map(|i| {
                SentencePair::new(
                    format!("The dog {} walk .", i),
                    format!("The dog {} walks .", i),
                )
                .into_labeled()
            })
            .collect()
    }

    fn pair_id(sentence: &LabeledSentence) -> String {
        sentence.sentence.split(' ').nth(2).unwrap().to_string()
    }

    #[test]
    fn split_follows_pair_scheme() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let split = split_pairs(pairs(11), &mut rng);

        assert_eq!(split.train.len(), 10);
        assert_eq!(split.valid.len(), 3);
        assert_eq!(split.test.len(), 3);

        let train_ids: HashSet<_> = split.train.iter().map(pair_id).collect();
        assert_eq!(train_ids.len(), 5);

        let held_out_ids: HashSet<_> = split
            .valid
            .iter()
            .chain(split.test.iter())
            .map(pair_id)
            .collect();
        assert_eq!(held_out_ids.len(), 6);
        assert!(train_ids.is_disjoint(&held_out_ids));
    }

    #[test]
    fn split_of_nothing_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(split_pairs(Vec::new(), &mut rng), Split::default());
    }

    #[test]
    fn numeric_sentences_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numbers.csv");

        let sentences = vec![
            LabeledSentence::new("1999", Label::Correct),
            LabeledSentence::new("3.5", Label::Incorrect),
        ];
        write_csv(&path, &sentences).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "\"1999\",1\n\"3.5\",0\n"
        );
        assert_eq!(read_csv(&path).unwrap(), sentences);
    }

    #[test]
    fn csv_to_json_keeps_sentences() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("pairs.csv");
        let json_path = dir.path().join("pairs.json");

        let pair = SentencePair::new("He said \"hi\" , he walk .", "He said \"hi\" , he walks .");
        let sentences = pairs_to_sentences(&[pair]);
        write_csv(&csv_path, &sentences).unwrap();

        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(
            text,
            "\"He said 'hi' , he walk .\",0\n\"He said 'hi' , he walks .\",1\n"
        );

        assert_eq!(combine(&[&csv_path], &json_path).unwrap(), 2);
        let back = read_json(&json_path).unwrap();
        assert_eq!(back[0].sentence, "He said 'hi' , he walk .");
        assert_eq!(back[0].label, Label::Incorrect);
        assert_eq!(back[1].label, Label::Correct);

        let json = std::fs::read_to_string(&json_path).unwrap();
        assert!(json.starts_with("[\n    {\n        \"sentence\""));
    }

    #[test]
    fn odd_rows_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.csv");
        std::fs::write(&path, "\"The dog walk .\",0\n\"The dog walks .\",1\n\"A cat .\",C\n").unwrap();

        assert_eq!(read_csv(&path).unwrap().len(), 3);
        assert!(matches!(
            read_pairs(&path),
            Err(Error::UnevenPairs { rows: 3, .. })
        ));
    }

    #[test]
    fn unknown_labels_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "\"The dog walk .\",x\n").unwrap();

        assert!(matches!(read_csv(&path), Err(Error::UnknownLabel(_))));
    }

    #[test]
    fn balanced_sample_balances_classes() {
        let mut sentences: Vec<_> = (0..30)
            .map(|i| LabeledSentence::new(format!("correct {}", i), Label::Correct))
            .collect();
        sentences.extend((0..6).map(|i| LabeledSentence::new(format!("incorrect {}", i), Label::Incorrect)));

        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let sample = balanced_sample(&sentences, 10, &mut rng);
        let incorrect = sample.iter().filter(|x| x.label == Label::Incorrect).count();
        assert_eq!(sample.len(), 10);
        assert_eq!(incorrect, 5);

        // not enough incorrect sentences, topped up with correct ones
        let sample = balanced_sample(&sentences, 20, &mut rng);
        let incorrect = sample.iter().filter(|x| x.label == Label::Incorrect).count();
        assert_eq!(sample.len(), 20);
        assert_eq!(incorrect, 6);

        let unique: HashSet<_> = sample.iter().map(|x| &x.sentence).collect();
        assert_eq!(unique.len(), 20);

        assert_eq!(balanced_sample(&sentences, 100, &mut rng).len(), 36);
        assert!(balanced_sample(&[], 10, &mut rng).is_empty());
    }
}
