//! Reads sentence pairs with agreement errors from corpora in the m2 annotation format.
//!
//! An m2 file is a sequence of blocks: one `S` line with the space separated tokens of the
//! original sentence, then one `A` line per edit:
//!
//! ```text
//! S The dogs runs in the park .
//! A 2 3|||R:VERB:SVA|||run|||REQUIRED|||-NONE-|||0
//! ```
//!
//! The first two numbers are the token span of the edit, followed by the error type, the
//! correction, two unused columns and the annotator id.

use fs_err::File;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{types::SentencePair, Error};

/// The error type of subject-verb agreement edits.
pub const SVA: &str = "R:VERB:SVA";

/// One annotated edit of a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub kind: String,
    pub correction: Vec<String>,
    pub annotator: usize,
}

impl Edit {
    pub fn is_sva(&self) -> bool {
        self.kind == SVA
    }
}

/// A sentence of an m2 file with the edits of its first annotator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSentence {
    pub tokens: Vec<String>,
    pub edits: Vec<Edit>,
    /// The annotator of the first `A` line, whose edits are kept.
    pub annotator: Option<usize>,
    /// The line number of the `S` line, starting at 1.
    pub line: usize,
}

/// Which annotated sentences become pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// The last edit is an agreement edit. All other edits are applied to both sentences.
    LastEditSva,
    /// The agreement edit is the only edit of the sentence.
    SingleSva,
}

impl Default for ExtractionMode {
    fn default() -> Self {
        ExtractionMode::LastEditSva
    }
}

fn malformed(line: usize, message: &str) -> Error {
    Error::MalformedM2 {
        line,
        message: message.to_string(),
    }
}

/// Parses an `A` line into its annotator and edit. The edit is `None` for `noop` lines.
fn parse_edit(text: &str, line: usize) -> Result<(usize, Option<Edit>), Error> {
    let parts: Vec<_> = text.split("|||").collect();
    if parts.len() < 3 {
        return Err(malformed(line, "expected at least 3 '|||' separated columns"));
    }

    let span: Vec<_> = parts[0].split_whitespace().skip(1).collect();
    if span.len() != 2 {
        return Err(malformed(line, "expected a span of two token indices"));
    }

    let parse_index = |x: &str| {
        x.parse::<i64>()
            .map_err(|_| malformed(line, &format!("invalid token index '{}'", x)))
    };
    let (start, end) = (parse_index(span[0])?, parse_index(span[1])?);

    let annotator = match parts.get(5) {
        Some(x) => x
            .trim()
            .parse()
            .map_err(|_| malformed(line, &format!("invalid annotator id '{}'", x.trim())))?,
        None => 0,
    };

    if start < 0 || end < 0 || parts[1] == "noop" {
        return Ok((annotator, None));
    }
    if end < start {
        return Err(malformed(line, "span end is before span start"));
    }

    Ok((annotator, Some(Edit {
        start: start as usize,
        end: end as usize,
        kind: parts[1].to_string(),
        correction: parts[2].split_whitespace().map(String::from).collect(),
        annotator,
    })))
}

/// Parses all annotated sentences of an m2 document.
pub fn parse<R: BufRead>(reader: R) -> Result<Vec<AnnotatedSentence>, Error> {
    let mut out: Vec<AnnotatedSentence> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        let trimmed = line.trim();

        if let Some(sentence) = trimmed.strip_prefix("S ") {
            out.push(AnnotatedSentence {
                tokens: sentence.split_whitespace().map(String::from).collect(),
                edits: Vec::new(),
                annotator: None,
                line: line_number,
            });
        } else if trimmed.starts_with('A') {
            let sentence = out
                .last_mut()
                .ok_or_else(|| malformed(line_number, "annotation before the first sentence"))?;

            let (annotator, edit) = parse_edit(trimmed, line_number)?;
            let first_annotator = *sentence.annotator.get_or_insert(annotator);

            match edit {
                Some(edit) if edit.annotator == first_annotator => sentence.edits.push(edit),
                _ => {}
            }
        } else if !trimmed.is_empty() {
            debug!("skipping unknown m2 line {}: {:?}", line_number, trimmed);
        }
    }

    Ok(out)
}

/// Applies edits whose spans refer to the original tokens. Each span is shifted by the length
/// changes of the already applied edits before it. Returns `None` if an edit falls outside the tokens.
pub fn apply_edits(tokens: &[String], edits: &[Edit]) -> Option<Vec<String>> {
    let mut out = tokens.to_vec();
    let mut applied: Vec<(usize, isize)> = Vec::new();

    for edit in edits {
        let offset: isize = applied
            .iter()
            .filter(|(end, _)| *end <= edit.start)
            .map(|(_, delta)| delta)
            .sum();
        let start = edit.start as isize + offset;
        let end = edit.end as isize + offset;

        if start < 0 || end as usize > out.len() {
            return None;
        }

        out.splice(start as usize..end as usize, edit.correction.iter().cloned());
        applied.push((
            edit.end,
            edit.correction.len() as isize - (edit.end - edit.start) as isize,
        ));
    }

    Some(out)
}

impl AnnotatedSentence {
    /// The incorrect and correct versions of this sentence, if it is an agreement example.
    pub fn sva_pair(&self, mode: ExtractionMode) -> Option<SentencePair> {
        let (last, previous) = self.edits.split_last()?;

        if !last.is_sva() {
            return None;
        }

        if mode == ExtractionMode::SingleSva && !previous.is_empty() {
            return None;
        }

        match (
            apply_edits(&self.tokens, previous),
            apply_edits(&self.tokens, &self.edits),
        ) {
            (Some(incorrect), Some(correct)) => {
                Some(SentencePair::new(incorrect.join(" "), correct.join(" ")))
            }
            _ => {
                warn!("edit out of range in sentence at line {}", self.line);
                None
            }
        }
    }
}

/// Reads the agreement pairs of all files.
///
/// Returns the pairs and the average number of pairs per file, which is zero if there are no files.
pub fn extract_pairs<P: AsRef<Path>>(
    files: &[P],
    mode: ExtractionMode,
) -> Result<(Vec<SentencePair>, f64), Error> {
    let mut pairs = Vec::new();

    for path in files {
        info!("Extracting pairs from {}", path.as_ref().display());

        let reader = BufReader::new(File::open(path.as_ref())?);
        let before = pairs.len();

        pairs.extend(
            parse(reader)?
                .iter()
                .filter_map(|sentence| sentence.sva_pair(mode)),
        );

        info!(
            "Extracted {} pairs from {}",
            pairs.len() - before,
            path.as_ref().display()
        );
    }

    let average = if files.is_empty() {
        0.
    } else {
        pairs.len() as f64 / files.len() as f64
    };

    Ok((pairs, average))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const M2: &str = "S The dogs runs in the park .
A 2 3|||R:VERB:SVA|||run|||REQUIRED|||-NONE-|||0

S This are an sentence .
A 2 3|||R:DET|||a|||REQUIRED|||-NONE-|||0
A 1 2|||R:VERB:SVA|||is|||REQUIRED|||-NONE-|||0
A 1 2|||R:VERB:SVA|||was|||REQUIRED|||-NONE-|||1

S He go to to school .
A 3 4|||U:PREP||||||REQUIRED|||-NONE-|||0
A 1 2|||R:VERB:SVA|||goes|||REQUIRED|||-NONE-|||0

S Nothing is wrong here .
A -1 -1|||noop|||-NONE-|||REQUIRED|||-NONE-|||0

S The cat sleep .
A 2 3|||R:VERB:SVA|||sleeps|||REQUIRED|||-NONE-|||0
A 3 3|||M:ADV|||now|||REQUIRED|||-NONE-|||0
";

    fn sentences() -> Vec<AnnotatedSentence> {
        parse(M2.as_bytes()).unwrap()
    }

    #[test]
    fn can_parse_m2() {
        let sentences = sentences();

        assert_eq!(sentences.len(), 5);
        assert_eq!(sentences[0].tokens.len(), 7);
        assert_eq!(sentences[1].line, 4);
        // edits of the second annotator are dropped
        assert_eq!(sentences[1].edits.len(), 2);
        assert!(sentences[3].edits.is_empty());
        assert!(sentences[2].edits[0].correction.is_empty());
    }

    #[test]
    fn applies_previous_edits_with_offset() {
        let sentences = sentences();
        let mode = ExtractionMode::LastEditSva;

        let pair = sentences[0].sva_pair(mode).unwrap();
        assert_eq!(pair.incorrect, "The dogs runs in the park .");
        assert_eq!(pair.correct, "The dogs run in the park .");

        let pair = sentences[1].sva_pair(mode).unwrap();
        assert_eq!(pair.incorrect, "This are a sentence .");
        assert_eq!(pair.correct, "This is a sentence .");

        let pair = sentences[2].sva_pair(mode).unwrap();
        assert_eq!(pair.incorrect, "He go to school .");
        assert_eq!(pair.correct, "He goes to school .");

        assert!(sentences[3].sva_pair(mode).is_none());
        // last edit is not an agreement edit
        assert!(sentences[4].sva_pair(mode).is_none());
    }

    #[test]
    fn single_mode_needs_exactly_one_edit() {
        let sentences = sentences();
        let mode = ExtractionMode::SingleSva;

        assert!(sentences[0].sva_pair(mode).is_some());
        assert!(sentences[1].sva_pair(mode).is_none());
        assert!(sentences[2].sva_pair(mode).is_none());
    }

    #[test]
    fn out_of_range_edits_are_skipped() {
        let sentences = parse("S The dog run .\nA 7 8|||R:VERB:SVA|||runs|||REQUIRED|||-NONE-|||0\n".as_bytes()).unwrap();
        assert!(sentences[0].sva_pair(ExtractionMode::LastEditSva).is_none());

        let sentences = parse(
            "S The dog run .\nA 9 9|||M:DET|||the|||REQUIRED|||-NONE-|||0\n\
             A 2 3|||R:VERB:SVA|||runs|||REQUIRED|||-NONE-|||0\n"
                .as_bytes(),
        )
        .unwrap();
        assert!(sentences[0].sva_pair(ExtractionMode::LastEditSva).is_none());
    }

    #[test]
    fn first_annotator_decides_even_without_edits() {
        let sentences = parse(
            "S The dogs runs .\nA -1 -1|||noop|||-NONE-|||REQUIRED|||-NONE-|||0\n\
             A 2 3|||R:VERB:SVA|||run|||REQUIRED|||-NONE-|||1\n"
                .as_bytes(),
        )
        .unwrap();

        assert_eq!(sentences[0].annotator, Some(0));
        assert!(sentences[0].edits.is_empty());
        assert!(sentences[0].sva_pair(ExtractionMode::default()).is_none());
    }

    #[test]
    fn malformed_lines_are_errors() {
        let result = parse("S A dog .\nA x 2|||R:VERB:SVA|||walk\n".as_bytes());
        assert!(matches!(result, Err(Error::MalformedM2 { line: 2, .. })));

        let result = parse("A 1 2|||R:VERB:SVA|||walk\n".as_bytes());
        assert!(matches!(result, Err(Error::MalformedM2 { line: 1, .. })));

        let result = parse("S A dog .\nA 1 2 R:VERB:SVA\n".as_bytes());
        assert!(matches!(result, Err(Error::MalformedM2 { line: 2, .. })));
    }

    #[test]
    fn can_extract_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.m2");
        let second = dir.path().join("second.m2");

        File::create(&first).unwrap().write_all(M2.as_bytes()).unwrap();
        File::create(&second).unwrap().write_all(b"S Fine .\n").unwrap();

        let (pairs, average) = extract_pairs(&[first, second], ExtractionMode::default()).unwrap();
        assert_eq!(pairs.len(), 3);
        assert!((average - 1.5).abs() < 1e-9);

        let (pairs, average) = extract_pairs::<&Path>(&[], ExtractionMode::default()).unwrap();
        assert!(pairs.is_empty());
        assert_eq!(average, 0.);
    }
}
