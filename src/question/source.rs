//! Question sources
//!
//! The round state machine draws raw records through the [`QuestionSource`]
//! capability. [`Deck`] is the in-memory implementation used by the terminal
//! driver and the tests; a remote API client would implement the same trait.

use std::{fs, io, path::Path};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::raw::RawQuestion;

/// Errors reported by a question source
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    /// No question is available, or the filter excludes all of them
    #[error("no eligible questions")]
    Empty,
}

/// Restricts which records a source may yield
///
/// An empty subject list accepts every subject. Subjects are compared
/// without regard to ASCII case so that `"Physics"` selects SciBowlDB's
/// `"PHYSICS"` records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Accepted subjects
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl Filter {
    /// A filter accepting only the given subjects
    pub fn subjects<I, S>(subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subjects: subjects.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the filter lets the record through
    pub fn accepts(&self, raw: &RawQuestion) -> bool {
        if self.subjects.is_empty() {
            return true;
        }
        let subject = raw.subject_field().unwrap_or_default();
        self.subjects
            .iter()
            .any(|wanted| wanted.trim().eq_ignore_ascii_case(subject))
    }
}

/// Capability yielding candidate question records
pub trait QuestionSource {
    /// Yields one raw record accepted by `filter`
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Empty`] when nothing passes the filter.
    fn next(&mut self, filter: &Filter) -> Result<RawQuestion, SourceError>;

    /// Whether asking again after a malformed record can yield another one
    fn supports_retry(&self) -> bool {
        true
    }
}

/// Errors that can occur while loading a deck
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read
    #[error("failed to read questions: {0}")]
    Io(#[from] io::Error),
    /// The file is not a recognized question dataset
    #[error("failed to parse questions: {0}")]
    Json(#[from] serde_json::Error),
}

/// Accepted dataset layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum Dataset {
    /// `{ "questions": [...] }`, as returned by SciBowlDB
    Envelope { questions: Vec<RawQuestion> },
    /// A bare list of records
    List(Vec<RawQuestion>),
    /// A single record
    Single(Box<RawQuestion>),
}

impl From<Dataset> for Vec<RawQuestion> {
    fn from(dataset: Dataset) -> Self {
        match dataset {
            Dataset::Envelope { questions } | Dataset::List(questions) => questions,
            Dataset::Single(question) => vec![*question],
        }
    }
}

/// An in-memory set of records drawn at random
#[derive(Debug, Clone)]
pub struct Deck {
    records: Vec<RawQuestion>,
    rng: fastrand::Rng,
}

impl Deck {
    /// Creates a deck with a randomly seeded generator
    pub fn new(records: Vec<RawQuestion>) -> Self {
        Self {
            records,
            rng: fastrand::Rng::new(),
        }
    }

    /// Creates a deck whose draws are reproducible
    pub fn with_seed(records: Vec<RawQuestion>, seed: u64) -> Self {
        Self {
            records,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Parses a JSON dataset
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Json`] if the text is not a record, a list of
    /// records, or a `questions` envelope.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let dataset: Dataset = serde_json::from_str(json)?;
        Ok(Self::new(dataset.into()))
    }

    /// Reads and parses a JSON dataset from disk
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Reseeds the generator
    #[must_use]
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Number of records in the deck
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the deck holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct subjects present in the deck, in first-seen order
    pub fn subjects(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(RawQuestion::subject_field)
            .unique()
            .collect_vec()
    }
}

impl QuestionSource for Deck {
    fn next(&mut self, filter: &Filter) -> Result<RawQuestion, SourceError> {
        let candidates = self
            .records
            .iter()
            .filter(|raw| filter.accepts(raw))
            .collect_vec();

        if candidates.is_empty() {
            return Err(SourceError::Empty);
        }

        Ok(candidates[self.rng.usize(..candidates.len())].clone())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn record(subject: &str, question: &str) -> RawQuestion {
        RawQuestion {
            category: Some(subject.to_string()),
            tossup_question: Some(question.to_string()),
            tossup_answer: Some("answer".to_string()),
            ..RawQuestion::default()
        }
    }

    #[test]
    fn test_empty_deck() {
        let mut deck = Deck::new(vec![]);
        assert!(deck.is_empty());
        assert_eq!(deck.next(&Filter::default()), Err(SourceError::Empty));
    }

    #[test]
    fn test_filter_excludes_everything() {
        let mut deck = Deck::new(vec![record("PHYSICS", "q1"), record("MATH", "q2")]);
        assert_eq!(
            deck.next(&Filter::subjects(["Chemistry"])),
            Err(SourceError::Empty)
        );
    }

    #[test]
    fn test_filter_ignores_case() {
        let mut deck = Deck::with_seed(
            vec![record("PHYSICS", "q1"), record("MATH", "q2")],
            7,
        );
        for _ in 0..10 {
            let raw = deck.next(&Filter::subjects(["math"])).unwrap();
            assert_eq!(raw.tossup_question.as_deref(), Some("q2"));
        }
    }

    #[test]
    fn test_blank_subject_falls_back_to_category() {
        let mut raw = record("PHYSICS", "q1");
        raw.subject = Some("  ".to_string());
        let mut deck = Deck::new(vec![raw]);

        assert!(deck.next(&Filter::subjects(["Physics"])).is_ok());
        assert_eq!(deck.subjects(), vec!["PHYSICS"]);
    }

    #[test]
    fn test_seeded_draws_repeat() {
        let records = (0..20).map(|i| record("MATH", &format!("q{i}"))).collect_vec();
        let mut a = Deck::with_seed(records.clone(), 42);
        let mut b = Deck::new(records).seeded(42);
        for _ in 0..10 {
            assert_eq!(
                a.next(&Filter::default()).unwrap(),
                b.next(&Filter::default()).unwrap()
            );
        }
    }

    #[test]
    fn test_dataset_layouts() {
        let envelope = Deck::from_json(
            r#"{"questions": [{"category": "MATH", "tossup_question": "q", "tossup_answer": "a"}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.len(), 1);

        let list = Deck::from_json(r#"[{"subject": "A"}, {"subject": "B"}, {"subject": "A"}]"#)
            .unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.subjects(), vec!["A", "B"]);

        let single = Deck::from_json(r#"{"category": "MATH"}"#).unwrap();
        assert_eq!(single.len(), 1);

        assert!(matches!(Deck::from_json("42"), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Deck::load("/definitely/not/here.json"),
            Err(LoadError::Io(_))
        ));
    }
}
