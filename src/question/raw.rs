//! Raw question records and their normalization
//!
//! Question datasets come in two shapes: the SciBowlDB API record
//! (`category`, `tossup_question`, `tossup_answer`, `tossup_format`, and the
//! matching `bonus_*` fields) and a local fixture shape (`subject`,
//! `question`, `answer`, `type`, `options`, nested `bonus`). Both are read
//! into a single [`RawQuestion`] with every field optional, and [`normalize`]
//! turns it into a validated [`Question`] or explains what is missing.

use std::collections::BTreeMap;

use enum_map::EnumMap;
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{Body, OptionKey, Question, QuestionKind};

/// A question record as it appears in a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawQuestion {
    /// SciBowlDB category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Local subject label, preferred over `category`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Local question text, preferred over `tossup_question`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// SciBowlDB toss-up text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tossup_question: Option<String>,
    /// Local answer, preferred over `tossup_answer`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// SciBowlDB toss-up answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tossup_answer: Option<String>,
    /// Local format hint (`"multiple"` or `"toss-up"`)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// SciBowlDB format hint (`"Multiple Choice"` or `"Short Answer"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tossup_format: Option<String>,
    /// Explicit options keyed by letter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, String>>,
    /// Nested bonus record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus: Option<Box<RawQuestion>>,
    /// SciBowlDB bonus text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_question: Option<String>,
    /// SciBowlDB bonus answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_answer: Option<String>,
    /// SciBowlDB bonus format hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_format: Option<String>,
}

/// Reasons a raw record cannot be turned into a [`Question`]
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum MalformedQuestion {
    /// A required field is absent or blank
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// A multiple choice question does not provide all four options
    #[error("multiple choice question has no option {0}")]
    MissingOption(OptionKey),
    /// An option letter appears twice in the question text
    #[error("option {0} is listed more than once")]
    DuplicateOption(OptionKey),
    /// An explicit option uses a key outside W, X, Y, Z
    #[error("`{0}` is not an option key")]
    UnknownOptionKey(String),
    /// The answer of a multiple choice question names no option
    #[error("answer `{0}` is not one of the options")]
    AnswerNotAnOption(String),
    /// The bonus record is malformed
    #[error("bonus is malformed: {0}")]
    Bonus(Box<MalformedQuestion>),
    /// A field fails a length or content check
    #[error("invalid question: {0}")]
    Invalid(String),
}

/// Returns the trimmed value if it is present and not blank
fn present(field: Option<&String>) -> Option<&str> {
    field.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// What the format hint says about the question kind
fn hinted_kind(hint: Option<&str>) -> Option<QuestionKind> {
    let hint = hint?.to_lowercase();
    if hint.contains("multiple") {
        Some(QuestionKind::MultipleChoice)
    } else if hint.contains("short") || hint.contains("toss") {
        Some(QuestionKind::ShortAnswer)
    } else {
        None
    }
}

/// Parses a `W) text` line into its key and text
fn option_line(line: &str) -> Option<(OptionKey, &str)> {
    let line = line.trim_start();
    let mut chars = line.chars();
    let letter = chars.next().filter(char::is_ascii_uppercase)?;
    let key = OptionKey::from_char(letter)?;
    if chars.next() != Some(')') {
        return None;
    }
    Some((key, line[2..].trim()))
}

/// Splits a question text into the stem and the options laid out below it
///
/// Lines before the first `LETTER) text` line form the stem. Lines after it
/// that are not option lines continue the previous option.
fn split_layout(
    text: &str,
) -> Result<Option<(String, EnumMap<OptionKey, String>)>, MalformedQuestion> {
    let lines = text.lines().collect_vec();
    let Some(first) = lines.iter().position(|line| option_line(line).is_some()) else {
        return Ok(None);
    };

    let stem = lines[..first].iter().map(|l| l.trim()).join("\n");

    let mut found: EnumMap<OptionKey, Option<String>> = EnumMap::default();
    let mut current = None;
    for line in &lines[first..] {
        if let Some((key, option_text)) = option_line(line) {
            if found[key].is_some() {
                return Err(MalformedQuestion::DuplicateOption(key));
            }
            found[key] = Some(option_text.to_string());
            current = Some(key);
        } else if let Some(key) = current {
            let continuation = line.trim();
            if let Some(option_text) = found[key].as_mut().filter(|_| !continuation.is_empty()) {
                option_text.push(' ');
                option_text.push_str(continuation);
            }
        }
    }

    Ok(Some((stem.trim().to_string(), complete_options(found)?)))
}

/// Requires all four options to be present
fn complete_options(
    found: EnumMap<OptionKey, Option<String>>,
) -> Result<EnumMap<OptionKey, String>, MalformedQuestion> {
    if let Some((key, _)) = found.iter().find(|(_, text)| text.is_none()) {
        return Err(MalformedQuestion::MissingOption(key));
    }
    Ok(EnumMap::from_fn(|key| found[key].clone().unwrap_or_default()))
}

/// Reads an explicit `{"W": ..., "X": ...}` option map
fn explicit_options(
    options: &BTreeMap<String, String>,
) -> Result<EnumMap<OptionKey, String>, MalformedQuestion> {
    let mut found: EnumMap<OptionKey, Option<String>> = EnumMap::default();
    for (key, text) in options {
        let key = OptionKey::from_letter(key)
            .ok_or_else(|| MalformedQuestion::UnknownOptionKey(key.clone()))?;
        if found[key].is_some() {
            return Err(MalformedQuestion::DuplicateOption(key));
        }
        found[key] = Some(text.trim().to_string());
    }
    complete_options(found)
}

/// Reduces a raw multiple choice answer to an option key
///
/// Accepts a lone letter (`"x"`), the option text itself, a lettered answer
/// (`"X) CELLULOSE"`), or a letter followed by that option's text
/// (`"X CELLULOSE"`), ignoring case. Option text is matched before the
/// letter prefix so that an option such as `"X rays"` resolves to its own
/// key.
fn answer_key(
    answer: &str,
    options: &EnumMap<OptionKey, String>,
) -> Result<OptionKey, MalformedQuestion> {
    if let Some(key) = OptionKey::from_letter(answer) {
        return Ok(key);
    }

    if let Some((key, _)) = options
        .iter()
        .find(|(_, text)| text.eq_ignore_ascii_case(answer))
    {
        return Ok(key);
    }

    let mut chars = answer.chars();
    if let Some(key) = chars.next().and_then(OptionKey::from_char) {
        let rest = chars.as_str();
        if rest.starts_with(')')
            || (rest.starts_with(char::is_whitespace)
                && rest.trim().eq_ignore_ascii_case(options[key].trim()))
        {
            return Ok(key);
        }
    }

    Err(MalformedQuestion::AnswerNotAnOption(answer.to_string()))
}

impl RawQuestion {
    /// Subject, preferring the local field and skipping blank values
    pub(crate) fn subject_field(&self) -> Option<&str> {
        present(self.subject.as_ref()).or_else(|| present(self.category.as_ref()))
    }

    /// Question text, preferring the local field
    fn question_field(&self) -> Option<&str> {
        present(self.question.as_ref()).or_else(|| present(self.tossup_question.as_ref()))
    }

    /// Answer, preferring the local field and keeping it verbatim
    fn answer_field(&self) -> Option<&str> {
        self.answer
            .as_deref()
            .or(self.tossup_answer.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// Format hint, preferring the local field
    fn format_field(&self) -> Option<&str> {
        present(self.format.as_ref()).or_else(|| present(self.tossup_format.as_ref()))
    }

    /// The bonus as its own raw record, if the record carries one
    fn bonus_record(&self) -> Option<RawQuestion> {
        if let Some(bonus) = &self.bonus {
            let mut bonus = bonus.as_ref().clone();
            if bonus.subject_field().is_none() {
                bonus.subject = self.subject_field().map(str::to_string);
            }
            return Some(bonus);
        }

        if self.bonus_question.is_none() && self.bonus_answer.is_none() {
            return None;
        }

        Some(RawQuestion {
            subject: self.subject_field().map(str::to_string),
            question: self.bonus_question.clone(),
            answer: self.bonus_answer.clone(),
            format: self.bonus_format.clone(),
            ..RawQuestion::default()
        })
    }
}

/// Normalizes a raw record into a validated [`Question`]
///
/// # Errors
///
/// Returns [`MalformedQuestion`] when the subject, question text or answer is
/// missing, when a multiple choice question does not list all four options,
/// when its answer names no option, or when the bonus is malformed.
pub fn normalize(raw: &RawQuestion) -> Result<Question, MalformedQuestion> {
    let subject = raw
        .subject_field()
        .ok_or(MalformedQuestion::MissingField("category"))?;
    let text = raw
        .question_field()
        .ok_or(MalformedQuestion::MissingField("question"))?;
    let answer = raw
        .answer_field()
        .ok_or(MalformedQuestion::MissingField("answer"))?;

    let layout = match (hinted_kind(raw.format_field()), &raw.options) {
        (_, Some(options)) => Some((text.to_string(), explicit_options(options)?)),
        (Some(QuestionKind::ShortAnswer), None) => None,
        (Some(QuestionKind::MultipleChoice), None) => Some(
            split_layout(text)?.ok_or(MalformedQuestion::MissingOption(OptionKey::W))?,
        ),
        (None, None) => split_layout(text)?,
    };

    let mut question = match layout {
        Some((stem, options)) => {
            let key = answer_key(answer.trim(), &options)?;
            Question::multiple_choice(subject, stem, options, key)
        }
        None => Question::short_answer(subject, text, answer),
    };

    if let Some(bonus) = raw.bonus_record() {
        let bonus = normalize(&bonus).map_err(|e| MalformedQuestion::Bonus(Box::new(e)))?;
        question = question.with_bonus(bonus);
    }

    question
        .validate()
        .map_err(|report| MalformedQuestion::Invalid(report.to_string()))?;

    Ok(question)
}

impl From<&Question> for RawQuestion {
    /// Writes a question back in the local fixture shape
    fn from(question: &Question) -> Self {
        let (format, options) = match question.body() {
            Body::ShortAnswer { .. } => ("toss-up", None),
            Body::MultipleChoice { options, .. } => (
                "multiple",
                Some(
                    options
                        .iter()
                        .map(|(key, text)| (key.as_str().to_string(), text.clone()))
                        .collect(),
                ),
            ),
        };

        RawQuestion {
            subject: Some(question.subject().to_string()),
            question: Some(question.prompt().to_string()),
            answer: Some(question.answer().to_string()),
            format: Some(format.to_string()),
            options,
            bonus: question.bonus().map(|b| Box::new(RawQuestion::from(b))),
            ..RawQuestion::default()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn scibowl_record() -> RawQuestion {
        serde_json::from_str(
            r#"{
                "id": 3412,
                "category": "PHYSICS",
                "source": "Round 4",
                "tossup_format": "Short Answer",
                "tossup_question": "What intrinsic property of the electron has values plus or minus one half?",
                "tossup_answer": "Spin",
                "bonus_format": "Multiple Choice",
                "bonus_question": "Which of the following is a lepton?\nW) Proton\nX) Neutron\nY) Muon\nZ) Pion",
                "bonus_answer": "Y) MUON"
            }"#,
        )
        .unwrap()
    }

    fn fixtures() -> Vec<RawQuestion> {
        let local: Vec<RawQuestion> = serde_json::from_str(
            r#"[
                {
                    "type": "multiple",
                    "subject": "Biology",
                    "question": "Plant cell walls are mostly made of what?",
                    "options": { "W": "Chitin", "X": "Cellulose", "Y": "Lignin", "Z": "Hemicellulose" },
                    "answer": "X",
                    "bonus": { "type": "toss-up", "question": "Name the monomer of cellulose.", "answer": "Glucose" }
                },
                {
                    "category": "EARTH AND SPACE",
                    "tossup_question": "Which planet has the shortest day?\nW) Jupiter\nX) Earth\nY) Mars\nZ) Venus",
                    "tossup_answer": "W) JUPITER"
                },
                {
                    "category": "MATH",
                    "tossup_format": "Short Answer",
                    "tossup_question": "What is 7 times 8?",
                    "tossup_answer": " 56 "
                }
            ]"#,
        )
        .unwrap();
        let mut all = vec![scibowl_record()];
        all.extend(local);
        all
    }

    #[test]
    fn test_scibowl_short_answer_with_multiple_choice_bonus() {
        let question = normalize(&scibowl_record()).unwrap();

        assert_eq!(question.kind(), QuestionKind::ShortAnswer);
        assert_eq!(question.subject(), "PHYSICS");
        assert_eq!(question.answer(), "Spin");

        let bonus = question.bonus().unwrap();
        assert_eq!(bonus.kind(), QuestionKind::MultipleChoice);
        assert_eq!(bonus.subject(), "PHYSICS");
        assert_eq!(bonus.prompt(), "Which of the following is a lepton?");
        assert_eq!(bonus.answer_key(), Some(OptionKey::Y));
        assert_eq!(bonus.options().unwrap()[OptionKey::Z], "Pion");
    }

    #[test]
    fn test_layout_detection_without_hint() {
        let raw = RawQuestion {
            category: Some("EARTH AND SPACE".to_string()),
            tossup_question: Some(
                "Which planet has the shortest day?\nW) Jupiter\nX) Earth\nY) Mars\nZ) Venus"
                    .to_string(),
            ),
            tossup_answer: Some("w".to_string()),
            ..RawQuestion::default()
        };
        let question = normalize(&raw).unwrap();
        assert_eq!(question.kind(), QuestionKind::MultipleChoice);
        assert_eq!(question.answer(), "W");
        assert!(question.bonus().is_none());
    }

    #[test]
    fn test_option_continuation_lines() {
        let raw = RawQuestion {
            subject: Some("CHEMISTRY".to_string()),
            question: Some(
                "Pick one.\nW) A long\n   option\nX) Two\nY) Three\nZ) Four".to_string(),
            ),
            answer: Some("A long option".to_string()),
            ..RawQuestion::default()
        };
        let question = normalize(&raw).unwrap();
        assert_eq!(question.options().unwrap()[OptionKey::W], "A long option");
        assert_eq!(question.answer_key(), Some(OptionKey::W));
    }

    #[test]
    fn test_short_answer_hint_skips_layout_detection() {
        let raw = RawQuestion {
            subject: Some("PHYSICS".to_string()),
            question: Some("Name the quantity.\nX) marks the spot".to_string()),
            answer: Some("Force".to_string()),
            format: Some("toss-up".to_string()),
            ..RawQuestion::default()
        };
        let question = normalize(&raw).unwrap();
        assert_eq!(question.kind(), QuestionKind::ShortAnswer);
    }

    #[test]
    fn test_short_answer_keeps_answer_verbatim() {
        let raw = &fixtures()[3];
        let question = normalize(raw).unwrap();
        assert_eq!(question.answer(), " 56 ");
    }

    #[test]
    fn test_missing_fields() {
        let mut raw = scibowl_record();
        raw.category = None;
        assert_eq!(
            normalize(&raw),
            Err(MalformedQuestion::MissingField("category"))
        );

        let mut raw = scibowl_record();
        raw.tossup_question = Some("   ".to_string());
        assert_eq!(
            normalize(&raw),
            Err(MalformedQuestion::MissingField("question"))
        );

        let mut raw = scibowl_record();
        raw.tossup_answer = None;
        assert_eq!(normalize(&raw), Err(MalformedQuestion::MissingField("answer")));
    }

    #[test]
    fn test_answer_not_an_option() {
        let mut raw = scibowl_record();
        raw.bonus_answer = Some("ELECTRON".to_string());
        assert_eq!(
            normalize(&raw),
            Err(MalformedQuestion::Bonus(Box::new(
                MalformedQuestion::AnswerNotAnOption("ELECTRON".to_string())
            )))
        );
    }

    #[test]
    fn test_missing_option() {
        let raw = RawQuestion {
            subject: Some("BIOLOGY".to_string()),
            question: Some("Stem\nW) One\nX) Two\nY) Three".to_string()),
            answer: Some("W".to_string()),
            ..RawQuestion::default()
        };
        assert_eq!(
            normalize(&raw),
            Err(MalformedQuestion::MissingOption(OptionKey::Z))
        );
    }

    #[test]
    fn test_multiple_choice_hint_without_options() {
        let raw = RawQuestion {
            subject: Some("BIOLOGY".to_string()),
            question: Some("Stem without options".to_string()),
            answer: Some("W".to_string()),
            format: Some("multiple".to_string()),
            ..RawQuestion::default()
        };
        assert!(matches!(
            normalize(&raw),
            Err(MalformedQuestion::MissingOption(_))
        ));
    }

    #[test]
    fn test_duplicate_option() {
        let raw = RawQuestion {
            subject: Some("BIOLOGY".to_string()),
            question: Some("Stem\nW) One\nW) Again\nX) Two\nY) Three\nZ) Four".to_string()),
            answer: Some("W".to_string()),
            ..RawQuestion::default()
        };
        assert_eq!(
            normalize(&raw),
            Err(MalformedQuestion::DuplicateOption(OptionKey::W))
        );
    }

    #[test]
    fn test_unknown_explicit_key() {
        let mut raw = fixtures()[1].clone();
        if let Some(options) = raw.options.as_mut() {
            options.insert("A".to_string(), "Extra".to_string());
        }
        assert_eq!(
            normalize(&raw),
            Err(MalformedQuestion::UnknownOptionKey("A".to_string()))
        );
    }

    #[test]
    fn test_partial_bonus_is_malformed() {
        let mut raw = scibowl_record();
        raw.bonus_answer = None;
        assert_eq!(
            normalize(&raw),
            Err(MalformedQuestion::Bonus(Box::new(
                MalformedQuestion::MissingField("answer")
            )))
        );
    }

    #[test]
    fn test_nested_bonus_inherits_subject() {
        let question = normalize(&fixtures()[1]).unwrap();
        let bonus = question.bonus().unwrap();
        assert_eq!(bonus.subject(), "Biology");
        assert_eq!(bonus.answer(), "Glucose");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in fixtures() {
            let question = normalize(&raw).unwrap();
            let again = normalize(&RawQuestion::from(&question)).unwrap();
            assert_eq!(again, question);
        }
    }

    fn layout(options: [&str; 4]) -> EnumMap<OptionKey, String> {
        let text = OptionKey::ALL
            .iter()
            .zip(options)
            .map(|(key, option)| format!("{key}) {option}"))
            .join("\n");
        split_layout(&format!("Stem\n{text}")).unwrap().unwrap().1
    }

    #[test]
    fn test_option_text_beats_letter_prefix() {
        let options = layout(["Gamma rays", "Radio waves", "Microwaves", "X rays"]);

        assert_eq!(answer_key("X rays", &options), Ok(OptionKey::Z));
        assert_eq!(answer_key("x RAYS", &options), Ok(OptionKey::Z));
        assert_eq!(answer_key("Z X RAYS", &options), Ok(OptionKey::Z));
        assert_eq!(answer_key("Z) X RAYS", &options), Ok(OptionKey::Z));
        assert_eq!(answer_key("x", &options), Ok(OptionKey::X));
        assert_eq!(
            answer_key("Y something-else", &options),
            Err(MalformedQuestion::AnswerNotAnOption(
                "Y something-else".to_string()
            ))
        );
    }

    const OPTION_POOL: [&str; 12] = [
        "X rays",
        "Z boson",
        "W particle",
        "Y chromosome",
        "Gamma rays",
        "Radio waves",
        "Microwaves",
        "Neutrino",
        "Photon",
        "Muon",
        "Gluon",
        "Helium",
    ];

    fn pad(rng: &mut fastrand::Rng, text: &str) -> String {
        format!(
            "{}{text}{}",
            " ".repeat(rng.usize(..3)),
            " ".repeat(rng.usize(..3))
        )
    }

    fn random_case(rng: &mut fastrand::Rng, text: &str) -> String {
        if rng.bool() {
            text.to_uppercase()
        } else {
            text.to_lowercase()
        }
    }

    /// Writes `question` the way a dataset might, with `answer` as given
    fn generated_record(
        rng: &mut fastrand::Rng,
        subject: &str,
        text: String,
        answer: String,
        hint: Option<&str>,
        options: Option<BTreeMap<String, String>>,
    ) -> RawQuestion {
        if rng.bool() {
            RawQuestion {
                category: Some(subject.to_string()),
                tossup_question: Some(text),
                tossup_answer: Some(answer),
                tossup_format: hint.map(str::to_string),
                options,
                ..RawQuestion::default()
            }
        } else {
            RawQuestion {
                subject: Some(subject.to_string()),
                question: Some(text),
                answer: Some(answer),
                format: hint.map(str::to_string),
                options,
                ..RawQuestion::default()
            }
        }
    }

    /// A random record together with the question it must normalize to
    fn generated_case(rng: &mut fastrand::Rng, index: usize) -> (RawQuestion, Question) {
        let subject = ["PHYSICS", "Biology", "EARTH AND SPACE"][rng.usize(..3)];

        if rng.usize(..4) == 0 {
            let prompt = format!("Name quantity number {index}");
            let answer = pad(rng, &format!("Answer {index}"));
            let hint = [None, Some("Short Answer"), Some("toss-up")][rng.usize(..3)];
            let raw = generated_record(rng, subject, prompt.clone(), answer.clone(), hint, None);
            return (raw, Question::short_answer(subject, prompt, answer));
        }

        let mut pool = OPTION_POOL.to_vec();
        rng.shuffle(&mut pool);
        let texts: EnumMap<OptionKey, String> =
            EnumMap::from_fn(|key: OptionKey| pool[key as usize].to_string());
        let key = OptionKey::ALL[rng.usize(..4)];
        let stem = format!("Which of these is item {index}?");

        let answer = match rng.usize(..4) {
            0 => random_case(rng, key.as_str()),
            1 => format!("{key}) {}", texts[key].to_uppercase()),
            2 => random_case(rng, &texts[key]),
            _ => format!("{key} {}", texts[key]),
        };
        let answer = pad(rng, &answer);
        let hint = [None, Some("Multiple Choice"), Some("multiple")][rng.usize(..3)];

        let (text, options) = if rng.bool() {
            let lines = texts.iter().map(|(k, t)| format!("{k}) {t}")).join("\n");
            (format!("{stem}\n{lines}"), None)
        } else {
            let map = texts
                .iter()
                .map(|(k, t)| {
                    let letter = if rng.bool() {
                        k.as_str().to_lowercase()
                    } else {
                        k.as_str().to_string()
                    };
                    (letter, t.clone())
                })
                .collect();
            (stem.clone(), Some(map))
        };

        let mut raw = generated_record(rng, subject, text, answer, hint, options);
        let mut question = Question::multiple_choice(subject, stem, texts, key);

        match rng.usize(..3) {
            0 => {}
            1 => {
                raw.bonus_format = Some("Short Answer".to_string());
                raw.bonus_question = Some(format!("Name follow-up {index}"));
                raw.bonus_answer = Some(format!("Follow-up {index}"));
                question = question.with_bonus(Question::short_answer(
                    subject,
                    format!("Name follow-up {index}"),
                    format!("Follow-up {index}"),
                ));
            }
            _ => {
                raw.bonus = Some(Box::new(RawQuestion {
                    question: Some(format!("Name follow-up {index}")),
                    answer: Some(format!("Follow-up {index}")),
                    ..RawQuestion::default()
                }));
                question = question.with_bonus(Question::short_answer(
                    subject,
                    format!("Name follow-up {index}"),
                    format!("Follow-up {index}"),
                ));
            }
        }

        (raw, question)
    }

    #[test]
    fn test_generated_records_resolve_their_answer() {
        let mut rng = fastrand::Rng::with_seed(0x7055);
        for index in 0..200 {
            let (raw, expected) = generated_case(&mut rng, index);
            let question = normalize(&raw).unwrap_or_else(|e| panic!("{raw:?}: {e}"));

            assert_eq!(question, expected, "{raw:?}");
            assert_eq!(question.answer_key(), expected.answer_key(), "{raw:?}");
            assert_eq!(question.options(), expected.options(), "{raw:?}");
            assert_eq!(normalize(&RawQuestion::from(&question)), Ok(question));
        }
    }
}
