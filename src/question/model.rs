//! Canonical question shape
//!
//! Every record coming out of a question source is normalized into a
//! [`Question`] before it can be played. A question is either a short answer
//! (free text, graded by string comparison) or a multiple choice question
//! with the fixed option keys W, X, Y and Z. Either kind may carry a bonus
//! follow-up that is only played after the parent was answered correctly.

use std::fmt;

use enum_map::{Enum, EnumMap};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::constants::source::{MAX_ANSWER_LENGTH, MAX_PROMPT_LENGTH, MAX_SUBJECT_LENGTH};

/// Key of a multiple choice option
///
/// The key set is fixed; options are always presented in W, X, Y, Z order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Enum, Serialize, Deserialize,
)]
pub enum OptionKey {
    /// First option
    W,
    /// Second option
    X,
    /// Third option
    Y,
    /// Fourth option
    Z,
}

impl OptionKey {
    /// All keys in presentation order
    pub const ALL: [OptionKey; 4] = [OptionKey::W, OptionKey::X, OptionKey::Y, OptionKey::Z];

    /// Returns the key as an uppercase letter
    pub fn as_str(self) -> &'static str {
        match self {
            Self::W => "W",
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }

    /// Parses a single letter, ignoring case
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'W' => Some(Self::W),
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }

    /// Parses a key written as a lone letter (`"x"`, `" X "`)
    pub fn from_letter(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two kinds of question a round can present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free text answer
    ShortAnswer,
    /// One of four lettered options
    MultipleChoice,
}

/// Rejects options whose text is blank
fn validate_options(options: &EnumMap<OptionKey, String>, _ctx: &()) -> garde::Result {
    match options.iter().find(|(_, text)| text.trim().is_empty()) {
        Some((key, _)) => Err(garde::Error::new(format!("option {key} is empty"))),
        None => Ok(()),
    }
}

/// Kind-specific part of a question
///
/// A multiple choice answer is a key into a map holding all four options, so
/// the answer can never point outside the options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Body {
    /// Free text question with its canonical answer, stored verbatim
    ShortAnswer {
        /// Canonical answer
        #[garde(length(chars, min = 1, max = MAX_ANSWER_LENGTH))]
        answer: String,
    },
    /// Lettered options and the key of the correct one
    MultipleChoice {
        /// Option text per key
        #[garde(custom(validate_options))]
        options: EnumMap<OptionKey, String>,
        /// Key of the correct option
        #[garde(skip)]
        answer: OptionKey,
    },
}

/// A normalized, immutable question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Category label, e.g. "PHYSICS"
    #[garde(length(chars, min = 1, max = MAX_SUBJECT_LENGTH))]
    subject: String,
    /// Text that is read aloud (without the options)
    #[garde(length(chars, min = 1, max = MAX_PROMPT_LENGTH))]
    prompt: String,
    #[garde(dive)]
    #[serde(flatten)]
    body: Body,
    /// Follow-up played after a correct answer
    #[garde(dive)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bonus: Option<Box<Question>>,
}

impl Question {
    /// Builds a short answer question
    pub fn short_answer(
        subject: impl Into<String>,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            prompt: prompt.into(),
            body: Body::ShortAnswer {
                answer: answer.into(),
            },
            bonus: None,
        }
    }

    /// Builds a multiple choice question from its four options
    pub fn multiple_choice(
        subject: impl Into<String>,
        prompt: impl Into<String>,
        options: EnumMap<OptionKey, String>,
        answer: OptionKey,
    ) -> Self {
        Self {
            subject: subject.into(),
            prompt: prompt.into(),
            body: Body::MultipleChoice { options, answer },
            bonus: None,
        }
    }

    /// Attaches a bonus follow-up
    #[must_use]
    pub fn with_bonus(mut self, bonus: Question) -> Self {
        self.bonus = Some(Box::new(bonus));
        self
    }

    /// Kind of the question
    pub fn kind(&self) -> QuestionKind {
        match self.body {
            Body::ShortAnswer { .. } => QuestionKind::ShortAnswer,
            Body::MultipleChoice { .. } => QuestionKind::MultipleChoice,
        }
    }

    /// Category label
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Question text without the options
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Canonical answer; the option letter for multiple choice
    pub fn answer(&self) -> &str {
        match &self.body {
            Body::ShortAnswer { answer } => answer,
            Body::MultipleChoice { answer, .. } => answer.as_str(),
        }
    }

    /// Key of the correct option, for multiple choice questions
    pub fn answer_key(&self) -> Option<OptionKey> {
        match &self.body {
            Body::ShortAnswer { .. } => None,
            Body::MultipleChoice { answer, .. } => Some(*answer),
        }
    }

    /// Options, for multiple choice questions
    pub fn options(&self) -> Option<&EnumMap<OptionKey, String>> {
        match &self.body {
            Body::ShortAnswer { .. } => None,
            Body::MultipleChoice { options, .. } => Some(options),
        }
    }

    /// Kind-specific part
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Bonus follow-up, if any
    pub fn bonus(&self) -> Option<&Question> {
        self.bonus.as_deref()
    }
}
