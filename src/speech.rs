//! Speech channel
//!
//! Wraps the [`Presenter`] capability as a cancelable, completion-signaling
//! operation. Every utterance gets a fresh [`UtteranceId`]; only the id of
//! the utterance currently pending is accepted as a completion, so a
//! completion that arrives after a cancel is recognized as stale.

use std::fmt;

use heck::ToTitleCase;
use serde::{Deserialize, Serialize};

use crate::{
    constants::phrases::BONUS_PREFIX,
    question::{Body, OptionKey, Question},
    session::Presenter,
};

/// Identifies one utterance handed to the presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UtteranceId(u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utterance#{}", self.0)
    }
}

/// Text to be read aloud
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Utterance {
    /// Id to report back on completion
    pub id: UtteranceId,
    /// What to say
    pub text: String,
}

/// Tracks the single pending utterance
#[derive(Debug, Default, Clone)]
pub struct SpeechChannel {
    issued: u64,
    pending: Option<UtteranceId>,
}

impl SpeechChannel {
    /// Speaks `text`, canceling whatever is still pending
    pub fn speak<P: Presenter>(&mut self, presenter: &P, text: impl Into<String>) -> UtteranceId {
        self.cancel(presenter);

        self.issued += 1;
        let id = UtteranceId(self.issued);
        let utterance = Utterance {
            id,
            text: text.into(),
        };
        log::debug!("speaking {id}: {}", utterance.text);
        presenter.speak(&utterance);
        self.pending = Some(id);
        id
    }

    /// Cancels the pending utterance, if any
    pub fn cancel<P: Presenter>(&mut self, presenter: &P) {
        if let Some(id) = self.pending.take() {
            log::debug!("canceling {id}");
            presenter.cancel();
        }
    }

    /// Accepts a completion signal
    ///
    /// Returns `true` only for the pending utterance; stale or canceled ids
    /// are ignored.
    pub fn finish(&mut self, id: UtteranceId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            log::debug!("ignoring completion of stale {id}");
            false
        }
    }

    /// The utterance currently being read
    pub fn pending(&self) -> Option<UtteranceId> {
        self.pending
    }
}

/// Renders the spoken form of a question
///
/// Short answer: `"Short answer, Physics, <prompt>."`.
/// Multiple choice: `"Multiple choice, Biology, <prompt>. W (..), X (..), Y (..), Z (..)."`.
/// Bonus questions are prefixed with `"Bonus, "`. The period after the prompt
/// is only added when the prompt has no closing punctuation of its own.
pub fn render_question(question: &Question, is_bonus: bool) -> String {
    let prefix = if is_bonus { BONUS_PREFIX } else { "" };
    let subject = question.subject().to_title_case();
    let prompt = question.prompt().trim_end();
    let stop = if prompt.ends_with(['.', '?', '!']) {
        ""
    } else {
        "."
    };

    match question.body() {
        Body::ShortAnswer { .. } => format!("{prefix}Short answer, {subject}, {prompt}{stop}"),
        Body::MultipleChoice { options, .. } => {
            let spoken = OptionKey::ALL
                .iter()
                .map(|key| format!("{key} ({})", options[*key]))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{prefix}Multiple choice, {subject}, {prompt}{stop} {spoken}.")
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::{Arc, Mutex};

    use enum_map::enum_map;

    use super::*;

    #[derive(Debug, Clone, Default)]
    struct MockPresenter {
        spoken: Arc<Mutex<Vec<Utterance>>>,
        cancels: Arc<Mutex<usize>>,
    }

    impl Presenter for MockPresenter {
        fn speak(&self, utterance: &Utterance) {
            self.spoken.lock().unwrap().push(utterance.clone());
        }

        fn cancel(&self) {
            *self.cancels.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_render_short_answer() {
        let question = Question::short_answer(
            "EARTH AND SPACE",
            "What is the closest star to Earth?",
            "Sun",
        );
        assert_eq!(
            render_question(&question, false),
            "Short answer, Earth And Space, What is the closest star to Earth?"
        );
        assert!(render_question(&question, true).starts_with("Bonus, Short answer"));
    }

    #[test]
    fn test_render_adds_period_only_when_missing() {
        let spoken = |prompt: &str| {
            render_question(&Question::short_answer("MATH", prompt, "4"), false)
        };
        assert_eq!(spoken("Add two and two"), "Short answer, Math, Add two and two.");
        assert_eq!(spoken("Add two and two.  "), "Short answer, Math, Add two and two.");
        assert_eq!(spoken("Is it four!"), "Short answer, Math, Is it four!");
    }

    #[test]
    fn test_render_multiple_choice_in_fixed_order() {
        let question = Question::multiple_choice(
            "BIOLOGY",
            "Plant cell walls are mostly made of what",
            enum_map! {
                OptionKey::W => "Chitin".to_string(),
                OptionKey::X => "Cellulose".to_string(),
                OptionKey::Y => "Lignin".to_string(),
                OptionKey::Z => "Hemicellulose".to_string(),
            },
            OptionKey::X,
        );
        assert_eq!(
            render_question(&question, false),
            "Multiple choice, Biology, Plant cell walls are mostly made of what. \
             W (Chitin), X (Cellulose), Y (Lignin), Z (Hemicellulose)."
        );
    }

    #[test]
    fn test_speak_replaces_pending() {
        let presenter = MockPresenter::default();
        let mut channel = SpeechChannel::default();

        let first = channel.speak(&presenter, "one");
        let second = channel.speak(&presenter, "two");

        assert_ne!(first, second);
        assert_eq!(*presenter.cancels.lock().unwrap(), 1);
        assert_eq!(channel.pending(), Some(second));
        assert!(!channel.finish(first));
        assert!(channel.finish(second));
        assert_eq!(channel.pending(), None);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let presenter = MockPresenter::default();
        let mut channel = SpeechChannel::default();

        channel.cancel(&presenter);
        assert_eq!(*presenter.cancels.lock().unwrap(), 0);

        let id = channel.speak(&presenter, "hello");
        channel.cancel(&presenter);
        channel.cancel(&presenter);
        assert_eq!(*presenter.cancels.lock().unwrap(), 1);

        // completion of the canceled utterance arrives late
        assert!(!channel.finish(id));
    }
}
