//! Round state machine
//!
//! A [`Round`] sequences one question at a time through
//! [`Phase::Presenting`], [`Phase::AwaitingAnswer`], an optional
//! [`Phase::Locked`] after a buzz, and finally [`Phase::Graded`]. It owns
//! the score and the bonus chain, and it is the only place either changes.
//!
//! Every handler runs to completion and returns. Anything that has to happen
//! later (the next countdown tick, the end of the lockout) is requested from
//! the host through `schedule_message` and arrives back through
//! [`Round::receive_alarm`]. Alarms carry the round number or the timer
//! generation they were scheduled for, so an alarm that outlived its round
//! is dropped instead of acting on the next one.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

use crate::{
    StatusMessage,
    config::Options,
    constants::{
        phrases::{BUZZ_CONFIRMATION, CORRECT, INCORRECT},
        points,
        source::MAX_MALFORMED_RETRIES,
    },
    question::{
        MalformedQuestion, OptionKey, Question, QuestionKind, QuestionSource, SourceError,
        normalize,
    },
    score::ScoreTracker,
    session::{Presenter, StatusSink},
    speech::{SpeechChannel, UtteranceId, render_question},
    timer::{RoundTimer, TickOutcome},
};

/// Phases a round passes through
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// No round is live
    #[default]
    #[display("idle")]
    Idle,
    /// The question is being read
    #[display("presenting")]
    Presenting,
    /// The countdown runs
    #[display("awaiting an answer")]
    AwaitingAnswer,
    /// The player buzzed in
    #[display("locked")]
    Locked,
    /// The round is over
    #[display("graded")]
    Graded,
}

/// Alarm messages for the round itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// The lockout after a buzz in `round` is over
    LockoutExpired {
        /// Round the lockout belongs to
        round: u64,
    },
}

/// Input from the player or the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Begin the next round, abandoning a live one
    StartRound,
    /// Claim the right to answer
    Buzz,
    /// Free text answer
    SubmitAnswer(String),
    /// Multiple choice answer
    SelectOption(OptionKey),
    /// The presenter finished reading an utterance
    SpeechFinished(UtteranceId),
    /// Reset the score and the bonus chain
    NewGame,
}

/// How a round ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The submission matched
    Correct,
    /// The submission did not match
    Incorrect {
        /// The canonical answer
        answer: String,
    },
    /// The countdown ran out
    Timeout,
}

/// Why an input was ignored
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Rejection {
    /// The input does not apply to the current phase
    #[error("not accepted while {phase}")]
    NotAccepting {
        /// Phase the input arrived in
        phase: Phase,
    },
    /// Answers are refused until the lockout is over
    #[error("lockout is still active")]
    LockoutActive,
    /// The answer does not fit the question
    #[error("the question expects a {expected:?} answer")]
    WrongKind {
        /// Kind of the live question
        expected: QuestionKind,
    },
}

/// Errors surfaced by the state machine
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No round started because nothing could be drawn
    #[error(transparent)]
    EmptySource(#[from] SourceError),
    /// No round started because the drawn record was unusable
    #[error(transparent)]
    Malformed(#[from] MalformedQuestion),
    /// The input was ignored
    #[error(transparent)]
    Rejected(#[from] Rejection),
}

/// The live round
#[derive(Debug, Clone, Serialize)]
pub struct RoundState {
    number: u64,
    phase: Phase,
    active_question: Question,
    is_bonus: bool,
    remaining_seconds: u64,
    lockout_active: bool,
    #[serde(skip)]
    prompt: Option<UtteranceId>,
}

impl RoundState {
    /// Sequence number, starting at 1
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The question in play
    pub fn active_question(&self) -> &Question {
        &self.active_question
    }

    /// Whether the question in play is a bonus
    pub fn is_bonus(&self) -> bool {
        self.is_bonus
    }

    /// Seconds left in the answer window
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    /// Whether answers are refused because of a recent buzz
    pub fn lockout_active(&self) -> bool {
        self.lockout_active
    }

    fn options_enabled(&self) -> bool {
        self.active_question.kind() == QuestionKind::MultipleChoice
    }

    fn outcome(&self, correct: bool) -> Outcome {
        if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect {
                answer: self.active_question.answer().to_owned(),
            }
        }
    }

    fn accepts_answers(&self) -> Result<(), Rejection> {
        match self.phase {
            Phase::AwaitingAnswer => Ok(()),
            Phase::Locked if !self.lockout_active => Ok(()),
            Phase::Locked => Err(Rejection::LockoutActive),
            phase => Err(Rejection::NotAccepting { phase }),
        }
    }
}

/// The question-round state machine
#[derive(Debug, Clone, Default)]
pub struct Round {
    options: Options,
    state: Option<RoundState>,
    score: ScoreTracker,
    timer: RoundTimer,
    speech: SpeechChannel,
    rounds_started: u64,
    bonus_eligible: bool,
    pending_bonus: Option<Question>,
}

impl Round {
    /// Creates an idle machine
    ///
    /// # Errors
    ///
    /// Returns the validation report if `options` are out of bounds.
    pub fn new(options: Options) -> Result<Self, garde::Report> {
        options.validate()?;
        Ok(Self {
            options,
            ..Self::default()
        })
    }

    /// Current phase; [`Phase::Idle`] when no round was started
    pub fn phase(&self) -> Phase {
        self.state.as_ref().map_or(Phase::Idle, RoundState::phase)
    }

    /// The live or last graded round
    pub fn state(&self) -> Option<&RoundState> {
        self.state.as_ref()
    }

    /// Running score
    pub fn score(&self) -> ScoreTracker {
        self.score
    }

    /// Whether the last round was a correct toss-up
    ///
    /// The next round plays the bonus of that toss-up if it has one.
    pub fn bonus_eligible(&self) -> bool {
        self.bonus_eligible
    }

    /// Settings in use
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Dispatches one command
    ///
    /// # Errors
    ///
    /// Returns why a round could not start or why the input was ignored.
    /// Either way a status has already been sent to `sink`.
    pub fn receive_command<
        Q: QuestionSource,
        P: Presenter,
        K: StatusSink,
        S: FnMut(crate::AlarmMessage, Duration),
    >(
        &mut self,
        command: Command,
        source: &mut Q,
        presenter: &P,
        sink: &K,
        schedule_message: S,
    ) -> Result<(), Error> {
        match command {
            Command::StartRound => self.start_round(source, presenter, sink)?,
            Command::Buzz => self.buzz(presenter, sink, schedule_message)?,
            Command::SubmitAnswer(submission) => {
                self.submit_answer(&submission, presenter, sink)?;
            }
            Command::SelectOption(key) => {
                self.select_option(key, presenter, sink)?;
            }
            Command::SpeechFinished(id) => self.speech_finished(id, sink, schedule_message),
            Command::NewGame => self.new_game(presenter, sink),
        }
        Ok(())
    }

    /// Starts the next round
    ///
    /// A live round is abandoned without scoring. The pending bonus is played
    /// if the last round was a correct toss-up with a bonus; otherwise a
    /// fresh question is drawn from `source`. If nothing usable can be drawn
    /// the machine is left idle.
    ///
    /// # Errors
    ///
    /// [`Error::EmptySource`] or [`Error::Malformed`].
    pub fn start_round<Q: QuestionSource, P: Presenter, K: StatusSink>(
        &mut self,
        source: &mut Q,
        presenter: &P,
        sink: &K,
    ) -> Result<(), Error> {
        self.abandon(presenter);

        let chained = if self.bonus_eligible {
            self.pending_bonus.take()
        } else {
            None
        };
        self.bonus_eligible = false;
        self.pending_bonus = None;

        let (question, is_bonus) = match chained {
            Some(bonus) => (bonus, true),
            None => (self.draw(source, sink)?, false),
        };

        self.rounds_started += 1;
        let number = self.rounds_started;
        log::debug!(
            "round {number}: presenting {} question on {}{}",
            match question.kind() {
                QuestionKind::ShortAnswer => "short answer",
                QuestionKind::MultipleChoice => "multiple choice",
            },
            question.subject(),
            if is_bonus { " (bonus)" } else { "" },
        );

        sink.send_status(&StatusMessage::Presenting {
            round: number,
            subject: question.subject().to_owned(),
            kind: question.kind(),
            is_bonus,
        });
        let prompt = self
            .speech
            .speak(presenter, render_question(&question, is_bonus));

        self.state = Some(RoundState {
            number,
            phase: Phase::Presenting,
            active_question: question,
            is_bonus,
            remaining_seconds: self.options.timer_seconds(),
            lockout_active: false,
            prompt: Some(prompt),
        });

        Ok(())
    }

    /// Draws and normalizes one question, skipping malformed records while
    /// the source allows it
    fn draw<Q: QuestionSource, K: StatusSink>(
        &self,
        source: &mut Q,
        sink: &K,
    ) -> Result<Question, Error> {
        let mut skipped = 0;
        loop {
            let raw = match source.next(self.options.filter()) {
                Ok(raw) => raw,
                Err(error) => {
                    log::warn!("cannot start round: {error}");
                    sink.send_status(&StatusMessage::EmptySource);
                    return Err(error.into());
                }
            };

            match normalize(&raw) {
                Ok(question) => return Ok(question),
                Err(error) if source.supports_retry() && skipped < MAX_MALFORMED_RETRIES => {
                    skipped += 1;
                    log::warn!("skipping malformed question: {error}");
                }
                Err(error) => {
                    log::warn!("cannot start round: {error}");
                    sink.send_status(&StatusMessage::MalformedQuestion {
                        reason: error.to_string(),
                    });
                    return Err(error.into());
                }
            }
        }
    }

    /// Claims the right to answer
    ///
    /// Accepted while the question is read or the countdown runs. Reading and
    /// the countdown stop at once, the confirmation phrase is spoken, and
    /// answers are refused until the lockout alarm arrives.
    ///
    /// # Errors
    ///
    /// [`Rejection::NotAccepting`] in any other phase.
    pub fn buzz<P: Presenter, K: StatusSink, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        presenter: &P,
        sink: &K,
        mut schedule_message: S,
    ) -> Result<(), Rejection> {
        let phase = self.phase();
        let Some(state) = self
            .state
            .as_mut()
            .filter(|state| matches!(state.phase, Phase::Presenting | Phase::AwaitingAnswer))
        else {
            return Err(reject(sink, Rejection::NotAccepting { phase }));
        };

        self.timer.cancel();
        self.speech.cancel(presenter);

        state.phase = Phase::Locked;
        state.lockout_active = true;
        state.prompt = None;
        log::debug!("round {}: buzzed in", state.number);

        let lockout = self.options.lockout();
        schedule_message(
            AlarmMessage::LockoutExpired {
                round: state.number,
            }
            .into(),
            lockout,
        );
        sink.send_status(&StatusMessage::Locked { lockout });
        self.speech.speak(presenter, BUZZ_CONFIRMATION);

        Ok(())
    }

    /// Grades a free text answer
    ///
    /// # Errors
    ///
    /// Rejects the answer outside the answer window, during the lockout, or
    /// when the live question is multiple choice.
    pub fn submit_answer<P: Presenter, K: StatusSink>(
        &mut self,
        submission: &str,
        presenter: &P,
        sink: &K,
    ) -> Result<Outcome, Rejection> {
        let state = self.answerable(sink)?;
        if state.active_question.kind() != QuestionKind::ShortAnswer {
            return Err(reject(
                sink,
                Rejection::WrongKind {
                    expected: QuestionKind::MultipleChoice,
                },
            ));
        }

        let correct = self
            .options
            .answer_matching()
            .matches(submission, state.active_question.answer());
        let outcome = state.outcome(correct);
        Ok(self.grade(outcome, presenter, sink))
    }

    /// Grades a multiple choice answer
    ///
    /// # Errors
    ///
    /// Rejects the selection outside the answer window, during the lockout,
    /// or when the live question is short answer.
    pub fn select_option<P: Presenter, K: StatusSink>(
        &mut self,
        key: OptionKey,
        presenter: &P,
        sink: &K,
    ) -> Result<Outcome, Rejection> {
        let state = self.answerable(sink)?;
        let Some(answer) = state.active_question.answer_key() else {
            return Err(reject(
                sink,
                Rejection::WrongKind {
                    expected: QuestionKind::ShortAnswer,
                },
            ));
        };

        let outcome = state.outcome(answer == key);
        Ok(self.grade(outcome, presenter, sink))
    }

    fn answerable<K: StatusSink>(&self, sink: &K) -> Result<&RoundState, Rejection> {
        let accepted = match &self.state {
            Some(state) => state.accepts_answers().map(|()| state),
            None => Err(Rejection::NotAccepting { phase: Phase::Idle }),
        };
        accepted.map_err(|rejection| reject(sink, rejection))
    }

    /// Handles the presenter's completion signal
    ///
    /// Only the completion of the question prompt moves the round on; it
    /// opens the answer window and arms the countdown. Completions of
    /// canceled prompts and of feedback phrases are ignored.
    pub fn speech_finished<K: StatusSink, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        id: UtteranceId,
        sink: &K,
        schedule_message: S,
    ) {
        if !self.speech.finish(id) {
            return;
        }

        let Some(state) = self
            .state
            .as_mut()
            .filter(|state| state.phase == Phase::Presenting && state.prompt == Some(id))
        else {
            return;
        };

        state.phase = Phase::AwaitingAnswer;
        state.prompt = None;
        state.remaining_seconds = self.options.timer_seconds();
        log::debug!(
            "round {}: answer window open for {}s",
            state.number,
            state.remaining_seconds
        );

        self.timer.start(state.remaining_seconds, schedule_message);
        sink.send_status(&StatusMessage::AwaitingAnswer {
            seconds: state.remaining_seconds,
            options_enabled: state.options_enabled(),
        });
    }

    /// Handles an alarm scheduled earlier
    ///
    /// Alarms that belong to a canceled countdown or to another round are
    /// ignored.
    pub fn receive_alarm<P: Presenter, K: StatusSink, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        message: crate::AlarmMessage,
        presenter: &P,
        sink: &K,
        schedule_message: S,
    ) {
        match message {
            crate::AlarmMessage::Timer(crate::timer::AlarmMessage::Tick { generation }) => {
                match self.timer.receive_tick(generation, schedule_message) {
                    TickOutcome::Stale => {
                        log::debug!("dropping stale tick of generation {generation}");
                    }
                    TickOutcome::Running(remaining_seconds) => {
                        if let Some(state) = self.state.as_mut() {
                            state.remaining_seconds = remaining_seconds;
                        }
                        sink.send_status(&StatusMessage::Tick { remaining_seconds });
                    }
                    TickOutcome::Expired => {
                        if let Some(state) = self
                            .state
                            .as_mut()
                            .filter(|state| state.phase == Phase::AwaitingAnswer)
                        {
                            state.remaining_seconds = 0;
                            sink.send_status(&StatusMessage::Tick {
                                remaining_seconds: 0,
                            });
                            self.time_out(presenter, sink);
                        }
                    }
                }
            }
            crate::AlarmMessage::Round(AlarmMessage::LockoutExpired { round }) => {
                match self.state.as_mut() {
                    Some(state)
                        if state.number == round
                            && state.phase == Phase::Locked
                            && state.lockout_active =>
                    {
                        state.lockout_active = false;
                        log::debug!("round {round}: lockout over");
                        sink.send_status(&StatusMessage::LockoutEnded {
                            options_enabled: state.options_enabled(),
                        });
                    }
                    _ => log::debug!("dropping stale lockout alarm of round {round}"),
                }
            }
        }
    }

    /// Resets the score and the bonus chain, abandoning a live round
    pub fn new_game<P: Presenter, K: StatusSink>(&mut self, presenter: &P, sink: &K) {
        self.abandon(presenter);
        self.score = ScoreTracker::default();
        self.bonus_eligible = false;
        self.pending_bonus = None;
        log::info!("new game");
        self.send_score(sink);
    }

    /// Drops the current round, stopping its countdown and any speech
    fn abandon<P: Presenter>(&mut self, presenter: &P) {
        self.timer.cancel();
        self.speech.cancel(presenter);
        if let Some(state) = self
            .state
            .take()
            .filter(|state| state.phase != Phase::Graded)
        {
            log::debug!("round {}: abandoned in phase {}", state.number, state.phase);
        }
    }

    fn time_out<P: Presenter, K: StatusSink>(&mut self, presenter: &P, sink: &K) {
        self.speech.cancel(presenter);
        self.resolve(Outcome::Timeout, sink);
    }

    fn grade<P: Presenter, K: StatusSink>(
        &mut self,
        outcome: Outcome,
        presenter: &P,
        sink: &K,
    ) -> Outcome {
        self.timer.cancel();

        let phrase = if outcome == Outcome::Correct {
            CORRECT
        } else {
            INCORRECT
        };
        self.speech.speak(presenter, phrase);
        self.resolve(outcome.clone(), sink);
        outcome
    }

    /// Applies the scoring rule and closes the round
    fn resolve<K: StatusSink>(&mut self, outcome: Outcome, sink: &K) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        state.phase = Phase::Graded;
        state.lockout_active = false;
        state.prompt = None;

        let (player_points, opponent_points) = match (&outcome, state.is_bonus) {
            (Outcome::Correct, false) => {
                self.bonus_eligible = true;
                self.pending_bonus = state.active_question.bonus().cloned();
                (points::TOSSUP, 0)
            }
            (Outcome::Correct, true) => {
                self.bonus_eligible = false;
                self.pending_bonus = None;
                (points::BONUS, 0)
            }
            (Outcome::Incorrect { .. } | Outcome::Timeout, _) => {
                self.bonus_eligible = false;
                self.pending_bonus = None;
                (0, points::OPPONENT)
            }
        };

        self.score.award_player(player_points);
        self.score.award_opponent(opponent_points);
        log::info!(
            "round {}: {outcome:?}, player +{player_points}, opponent +{opponent_points}",
            state.number
        );

        sink.send_status(&StatusMessage::Graded {
            outcome,
            player_points,
            opponent_points,
        });
        self.send_score(sink);
    }

    fn send_score<K: StatusSink>(&self, sink: &K) {
        sink.send_status(&StatusMessage::Score {
            player: self.score.player(),
            opponent: self.score.opponent(),
        });
    }
}

fn reject<K: StatusSink>(sink: &K, rejection: Rejection) -> Rejection {
    log::warn!("ignoring input: {rejection}");
    sink.send_status(&StatusMessage::Rejected { reason: rejection });
    rejection
}
