//! Terminal practice driver
//!
//! Reads questions from a JSON file, "speaks" them by printing, and runs the
//! round state machine on a single event channel. Alarms are tokio sleeps
//! that post back into the same channel, so events are handled one at a
//! time in arrival order.

use std::{
    io::Write,
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use anyhow::{Context, anyhow};
use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    task::AbortHandle,
};
use tossup::{
    AlarmMessage, StatusMessage,
    config::{AnswerMatching, Options},
    question::{Deck, Filter, OptionKey, QuestionKind},
    round::{Command, Outcome, Round},
    session::{Presenter, StatusSink},
    speech::{Utterance, UtteranceId},
};

/// Simulated reading speed of the console presenter
const MILLIS_PER_WORD: u64 = 250;

#[derive(Parser, Debug)]
#[command(version, about = "Quiz bowl practice rounds in the terminal")]
struct Args {
    /// JSON file with questions (SciBowlDB export or a plain list)
    #[arg(short, long)]
    questions: PathBuf,

    /// Seconds to answer once the question was read
    #[arg(short, long, conflicts_with = "strict")]
    timer: Option<u64>,

    /// Use the five second answer window
    #[arg(long)]
    strict: bool,

    /// Only draw questions of this subject (repeatable)
    #[arg(short, long = "subject")]
    subjects: Vec<String>,

    /// Seed for a reproducible question order
    #[arg(long)]
    seed: Option<u64>,

    /// Accept short answers regardless of case
    #[arg(long)]
    ignore_case: bool,
}

impl Args {
    fn options(&self) -> Options {
        let mut options = if self.strict {
            Options::strict()
        } else {
            Options::default()
        };
        if let Some(seconds) = self.timer {
            options = options.with_timer_seconds(seconds);
        }
        if self.ignore_case {
            options = options.with_answer_matching(AnswerMatching::IgnoreCase);
        }
        if !self.subjects.is_empty() {
            options = options.with_filter(Filter::subjects(self.subjects.clone()));
        }
        options
    }
}

#[derive(Debug)]
enum Event {
    Input(String),
    Alarm(AlarmMessage),
    SpeechFinished(UtteranceId),
    Quit,
}

type Events = mpsc::UnboundedSender<Event>;

/// Prints utterances and reports completion after a reading delay
struct ConsolePresenter {
    events: Events,
    reading: Mutex<Option<AbortHandle>>,
}

impl Presenter for ConsolePresenter {
    fn speak(&self, utterance: &Utterance) {
        self.cancel();
        println!("> {}", utterance.text);

        let words = u64::try_from(utterance.text.split_whitespace().count()).unwrap_or(u64::MAX);
        let delay = Duration::from_millis(MILLIS_PER_WORD.saturating_mul(words));
        let events = self.events.clone();
        let id = utterance.id;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::SpeechFinished(id));
        });

        if let Ok(mut reading) = self.reading.lock() {
            *reading = Some(handle.abort_handle());
        }
    }

    fn cancel(&self) {
        if let Some(handle) = self.reading.lock().ok().and_then(|mut r| r.take()) {
            handle.abort();
        }
    }
}

struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn send_status(&self, status: &StatusMessage) {
        log::debug!("{}", status.to_message());
        match status {
            StatusMessage::Presenting {
                round,
                subject,
                is_bonus,
                ..
            } => {
                let bonus = if *is_bonus { " (bonus)" } else { "" };
                println!("\n== Round {round}: {subject}{bonus} ==");
            }
            StatusMessage::AwaitingAnswer {
                seconds,
                options_enabled,
            } => {
                let choices = if *options_enabled {
                    "pick W, X, Y or Z"
                } else {
                    "type your answer"
                };
                println!("{seconds}s: {choices}, or /b to buzz");
            }
            StatusMessage::Tick { remaining_seconds } => {
                print!("{remaining_seconds} ");
                let _ = std::io::stdout().flush();
            }
            StatusMessage::Locked { .. } => println!("\nBuzzed, hold on..."),
            StatusMessage::LockoutEnded { options_enabled } => {
                if *options_enabled {
                    println!("Your pick (W, X, Y or Z):");
                } else {
                    println!("Your answer:");
                }
            }
            StatusMessage::Graded {
                outcome,
                player_points,
                ..
            } => match outcome {
                Outcome::Correct => println!("Correct! +{player_points}"),
                Outcome::Incorrect { answer } => println!("Incorrect, the answer was {answer}"),
                Outcome::Timeout => println!("\nTime is up"),
            },
            StatusMessage::Score { player, opponent } => {
                println!("Score: you {player}, opponent {opponent}. /n for the next question");
            }
            StatusMessage::EmptySource => println!("No questions match the selected subjects"),
            StatusMessage::MalformedQuestion { reason } => {
                println!("Could not use the drawn question: {reason}");
            }
            StatusMessage::Rejected { reason } => println!("({reason})"),
        }
    }
}

fn scheduler(events: &Events) -> impl FnMut(AlarmMessage, Duration) + '_ {
    move |alarm: AlarmMessage, delay: Duration| {
        let events = events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::Alarm(alarm));
        });
    }
}

/// Maps a line of input onto a command
///
/// A lone option letter selects that option when the live question is
/// multiple choice; everything else that is not a slash command is a free
/// text answer.
fn parse_input(line: &str, kind: Option<QuestionKind>) -> Option<Result<Command, ()>> {
    let line = line.trim();
    match line {
        "" => None,
        "/q" | "/quit" => Some(Err(())),
        "/n" | "/next" => Some(Ok(Command::StartRound)),
        "/b" | "/buzz" => Some(Ok(Command::Buzz)),
        "/r" | "/reset" => Some(Ok(Command::NewGame)),
        _ => match (kind, OptionKey::from_letter(line)) {
            (Some(QuestionKind::MultipleChoice), Some(key)) => Some(Ok(Command::SelectOption(key))),
            _ => Some(Ok(Command::SubmitAnswer(line.to_owned()))),
        },
    }
}

fn spawn_stdin_reader(events: Events) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if events.send(Event::Input(line)).is_err() {
                return;
            }
        }
        let _ = events.send(Event::Quit);
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut deck = Deck::load(&args.questions)
        .with_context(|| format!("cannot load questions from {}", args.questions.display()))?;
    if let Some(seed) = args.seed {
        deck = deck.seeded(seed);
    }
    if deck.is_empty() {
        log::warn!("{} holds no questions", args.questions.display());
    }
    log::info!(
        "loaded {} questions on {}",
        deck.len(),
        deck.subjects().join(", ")
    );

    let mut round =
        Round::new(args.options()).map_err(|report| anyhow!("invalid options: {report}"))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let presenter = ConsolePresenter {
        events: tx.clone(),
        reading: Mutex::default(),
    };
    let sink = ConsoleSink;
    spawn_stdin_reader(tx.clone());

    println!("/n next question, /b buzz, /r new game, /q quit");
    tx.send(Event::Input("/n".to_owned()))
        .map_err(|_| anyhow!("event channel closed"))?;

    while let Some(event) = rx.recv().await {
        let command = match event {
            Event::Quit => break,
            Event::Alarm(alarm) => {
                round.receive_alarm(alarm, &presenter, &sink, scheduler(&tx));
                continue;
            }
            Event::SpeechFinished(id) => Command::SpeechFinished(id),
            Event::Input(line) => {
                let kind = round
                    .state()
                    .map(|state| state.active_question().kind());
                match parse_input(&line, kind) {
                    None => continue,
                    Some(Err(())) => break,
                    Some(Ok(command)) => command,
                }
            }
        };

        if let Err(error) =
            round.receive_command(command, &mut deck, &presenter, &sink, scheduler(&tx))
        {
            log::debug!("{error}");
        }
    }

    presenter.cancel();
    let score = round.score();
    println!(
        "\nFinal score: you {}, opponent {}",
        score.player(),
        score.opponent()
    );
    Ok(())
}
