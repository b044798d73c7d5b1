//! Drill rounds
//!
//! One round: pick a word, record the learner, transcribe, judge. The round
//! moves Idle -> Recording -> Recognizing -> Idle and nothing else; controls
//! are only usable while Idle.
//!
//! [`Drill::run_round`] blocks for the whole round. [`spawn_round`] moves the
//! drill onto a worker thread and streams [`RoundEvent`]s back so a front-end
//! can keep redrawing while audio is captured and transcribed.

use crate::answer::{check_answer, Verdict};
use crate::capture::{CaptureSpec, Recorder};
use crate::dictionary::{random_pair, WordPair, DICTIONARY};
use crate::error::{DrillError, RecognitionError, Result};
use crate::recognize::{SpeechRecognizer, DEFAULT_LANGUAGE};
use rand::Rng;
use std::fmt;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundState {
    Idle,
    Recording,
    Recognizing,
}

impl RoundState {
    pub fn can_advance_to(self, next: RoundState) -> bool {
        matches!(
            (self, next),
            (RoundState::Idle, RoundState::Recording)
                | (RoundState::Recording, RoundState::Recognizing)
                | (RoundState::Recognizing, RoundState::Idle)
        )
    }

    pub fn controls_enabled(self) -> bool {
        self == RoundState::Idle
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundState::Idle => "idle",
            RoundState::Recording => "recording",
            RoundState::Recognizing => "recognizing",
        };
        f.write_str(name)
    }
}

/// Guards the round lifecycle.
#[derive(Debug)]
pub struct RoundTracker {
    state: RoundState,
}

impl Default for RoundTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundTracker {
    pub fn new() -> Self {
        Self {
            state: RoundState::Idle,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn advance(&mut self, next: RoundState) -> Result<()> {
        if !self.state.can_advance_to(next) {
            return Err(DrillError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(from = %self.state, to = %next, "Round state changed");
        self.state = next;
        Ok(())
    }

    /// Ends the round early, from any state, after a capture failure.
    pub fn abort(&mut self) {
        if self.state != RoundState::Idle {
            debug!(from = %self.state, "Round aborted");
        }
        self.state = RoundState::Idle;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Judged(Verdict),
    /// The recognizer heard nothing it could transcribe.
    NotRecognized,
    ServiceUnavailable(String),
    RecognitionFailed(String),
    RecordingFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub pair: WordPair,
    pub transcript: Option<String>,
    pub outcome: RoundOutcome,
}

impl RoundReport {
    pub fn is_correct(&self) -> bool {
        matches!(&self.outcome, RoundOutcome::Judged(v) if v.is_correct())
    }

    /// Line shown to the learner once the round is over.
    pub fn message(&self) -> String {
        match &self.outcome {
            RoundOutcome::Judged(verdict) => verdict.to_string(),
            RoundOutcome::NotRecognized => {
                "😕 Could not recognise your speech. Try saying it more clearly!".to_string()
            }
            RoundOutcome::ServiceUnavailable(reason) => {
                format!("🌐 Recognition service error (check your connection): {}", reason)
            }
            RoundOutcome::RecognitionFailed(reason) => {
                format!("❌ Recognition failed: {}", reason)
            }
            RoundOutcome::RecordingFailed(reason) => {
                format!("❌ Audio recording failed: {}", reason)
            }
        }
    }
}

#[derive(Debug)]
pub enum RoundEvent {
    WordChosen(WordPair),
    StateChanged(RoundState),
    Recognized(String),
    Finished(Result<RoundReport>),
}

#[derive(Debug, Clone)]
pub struct RoundConfig {
    pub capture: CaptureSpec,
    pub language: String,
    /// Pause between showing the word and starting the capture.
    pub lead_in: Duration,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            capture: CaptureSpec::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            lead_in: Duration::from_millis(500),
        }
    }
}

/// Everything a round needs: word table, audio seams, randomness.
pub struct Drill<Rec, Sr, G> {
    dictionary: &'static [WordPair],
    recorder: Rec,
    recognizer: Sr,
    rng: G,
    config: RoundConfig,
    tracker: RoundTracker,
}

impl<Rec, Sr, G> Drill<Rec, Sr, G>
where
    Rec: Recorder,
    Sr: SpeechRecognizer,
    G: Rng,
{
    pub fn new(recorder: Rec, recognizer: Sr, rng: G) -> Self {
        Self {
            dictionary: DICTIONARY,
            recorder,
            recognizer,
            rng,
            config: RoundConfig::default(),
            tracker: RoundTracker::new(),
        }
    }

    pub fn with_dictionary(mut self, dictionary: &'static [WordPair]) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_config(mut self, config: RoundConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> RoundState {
        self.tracker.state()
    }

    pub fn recognizer(&self) -> &Sr {
        &self.recognizer
    }

    fn enter(&mut self, next: RoundState, on_event: &mut impl FnMut(RoundEvent)) -> Result<()> {
        self.tracker.advance(next)?;
        on_event(RoundEvent::StateChanged(next));
        Ok(())
    }

    /// Runs one full round. Capture and recognition failures end up in the
    /// report's outcome; only an empty dictionary or a round started while
    /// another is in flight is an `Err`.
    pub fn run_round(&mut self, mut on_event: impl FnMut(RoundEvent)) -> Result<RoundReport> {
        if !self.tracker.state().controls_enabled() {
            return Err(DrillError::InvalidTransition {
                from: self.tracker.state(),
                to: RoundState::Recording,
            });
        }

        let pair = random_pair(self.dictionary, &mut self.rng)?;
        info!(russian = pair.russian, expected = pair.english, "Round started");
        on_event(RoundEvent::WordChosen(pair));

        self.enter(RoundState::Recording, &mut on_event)?;
        if !self.config.lead_in.is_zero() {
            thread::sleep(self.config.lead_in);
        }

        let clip = match self.recorder.record(self.config.capture) {
            Ok(clip) => clip,
            Err(e) => {
                warn!(error = %e, "Audio capture failed");
                self.tracker.abort();
                on_event(RoundEvent::StateChanged(RoundState::Idle));
                return Ok(RoundReport {
                    pair,
                    transcript: None,
                    outcome: RoundOutcome::RecordingFailed(e.to_string()),
                });
            }
        };
        debug!(samples = clip.samples.len(), duration = ?clip.duration(), "Captured audio");

        self.enter(RoundState::Recognizing, &mut on_event)?;

        let (transcript, outcome) = match self.recognizer.recognize(&clip, &self.config.language) {
            Ok(text) if !text.trim().is_empty() => {
                on_event(RoundEvent::Recognized(text.clone()));
                let verdict = check_answer(&text, pair.english);
                (Some(text), RoundOutcome::Judged(verdict))
            }
            Ok(_) | Err(RecognitionError::Unintelligible) => (None, RoundOutcome::NotRecognized),
            Err(RecognitionError::Service(reason)) => {
                warn!(reason = %reason, "Recognition service unavailable");
                (None, RoundOutcome::ServiceUnavailable(reason))
            }
            Err(RecognitionError::Other(reason)) => {
                warn!(reason = %reason, "Recognition failed");
                (None, RoundOutcome::RecognitionFailed(reason))
            }
        };

        self.enter(RoundState::Idle, &mut on_event)?;

        let report = RoundReport {
            pair,
            transcript,
            outcome,
        };
        info!(
            russian = pair.russian,
            correct = report.is_correct(),
            outcome = ?report.outcome,
            "Round finished"
        );
        Ok(report)
    }
}

/// A round running on its own thread.
pub struct RoundHandle<D> {
    pub events: Receiver<RoundEvent>,
    worker: JoinHandle<D>,
}

impl<D> RoundHandle<D> {
    /// Waits for the worker and hands the drill back for the next round.
    pub fn join(self) -> Result<D> {
        self.worker.join().map_err(|_| DrillError::WorkerLost)
    }
}

/// Moves `drill` to a worker thread, runs one round there and streams its
/// events. The last event is always `Finished`.
pub fn spawn_round<Rec, Sr, G>(mut drill: Drill<Rec, Sr, G>) -> RoundHandle<Drill<Rec, Sr, G>>
where
    Rec: Recorder + Send + 'static,
    Sr: SpeechRecognizer + Send + 'static,
    G: Rng + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let worker = thread::spawn(move || {
        // receiver may be gone; the round still runs to completion
        let result = drill.run_round(|event| {
            let _ = tx.send(event);
        });
        let _ = tx.send(RoundEvent::Finished(result));
        drill
    });

    RoundHandle { events: rx, worker }
}
