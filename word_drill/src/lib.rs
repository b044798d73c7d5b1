//! Word Drill
//!
//! Shows a Russian word, records the learner saying its English translation
//! and judges the transcript. Audio capture and speech recognition are
//! traits so real devices and services plug in behind them.

pub mod answer;
pub mod capture;
pub mod dictionary;
pub mod error;
pub mod recognize;
pub mod round;

pub use answer::{check_answer, Verdict};
pub use capture::{AudioClip, CaptureSpec, Recorder, SilentRecorder};
pub use dictionary::{random_pair, WordPair, DICTIONARY};
pub use error::{DrillError, RecognitionError, Result};
pub use recognize::{SpeechRecognizer, DEFAULT_LANGUAGE};
pub use round::{
    spawn_round, Drill, RoundConfig, RoundEvent, RoundHandle, RoundOutcome, RoundReport,
    RoundState, RoundTracker,
};
