//! Word drill error types

use crate::round::RoundState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrillError {
    #[error("Dictionary is empty, no word to practise")]
    EmptyDictionary,

    #[error("Round cannot move from {from} to {to}")]
    InvalidTransition { from: RoundState, to: RoundState },

    #[error("Audio capture failed: {0}")]
    Recording(String),

    #[error("Round worker stopped before reporting a result")]
    WorkerLost,
}

/// Failure modes of a speech recognizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// Audio was processed but no words came out of it.
    #[error("Speech could not be understood")]
    Unintelligible,

    /// The recognition service was unreachable or refused the request.
    #[error("Recognition service error: {0}")]
    Service(String),

    #[error("Recognition failed: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DrillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_names_both_states() {
        let err = DrillError::InvalidTransition {
            from: RoundState::Idle,
            to: RoundState::Recognizing,
        };
        let msg = err.to_string();
        assert!(msg.contains("idle"), "{}", msg);
        assert!(msg.contains("recognizing"), "{}", msg);
    }

    #[test]
    fn test_recognition_error_display() {
        let err = RecognitionError::Service("timeout".to_string());
        assert_eq!(err.to_string(), "Recognition service error: timeout");
    }
}
