//! Speech recognition seam

use crate::capture::AudioClip;
use crate::error::RecognitionError;

/// Language tag sent with every recognition request.
pub const DEFAULT_LANGUAGE: &str = "en-US";

pub trait SpeechRecognizer {
    /// Transcribes `clip`. May block on a network round trip.
    fn recognize(&self, clip: &AudioClip, language: &str) -> Result<String, RecognitionError>;
}

impl<T: SpeechRecognizer + ?Sized> SpeechRecognizer for Box<T> {
    fn recognize(&self, clip: &AudioClip, language: &str) -> Result<String, RecognitionError> {
        (**self).recognize(clip, language)
    }
}
