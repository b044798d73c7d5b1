//! Audio capture seam
//!
//! A round records one fixed-length mono clip. Real microphone access lives
//! behind [`Recorder`]; [`SilentRecorder`] stands in where there is none.

use crate::error::Result;
use std::time::Duration;

/// How much audio to capture and in what shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSpec {
    pub duration: Duration,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for CaptureSpec {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(3),
            sample_rate: 44_100,
            channels: 1,
        }
    }
}

impl CaptureSpec {
    /// Interleaved sample count for the whole capture.
    pub fn sample_count(&self) -> usize {
        let frames = (self.duration.as_secs_f64() * f64::from(self.sample_rate)).round() as usize;
        frames * usize::from(self.channels)
    }
}

/// Signed 16-bit PCM, channels interleaved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() / usize::from(self.channels);
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate))
    }

    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0)
    }
}

pub trait Recorder {
    /// Blocks until `spec.duration` of audio has been captured.
    fn record(&mut self, spec: CaptureSpec) -> Result<AudioClip>;
}

/// Returns an all-zero clip of the requested length without waiting.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentRecorder;

impl Recorder for SilentRecorder {
    fn record(&mut self, spec: CaptureSpec) -> Result<AudioClip> {
        Ok(AudioClip {
            samples: vec![0; spec.sample_count()],
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capture_is_three_seconds_mono() {
        let spec = CaptureSpec::default();
        assert_eq!(spec.sample_count(), 132_300);
        assert_eq!(spec.channels, 1);
    }

    #[test]
    fn test_silent_recorder_matches_spec() {
        let spec = CaptureSpec {
            duration: Duration::from_millis(500),
            sample_rate: 8_000,
            channels: 2,
        };
        let clip = SilentRecorder.record(spec).unwrap();
        assert_eq!(clip.samples.len(), 8_000);
        assert_eq!(clip.duration(), Duration::from_millis(500));
        assert!(clip.is_silent());
    }

    #[test]
    fn test_empty_clip_duration() {
        let clip = AudioClip {
            samples: vec![],
            sample_rate: 0,
            channels: 1,
        };
        assert_eq!(clip.duration(), Duration::ZERO);
    }
}
