//! Progress Bar Module
//!
//! One bar style for every batch front-end: ████████▓░░░░░░░
//! Drawn on stderr; hidden when stderr is not a terminal so piped JSON
//! output stays clean.

use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

pub mod progress_style {
    /// indicatif wants three characters: filled, current, empty.
    pub const PROGRESS_CHARS: &str = "█▓░";

    pub const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

    pub const BATCH_TEMPLATE: &str = "{spinner:.green} {prefix:.cyan.bold} ▕{bar:35.green/black}▏ {percent:>3}% • {pos}/{len} • ⏱️ {elapsed_precise} (ETA: {eta}) • {msg}";
}

fn batch_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(progress_style::BATCH_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(progress_style::PROGRESS_CHARS)
        .tick_chars(progress_style::SPINNER_CHARS)
}

pub fn create_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if !Term::stderr().is_term() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }

    pb.set_style(batch_style());
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_chars_has_three_glyphs() {
        assert_eq!(progress_style::PROGRESS_CHARS.chars().count(), 3);
    }

    #[test]
    fn test_batch_template_parses() {
        assert!(ProgressStyle::default_bar()
            .template(progress_style::BATCH_TEMPLATE)
            .is_ok());
    }

    #[test]
    fn test_bar_tracks_position() {
        let pb = create_progress_bar(4, "Converting");
        pb.inc(3);
        assert_eq!(pb.position(), 3);
        assert_eq!(pb.length(), Some(4));
        pb.finish_and_clear();
    }
}
