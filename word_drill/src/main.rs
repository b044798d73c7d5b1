use clap::Parser;
use console::style;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared_utils::logging::{init_logging, LogConfig};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, Level};
use word_drill::{
    spawn_round, AudioClip, Drill, DrillError, RecognitionError, RoundConfig, RoundEvent,
    RoundState, SilentRecorder, SpeechRecognizer,
};

#[derive(Parser)]
#[command(name = "word-drill")]
#[command(version, about = "Russian -> English word drill (typed answers stand in for speech)", long_about = None)]
struct Cli {
    /// Number of rounds to play
    #[arg(short = 'n', long, default_value_t = 10)]
    rounds: u32,

    /// Seed for word selection (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(short, long)]
    verbose: bool,
}

/// Reads the answer from stdin instead of transcribing the clip.
struct TypedRecognizer {
    closed: Arc<AtomicBool>,
}

impl SpeechRecognizer for TypedRecognizer {
    fn recognize(&self, clip: &AudioClip, language: &str) -> Result<String, RecognitionError> {
        debug!(samples = clip.samples.len(), language = language, "Waiting for typed answer");

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => {
                self.closed.store(true, Ordering::SeqCst);
                Err(RecognitionError::Unintelligible)
            }
            Ok(_) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => Err(RecognitionError::Other(e.to_string())),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::default()
            .with_level(Level::DEBUG)
            .with_stderr_level(Level::DEBUG)
    } else {
        LogConfig::default()
    };
    let _ = init_logging("word_drill", log_config);

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let closed = Arc::new(AtomicBool::new(false));
    let recognizer = TypedRecognizer {
        closed: Arc::clone(&closed),
    };
    let config = RoundConfig {
        lead_in: Duration::ZERO,
        ..RoundConfig::default()
    };
    let mut drill = Drill::new(SilentRecorder, recognizer, rng).with_config(config);

    println!("{}", style("Say the English translation!").bold());
    info!(rounds = cli.rounds, seed = ?cli.seed, "Drill started");

    let mut played = 0u32;
    let mut correct = 0u32;

    for round in 1..=cli.rounds {
        let handle = spawn_round(drill);
        let mut finished = None;

        for event in handle.events.iter() {
            match event {
                RoundEvent::WordChosen(pair) => {
                    println!();
                    println!(
                        "📖 Round {}/{}: Russian word \"{}\"",
                        round,
                        cli.rounds,
                        style(pair.russian).cyan().bold()
                    );
                }
                RoundEvent::StateChanged(RoundState::Recording) => {
                    println!("{}", style("🎙️  Get ready to speak...").dim());
                }
                RoundEvent::StateChanged(RoundState::Recognizing) => {
                    print!("⌨️  English translation: ");
                    io::stdout().flush()?;
                }
                RoundEvent::StateChanged(RoundState::Idle) => {}
                RoundEvent::Recognized(text) => debug!(transcript = %text, "Answer received"),
                RoundEvent::Finished(result) => finished = Some(result),
            }
        }

        drill = handle.join()?;
        let report = finished.ok_or(DrillError::WorkerLost)??;

        if closed.load(Ordering::SeqCst) {
            println!();
            break;
        }

        played += 1;
        if report.is_correct() {
            correct += 1;
            println!("{}", style(report.message()).green());
        } else {
            println!("{}", style(report.message()).red());
        }
    }

    info!(played = played, correct = correct, "Drill finished");
    println!();
    println!(
        "✅ Score: {} / {} correct",
        style(correct).green().bold(),
        played
    );

    Ok(())
}
