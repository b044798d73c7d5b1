use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use img_convert::{
    convert_with_spec, needs_conversion, parse_target, ConversionResult, ConvertError, TargetSpec,
    DEFAULT_QUALITY,
};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use serde_json::json;
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{
    check_dangerous_directory, collect_files, create_progress_bar, determine_output_path,
    determine_output_path_with_base, format_size_change, print_summary_report, BatchResult,
    IMAGE_EXTENSIONS,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "img-convert")]
#[command(version, about = "Image format converter - JPEG/PNG/GIF/TIFF/BMP/WEBP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one image, or every image under a directory
    #[command(name = "run")]
    Run {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Target format (JPG, JPEG, PNG, GIF, TIFF, TIF, BMP, WEBP)
        #[arg(short = 't', long = "to", value_name = "FORMAT", value_parser = parse_target)]
        to: TargetSpec,

        /// Output file, or output directory when INPUT is a directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JPEG quality (1-100); ignored by the other formats
        #[arg(short, long, default_value_t = DEFAULT_QUALITY,
              value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,

        #[arg(short, long, default_value_t = true)]
        recursive: bool,

        /// Only convert files directly inside INPUT
        #[arg(long)]
        no_recursive: bool,

        /// Convert even when the file already has the target extension
        #[arg(short, long)]
        force: bool,

        #[arg(long, value_enum, default_value = "human")]
        output_format: OutputFormat,

        /// Debug logging on stderr, per-file messages in batch mode
        #[arg(short, long)]
        verbose: bool,
    },

    /// List accepted target formats
    Formats {
        #[arg(long, value_enum, default_value = "human")]
        output_format: OutputFormat,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output (for API use)
    Json,
}

struct RunOptions {
    target: TargetSpec,
    output: Option<PathBuf>,
    quality: u8,
    recursive: bool,
    force: bool,
    output_format: OutputFormat,
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    let log_config = if verbose {
        LogConfig::default()
            .with_level(Level::DEBUG)
            .with_stderr_level(Level::DEBUG)
    } else {
        LogConfig::default()
    };
    let _ = init_logging("img_convert", log_config);

    match cli.command {
        Commands::Run {
            input,
            to,
            output,
            quality,
            recursive,
            no_recursive,
            force,
            output_format,
            verbose,
        } => {
            let options = RunOptions {
                target: to,
                output,
                quality,
                recursive: recursive && !no_recursive,
                force,
                output_format,
                verbose,
            };

            let any_failed = if input.is_dir() {
                run_directory(&input, &options)?
            } else {
                run_single(&input, &options)?
            };

            if any_failed {
                std::process::exit(1);
            }
        }

        Commands::Formats { output_format } => print_formats(output_format)?,
    }

    Ok(())
}

/// Missing input and same-extension checks happen here; the converter
/// itself never short-circuits.
fn convert_one(input: &Path, output: Option<&Path>, options: &RunOptions) -> ConversionResult {
    let identifier = options.target.identifier;

    if !input.exists() {
        return ConversionResult::missing_input(input, identifier);
    }
    if !options.force && !needs_conversion(input, &options.target) {
        return ConversionResult::skipped_same_format(input, identifier);
    }

    convert_with_spec(input, options.target, output, options.quality)
}

fn run_single(input: &Path, options: &RunOptions) -> anyhow::Result<bool> {
    let result = convert_one(input, options.output.as_deref(), options);

    match options.output_format {
        OutputFormat::Human => print_result(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(!result.success)
}

fn print_result(result: &ConversionResult) {
    if result.skipped {
        println!("{}", style(&result.message).yellow());
    } else if result.success {
        println!("{}", style(&result.message).green());
        if let Some(output_size) = result.output_size {
            println!(
                "   {}",
                style(format_size_change(result.input_size, output_size)).dim()
            );
        }
    } else {
        eprintln!("{}", style(&result.message).red());
    }
}

fn run_directory(dir: &Path, options: &RunOptions) -> anyhow::Result<bool> {
    if let Err(e) = check_dangerous_directory(dir) {
        bail!("{}", e);
    }

    let files = collect_files(dir, IMAGE_EXTENSIONS, options.recursive);
    if files.is_empty() {
        println!("📂 No supported images found in {}", dir.display());
        return Ok(false);
    }

    if let Some(output_dir) = &options.output {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;
    }

    info!(
        dir = %dir.display(),
        files = files.len(),
        target = options.target.identifier,
        recursive = options.recursive,
        "Batch conversion started"
    );
    if options.output_format == OutputFormat::Human {
        println!(
            "📂 Found {} images, converting to {}",
            style(files.len()).green(),
            style(options.target.format.name()).cyan()
        );
    }

    let plan = plan_outputs(&files, dir, options);
    let conflicts = plan.iter().filter(|p| p.conflict.is_some()).count();
    if conflicts > 0 {
        warn!(conflicts = conflicts, "Some outputs collide and will not be written");
    }

    let start = Instant::now();
    let pb = create_progress_bar(plan.len() as u64, "Converting");

    let results: Vec<ConversionResult> = plan
        .par_iter()
        .progress_with(pb.clone())
        .map(|planned| {
            let result = convert_planned(planned, options);
            pb.set_message(
                planned
                    .input
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string(),
            );
            if options.output_format == OutputFormat::Human && (options.verbose || !result.success) {
                pb.println(&result.message);
            }
            result
        })
        .collect();

    pb.finish_with_message("Complete!");

    let mut batch = BatchResult::new();
    for result in &results {
        batch.record(result);
    }
    info!(
        total = batch.total,
        succeeded = batch.succeeded,
        failed = batch.failed,
        skipped = batch.skipped,
        "Batch conversion finished"
    );

    match options.output_format {
        OutputFormat::Human => print_summary_report(&batch, start.elapsed(), "Image Conversion"),
        OutputFormat::Json => {
            let report = json!({
                "target": options.target.identifier,
                "total": batch.total,
                "succeeded": batch.succeeded,
                "failed": batch.failed,
                "skipped": batch.skipped,
                "input_bytes": batch.input_bytes,
                "output_bytes": batch.output_bytes,
                "results": results,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(batch.failed > 0)
}

/// One collected file and where its conversion will be written.
#[derive(Debug)]
struct PlannedFile {
    input: PathBuf,
    /// `None` when the file will be skipped for already having the target
    /// extension.
    destination: Option<PathBuf>,
    /// Set when writing `destination` would clobber another collected file
    /// or an output already claimed earlier in the batch.
    conflict: Option<String>,
}

/// Works out every destination before any file is written. With an output
/// directory the source tree layout is mirrored under it.
///
/// Files are visited in sorted order and the first one to claim an output
/// keeps it. A destination that is itself one of the collected inputs is
/// never written, since a concurrent worker may still be reading it.
fn plan_outputs(files: &[PathBuf], base_dir: &Path, options: &RunOptions) -> Vec<PlannedFile> {
    let inputs: HashSet<&Path> = files.iter().map(PathBuf::as_path).collect();
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();

    files
        .iter()
        .map(|input| {
            if !options.force && !needs_conversion(input, &options.target) {
                return PlannedFile {
                    input: input.clone(),
                    destination: None,
                    conflict: None,
                };
            }

            let extension = options.target.extension;
            let destination = match &options.output {
                Some(output_dir) => {
                    determine_output_path_with_base(input, base_dir, extension, output_dir)
                }
                None => determine_output_path(input, extension, None),
            };

            let conflict = if destination != *input && inputs.contains(destination.as_path()) {
                Some(format!("would overwrite input file {}", destination.display()))
            } else if let Some(owner) = claimed.get(&destination) {
                Some(format!(
                    "output {} already claimed by {}",
                    destination.display(),
                    owner.display()
                ))
            } else {
                claimed.insert(destination.clone(), input.as_path());
                None
            };

            PlannedFile {
                input: input.clone(),
                destination: Some(destination),
                conflict,
            }
        })
        .collect()
}

fn convert_planned(planned: &PlannedFile, options: &RunOptions) -> ConversionResult {
    let input = planned.input.as_path();
    let identifier = options.target.identifier;

    let Some(destination) = &planned.destination else {
        return convert_one(input, None, options);
    };
    if let Some(reason) = &planned.conflict {
        let error = ConvertError::write(destination, reason);
        return ConversionResult::failed(input, identifier, &error);
    }

    if options.output.is_some() {
        if let Some(parent) = destination.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                let error = ConvertError::write(parent, e);
                return ConversionResult::failed(input, identifier, &error);
            }
        }
    }

    convert_one(input, Some(destination), options)
}

fn print_formats(output_format: OutputFormat) -> anyhow::Result<()> {
    let specs = TargetSpec::all();

    match output_format {
        OutputFormat::Json => {
            let formats: Vec<_> = specs
                .iter()
                .map(|spec| {
                    json!({
                        "identifier": spec.identifier,
                        "format": spec.format.name(),
                        "extension": spec.extension,
                        "lossy": spec.format.is_lossy(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&formats)?);
        }
        OutputFormat::Human => {
            println!("{}", style("Supported target formats").bold());
            for spec in specs {
                let quality_note = if spec.format.is_lossy() {
                    " (uses --quality)"
                } else {
                    ""
                };
                println!(
                    "  {:<6} -> {:<5} {}{}",
                    style(spec.identifier).cyan(),
                    spec.format.name(),
                    spec.dotted_extension(),
                    style(quality_note).dim()
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(identifier: &str, output: Option<&Path>) -> RunOptions {
        RunOptions {
            target: TargetSpec::parse(identifier).unwrap(),
            output: output.map(Path::to_path_buf),
            quality: DEFAULT_QUALITY,
            recursive: true,
            force: false,
            output_format: OutputFormat::Human,
            verbose: false,
        }
    }

    fn paths(base: &Path, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|name| base.join(name)).collect()
    }

    #[test]
    fn test_plan_refuses_to_overwrite_another_input() {
        let base = Path::new("/photos");
        let files = paths(base, &["a.bmp", "a.png"]);
        let plan = plan_outputs(&files, base, &options("PNG", None));

        assert_eq!(plan[0].destination.as_deref(), Some(base.join("a.png").as_path()));
        let reason = plan[0].conflict.as_deref().unwrap();
        assert!(reason.contains("overwrite input"), "{}", reason);

        // a.png already has the target extension
        assert!(plan[1].destination.is_none());
        assert!(plan[1].conflict.is_none());
    }

    #[test]
    fn test_plan_first_claim_wins_on_shared_output() {
        let base = Path::new("/photos");
        let files = paths(base, &["a.jpeg", "a.jpg"]);
        let plan = plan_outputs(&files, base, &options("PNG", None));

        assert!(plan[0].conflict.is_none());
        assert_eq!(plan[0].destination.as_deref(), Some(base.join("a.png").as_path()));
        let reason = plan[1].conflict.as_deref().unwrap();
        assert!(reason.contains("already claimed"), "{}", reason);
        assert!(reason.contains("a.jpeg"), "{}", reason);
    }

    #[test]
    fn test_plan_distinct_stems_do_not_conflict() {
        let base = Path::new("/photos");
        let files = paths(base, &["a.jpg", "b.bmp", "nested/c.gif"]);
        let plan = plan_outputs(&files, base, &options("WEBP", None));

        assert!(plan.iter().all(|p| p.conflict.is_none()));
        assert_eq!(
            plan[2].destination.as_deref(),
            Some(base.join("nested/c.webp").as_path())
        );
    }

    #[test]
    fn test_plan_with_output_dir_mirrors_tree_and_detects_collisions() {
        let base = Path::new("/photos");
        let out = Path::new("/converted");
        let files = paths(base, &["a.gif", "a.tiff", "nested/a.gif"]);
        let plan = plan_outputs(&files, base, &options("JPG", Some(out)));

        assert_eq!(plan[0].destination.as_deref(), Some(out.join("a.jpg").as_path()));
        assert!(plan[0].conflict.is_none());
        assert!(plan[1].conflict.as_deref().unwrap().contains("already claimed"));
        assert_eq!(
            plan[2].destination.as_deref(),
            Some(out.join("nested/a.jpg").as_path())
        );
        assert!(plan[2].conflict.is_none());
    }

    #[test]
    fn test_plan_force_same_extension_keeps_own_path() {
        let base = Path::new("/photos");
        let files = paths(base, &["a.png"]);
        let mut opts = options("PNG", None);
        opts.force = true;
        let plan = plan_outputs(&files, base, &opts);

        // Same-file rejection is left to the converter.
        assert_eq!(plan[0].destination.as_deref(), Some(base.join("a.png").as_path()));
        assert!(plan[0].conflict.is_none());
    }
}
