//! Report Module
//!
//! Summary output for batch conversions.

use crate::batch::BatchResult;
use std::time::Duration;

pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

pub fn print_summary_report(result: &BatchResult, duration: Duration, operation_name: &str) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  📊 {:<56} ║", format!("{} Summary Report", operation_name));
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  📁 Files Processed:    {:>10}                           ║", result.total);
    println!("║  ✅ Succeeded:          {:>10}                           ║", result.succeeded);
    println!("║  ❌ Failed:             {:>10}                           ║", result.failed);
    println!("║  ⏭️  Skipped:            {:>10}                           ║", result.skipped);
    println!(
        "║  📈 Success Rate:       {:>9.1}%                           ║",
        result.success_rate()
    );
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  💾 Input Size:         {:>10}                           ║",
        format_bytes(result.input_bytes)
    );
    println!(
        "║  💾 Output Size:        {:>10}                           ║",
        format_bytes(result.output_bytes)
    );
    println!(
        "║  ⏱️  Total Time:         {:>10}                           ║",
        format_duration(duration)
    );
    println!("╚══════════════════════════════════════════════════════════════╝");

    if !result.errors.is_empty() {
        println!();
        println!("❌ Errors encountered:");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for (path, error) in &result.errors {
            println!("   {} → {}", path.display(), error);
        }
    }
}
