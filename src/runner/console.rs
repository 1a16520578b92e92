use super::state::{CheckRecord, RunSummary};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

const RULE_WIDTH: usize = 60;
const DETAILS_MAX_CHARS: usize = 300;

pub fn print_header(base_url: &str) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", "GPS API ENDPOINT TESTING".bold());
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Backend URL: {}", base_url.cyan());
    println!();
}

pub fn print_section(title: &str) {
    println!("\n--- {} ---", title.bold());
}

/// Spinner shown while a request is in flight. Drawn on stderr, so it is
/// hidden (and never ticks) when stderr is not a terminal.
pub fn spinner(label: &str) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn print_record(record: &CheckRecord) {
    let status = if record.success {
        "✅ PASS".green().bold()
    } else {
        "❌ FAIL".red().bold()
    };
    println!("{} {}: {}", status, record.name, record.message);

    if let Some(details) = &record.details {
        let rendered = match details {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if !rendered.is_empty() {
            println!("   Details: {}", truncate(&rendered, DETAILS_MAX_CHARS).dimmed());
        }
    }
}

pub fn print_abort() {
    println!("{} Cannot connect to backend - aborting tests", "❌".red());
}

pub fn print_skip_authenticated() {
    println!(
        "{}  Skipping authenticated tests due to auth failure",
        "⚠️".yellow()
    );
}

pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("{}", "TEST SUMMARY".bold());
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Total Tests: {}", summary.total);
    println!("Passed: {}", summary.passed.to_string().green());
    println!("Failed: {}", summary.failed.to_string().red());
    if let Some(ms) = summary.total_duration_ms {
        println!("Duration: {}ms", ms);
    }

    println!("\n🎯 Critical Results:");
    println!(
        "   GPS Data Retrieval: {}",
        working(summary.retrieval_working, "❌ Failed")
    );
    println!(
        "   GPS Location Update: {}",
        working(summary.update_working, "❌ Failed")
    );
    println!(
        "   Route Order Fix: {}",
        working(summary.route_order_clean, "❌ Still has 500 errors")
    );

    let verdict = if summary.is_success() {
        "✅ Overall: PASS".green().bold()
    } else {
        "❌ Overall: FAIL".red().bold()
    };
    println!("\n{}", verdict);
}

fn working(ok: bool, failed_text: &str) -> colored::ColoredString {
    if ok {
        "✅ Working".green()
    } else {
        failed_text.red()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}…", head)
    }
}
