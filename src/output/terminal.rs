// Colored terminal output for scan envelopes, aggregate reports and
// single-text analysis.
//
// This module handles all terminal-specific formatting. The main.rs command
// arms delegate here; `--json` output bypasses it entirely.

use colored::Colorize;

use crate::detector::{Category, DetectionResult};
use crate::models::SourceDetection;
use crate::output::envelope::ServiceEnvelope;
use crate::pipeline::AggregateReport;

const CONTENT_PREVIEW_CHARS: usize = 120;

/// Display one source's envelope: summary line, then each detection.
pub fn display_envelope(envelope: &ServiceEnvelope) {
    println!(
        "\n{}",
        format!("=== {} Scan ===", envelope.service).bold()
    );

    if !envelope.success {
        println!("  {} {}", "!!".red().bold(), envelope.message);
        if let Some(error) = &envelope.error {
            if *error != envelope.message {
                println!("  {}", error.dimmed());
            }
        }
        return;
    }

    println!("  {}", envelope.message);
    let Some(result) = &envelope.data else {
        return;
    };
    println!(
        "  {} {}",
        "Query:".dimmed(),
        result.source_info.query
    );

    if result.detections.is_empty() {
        println!("  {}", "No harassment/abuse content found.".green());
        return;
    }

    println!();
    for (i, detection) in result.detections.iter().enumerate() {
        display_detection(i + 1, detection);
    }
    println!();
}

fn display_detection(rank: usize, detection: &SourceDetection) {
    let common = detection.common();
    println!(
        "  {:>3}. [{}] {:<8} {} {}",
        rank,
        colorize_confidence(common.confidence),
        detection.detection_type(),
        common.author.bold(),
        common.source_url.dimmed(),
    );
    if let Some(title) = detection_title(detection) {
        println!("       {}", super::truncate_chars(title, CONTENT_PREVIEW_CHARS));
    }
    println!(
        "       {}",
        super::truncate_chars(&common.content, CONTENT_PREVIEW_CHARS).dimmed()
    );
    if !common.matched_terms.is_empty() {
        println!(
            "       {} {}",
            "terms:".dimmed(),
            common.matched_terms.join(", ").yellow()
        );
    }
}

fn detection_title(detection: &SourceDetection) -> Option<&str> {
    match detection {
        SourceDetection::Post { title, .. }
        | SourceDetection::NewsArticle { title, .. }
        | SourceDetection::Video { title, .. } => Some(title),
        SourceDetection::Comment { parent_title, .. } => Some(parent_title),
        SourceDetection::Tweet { .. } => None,
    }
}

/// Display an aggregate report as one line per service plus totals.
pub fn display_report(report: &AggregateReport) {
    println!(
        "\n{}",
        format!(
            "=== Aggregate Scan ({} of {} services) ===",
            report.services_scanned,
            report.services.len()
        )
        .bold()
    );
    println!();

    for (kind, envelope) in report.services.iter() {
        let status = if envelope.success {
            "ok".green()
        } else {
            "failed".red()
        };
        let detail = match (&envelope.data, &envelope.error) {
            (Some(data), _) => format!(
                "{} scanned, {} found",
                data.items_scanned, data.threats_found
            ),
            (None, Some(error)) => error.clone(),
            (None, None) => envelope.message.clone(),
        };
        println!(
            "  {:<10} {:<8} {}",
            kind.display_name(),
            status,
            detail.dimmed()
        );
    }

    println!();
    let total = report.total_threats_found;
    if total > 0 {
        println!(
            "  {} {} harassment/abuse cases found",
            "!!".red().bold(),
            total
        );
    } else {
        println!("  {}", "No harassment/abuse content found.".green());
    }
}

/// Display the detector's verdict on a single text.
pub fn display_analysis(result: &DetectionResult) {
    let verdict = match result.category {
        Category::HarassmentAbuse => "THREAT".red().bold(),
        Category::Safe => "safe".green(),
        Category::Error => "error".yellow(),
    };
    println!("\n  Verdict: {verdict}");
    println!("  Category: {}", result.category);
    println!(
        "  Confidence: {}",
        colorize_confidence(result.confidence)
    );
    if result.matched_terms.is_empty() {
        if result.is_threat {
            println!("  Matched: {}", "pattern only".dimmed());
        }
    } else {
        println!("  Matched: {}", result.matched_terms.join(", ").yellow());
    }
    println!("  Preview: {}", result.text_preview.dimmed());
}

/// Colorize a confidence value by band.
fn colorize_confidence(confidence: f64) -> colored::ColoredString {
    let text = format!("{confidence:.2}");
    if confidence >= 0.7 {
        text.red().bold()
    } else if confidence >= 0.5 {
        text.bright_red()
    } else if confidence > 0.0 {
        text.yellow()
    } else {
        text.dimmed()
    }
}
