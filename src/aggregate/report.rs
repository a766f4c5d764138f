// src/aggregate/report.rs
//! JSON and terminal rendering of [`UxReport`]s.

use super::UxReport;
use crate::error::Result;
use crate::types::{Issue, Severity};
use colored::{ColoredString, Colorize};
use std::fmt::Write;

/// Pretty JSON, the same shape written to `reports/<id>.json`.
///
/// # Errors
/// Returns error if serialization fails.
pub fn to_json(report: &UxReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn paint_severity(severity: Severity) -> ColoredString {
    let label = format!("{:<8}", severity.label());
    match severity {
        Severity::Critical | Severity::Error => label.red().bold(),
        Severity::High => label.red(),
        Severity::Medium | Severity::Warning => label.yellow(),
        Severity::Low | Severity::Info => label.dimmed(),
    }
}

fn paint_score(score: f64) -> ColoredString {
    let text = format!("{score:5.1}");
    if score >= 80.0 {
        text.green().bold()
    } else if score >= 60.0 {
        text.yellow().bold()
    } else {
        text.red().bold()
    }
}

/// Dimension table followed by issues grouped by severity, most severe first.
#[must_use]
pub fn format_terminal(report: &UxReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}  {}/{}",
        "Component".bold(),
        report.component_id.cyan(),
        paint_score(report.score),
        report.max_score
    );

    for d in &report.dimensions {
        let status = if d.failed { "failed".red().to_string() } else { String::new() };
        let _ = writeln!(
            out,
            "  {:<16}{}  {:>3} issue(s) {}",
            d.dimension.label(),
            paint_score(d.score),
            d.issue_count,
            status
        );
    }

    if report.issues.is_empty() {
        let _ = writeln!(out, "{} No issues found.", "OK".green().bold());
        return out;
    }

    let mut sorted: Vec<&Issue> = report.issues.iter().collect();
    sorted.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.id.cmp(&b.id)));

    let mut current: Option<Severity> = None;
    for issue in sorted {
        if current != Some(issue.severity) {
            current = Some(issue.severity);
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "{} {} {}", paint_severity(issue.severity), issue.title.bold(), format!("[{}]", issue.id).dimmed());
        let _ = writeln!(out, "   {} {}", "|".blue(), issue.description);
        for rec in &issue.recommendations {
            let _ = writeln!(out, "   {} {} {rec}", "=".blue(), "FIX:".green());
        }
    }

    let _ = writeln!(
        out,
        "\n{} issue(s), {} at HIGH or above. Issue score {:.1}.",
        report.issues.len(),
        report.count_at_least(Severity::High),
        report.issue_score
    );
    out
}

pub fn print_report(report: &UxReport) {
    print!("{}", format_terminal(report));
}

/// One line per component plus the batch mean.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_batch_summary(reports: &[UxReport]) -> String {
    let mut out = String::new();
    if reports.is_empty() {
        return out;
    }
    let _ = writeln!(out, "{}", "Summary".bold());
    for r in reports {
        let _ = writeln!(out, "  {:<32}{}  {:>3} issue(s)", r.component_id, paint_score(r.score), r.issues.len());
    }
    let mean = reports.iter().map(|r| r.score).sum::<f64>() / reports.len() as f64;
    let _ = writeln!(out, "  {:<32}{}", "mean", paint_score(mean));
    out
}
