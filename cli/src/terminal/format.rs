use colored::*;
use inkpad_common::config::ReportOptions;
use inkpad_common::counter::{GroupEntry, HIGH_THRESHOLD, Report};
use inkpad_core::report::{LineKind, RenderedLine, is_rendered, render_lines};

use crate::mprint;
use crate::terminal::{colors, print};

fn colorize(line: &RenderedLine) -> ColoredString {
    match line.kind {
        LineKind::Heading => line.text.color(colors::PRIMARY).bold(),
        LineKind::Group => line.text.color(colors::TEXT_DEFAULT).bold(),
        LineKind::Address { high: true } => line.text.color(colors::HIGH).bold(),
        LineKind::Address { high: false } => line.text.color(colors::TEXT_DEFAULT),
        LineKind::Failure => line.text.color(colors::FAILED),
    }
}

pub fn print_report(report: &Report, options: &ReportOptions) {
    for line in render_lines(report, options) {
        match line.kind {
            LineKind::Heading => {
                print::print(&format!("{}", colorize(&line)));
                mprint!();
            }
            LineKind::Group | LineKind::Failure => print::print_status(format!("{}", colorize(&line))),
            LineKind::Address { .. } => print::print(&format!("{}", colorize(&line))),
        }
    }
}

/// One-line verdict for the end of a report.
pub fn verdict(report: &Report, options: &ReportOptions) -> ColoredString {
    let shown: Vec<&GroupEntry> = report.groups.iter().filter(|entry| is_rendered(entry, options)).collect();
    let failed = shown.iter().filter(|entry| entry.as_reading().is_none()).count();
    let high = shown
        .iter()
        .filter_map(|entry| entry.as_reading())
        .filter(|reading| {
            reading.has_high_reading() || reading.normalized_fraction().is_some_and(|n| n >= HIGH_THRESHOLD)
        })
        .count();

    let text = verdict_text(failed, high);
    match (failed, high) {
        (0, 0) => text.green().bold(),
        (0, _) => text.color(colors::HIGH).bold(),
        _ => text.color(colors::FAILED).bold(),
    }
}

fn verdict_text(failed: usize, high: usize) -> String {
    match (failed, high) {
        (0, 0) => "All counters below 90%".to_string(),
        (0, n) => format!("{n} counter(s) at or above 90%"),
        (f, 0) => format!("{f} counter group(s) could not be read"),
        (f, n) => format!("{f} counter group(s) could not be read, {n} at or above 90%"),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
