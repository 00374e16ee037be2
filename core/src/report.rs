//! Report rendering.
//!
//! Everything here is a pure function of a [`Report`] and [`ReportOptions`]: no
//! device I/O, no classification. The sinks in [`csv`] and [`status_log`] only add
//! file appends on top of the same data.

pub mod csv;
pub mod status_log;

use inkpad_common::address::hex_byte;
use inkpad_common::config::{DetailLevel, ReportOptions};
use inkpad_common::counter::{AddressReading, CounterKind, GroupEntry, GroupReading, Report};

pub use csv::CsvSink;
pub use status_log::StatusLog;

/// Formats a fraction as a percentage with the given number of decimals.
pub fn percent(fraction: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, fraction * 100.0)
}

/// Whether a group takes part in a report rendered with `options`.
pub fn is_rendered(entry: &GroupEntry, options: &ReportOptions) -> bool {
    options.show_ambiguous || entry.group().kind != CounterKind::Ambiguous
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    Group,
    /// One address reading; `high` when the byte is at or above 90% of full scale.
    Address { high: bool },
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub kind: LineKind,
    pub text: String,
}

impl RenderedLine {
    fn new(kind: LineKind, text: String) -> Self {
        Self { kind, text }
    }
}

/// The headline for one group: normalized percentage with raw sum, or the
/// maximum per-address percentage when no normalized value is defined.
pub fn summary_text(reading: &GroupReading) -> String {
    let label = &reading.group().label;
    match (reading.normalized_fraction(), reading.max_fraction()) {
        (Some(normalized), _) => format!(
            "{label}: {}% (sum {})",
            percent(normalized, 2),
            reading.sum()
        ),
        (None, Some(max)) => format!("{label}: (max {}%)", percent(max, 1)),
        (None, None) => format!("{label}: no readings"),
    }
}

pub fn address_text(reading: &AddressReading) -> String {
    let address = hex_byte(reading.address);
    match (reading.value, reading.fraction()) {
        (Some(value), Some(fraction)) => {
            let flag = if reading.is_high() { " [HIGH]" } else { "" };
            format!("{address} = {} ({}%){flag}", hex_byte(value), percent(fraction, 1))
        }
        _ => format!("{address} = NA"),
    }
}

pub fn render_lines(report: &Report, options: &ReportOptions) -> Vec<RenderedLine> {
    let mut lines = vec![RenderedLine::new(
        LineKind::Heading,
        format!(
            "{} ({})",
            report.model,
            report.generated_at.format("%Y-%m-%d %H:%M:%S")
        ),
    )];

    for entry in report.groups.iter().filter(|entry| is_rendered(entry, options)) {
        match entry {
            GroupEntry::Read(reading) => {
                lines.push(RenderedLine::new(LineKind::Group, summary_text(reading)));
                if options.detail == DetailLevel::Detail {
                    lines.extend(reading.readings().iter().map(|address| {
                        RenderedLine::new(
                            LineKind::Address {
                                high: address.is_high(),
                            },
                            format!("  {}", address_text(address)),
                        )
                    }));
                }
            }
            GroupEntry::Failed(failure) => lines.push(RenderedLine::new(
                LineKind::Failure,
                format!("{}: read failed ({})", failure.group.label, failure.reason),
            )),
        }
    }

    lines
}

pub fn render_text(report: &Report, options: &ReportOptions) -> String {
    let mut text = render_lines(report, options)
        .into_iter()
        .map(|line| line.text)
        .collect::<Vec<String>>()
        .join("\n");
    text.push('\n');
    text
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
