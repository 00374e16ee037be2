//! Line-oriented status log and address extraction.
//!
//! Each report adds one line per group:
//!
//! ```text
//! 2026-10-19T09:12:44+02:00 model=ET-1811 kind=waste group="Counter 1" addresses=0x30,0x31 sum=5 normalized=3.55% max=1.96%
//! ```
//!
//! Values are never written in hex, so a later scan for `0x..` tokens on
//! waste/pad/counter lines recovers exactly the counter addresses.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use inkpad_common::InkpadError;
use inkpad_common::address::{dedup_addresses, format_addresses};
use inkpad_common::config::ReportOptions;
use inkpad_common::counter::{GroupEntry, Report};
use regex::Regex;

use super::{is_rendered, percent};

const KEYWORDS: [&str; 3] = ["waste", "pad", "counter"];

static ADDRESS_TOKEN: OnceLock<Regex> = OnceLock::new();

fn address_token() -> &'static Regex {
    ADDRESS_TOKEN.get_or_init(|| Regex::new(r"\b0x[0-9a-f]{1,2}\b").expect("valid address token pattern"))
}

fn metric(fraction: Option<f64>) -> String {
    fraction
        .map(|f| format!("{}%", percent(f, 2)))
        .unwrap_or_else(|| "-".to_string())
}

pub fn status_lines(report: &Report, options: &ReportOptions) -> Vec<String> {
    let stamp = report.generated_at.to_rfc3339();

    report
        .groups
        .iter()
        .filter(|entry| is_rendered(entry, options))
        .map(|entry| {
            let group = entry.group();
            let prefix = format!(
                "{stamp} model={} kind={} group=\"{}\" addresses={}",
                report.model,
                group.kind,
                group.label.replace('"', "'"),
                format_addresses(&group.addresses)
            );
            match entry {
                GroupEntry::Read(reading) => format!(
                    "{prefix} sum={} normalized={} max={}",
                    reading.sum(),
                    metric(reading.normalized_fraction()),
                    metric(reading.max_fraction())
                ),
                GroupEntry::Failed(failure) => format!(
                    "{prefix} status=failed reason=\"{}\"",
                    failure.reason.replace('"', "'")
                ),
            }
        })
        .collect()
}

/// Collects `0x..` address tokens from `text`, first occurrence order, without repeats.
///
/// With `filter`, only lines mentioning waste, pad or counter are scanned.
pub fn extract_addresses(text: &str, filter: bool) -> Vec<u8> {
    let mut found: Vec<u8> = Vec::new();

    for line in text.lines() {
        if filter {
            let lower = line.to_ascii_lowercase();
            if !KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
                continue;
            }
        }
        found.extend(
            address_token()
                .find_iter(line)
                .filter_map(|token| u8::from_str_radix(&token.as_str()[2..], 16).ok()),
        );
    }

    dedup_addresses(&found)
}

pub struct StatusLog {
    path: PathBuf,
}

impl StatusLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, report: &Report, options: &ReportOptions) -> Result<usize, InkpadError> {
        let io_err = |source| InkpadError::Io {
            path: self.path.clone(),
            source,
        };

        let lines = status_lines(report, options);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        for line in &lines {
            writeln!(writer, "{line}").map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;

        Ok(lines.len())
    }

    /// Reads the log back and extracts the counter addresses it mentions.
    pub fn read_addresses(path: &Path, filter: bool) -> Result<Vec<u8>, InkpadError> {
        let text = fs::read_to_string(path).map_err(|e| InkpadError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(extract_addresses(&text, filter))
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
