//! Append-only CSV log, one row per address reading.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use inkpad_common::InkpadError;
use inkpad_common::address::hex_byte;
use inkpad_common::config::ReportOptions;
use inkpad_common::counter::{CounterKind, GroupEntry, Report};
use tracing::debug;

use super::{is_rendered, percent};

pub const CSV_HEADER: &str = "model,group_label,group_type,addr,value_hex,percent_255,group_sum,normalized_percent,group_max_percent";

/// Quotes a field when it contains a separator, a quote or a line break.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn optional_percent(fraction: Option<f64>) -> String {
    fraction.map(|f| percent(f, 2)).unwrap_or_default()
}

/// Data rows for `report`, without header. Failed groups produce no rows.
pub fn csv_rows(report: &Report, options: &ReportOptions) -> Vec<String> {
    let mut rows = Vec::new();

    for entry in report.groups.iter().filter(|entry| is_rendered(entry, options)) {
        let GroupEntry::Read(reading) = entry else {
            continue;
        };
        let group = reading.group();
        let normalized = match group.kind {
            CounterKind::Ambiguous => String::new(),
            _ => optional_percent(reading.normalized_fraction()),
        };
        let max = optional_percent(reading.max_fraction());

        for address in reading.readings() {
            let value = address.value.map(hex_byte).unwrap_or_else(|| "NA".to_string());
            rows.push(
                [
                    field(&report.model),
                    field(&group.label),
                    group.kind.to_string(),
                    hex_byte(address.address),
                    value,
                    optional_percent(address.fraction()),
                    reading.sum().to_string(),
                    normalized.clone(),
                    max.clone(),
                ]
                .join(","),
            );
        }
    }

    rows
}

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the report's rows, writing the header first when the file is new or empty.
    ///
    /// Returns the number of data rows written.
    pub fn append(&self, report: &Report, options: &ReportOptions) -> Result<usize, InkpadError> {
        let io_err = |source| InkpadError::Io {
            path: self.path.clone(),
            source,
        };

        let needs_header = fs::metadata(&self.path).map(|meta| meta.len() == 0).unwrap_or(true);
        let rows = csv_rows(report, options);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        let mut writer = BufWriter::new(file);

        if needs_header {
            writeln!(writer, "{CSV_HEADER}").map_err(io_err)?;
        }
        for row in &rows {
            writeln!(writer, "{row}").map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;

        debug!(path = %self.path.display(), rows = rows.len(), "appended csv rows");
        Ok(rows.len())
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
