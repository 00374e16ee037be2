use std::time::Instant;

use anyhow::Context;
use colored::*;
use inkpad_common::address::AddressList;
use inkpad_common::config::{Config, ReportOptions};
use inkpad_common::counter::Report;
use inkpad_common::success;
use inkpad_core::classifier::ClassifyOptions;
use inkpad_core::report::{CsvSink, StatusLog};
use inkpad_core::session::Session;
use tracing::{info_span, warn};

use crate::commands::open_session;
use crate::mprint;
use crate::terminal::{colors, format, print, spinner};

pub fn status(addresses: Option<AddressList>, cfg: &Config) -> anyhow::Result<()> {
    let span = info_span!("status");
    let _guard = span.enter();

    let start_time = Instant::now();
    let mut session = open_session(cfg)?;
    let report = read_report(&mut session, addresses.as_deref(), cfg)?;
    let options = cfg.report_options();

    format::print_report(&report, &options);
    privilege_hint(&report);
    write_sinks(&report, &options, cfg)?;

    let output = format!(
        "{} in {}",
        format::verdict(&report, &options),
        format!("{:.2}s", start_time.elapsed().as_secs_f64()).bold().yellow()
    );
    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => {
            mprint!();
        }
    }
    Ok(())
}

/// Classifies and reads under a spinner. Shared with the reset command.
pub fn read_report(session: &mut Session, addresses: Option<&[u8]>, cfg: &Config) -> anyhow::Result<Report> {
    let _spinner = spinner::start(&format!("Reading counters of {}", session.model()), cfg.quiet);
    let options = ClassifyOptions {
        explicit_addresses: addresses,
        show_ambiguous: cfg.show_ambiguous,
    };
    let report = session
        .report(options)
        .with_context(|| format!("could not build a report for {}", session.model()))?;
    Ok(report)
}

fn write_sinks(report: &Report, options: &ReportOptions, cfg: &Config) -> anyhow::Result<()> {
    if let Some(path) = &options.csv_path {
        let rows = CsvSink::new(path).append(report, options)?;
        success!("Appended {rows} row(s) to {}", path.display());
    }
    if let Some(path) = &cfg.status_log {
        let lines = StatusLog::new(path).append(report, options)?;
        success!("Appended {lines} line(s) to {}", path.display());
    }
    Ok(())
}

/// Suggests elevated privileges when a group read was refused.
pub fn privilege_hint(report: &Report) {
    if report.failures().any(|failure| failure.permission_denied) && !is_root::is_root() {
        warn!(
            "{}",
            "Access to the printer was denied; try again with elevated privileges".color(colors::FAILED)
        );
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ResetArgs;
    use crate::commands::reset::reset;
    use crate::commands::test_support::{cells, config_for, write_image};
    use inkpad_core::report::csv::CSV_HEADER;
    use std::fs;

    const ET1811: &str = r#"{
        "model": "ET-1811",
        "regions": [
            {"description": "waste counter", "addresses": ["0x30", "0x31"]},
            {"description": "platen pad counter", "addresses": ["0x2f"]}
        ],
        "eeprom": {"0x2f": "0x10", "0x30": "0x00", "0x31": "0x05"}
    }"#;

    #[test]
    fn status_appends_csv_rows_and_log_lines() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("counters.csv");
        let log = dir.path().join("status.log");
        let cfg = Config {
            csv_path: Some(csv.clone()),
            status_log: Some(log.clone()),
            ..config_for(&write_image(dir.path(), ET1811))
        };

        status(None, &cfg).unwrap();
        status(None, &cfg).unwrap();

        let rows = fs::read_to_string(&csv).unwrap();
        assert_eq!(rows.lines().next(), Some(CSV_HEADER));
        assert_eq!(rows.lines().count(), 1 + 2 * 3);

        let lines = fs::read_to_string(&log).unwrap();
        assert_eq!(lines.lines().count(), 4);
        assert!(lines.contains("group=\"Counter 1\" addresses=0x30,0x31 sum=5 normalized=3.55%"));
    }

    #[test]
    fn status_without_a_printer_is_an_error() {
        let err = status(None, &Config::default()).unwrap_err();
        assert!(format!("{err:#}").contains("could not open a printer"));
    }

    #[test]
    fn manual_status_log_drives_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_image(
            dir.path(),
            r#"{"model": "XP-1234", "eeprom": {"0x40": "0x80", "0x41": "0x10"}}"#,
        );
        let log = dir.path().join("status.log");
        let cfg = Config {
            status_log: Some(log.clone()),
            ..config_for(&image)
        };

        status(Some("0x40,0x41".parse().unwrap()), &cfg).unwrap();
        reset(
            ResetArgs {
                auto: false,
                addresses: None,
                from_log: Some(log),
                all_lines: false,
                yes: true,
            },
            &config_for(&image),
        )
        .unwrap();

        assert_eq!(cells(&image, &[0x40, 0x41]), vec![(0x40, Some(0)), (0x41, Some(0))]);
    }
}
