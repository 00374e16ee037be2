use std::fs;

use inkpad_common::config::{DetailLevel, ReportOptions};
use inkpad_common::counter::{CounterKind, GroupEntry, Report};
use inkpad_common::device::DeviceProvider;
use inkpad_common::InkpadError;
use inkpad_core::classifier::{ClassifyOptions, OverrideTable};
use inkpad_core::report::csv::CSV_HEADER;
use inkpad_core::report::{render_text, summary_text, CsvSink, StatusLog};
use inkpad_core::session::{DeviceSelector, Session};
use inkpad_core::snapshot::SnapshotProvider;

use crate::support::{fixture_image, platen, waste, MockPrinter};

fn open_fixture(dir: &std::path::Path) -> Session {
    let provider = SnapshotProvider::new(vec![fixture_image(dir, "et1811.json")]);
    Session::open(&provider, &DeviceSelector::First, OverrideTable::builtin()).unwrap()
}

fn reading<'a>(report: &'a Report, label: &str) -> &'a inkpad_common::counter::GroupReading {
    report
        .find(label)
        .and_then(GroupEntry::as_reading)
        .unwrap_or_else(|| panic!("no reading for {label}"))
}

/// A counter without a known capacity is summarized by its highest address.
#[test]
fn uncalibrated_counter_falls_back_to_max() {
    let printer = MockPrinter::new("L3150", vec![waste(&[0x2f])], &[(0x2f, 0x10)]);
    let mut session = Session::new(Box::new(printer), OverrideTable::builtin());

    let report = session.report(ClassifyOptions::default()).unwrap();
    let counter = reading(&report, "Waste counter");

    assert_eq!(counter.sum(), 16);
    assert_eq!(counter.normalized_fraction(), None);
    assert!((counter.max_fraction().unwrap() - 16.0 / 255.0).abs() < 1e-9);
    assert_eq!(summary_text(counter), "Waste counter: (max 6.3%)");
}

#[test]
fn calibrated_counter_is_normalized_against_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_fixture(dir.path());

    let report = session.report(ClassifyOptions::default()).unwrap();

    let labels: Vec<&str> = report.groups.iter().map(|g| g.group().label.as_str()).collect();
    assert_eq!(labels, vec!["Counter 1", "Counter 3", "Platen pad counter"]);

    let first = reading(&report, "Counter 1");
    assert_eq!(first.sum(), 5);
    assert!((first.normalized_fraction().unwrap() - 5.0 / 141.0).abs() < 1e-9);
    assert_eq!(summary_text(first), "Counter 1: 3.55% (sum 5)");

    let third = reading(&report, "Counter 3");
    assert_eq!(third.sum(), 67);
    assert_eq!(third.normalized_fraction(), Some(1.0));

    let platen = reading(&report, "Platen pad counter");
    assert_eq!(platen.group().kind, CounterKind::Platen);
    assert_eq!(platen.normalized_fraction(), None);
}

#[test]
fn each_group_is_read_in_one_batch() {
    let printer = MockPrinter::new(
        "ET-2720",
        vec![waste(&[0x30, 0x31]), platen(&[0x2f])],
        &[(0x30, 1), (0x31, 2), (0x2f, 3)],
    );
    let log = printer.log.clone();
    let mut session = Session::new(Box::new(printer), OverrideTable::builtin());

    session
        .report(ClassifyOptions {
            show_ambiguous: true,
            ..ClassifyOptions::default()
        })
        .unwrap();

    assert_eq!(
        log.borrow().reads,
        vec![vec![0x30, 0x31], vec![0x2f], vec![0x2c, 0x2d, 0x2e]]
    );
    assert!(log.borrow().writes.is_empty());
}

#[test]
fn model_without_counters_needs_manual_addresses() {
    let printer = MockPrinter::new("XP-1234", Vec::new(), &[(0x40, 0x80)]);
    let log = printer.log.clone();
    let mut session = Session::new(Box::new(printer), OverrideTable::builtin());

    let err = session.report(ClassifyOptions::default()).unwrap_err();
    assert!(matches!(err, InkpadError::NoCountersAvailable { .. }));
    assert_eq!(log.borrow().io_count(), 0);

    let manual = [0x40, 0x41];
    let report = session
        .report(ClassifyOptions {
            explicit_addresses: Some(&manual),
            show_ambiguous: false,
        })
        .unwrap();
    let group = reading(&report, "Manual counter");
    assert_eq!(group.group().kind, CounterKind::Raw);
    assert_eq!(group.sum(), 0x80);
}

#[test]
fn ambiguous_rows_never_carry_a_normalized_percent() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_fixture(dir.path());
    let report = session
        .report(ClassifyOptions {
            show_ambiguous: true,
            ..ClassifyOptions::default()
        })
        .unwrap();

    let options = ReportOptions {
        show_ambiguous: true,
        ..ReportOptions::default()
    };
    let csv = dir.path().join("counters.csv");
    CsvSink::new(&csv).append(&report, &options).unwrap();

    let text = fs::read_to_string(&csv).unwrap();
    let ambiguous: Vec<&str> = text.lines().filter(|row| row.contains(",ambiguous,")).collect();
    assert_eq!(ambiguous.len(), 3);
    for row in ambiguous {
        let cols: Vec<&str> = row.split(',').collect();
        assert_eq!(cols[7], "", "row {row}");
    }
}

#[test]
fn csv_header_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_fixture(dir.path());
    let csv = CsvSink::new(dir.path().join("counters.csv"));
    let options = ReportOptions::default();

    for _ in 0..2 {
        let report = session.report(ClassifyOptions::default()).unwrap();
        assert_eq!(csv.append(&report, &options).unwrap(), 5);
    }

    let text = fs::read_to_string(csv.path()).unwrap();
    assert_eq!(text.lines().filter(|line| *line == CSV_HEADER).count(), 1);
    assert_eq!(text.lines().count(), 11);
}

#[test]
fn detailed_text_flags_high_readings() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_fixture(dir.path());
    let report = session
        .report(ClassifyOptions {
            show_ambiguous: true,
            ..ClassifyOptions::default()
        })
        .unwrap();

    let text = render_text(
        &report,
        &ReportOptions {
            show_ambiguous: true,
            detail: DetailLevel::Detail,
            csv_path: None,
        },
    );
    assert!(text.contains("0x2c = 0xe6 (90.2%) [HIGH]"));
    assert!(text.contains("0x31 = 0x05 (2.0%)"));
}

#[test]
fn status_log_round_trips_counter_addresses() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_fixture(dir.path());
    let report = session.report(ClassifyOptions::default()).unwrap();

    let path = dir.path().join("status.log");
    let log = StatusLog::new(&path);
    assert_eq!(log.append(&report, &ReportOptions::default()).unwrap(), 3);

    let addresses = StatusLog::read_addresses(&path, true).unwrap();
    assert_eq!(addresses, vec![0x30, 0x31, 0x34, 0x35, 0x2f]);
}

#[test]
fn provider_lists_every_image() {
    let dir = tempfile::tempdir().unwrap();
    let first = fixture_image(dir.path(), "et1811.json");
    let second = dir.path().join("copy.json");
    fs::copy(&first, &second).unwrap();

    let devices = SnapshotProvider::new(vec![first, second]).list_devices().unwrap();
    assert_eq!(devices.len(), 2);
    assert!(devices.iter().all(|device| device.model_name() == "ET-1811"));
}
