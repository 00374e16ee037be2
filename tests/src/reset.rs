use std::fs;

use inkpad_common::address::AddressList;
use inkpad_common::config::ReportOptions;
use inkpad_common::counter::{GroupEntry, Report};
use inkpad_common::InkpadError;
use inkpad_core::classifier::{ClassifyOptions, OverrideTable};
use inkpad_core::report::StatusLog;
use inkpad_core::reset::ResetTarget;
use inkpad_core::session::{DeviceSelector, Session};
use inkpad_core::snapshot::{SnapshotDevice, SnapshotProvider};
use inkpad_common::device::PrinterDevice;

use crate::support::{fixture_image, waste, MockPrinter};

fn sum_of(report: &Report, label: &str) -> u32 {
    report
        .find(label)
        .and_then(GroupEntry::as_reading)
        .map(|reading| reading.sum())
        .unwrap_or_else(|| panic!("no reading for {label}"))
}

fn open(path: &std::path::Path) -> Session {
    let provider = SnapshotProvider::new(vec![path.to_path_buf()]);
    Session::open(&provider, &DeviceSelector::First, OverrideTable::builtin()).unwrap()
}

#[test]
fn rejected_manual_reset_is_one_atomic_write() {
    let printer = MockPrinter::new("ET-2720", vec![waste(&[0x2f, 0x30])], &[(0x2f, 9), (0x30, 9)]).rejecting_writes();
    let log = printer.log.clone();
    let mut session = Session::new(Box::new(printer), OverrideTable::builtin());

    let err = session
        .reset(&ResetTarget::Addresses(vec![0x2f, 0x30]))
        .unwrap_err();

    assert!(matches!(err, InkpadError::DeviceWrite { .. }));
    assert_eq!(log.borrow().writes, vec![(vec![(0x2f, 0), (0x30, 0)], true)]);

    let after = session.report(ClassifyOptions::default()).unwrap();
    assert_eq!(sum_of(&after, "Waste counter"), 18);
}

#[test]
fn malformed_addresses_never_reach_the_device() {
    let printer = MockPrinter::new("ET-2720", vec![waste(&[0x2f])], &[]);
    let log = printer.log.clone();
    let _session = Session::new(Box::new(printer), OverrideTable::builtin());

    let err = "0xzz,0x30".parse::<AddressList>().unwrap_err();

    assert!(matches!(err, InkpadError::MalformedAddressInput { .. }));
    assert_eq!(log.borrow().io_count(), 0);
}

#[test]
fn factory_reset_zeroes_waste_counters_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture_image(dir.path(), "et1811.json");
    let mut session = open(&path);

    session.reset(&ResetTarget::Factory).unwrap();
    let after = session.report(ClassifyOptions::default()).unwrap();

    assert_eq!(sum_of(&after, "Counter 1"), 0);
    assert_eq!(sum_of(&after, "Counter 3"), 0);
    assert_eq!(sum_of(&after, "Platen pad counter"), 16);
}

#[test]
fn reset_from_status_log_is_persisted() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let image = fixture_image(dir.path(), "et1811.json");
    let log_path = dir.path().join("status.log");

    {
        let mut session = open(&image);
        let before = session.report(ClassifyOptions::default())?;
        StatusLog::new(&log_path).append(&before, &ReportOptions::default())?;
    }

    let addresses = StatusLog::read_addresses(&log_path, true)?;
    {
        let mut session = open(&image);
        session.reset(&ResetTarget::Addresses(addresses.clone()))?;
    }

    let mut reopened = SnapshotDevice::open(&image)?;
    let cells = reopened.read_bytes(&addresses)?;
    assert!(cells.iter().all(|(_, value)| *value == Some(0)), "{cells:?}");

    let untouched = reopened.read_bytes(&[0x2c])?;
    assert_eq!(untouched, vec![(0x2c, Some(0xe6))]);
    Ok(())
}

#[test]
fn write_protected_image_reports_a_write_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let image = fixture_image(dir.path(), "et1811.json");

    let mut json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&image)?)?;
    json["write_protected"] = serde_json::Value::Bool(true);
    fs::write(&image, serde_json::to_string(&json)?)?;

    let mut session = open(&image);
    let err = session
        .reset(&ResetTarget::Addresses(vec![0x30, 0x31]))
        .unwrap_err();
    assert!(matches!(err, InkpadError::DeviceWrite { .. }));
    assert!(err.to_string().contains("0x30,0x31"));

    let after = session.report(ClassifyOptions::default())?;
    assert_eq!(sum_of(&after, "Counter 1"), 5);
    Ok(())
}
