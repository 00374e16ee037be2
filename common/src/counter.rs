//! # Counter Model
//!
//! Logical counters built from a model's memory regions and the readings attached to them.
//!
//! ## Saturation metrics
//! * `sum`: every present byte added up, NA counted as zero.
//! * `max_fraction`: the largest single byte as a fraction of 255.
//! * `normalized_fraction`: `sum / capacity` clamped to 1 when a capacity is known,
//!   `0` when nothing has been counted yet, undefined otherwise.

use std::fmt;

use chrono::{DateTime, Local};

use crate::address::dedup_addresses;

/// Full scale of a single EEPROM byte.
pub const FULL_SCALE: f64 = 255.0;

/// Per-address fraction at or above which a reading is flagged as high.
pub const HIGH_THRESHOLD: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    Waste,
    Platen,
    Ambiguous,
    Raw,
}

impl CounterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::Waste => "waste",
            CounterKind::Platen => "platen",
            CounterKind::Ambiguous => "ambiguous",
            CounterKind::Raw => "raw",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of addresses reported together as one counter.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterGroup {
    pub label: String,
    pub kind: CounterKind,
    pub addresses: Vec<u8>,
    pub capacity: Option<f64>,
}

impl CounterGroup {
    /// Builds a group without capacity. Repeated addresses keep their first position.
    pub fn new(label: impl Into<String>, kind: CounterKind, addresses: &[u8]) -> Self {
        Self {
            label: label.into(),
            kind,
            addresses: dedup_addresses(addresses),
            capacity: None,
        }
    }

    /// Attaches a saturation capacity.
    ///
    /// Non-positive or non-finite values are dropped, and ambiguous groups never take one.
    pub fn with_capacity(mut self, capacity: Option<f64>) -> Self {
        self.capacity = match self.kind {
            CounterKind::Ambiguous => None,
            _ => capacity.filter(|cap| cap.is_finite() && *cap > 0.0),
        };
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressReading {
    pub address: u8,
    pub value: Option<u8>,
}

impl AddressReading {
    pub fn new(address: u8, value: Option<u8>) -> Self {
        Self { address, value }
    }

    /// The value as a fraction of 255, `None` when NA.
    pub fn fraction(&self) -> Option<f64> {
        self.value.map(|value| f64::from(value) / FULL_SCALE)
    }

    pub fn is_high(&self) -> bool {
        self.fraction().is_some_and(|fraction| fraction >= HIGH_THRESHOLD)
    }
}

/// A counter group together with its readings and derived metrics.
///
/// Only constructed through [`GroupReading::from_values`], so the readings always
/// follow the group's address order, one per address.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReading {
    group: CounterGroup,
    readings: Vec<AddressReading>,
    sum: u32,
    max_fraction: Option<f64>,
    normalized_fraction: Option<f64>,
}

impl GroupReading {
    /// Attaches device answers to `group`.
    ///
    /// `lookup` is asked for each address in group order; `None` records NA.
    pub fn from_values<F>(group: CounterGroup, mut lookup: F) -> Self
    where
        F: FnMut(u8) -> Option<u8>,
    {
        let readings: Vec<AddressReading> = group
            .addresses
            .iter()
            .map(|addr| AddressReading::new(*addr, lookup(*addr)))
            .collect();

        let sum: u32 = readings
            .iter()
            .map(|reading| u32::from(reading.value.unwrap_or(0)))
            .sum();

        let max_fraction: Option<f64> = readings
            .iter()
            .filter_map(AddressReading::fraction)
            .fold(None, |max, fraction| Some(max.map_or(fraction, |m: f64| m.max(fraction))));

        let normalized_fraction = normalize(sum, group.capacity, group.kind);

        Self {
            group,
            readings,
            sum,
            max_fraction,
            normalized_fraction,
        }
    }

    pub fn group(&self) -> &CounterGroup {
        &self.group
    }

    pub fn readings(&self) -> &[AddressReading] {
        &self.readings
    }

    pub fn sum(&self) -> u32 {
        self.sum
    }

    pub fn max_fraction(&self) -> Option<f64> {
        self.max_fraction
    }

    pub fn normalized_fraction(&self) -> Option<f64> {
        self.normalized_fraction
    }

    pub fn has_high_reading(&self) -> bool {
        self.readings.iter().any(AddressReading::is_high)
    }
}

fn normalize(sum: u32, capacity: Option<f64>, kind: CounterKind) -> Option<f64> {
    if kind == CounterKind::Ambiguous {
        return None;
    }
    match capacity {
        Some(cap) if cap > 0.0 => Some((f64::from(sum) / cap).min(1.0)),
        _ if sum == 0 => Some(0.0),
        _ => None,
    }
}

/// A group whose batch read failed. No readings are kept for it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupFailure {
    pub group: CounterGroup,
    pub reason: String,
    /// The device refused access; retrying with elevated privileges may help.
    pub permission_denied: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupEntry {
    Read(GroupReading),
    Failed(GroupFailure),
}

impl GroupEntry {
    pub fn group(&self) -> &CounterGroup {
        match self {
            GroupEntry::Read(reading) => reading.group(),
            GroupEntry::Failed(failure) => &failure.group,
        }
    }

    pub fn as_reading(&self) -> Option<&GroupReading> {
        match self {
            GroupEntry::Read(reading) => Some(reading),
            GroupEntry::Failed(_) => None,
        }
    }
}

/// One status snapshot of a device.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub model: String,
    pub groups: Vec<GroupEntry>,
    pub generated_at: DateTime<Local>,
}

impl Report {
    pub fn new(model: impl Into<String>, groups: Vec<GroupEntry>) -> Self {
        Self {
            model: model.into(),
            groups,
            generated_at: Local::now(),
        }
    }

    pub fn readings(&self) -> impl Iterator<Item = &GroupReading> {
        self.groups.iter().filter_map(GroupEntry::as_reading)
    }

    pub fn failures(&self) -> impl Iterator<Item = &GroupFailure> {
        self.groups.iter().filter_map(|entry| match entry {
            GroupEntry::Failed(failure) => Some(failure),
            GroupEntry::Read(_) => None,
        })
    }

    pub fn find(&self, label: &str) -> Option<&GroupEntry> {
        self.groups.iter().find(|entry| entry.group().label == label)
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
