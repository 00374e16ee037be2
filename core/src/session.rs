//! The per-invocation device session.
//!
//! A [`Session`] owns exactly one opened printer and the override data used to
//! classify it. It is created once, up front, and every read or write of the
//! invocation goes through it. The device is released when the session drops.

use std::fmt;

use inkpad_common::InkpadError;
use inkpad_common::counter::{CounterGroup, GroupEntry, Report};
use inkpad_common::device::{DeviceProvider, PrinterDevice};
use tracing::{debug, info, warn};

use crate::classifier::{ClassifyOptions, Classifier, OverrideTable};
use crate::reader;
use crate::reset::{self, ResetTarget};

/// What a selection strategy gets to see about each detected device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub index: usize,
    pub model: String,
    pub source: String,
}

impl fmt::Display for DeviceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.model, self.source)
    }
}

pub type SelectFn = dyn Fn(&[DeviceSummary]) -> Option<usize>;

/// Picks one device when several are present.
pub enum DeviceSelector {
    First,
    Index(usize),
    /// Caller-supplied choice, e.g. an interactive prompt. `None` aborts.
    With(Box<SelectFn>),
}

impl Default for DeviceSelector {
    fn default() -> Self {
        DeviceSelector::First
    }
}

impl DeviceSelector {
    fn choose(&self, devices: &[DeviceSummary]) -> Result<usize, InkpadError> {
        let index = match self {
            DeviceSelector::First => 0,
            DeviceSelector::Index(index) => *index,
            DeviceSelector::With(select) => select(devices).ok_or(InkpadError::NoDeviceFound)?,
        };
        if index >= devices.len() {
            return Err(InkpadError::DeviceIndexOutOfRange {
                index,
                available: devices.len(),
            });
        }
        Ok(index)
    }
}

pub fn summarize(devices: &[Box<dyn PrinterDevice>]) -> Vec<DeviceSummary> {
    devices
        .iter()
        .enumerate()
        .map(|(index, device)| DeviceSummary {
            index,
            model: device.model_name().to_string(),
            source: device.source(),
        })
        .collect()
}

pub struct Session {
    device: Box<dyn PrinterDevice>,
    overrides: OverrideTable,
}

impl Session {
    pub fn new(device: Box<dyn PrinterDevice>, overrides: OverrideTable) -> Self {
        debug!(model = device.model_name(), source = %device.source(), "device session opened");
        Self { device, overrides }
    }

    /// Lists devices through `provider` and keeps the one `selector` picks.
    ///
    /// The devices that were not picked are released right away.
    pub fn open(
        provider: &dyn DeviceProvider,
        selector: &DeviceSelector,
        overrides: OverrideTable,
    ) -> Result<Self, InkpadError> {
        let mut devices = provider.list_devices().map_err(InkpadError::Enumeration)?;
        if devices.is_empty() {
            return Err(InkpadError::NoDeviceFound);
        }

        let summaries = summarize(&devices);
        let index = selector.choose(&summaries)?;
        if devices.len() > 1 {
            warn!(
                "{} printers found, using {}",
                devices.len(),
                summaries[index]
            );
        }

        let device = devices.swap_remove(index);
        drop(devices);

        info!("Using {} at {}", device.model_name(), device.source());
        Ok(Self::new(device, overrides))
    }

    pub fn model(&self) -> &str {
        self.device.model_name()
    }

    pub fn classify(&self, options: ClassifyOptions<'_>) -> Result<Vec<CounterGroup>, InkpadError> {
        Classifier::new(&self.overrides).classify(self.device.spec(), self.device.model_name(), options)
    }

    pub fn read_all(&mut self, groups: &[CounterGroup]) -> Vec<GroupEntry> {
        reader::read_all(self.device.as_mut(), groups)
    }

    /// Classifies the device's counters and reads them into a fresh report.
    pub fn report(&mut self, options: ClassifyOptions<'_>) -> Result<Report, InkpadError> {
        let groups = self.classify(options)?;
        let entries = self.read_all(&groups);
        Ok(Report::new(self.model(), entries))
    }

    pub fn reset(&mut self, target: &ResetTarget) -> Result<(), InkpadError> {
        reset::reset(self.device.as_mut(), target)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(source = %self.device.source(), "device session closed");
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
