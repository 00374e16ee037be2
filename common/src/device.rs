//! # Device Access Contract
//!
//! The engine never talks to a printer directly. Everything it needs from the
//! hardware goes through the traits in this module, which are implemented by
//! transport adapters (a USB vendor-command session, a file-backed EEPROM image, a mock).

use serde::{Deserialize, Serialize};

use crate::address::serde_hex;
use crate::error::DeviceError;

/// A named region of EEPROM addresses declared by a model's memory specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    pub description: String,
    #[serde(with = "serde_hex::vec")]
    pub addresses: Vec<u8>,
}

impl MemoryRegion {
    pub fn new(description: impl Into<String>, addresses: Vec<u8>) -> Self {
        Self {
            description: description.into(),
            addresses,
        }
    }
}

/// Declarative memory layout for one printer model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Regions in the order the model declares them.
    #[serde(default)]
    pub regions: Vec<MemoryRegion>,
    /// Named aggregates spanning several regions (e.g. a merged "waste counter").
    #[serde(default)]
    pub merged: Vec<MemoryRegion>,
}

impl ModelSpec {
    /// Looks up a merged region by name, ignoring case and surrounding whitespace.
    pub fn merged_region(&self, name: &str) -> Option<&MemoryRegion> {
        let name = name.trim();
        self.merged
            .iter()
            .find(|region| region.description.trim().eq_ignore_ascii_case(name))
    }
}

/// A single byte answer from the device. `None` when the device declined the address.
pub type ByteReading = (u8, Option<u8>);

/// An opened printer session.
///
/// Implementations release the underlying handle when dropped.
pub trait PrinterDevice {
    /// Model identification as reported by the device (e.g. `ET-2720`).
    fn model_name(&self) -> &str;

    /// The memory specification for the detected model.
    fn spec(&self) -> &ModelSpec;

    /// Where this device lives (bus path, file path, ...), for display only.
    fn source(&self) -> String;

    /// Reads a batch of EEPROM addresses in one round trip.
    ///
    /// The answer may be in any order and may omit addresses the device did not return.
    fn read_bytes(&mut self, addresses: &[u8]) -> Result<Vec<ByteReading>, DeviceError>;

    /// Writes `(address, value)` pairs. With `atomic`, either all pairs land or the call reports `false`.
    fn write_bytes(&mut self, pairs: &[(u8, u8)], atomic: bool) -> Result<bool, DeviceError>;

    /// Runs the model's built-in waste counter reset routine.
    fn factory_waste_reset(&mut self) -> Result<bool, DeviceError>;
}

/// Enumerates reachable printers.
pub trait DeviceProvider {
    fn list_devices(&self) -> Result<Vec<Box<dyn PrinterDevice>>, DeviceError>;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
