use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use inkpad_common::DeviceError;
use inkpad_common::device::{ByteReading, MemoryRegion, ModelSpec, PrinterDevice};

/// Everything a [`MockPrinter`] was asked to do.
#[derive(Debug, Default)]
pub struct CallLog {
    pub reads: Vec<Vec<u8>>,
    pub writes: Vec<(Vec<(u8, u8)>, bool)>,
    pub factory_resets: usize,
}

impl CallLog {
    pub fn io_count(&self) -> usize {
        self.reads.len() + self.writes.len() + self.factory_resets
    }
}

/// In-memory printer whose calls stay observable after it is moved into a session.
pub struct MockPrinter {
    pub model: String,
    pub spec: ModelSpec,
    pub cells: BTreeMap<u8, u8>,
    pub accept_writes: bool,
    pub log: Rc<RefCell<CallLog>>,
}

impl MockPrinter {
    pub fn new(model: &str, regions: Vec<MemoryRegion>, cells: &[(u8, u8)]) -> Self {
        Self {
            model: model.to_string(),
            spec: ModelSpec {
                regions,
                merged: Vec::new(),
            },
            cells: cells.iter().copied().collect(),
            accept_writes: true,
            log: Rc::new(RefCell::new(CallLog::default())),
        }
    }

    pub fn rejecting_writes(mut self) -> Self {
        self.accept_writes = false;
        self
    }
}

impl PrinterDevice for MockPrinter {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    fn source(&self) -> String {
        format!("mock:{}", self.model)
    }

    fn read_bytes(&mut self, addresses: &[u8]) -> Result<Vec<ByteReading>, DeviceError> {
        self.log.borrow_mut().reads.push(addresses.to_vec());
        Ok(addresses
            .iter()
            .map(|addr| (*addr, self.cells.get(addr).copied()))
            .collect())
    }

    fn write_bytes(&mut self, pairs: &[(u8, u8)], atomic: bool) -> Result<bool, DeviceError> {
        self.log.borrow_mut().writes.push((pairs.to_vec(), atomic));
        if self.accept_writes {
            for (addr, value) in pairs {
                self.cells.insert(*addr, *value);
            }
        }
        Ok(self.accept_writes)
    }

    fn factory_waste_reset(&mut self) -> Result<bool, DeviceError> {
        self.log.borrow_mut().factory_resets += 1;
        Ok(self.accept_writes)
    }
}

pub fn waste(addresses: &[u8]) -> MemoryRegion {
    MemoryRegion::new("waste counter", addresses.to_vec())
}

pub fn platen(addresses: &[u8]) -> MemoryRegion {
    MemoryRegion::new("platen pad counter", addresses.to_vec())
}

/// Copies a JSON EEPROM image from `fixtures/` into `dir`, so tests can write to it.
pub fn fixture_image(dir: &Path, name: &str) -> PathBuf {
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name);
    let target = dir.join(name);
    fs::copy(&source, &target).unwrap_or_else(|e| panic!("copy {}: {e}", source.display()));
    target
}
