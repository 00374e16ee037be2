//! A printer backed by an EEPROM image file.
//!
//! Used for offline inspection of dumps and for exercising the full status/reset
//! flow without hardware. The file is JSON:
//!
//! ```json
//! {
//!   "model": "ET-1811",
//!   "regions": [{ "description": "waste counter", "addresses": ["0x30", "0x31"] }],
//!   "merged": [],
//!   "eeprom": { "0x30": "0x00", "0x31": "0x05" },
//!   "factory_reset": ["0x30", "0x31"],
//!   "write_protected": false
//! }
//! ```
//!
//! Cells missing from `eeprom` read as NA. Writes are persisted by writing a
//! temporary file next to the image and renaming it over the original.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use inkpad_common::DeviceError;
use inkpad_common::address::serde_hex;
use inkpad_common::device::{ByteReading, DeviceProvider, ModelSpec, PrinterDevice};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::reset::zero_pairs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EepromImage {
    pub model: String,
    #[serde(flatten)]
    pub spec: ModelSpec,
    #[serde(with = "serde_hex::map", default)]
    pub eeprom: BTreeMap<u8, u8>,
    /// Addresses zeroed by the model's built-in reset routine.
    #[serde(with = "serde_hex::vec", default)]
    pub factory_reset: Vec<u8>,
    #[serde(default)]
    pub write_protected: bool,
}

pub struct SnapshotDevice {
    path: PathBuf,
    image: EepromImage,
}

impl SnapshotDevice {
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let text = fs::read_to_string(path)?;
        let image: EepromImage = serde_json::from_str(&text)
            .map_err(|e| DeviceError::Protocol(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), model = %image.model, cells = image.eeprom.len(), "loaded eeprom image");
        Ok(Self {
            path: path.to_path_buf(),
            image,
        })
    }

    fn persist(&self, image: &EepromImage) -> Result<(), DeviceError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        let json = serde_json::to_string_pretty(image)
            .map_err(|e| DeviceError::Protocol(e.to_string()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| DeviceError::Io(e.error))?;
        Ok(())
    }
}

impl PrinterDevice for SnapshotDevice {
    fn model_name(&self) -> &str {
        &self.image.model
    }

    fn spec(&self) -> &ModelSpec {
        &self.image.spec
    }

    fn source(&self) -> String {
        self.path.display().to_string()
    }

    fn read_bytes(&mut self, addresses: &[u8]) -> Result<Vec<ByteReading>, DeviceError> {
        Ok(addresses
            .iter()
            .map(|addr| (*addr, self.image.eeprom.get(addr).copied()))
            .collect())
    }

    fn write_bytes(&mut self, pairs: &[(u8, u8)], _atomic: bool) -> Result<bool, DeviceError> {
        if self.image.write_protected {
            warn!(path = %self.path.display(), "eeprom image is write protected");
            return Ok(false);
        }

        let mut next = self.image.clone();
        for (addr, value) in pairs {
            next.eeprom.insert(*addr, *value);
        }
        self.persist(&next)?;
        self.image = next;
        Ok(true)
    }

    fn factory_waste_reset(&mut self) -> Result<bool, DeviceError> {
        if self.image.factory_reset.is_empty() {
            return Err(DeviceError::Unsupported(format!(
                "{} declares no factory reset routine",
                self.image.model
            )));
        }
        let pairs = zero_pairs(&self.image.factory_reset);
        self.write_bytes(&pairs, true)
    }
}

/// Exposes a fixed list of image files as devices.
pub struct SnapshotProvider {
    paths: Vec<PathBuf>,
}

impl SnapshotProvider {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl DeviceProvider for SnapshotProvider {
    /// Opens every image; unreadable ones are skipped unless none can be opened.
    fn list_devices(&self) -> Result<Vec<Box<dyn PrinterDevice>>, DeviceError> {
        let mut devices: Vec<Box<dyn PrinterDevice>> = Vec::new();
        let mut last_error: Option<DeviceError> = None;

        for path in &self.paths {
            match SnapshotDevice::open(path) {
                Ok(device) => devices.push(Box::new(device)),
                Err(err) => {
                    warn!("Skipping {}: {err}", path.display());
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if devices.is_empty() => Err(err),
            _ => Ok(devices),
        }
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

    const IMAGE: &str = r#"{
        "model": "ET-1811",
        "regions": [{"description": "waste counter", "addresses": ["0x30", "0x31"]}],
        "eeprom": {"0x30": "0x00", "0x31": "0x05", "0x2f": 16},
        "factory_reset": ["0x30", "0x31"]
    }"#;

    fn write_image(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn reads_cells_and_reports_missing_as_na() {
        let dir = tempfile::tempdir().unwrap();
        let mut dev = SnapshotDevice::open(&write_image(dir.path(), "et.json", IMAGE)).unwrap();

        assert_eq!(dev.model_name(), "ET-1811");
        assert_eq!(dev.spec().regions[0].addresses, vec![0x30, 0x31]);
        assert_eq!(
            dev.read_bytes(&[0x31, 0x2f, 0x99]).unwrap(),
            vec![(0x31, Some(5)), (0x2f, Some(16)), (0x99, None)]
        );
    }

    #[test]
    fn writes_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "et.json", IMAGE);

        let mut dev = SnapshotDevice::open(&path).unwrap();
        assert!(dev.write_bytes(&[(0x31, 0), (0x40, 0)], true).unwrap());
        drop(dev);

        let mut reopened = SnapshotDevice::open(&path).unwrap();
        assert_eq!(
            reopened.read_bytes(&[0x31, 0x40]).unwrap(),
            vec![(0x31, Some(0)), (0x40, Some(0))]
        );
    }

    #[test]
    fn write_protected_image_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let body = IMAGE.replace("\"model\"", "\"write_protected\": true, \"model\"");
        let path = write_image(dir.path(), "ro.json", &body);

        let mut dev = SnapshotDevice::open(&path).unwrap();
        assert!(!dev.write_bytes(&[(0x31, 0)], true).unwrap());
        assert_eq!(dev.read_bytes(&[0x31]).unwrap(), vec![(0x31, Some(5))]);
    }

    #[test]
    fn factory_reset_zeroes_declared_cells() {
        let dir = tempfile::tempdir().unwrap();
        let mut dev = SnapshotDevice::open(&write_image(dir.path(), "et.json", IMAGE)).unwrap();

        assert!(dev.factory_waste_reset().unwrap());
        assert_eq!(
            dev.read_bytes(&[0x30, 0x31, 0x2f]).unwrap(),
            vec![(0x30, Some(0)), (0x31, Some(0)), (0x2f, Some(16))]
        );
    }

    #[test]
    fn provider_skips_broken_images() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_image(dir.path(), "good.json", IMAGE);
        let bad = write_image(dir.path(), "bad.json", "{ not json");

        let provider = SnapshotProvider::new(vec![bad.clone(), good]);
        let devices = provider.list_devices().unwrap();
        assert_eq!(devices.len(), 1);

        let only_bad = SnapshotProvider::new(vec![bad]);
        assert!(matches!(only_bad.list_devices(), Err(DeviceError::Protocol(_))));

        let missing = SnapshotProvider::new(vec![dir.path().join("missing.json")]);
        assert!(matches!(missing.list_devices(), Err(DeviceError::Io(_))));
    }
}
