//! Zeroing of waste counters.
//!
//! Explicit addresses go out as one atomic multi-address write. The factory path
//! hands over to the device's own routine, whose addresses are not visible here.
//! Nothing is retried: the caller re-reads the counters to confirm the outcome.

use inkpad_common::InkpadError;
use inkpad_common::address::format_addresses;
use inkpad_common::device::PrinterDevice;
use inkpad_common::success;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetTarget {
    /// Set each address to zero.
    Addresses(Vec<u8>),
    /// Run the model's built-in waste counter reset.
    Factory,
}

impl ResetTarget {
    pub fn describe(&self) -> String {
        match self {
            ResetTarget::Addresses(addresses) => format!("reset of {}", format_addresses(addresses)),
            ResetTarget::Factory => "factory waste counter reset".to_string(),
        }
    }
}

pub fn zero_pairs(addresses: &[u8]) -> Vec<(u8, u8)> {
    addresses.iter().map(|addr| (*addr, 0)).collect()
}

pub fn reset(device: &mut dyn PrinterDevice, target: &ResetTarget) -> Result<(), InkpadError> {
    let operation = target.describe();

    let outcome = match target {
        ResetTarget::Addresses(addresses) => {
            if addresses.is_empty() {
                return Err(InkpadError::MalformedAddressInput {
                    input: String::new(),
                    reason: "no addresses to reset".to_string(),
                });
            }
            info!("Writing zero to {}", format_addresses(addresses));
            device.write_bytes(&zero_pairs(addresses), true)
        }
        ResetTarget::Factory => {
            info!("Running the factory waste counter reset of {}", device.model_name());
            device.factory_waste_reset()
        }
    };

    match outcome {
        Ok(true) => {
            success!("{operation} accepted by {}", device.model_name());
            Ok(())
        }
        Ok(false) => {
            error!("{operation} was rejected by the device");
            Err(InkpadError::DeviceWrite {
                operation,
                reason: "the device reported the write as unsuccessful".to_string(),
            })
        }
        Err(err) => {
            error!("{operation} raised a device error: {err}");
            Err(InkpadError::DeviceWrite {
                operation,
                reason: err.to_string(),
            })
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
    use inkpad_common::DeviceError;
    use inkpad_common::device::{ByteReading, ModelSpec};

    #[derive(Default)]
    struct WriteRecorder {
        spec: ModelSpec,
        accept: bool,
        fail: bool,
        writes: Vec<(Vec<(u8, u8)>, bool)>,
        factory_calls: usize,
    }

    impl PrinterDevice for WriteRecorder {
        fn model_name(&self) -> &str {
            "ET-2720"
        }

        fn spec(&self) -> &ModelSpec {
            &self.spec
        }

        fn source(&self) -> String {
            "recorder".to_string()
        }

        fn read_bytes(&mut self, _: &[u8]) -> Result<Vec<ByteReading>, DeviceError> {
            Ok(Vec::new())
        }

        fn write_bytes(&mut self, pairs: &[(u8, u8)], atomic: bool) -> Result<bool, DeviceError> {
            self.writes.push((pairs.to_vec(), atomic));
            if self.fail {
                return Err(DeviceError::Protocol("no ack".to_string()));
            }
            Ok(self.accept)
        }

        fn factory_waste_reset(&mut self) -> Result<bool, DeviceError> {
            self.factory_calls += 1;
            Ok(self.accept)
        }
    }

    #[test]
    fn explicit_addresses_are_one_atomic_write() {
        let mut dev = WriteRecorder {
            accept: true,
            ..Default::default()
        };

        reset(&mut dev, &ResetTarget::Addresses(vec![0x2f, 0x30])).unwrap();

        assert_eq!(dev.writes, vec![(vec![(0x2f, 0), (0x30, 0)], true)]);
    }

    #[test]
    fn rejected_write_is_a_write_error() {
        let mut dev = WriteRecorder::default();

        let err = reset(&mut dev, &ResetTarget::Addresses(vec![0x2f, 0x30])).unwrap_err();

        assert!(matches!(err, InkpadError::DeviceWrite { .. }));
        assert!(err.to_string().contains("0x2f,0x30"));
        assert_eq!(dev.writes.len(), 1, "must not retry");
    }

    #[test]
    fn device_exception_is_a_write_error() {
        let mut dev = WriteRecorder {
            fail: true,
            ..Default::default()
        };

        let err = reset(&mut dev, &ResetTarget::Addresses(vec![0x2f])).unwrap_err();
        assert!(err.to_string().contains("no ack"));
        assert_eq!(dev.writes.len(), 1);
    }

    #[test]
    fn factory_reset_uses_the_device_routine() {
        let mut dev = WriteRecorder {
            accept: true,
            ..Default::default()
        };

        reset(&mut dev, &ResetTarget::Factory).unwrap();
        assert_eq!(dev.factory_calls, 1);
        assert!(dev.writes.is_empty());
    }

    #[test]
    fn empty_address_list_is_rejected_without_io() {
        let mut dev = WriteRecorder::default();
        assert!(reset(&mut dev, &ResetTarget::Addresses(Vec::new())).is_err());
        assert!(dev.writes.is_empty());
    }
}
