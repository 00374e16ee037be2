//! Batched counter reads.
//!
//! Each group is fetched with a single `read_bytes` call. Groups are read one after
//! another; the bus session is not assumed to tolerate concurrent access.

use std::collections::HashMap;

use inkpad_common::InkpadError;
use inkpad_common::address::{format_addresses, hex_byte};
use inkpad_common::counter::{CounterGroup, GroupEntry, GroupFailure, GroupReading};
use inkpad_common::device::PrinterDevice;
use tracing::{debug, trace, warn};

/// Reads every address of `group` in one batch.
///
/// Answers are put back into the group's declared order. Addresses the device did
/// not answer are recorded as NA, answers for addresses that were not requested are dropped.
pub fn read_group(
    device: &mut dyn PrinterDevice,
    group: &CounterGroup,
) -> Result<GroupReading, InkpadError> {
    debug!(
        group = %group.label,
        addresses = %format_addresses(&group.addresses),
        "reading counter group"
    );

    let answers = device
        .read_bytes(&group.addresses)
        .map_err(|source| InkpadError::DeviceRead {
            group: group.label.clone(),
            addresses: format_addresses(&group.addresses),
            source,
        })?;

    let mut values: HashMap<u8, Option<u8>> = HashMap::with_capacity(answers.len());
    for (addr, value) in answers {
        if !group.addresses.contains(&addr) {
            trace!(address = %hex_byte(addr), "dropping unrequested answer");
            continue;
        }
        values.entry(addr).or_insert(value);
    }

    Ok(GroupReading::from_values(group.clone(), |addr| {
        values.get(&addr).copied().flatten()
    }))
}

/// Reads all groups, carrying on past groups that fail.
pub fn read_all(device: &mut dyn PrinterDevice, groups: &[CounterGroup]) -> Vec<GroupEntry> {
    groups
        .iter()
        .map(|group| match read_group(device, group) {
            Ok(reading) => GroupEntry::Read(reading),
            Err(err) => {
                warn!("{err}");
                let permission_denied = err
                    .device_cause()
                    .is_some_and(|cause| cause.is_permission_denied());
                let reason = err
                    .device_cause()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| err.to_string());
                GroupEntry::Failed(GroupFailure {
                    group: group.clone(),
                    reason,
                    permission_denied,
                })
            }
        })
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
