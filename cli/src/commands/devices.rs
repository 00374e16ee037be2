use colored::*;
use inkpad_common::config::Config;
use inkpad_common::device::DeviceProvider;
use inkpad_common::success;
use inkpad_core::session::summarize;
use tracing::warn;

use crate::commands::{device_provider, load_overrides};
use crate::mprint;
use crate::terminal::print;

type Detail = (String, ColoredString);

pub fn devices(cfg: &Config) -> anyhow::Result<()> {
    let overrides = load_overrides(cfg)?;
    let devices = device_provider(cfg).list_devices()?;

    if devices.is_empty() {
        warn!("No printers found (pass --device-file PATH for an EEPROM image)");
        return Ok(());
    }

    let summaries = summarize(&devices);
    for (summary, device) in summaries.iter().zip(&devices) {
        print::tree_head(summary.index, &summary.model);

        let spec = device.spec();
        let family = overrides
            .for_model(&summary.model)
            .map(|family| family.name.clone())
            .unwrap_or_else(|| "none".to_string());
        let details: Vec<Detail> = vec![
            ("Source".to_string(), summary.source.normal()),
            ("Regions".to_string(), spec.regions.len().to_string().normal()),
            ("Overrides".to_string(), family.normal()),
        ];
        print::as_tree_one_level(details);

        if summary.index + 1 != summaries.len() {
            mprint!();
        }
    }

    success!("{} printer(s) found", summaries.len());
    Ok(())
}
