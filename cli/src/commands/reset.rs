use anyhow::Context;
use colored::*;
use inkpad_common::InkpadError;
use inkpad_common::address::format_addresses;
use inkpad_common::config::Config;
use inkpad_common::success;
use inkpad_core::classifier::ClassifyOptions;
use inkpad_core::report::StatusLog;
use inkpad_core::reset::ResetTarget;
use inkpad_core::session::Session;
use tracing::{info, warn};

use crate::commands::status::{privilege_hint, read_report};
use crate::commands::{ResetArgs, open_session};
use crate::mprint;
use crate::terminal::{colors, format, print, prompt};

pub fn reset(args: ResetArgs, cfg: &Config) -> anyhow::Result<()> {
    // Malformed or empty input must fail before the device is touched.
    let target = resolve_target(args)?;
    info!("Planned: {}", target.describe());

    let mut session = open_session(cfg)?;
    let shown = snapshot_addresses(&session, &target);

    print::header("before", cfg.quiet);
    snapshot(&mut session, shown, "before", cfg);
    mprint!();

    if !cfg.assume_yes {
        let question = format!("Apply the {} on {}?", target.describe(), session.model());
        if !prompt::confirm(&question)? {
            warn!("Reset cancelled, nothing was written");
            return Ok(());
        }
    }

    if let Err(err) = session.reset(&target) {
        if err.device_cause().is_some_and(|cause| cause.is_permission_denied()) && !is_root::is_root() {
            warn!("Writing to the printer needs elevated privileges");
        }
        return Err(err).with_context(|| format!("reset failed on {}", session.model()));
    }

    print::header("after", cfg.quiet);
    snapshot(&mut session, shown, "after", cfg);

    let output = format!("{} on {}", "Reset applied".color(colors::PRIMARY).bold(), session.model());
    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => success!("{output}"),
    }
    Ok(())
}

/// Prints a report around the write. A failed snapshot never fails the reset.
fn snapshot(session: &mut Session, addresses: Option<&[u8]>, when: &str, cfg: &Config) {
    match read_report(session, addresses, cfg) {
        Ok(report) => {
            format::print_report(&report, &cfg.report_options());
            privilege_hint(&report);
        }
        Err(err) => warn!("Could not read counters {when} the reset: {err:#}"),
    }
}

/// Explicit reset addresses double as the report's group when the model declares no counters.
fn snapshot_addresses<'a>(session: &Session, target: &'a ResetTarget) -> Option<&'a [u8]> {
    let ResetTarget::Addresses(addresses) = target else {
        return None;
    };
    match session.classify(ClassifyOptions::default()) {
        Err(InkpadError::NoCountersAvailable { .. }) => Some(addresses),
        _ => None,
    }
}

fn resolve_target(args: ResetArgs) -> Result<ResetTarget, InkpadError> {
    if args.auto {
        return Ok(ResetTarget::Factory);
    }
    if let Some(addresses) = args.addresses {
        return Ok(ResetTarget::Addresses(addresses.into_vec()));
    }
    if let Some(path) = &args.from_log {
        let addresses = StatusLog::read_addresses(path, !args.all_lines)?;
        if addresses.is_empty() {
            return Err(InkpadError::MalformedAddressInput {
                input: path.display().to_string(),
                reason: "no counter addresses found in the log".to_string(),
            });
        }
        info!("Recovered {} from {}", format_addresses(&addresses), path.display());
        return Ok(ResetTarget::Addresses(addresses));
    }
    Err(InkpadError::MalformedAddressInput {
        input: String::new(),
        reason: "choose --auto, --addresses or --from-log".to_string(),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
