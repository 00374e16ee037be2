//! # Shared building blocks
//!
//! Types used by every crate in the workspace:
//!
//! * **[`device`]**: the device-access contract ([`device::PrinterDevice`], [`device::DeviceProvider`])
//!   and the declarative memory layout a model exposes.
//! * **[`counter`]**: counter groups, readings and the [`counter::Report`] built from them.
//! * **[`address`]**: parsing and formatting of EEPROM byte addresses.
//! * **[`config`]**: runtime configuration and report options.
//! * **[`error`]**: the error taxonomy shared by the engine and the CLI.

pub mod address;
pub mod config;
pub mod counter;
pub mod device;
pub mod error;

pub use error::{DeviceError, InkpadError};

#[doc(hidden)]
pub use tracing as __tracing;

/// Logs a positive outcome. Rendered with a distinct symbol by the CLI formatter.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "inkpad::success", $($arg)*)
    };
}
