//! # Counter engine
//!
//! Turns a printer's declared memory layout and raw EEPROM bytes into waste ink pad
//! counter reports, and zeroes counters on request.
//!
//! * **[`classifier`]**: memory regions → counter groups, with per-family label/capacity overrides.
//! * **[`reader`]**: batched reads per group and the derived saturation metrics.
//! * **[`report`]**: text rendering, the CSV sink and the line-oriented status log.
//! * **[`reset`]**: atomic zeroing of explicit addresses or the model's own reset routine.
//! * **[`session`]**: the per-invocation context owning the selected device.
//! * **[`snapshot`]**: a device backed by an EEPROM image file.

pub mod classifier;
pub mod reader;
pub mod report;
pub mod reset;
pub mod session;
pub mod snapshot;
