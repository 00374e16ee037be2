use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailLevel {
    /// One line per counter group.
    #[default]
    Summary,
    /// Group lines followed by every address reading.
    Detail,
}

/// Options understood by the report renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub show_ambiguous: bool,
    pub detail: DetailLevel,
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Adds the diagnostic address set that often mirrors the main waste counter.
    ///
    /// It is never normalized against a capacity.
    pub show_ambiguous: bool,
    pub detail: DetailLevel,
    /// Append one CSV row per address reading to this file.
    pub csv_path: Option<PathBuf>,
    /// Append a line per counter group to this text log.
    pub status_log: Option<PathBuf>,
    /// JSON file replacing the built-in label/capacity overrides.
    pub overrides_path: Option<PathBuf>,
    /// EEPROM image files to expose as devices.
    pub device_files: Vec<PathBuf>,
    /// Index of the device to use when several are found. Defaults to the first.
    pub device_index: Option<usize>,
    /// Skip interactive confirmation before writing to the device.
    pub assume_yes: bool,
    pub quiet: u8,
}

impl Config {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            show_ambiguous: self.show_ambiguous,
            detail: self.detail,
            csv_path: self.csv_path.clone(),
        }
    }
}
