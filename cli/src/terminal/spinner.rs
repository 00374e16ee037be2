use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// Clears the spinner when dropped, on success and error paths alike.
pub struct SpinnerHandle {
    spinner: ProgressBar,
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.spinner.finish_and_clear();
        if let Ok(mut active) = ACTIVE.lock() {
            *active = None;
        }
    }
}

pub fn start(message: &str, quiet: u8) -> SpinnerHandle {
    let pb = if quiet > 0 {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };

    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(TICKS));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    if let Ok(mut active) = ACTIVE.lock() {
        *active = Some(pb.clone());
    }

    SpinnerHandle { spinner: pb }
}

/// Log writer that prints above a running spinner instead of through it.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let active = ACTIVE.lock().ok().and_then(|guard| guard.clone());
        match active {
            Some(pb) => {
                let msg = String::from_utf8_lossy(buf);
                pb.println(msg.trim_end());
                Ok(buf.len())
            }
            None => io::stdout().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
