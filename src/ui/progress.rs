//! Download progress with CI fallback

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;

/// Progress bar for archive downloads.
///
/// Shows an indicatif bar when the terminal is interactive, nothing otherwise.
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    /// Create a progress indicator for a body of `length` bytes (if known)
    pub fn new(enabled: bool, label: &str, length: Option<u64>) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = match length {
            Some(len) => {
                let bar = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::default_bar().template(
                    "  {spinner:.cyan} {prefix}  {bar:20.cyan/dim} {bytes}/{total_bytes}  {elapsed:.dim}",
                ) {
                    bar.set_style(style.progress_chars("━╸─"));
                }
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) =
                    ProgressStyle::default_spinner().template("  {spinner:.cyan} {prefix}  {bytes}  {elapsed:.dim}")
                {
                    bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
                }
                bar
            }
        };
        bar.set_prefix(label.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar }
    }

    /// Wrap a reader so bytes read advance the bar
    pub fn wrap<R: Read>(&self, reader: R) -> impl Read {
        self.bar.wrap_read(reader)
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
    }
}

impl Drop for DownloadProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
