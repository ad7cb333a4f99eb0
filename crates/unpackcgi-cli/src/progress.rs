//! Progress bar implementation for the unpack run.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::path::Path;
use unpackcgi_core::ProgressCallback;

/// CLI progress bar wrapper implementing `ProgressCallback`.
///
/// Displays an entry counter when running in a TTY; the bar length is set
/// from the first entry event since the total is only known after the blob
/// has been scanned. Cleans up on drop.
pub struct CliProgress {
    bar: ProgressBar,
    sized: bool,
}

impl CliProgress {
    /// Creates a new CLI progress bar with the given message.
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::no_length();
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} entries")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.set_message(message.to_string());

        Self { bar, sized: false }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, _path: &Path, total: usize, _current: usize) {
        if !self.sized {
            self.bar.set_length(total as u64);
            self.sized = true;
        }
    }

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {
        self.bar.inc(1);
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}
