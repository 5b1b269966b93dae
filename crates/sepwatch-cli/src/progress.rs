//! Progress display over snapshot batches.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};

const TEMPLATE: &str = "{msg} {bar:40.cyan/blue} {pos}/{len} batches [{elapsed_precise}<{eta_precise}]";

pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    /// Progress bar on stderr, hidden when disabled or stderr is not a terminal.
    pub fn new(total_batches: u64, enabled: bool) -> Self {
        if !enabled || !io::stderr().is_terminal() {
            return Self::hidden();
        }

        let bar = ProgressBar::new(total_batches);
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message("Checking conflicts");
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
