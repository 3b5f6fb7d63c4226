//! `indicatif`-backed progress reporting, throttled to the interval C9
//! requires so redraws never dominate runtime on fast storage.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::PROGRESS_INTERVAL;
use crate::io_util::ProgressSink;

const TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Wraps an `indicatif` bar, redrawing at most once per [`PROGRESS_INTERVAL`].
pub struct ProgressReporter {
    bar: ProgressBar,
    pending: u64,
    last_draw: Instant,
}

impl ProgressReporter {
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_message(description.to_owned());
        Self { bar, pending: 0, last_draw: Instant::now() }
    }

    pub fn finish(&self) {
        self.bar.inc(self.pending);
        self.bar.finish_with_message("done");
    }
}

impl ProgressSink for ProgressReporter {
    fn add(&mut self, delta: u64) {
        self.pending += delta;
        if self.last_draw.elapsed() >= PROGRESS_INTERVAL {
            self.bar.inc(self.pending);
            self.pending = 0;
            self.last_draw = Instant::now();
        }
    }
}
