use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::types::{ProgressState, Stage};

/// Progress bar fed by the pipeline's progress callbacks.
pub struct PipelineProgress {
    bar: ProgressBar,
}

impl PipelineProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.blue} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .progress_chars("=> "),
        );
        bar.set_message("Fetching saved tracks...");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn update(&self, progress: ProgressState) {
        let message = match progress.stage {
            Stage::FetchingTracks => "Fetching saved tracks...",
            Stage::FetchingGenres => "Fetching artist genres...",
        };
        self.bar.set_message(message);
        self.bar.set_length(progress.total as u64);
        self.bar.set_position(progress.current as u64);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for PipelineProgress {
    fn default() -> Self {
        Self::new()
    }
}
