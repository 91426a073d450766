//! Terminal progress for `lens run`, fed by pipeline progress events.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use lens_core::enums::RunStatus;
use lens_pipeline::{ProgressEvent, ProgressSink};

use crate::ui;

/// indicatif bar advanced one step per finished stage. Hidden when progress
/// output is disabled (quiet mode or stderr is not a terminal).
pub struct RunProgress {
    bar: Option<ProgressBar>,
}

fn bar_template() -> &'static str {
    match ui::prefs().term_width {
        Some(cols) if cols < 80 => "{spinner:.cyan} {pos}/{len} {msg}",
        _ => "{spinner:.cyan} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}",
    }
}

impl RunProgress {
    #[must_use]
    pub fn new() -> Self {
        if !ui::prefs().progress {
            return Self { bar: None };
        }
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(bar_template())
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar: Some(bar) }
    }
}

impl ProgressSink for RunProgress {
    fn on_event(&self, event: &ProgressEvent) {
        let Some(bar) = &self.bar else {
            return;
        };
        match event {
            ProgressEvent::RunStarted { total_stages, .. } => {
                bar.set_length(u64::try_from(*total_stages).unwrap_or(u64::MAX));
                bar.set_position(0);
                bar.set_message("starting");
            }
            ProgressEvent::StageStarted { label, .. } => bar.set_message(label.clone()),
            ProgressEvent::StageFinished { persisted, .. } => {
                if !persisted {
                    bar.println("  stage skipped by write guard");
                }
                bar.inc(1);
            }
            ProgressEvent::RunFinished { status, elapsed } => {
                let message = format!("{status} in {}s", elapsed.as_secs());
                match status {
                    RunStatus::Completed => bar.finish_with_message(message),
                    RunStatus::Failed | RunStatus::Cancelled => bar.abandon_with_message(message),
                }
            }
        }
    }
}

impl Default for RunProgress {
    fn default() -> Self {
        Self::new()
    }
}
