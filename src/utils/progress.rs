use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Thin wrapper over indicatif so pipeline stages can report progress
/// without caring whether output is silenced (tests, non-tty runs).
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new_bar(total: u64, message: &str, silent: bool) -> Self {
        if silent {
            return Self { bar: None };
        }
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(pb) }
    }

    pub fn new_spinner(message: &str, silent: bool) -> Self {
        if silent {
            return Self { bar: None };
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(pb) }
    }

    pub fn silent() -> Self {
        Self { bar: None }
    }

    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.bar {
            pb.inc(delta);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.bar {
            pb.finish_with_message(message.to_string());
        }
    }
}
