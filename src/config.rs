use std::path::PathBuf;

use h3o::Resolution;

use crate::models::{DateRange, Extremum, Measure};
use crate::utils::constants::{
    DEFAULT_FRAME_DELAY_MS, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_WINDOW_WIDTH,
};

/// Explicit configuration for one animation run, passed to every pipeline
/// stage. No component reads ambient process-wide state.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub cache_dir: PathBuf,
    pub stations_file: PathBuf,
    pub output_dir: PathBuf,
    pub measure: Measure,
    pub extremum: Extremum,
    /// Analysis period; `None` selects the full date range present in the
    /// aggregated data.
    pub period: Option<DateRange>,
    /// Grid resolution, fixed for the whole run.
    pub resolution: Resolution,
    pub window_width: usize,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_delay_ms: u32,
    pub loop_animation: bool,
    pub max_workers: usize,
    pub silent: bool,
}

impl RunConfig {
    pub fn new(
        cache_dir: PathBuf,
        stations_file: PathBuf,
        output_dir: PathBuf,
        measure: Measure,
    ) -> Self {
        Self {
            cache_dir,
            stations_file,
            output_dir,
            measure,
            extremum: Extremum::Max,
            period: None,
            resolution: Resolution::Five,
            window_width: DEFAULT_WINDOW_WIDTH,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            loop_animation: true,
            max_workers: num_cpus::get(),
            silent: false,
        }
    }

    pub fn with_extremum(mut self, extremum: Extremum) -> Self {
        self.extremum = extremum;
        self
    }

    pub fn with_period(mut self, period: Option<DateRange>) -> Self {
        self.period = period;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_window_width(mut self, window_width: usize) -> Self {
        self.window_width = window_width.max(1);
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_width = width;
        self.frame_height = height;
        self
    }

    pub fn with_frame_delay_ms(mut self, delay_ms: u32) -> Self {
        self.frame_delay_ms = delay_ms;
        self
    }

    pub fn with_loop_animation(mut self, loop_animation: bool) -> Self {
        self.loop_animation = loop_animation;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Neighbor reach of the centered smoothing window, which is also how
    /// far the series is padded on each side before smoothing.
    pub fn half_window(&self) -> usize {
        self.window_width / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_window() {
        let config = RunConfig::new(
            PathBuf::from("cache"),
            PathBuf::from("stations.txt"),
            PathBuf::from("out"),
            Measure::Temperature,
        );
        assert_eq!(config.window_width, 7);
        assert_eq!(config.half_window(), 3);
        assert_eq!(config.with_window_width(9).half_window(), 4);
    }

    #[test]
    fn test_window_width_floor() {
        let config = RunConfig::new(
            PathBuf::from("cache"),
            PathBuf::from("stations.txt"),
            PathBuf::from("out"),
            Measure::Cloudiness,
        )
        .with_window_width(0);
        assert_eq!(config.window_width, 1);
    }
}
