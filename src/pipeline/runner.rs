use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use h3o::CellIndex;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::cache::{CsvCache, ObservationCache};
use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use crate::models::DateRange;
use crate::pipeline::{aggregate_daily, index_stations, join_cells, smooth, H3GeometryResolver};
use crate::readers::StationReader;
use crate::render::{sort_frames, AnimationEncoder, ColorDomain, Frame, FrameRenderer};
use crate::utils::constants::ANIMATION_FILE_NAME;
use crate::utils::ProgressReporter;

/// What one animation run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub period: DateRange,
    pub domain: ColorDomain,
    pub station_count: usize,
    pub cell_count: usize,
    pub frame_count: usize,
    pub animation_path: PathBuf,
}

/// Runs the transient pipeline: cache read → daily aggregation → cell
/// join → smoothing → frame rendering → GIF encoding. Everything except
/// the cache tables is recomputed from scratch on every invocation.
pub struct PipelineRunner {
    config: RunConfig,
}

impl PipelineRunner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        let config = &self.config;
        let progress = ProgressReporter::new_spinner("Loading cached observations...", config.silent);

        let stations = StationReader::new().read_stations(&config.stations_file)?;
        info!(stations = stations.len(), "Loaded station registry");

        let cache = CsvCache::new(&config.cache_dir)?;
        // Pull the pre-period padding too so boundary windows see real
        // neighbors.
        let date_floor = match config.period {
            Some(period) => period.start - Duration::days(config.half_window() as i64),
            None => NaiveDate::MIN,
        };
        let observations = cache.read(config.measure.table_name(), date_floor)?;
        if observations.is_empty() {
            return Err(PipelineError::NoData(format!(
                "Cache table '{}' holds no observations on or after {date_floor}",
                config.measure.table_name()
            )));
        }

        progress.set_message("Aggregating daily extrema...");
        let aggregates = aggregate_daily(&observations);
        if aggregates.is_empty() {
            return Err(PipelineError::NoData(
                "No day reached the minimum sample count".to_string(),
            ));
        }

        let period = match config.period {
            Some(period) => period,
            None => {
                // Aggregates are sorted by (station, date), so scan for
                // the global extent.
                let min = aggregates.iter().map(|a| a.date).min();
                let max = aggregates.iter().map(|a| a.date).max();
                match (min, max) {
                    (Some(min), Some(max)) => DateRange::new(min, max)?,
                    _ => unreachable!("non-empty aggregates have a date extent"),
                }
            }
        };
        info!(start = %period.start, end = %period.end, "Analysis period");

        let covering = StationReader::filter_covering(stations, &period);
        if covering.is_empty() {
            return Err(PipelineError::NoData(
                "No station's validity interval covers the analysis period".to_string(),
            ));
        }

        progress.set_message("Indexing stations onto the grid...");
        let lookup = index_stations(&covering, config.resolution, &H3GeometryResolver);
        if lookup.is_empty() {
            return Err(PipelineError::NoData(
                "No station coordinate could be indexed".to_string(),
            ));
        }

        let cell_aggregates = join_cells(&aggregates, &lookup, config.extremum);
        if cell_aggregates.is_empty() {
            return Err(PipelineError::NoData(
                "No aggregate joined onto an indexed cell".to_string(),
            ));
        }

        progress.set_message("Smoothing cell series...");
        let smoothed = smooth(&cell_aggregates, period, config.window_width);

        // The color domain is fixed here, once, for every frame.
        let domain = ColorDomain::from_points(&smoothed)?;
        info!(min = domain.min, max = domain.max, "Color domain");

        let mut values_by_date: BTreeMap<NaiveDate, HashMap<CellIndex, f64>> = BTreeMap::new();
        for point in &smoothed {
            if let Some(value) = point.value {
                values_by_date
                    .entry(point.date)
                    .or_default()
                    .insert(point.cell, value);
            }
        }

        fs::create_dir_all(&config.output_dir)?;
        let renderer =
            FrameRenderer::new(config.frame_width, config.frame_height, &lookup, domain)?;

        progress.set_message("Rendering frames...");
        let mut frames = self.render_frames(&renderer, &period, &values_by_date)?;

        self.warn_on_gaps(&frames, &period);

        sort_frames(&mut frames);
        for frame in &frames {
            let path = config.output_dir.join(frame.file_name());
            if let Err(e) = frame.image.save(&path) {
                warn!(date = %frame.date, "Failed to write frame image: {e}");
            }
        }

        progress.set_message("Encoding animation...");
        let animation_path = config.output_dir.join(ANIMATION_FILE_NAME);
        let encoder = AnimationEncoder::new(config.frame_delay_ms, config.loop_animation);
        encoder.encode(&frames, &animation_path)?;

        progress.finish_with_message(&format!(
            "Wrote {} frames and {}",
            frames.len(),
            animation_path.display()
        ));

        Ok(RunOutcome {
            period,
            domain,
            station_count: covering.len(),
            cell_count: lookup.cell_count(),
            frame_count: frames.len(),
            animation_path,
        })
    }

    /// Render one frame per date in the period. The only parallel stage:
    /// frames depend solely on that date's values, the geometry lookup
    /// and the already-fixed color domain.
    fn render_frames(
        &self,
        renderer: &FrameRenderer<'_>,
        period: &DateRange,
        values_by_date: &BTreeMap<NaiveDate, HashMap<CellIndex, f64>>,
    ) -> Result<Vec<Frame>> {
        let dates: Vec<NaiveDate> = period.days().collect();
        let empty = HashMap::new();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()
            .map_err(|e| PipelineError::Render(e.to_string()))?;

        let results: Vec<(NaiveDate, Result<Frame>)> = pool.install(|| {
            dates
                .par_iter()
                .map(|date| {
                    let values = values_by_date.get(date).unwrap_or(&empty);
                    (*date, renderer.render(*date, values))
                })
                .collect()
        });

        let mut frames = Vec::with_capacity(results.len());
        for (date, result) in results {
            match result {
                Ok(frame) => frames.push(frame),
                // One date's failure never aborts the run.
                Err(e) => warn!(date = %date, "Failed to render frame: {e}"),
            }
        }

        Ok(frames)
    }

    /// The encoder accepts whatever frames succeeded; missing in-range
    /// dates deserve a warning first.
    fn warn_on_gaps(&self, frames: &[Frame], period: &DateRange) {
        if frames.len() as i64 != period.num_days() {
            let rendered: std::collections::HashSet<NaiveDate> =
                frames.iter().map(|f| f.date).collect();
            let missing: Vec<String> = period
                .days()
                .filter(|d| !rendered.contains(d))
                .map(|d| d.to_string())
                .collect();
            warn!(
                missing = %missing.join(", "),
                "Frames missing for dates within the analysis period"
            );
        }
    }
}
