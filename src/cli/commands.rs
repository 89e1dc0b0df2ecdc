use std::collections::HashSet;

use chrono::NaiveDate;
use h3o::Resolution;

use crate::archive::LocalDirSource;
use crate::cache::{CsvCache, ObservationCache};
use crate::cli::args::{Cli, Commands};
use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use crate::ingest::{write_report, Ingestor};
use crate::models::{DateRange, Measure};
use crate::pipeline::PipelineRunner;
use crate::utils::constants::INGEST_REPORT_FILE_NAME;
use crate::utils::ProgressReporter;

pub async fn run(cli: Cli) -> Result<()> {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ingest {
            input_dir,
            cache_dir,
            force,
            use_mmap,
        } => {
            println!("Ingesting observation archives...");
            println!("Input directory: {}", input_dir.display());
            println!("Cache directory: {}", cache_dir.display());

            let cache = CsvCache::new(&cache_dir)?;
            let source = LocalDirSource::new(&input_dir);
            let progress = ProgressReporter::new_spinner("Ingesting archives...", false);

            let ingestor = Ingestor::new(&cache).with_force(force).with_mmap(use_mmap);
            let summary = ingestor.ingest(&source, Some(&progress))?;

            progress.finish_with_message("Ingestion complete");
            println!("\n{}", summary.console_summary());

            let report_path = cache_dir.join(INGEST_REPORT_FILE_NAME);
            write_report(&summary, &report_path)?;
            println!("Report written to {}", report_path.display());
        }

        Commands::Animate {
            cache_dir,
            stations_file,
            output_dir,
            measure,
            extremum,
            start,
            end,
            resolution,
            window,
            width,
            height,
            delay_ms,
            no_loop,
            max_workers,
        } => {
            let period = match (start, end) {
                (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
                (None, None) => None,
                _ => {
                    return Err(PipelineError::InvalidFormat(
                        "--start and --end must be given together".to_string(),
                    ))
                }
            };
            let resolution = Resolution::try_from(resolution)
                .map_err(|e| PipelineError::CellIndexing(e.to_string()))?;

            println!("Rendering {measure} animation...");
            println!("Cache directory: {}", cache_dir.display());
            println!("Output directory: {}", output_dir.display());

            let config = RunConfig::new(cache_dir, stations_file, output_dir, measure)
                .with_extremum(extremum)
                .with_period(period)
                .with_resolution(resolution)
                .with_window_width(window)
                .with_frame_size(width, height)
                .with_frame_delay_ms(delay_ms)
                .with_loop_animation(!no_loop)
                .with_max_workers(max_workers);

            let outcome = PipelineRunner::new(config).run().await?;

            println!(
                "\nPeriod: {} to {} ({} frames)",
                outcome.period.start, outcome.period.end, outcome.frame_count
            );
            println!(
                "Stations: {}, cells: {}",
                outcome.station_count, outcome.cell_count
            );
            println!(
                "Color domain: [{:.1}, {:.1}]",
                outcome.domain.min, outcome.domain.max
            );
            println!("Animation: {}", outcome.animation_path.display());
        }

        Commands::Info { cache_dir } => {
            let cache = CsvCache::new(&cache_dir)?;
            println!("Cache: {}", cache_dir.display());

            for measure in Measure::ALL {
                let table = measure.table_name();
                if !cache.has(table) {
                    println!("  {table}: absent");
                    continue;
                }

                let records = cache.read(table, NaiveDate::MIN)?;
                let stations: HashSet<u32> = records.iter().map(|r| r.station_id).collect();
                let present = records.iter().filter(|r| r.value.is_some()).count();
                let first = records.iter().map(|r| r.timestamp.date()).min();
                let last = records.iter().map(|r| r.timestamp.date()).max();

                match (first, last) {
                    (Some(first), Some(last)) => println!(
                        "  {table}: {} rows ({present} present) from {} stations, {first} to {last}",
                        records.len(),
                        stations.len()
                    ),
                    _ => println!("  {table}: empty"),
                }
            }
        }
    }

    Ok(())
}
