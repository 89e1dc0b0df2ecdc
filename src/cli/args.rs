use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{Extremum, Measure};
use crate::utils::constants::{
    DEFAULT_FRAME_DELAY_MS, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_RESOLUTION,
    DEFAULT_WINDOW_WIDTH,
};

#[derive(Parser)]
#[command(name = "dwd-hexmap")]
#[command(about = "Animated hexagonal choropleth maps from archived weather observations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest observation archives into the cache
    Ingest {
        #[arg(short, long, help = "Directory containing observation zip archives")]
        input_dir: PathBuf,

        #[arg(short, long, help = "Cache directory")]
        cache_dir: PathBuf,

        #[arg(long, default_value = "false", help = "Re-ingest even when cache tables exist")]
        force: bool,

        #[arg(long, default_value = "false", help = "Memory-map observation files")]
        use_mmap: bool,
    },

    /// Render the frame sequence and animation from cached observations
    Animate {
        #[arg(short, long, help = "Cache directory populated by ingest")]
        cache_dir: PathBuf,

        #[arg(short, long, help = "Station metadata file (fixed-width)")]
        stations_file: PathBuf,

        #[arg(short, long, help = "Directory for frames and the animation")]
        output_dir: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Measure::Temperature)]
        measure: Measure,

        #[arg(long, value_enum, default_value_t = Extremum::Max, help = "Daily extremum to visualize")]
        extremum: Extremum,

        #[arg(long, help = "Analysis start date (YYYY-MM-DD) [default: first date in the data]")]
        start: Option<NaiveDate>,

        #[arg(long, help = "Analysis end date (YYYY-MM-DD) [default: last date in the data]")]
        end: Option<NaiveDate>,

        #[arg(long, default_value_t = DEFAULT_RESOLUTION, help = "Grid resolution (0-15)")]
        resolution: u8,

        #[arg(long, default_value_t = DEFAULT_WINDOW_WIDTH, help = "Smoothing window width in days")]
        window: usize,

        #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH)]
        width: u32,

        #[arg(long, default_value_t = DEFAULT_FRAME_HEIGHT)]
        height: u32,

        #[arg(long, default_value_t = DEFAULT_FRAME_DELAY_MS, help = "Per-frame delay in milliseconds")]
        delay_ms: u32,

        #[arg(long, default_value = "false", help = "Encode a single pass instead of looping")]
        no_loop: bool,

        #[arg(long, default_value_t = num_cpus::get(), help = "Worker threads for frame rendering")]
        max_workers: usize,
    },

    /// Display cache table statistics
    Info {
        #[arg(short, long, help = "Cache directory")]
        cache_dir: PathBuf,
    },
}
