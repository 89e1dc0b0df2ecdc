/// Sentinel value marking a missing measurement in raw observation files
pub const SENTINEL_MISSING: f64 = -999.0;

/// Marker token identifying observation archives in the source directory
pub const ARCHIVE_MARKER: &str = "terminwerte";

/// Number of digits of the station id embedded in archive file names
pub const STATION_ID_DIGITS: usize = 5;

/// Fixed-width station metadata column widths, in characters:
/// id, valid-from, valid-to, elevation, latitude, longitude, name,
/// region, release flag
pub const STATION_COLUMN_WIDTHS: [usize; 9] = [6, 9, 9, 15, 12, 10, 41, 41, 5];

/// Date format of the station metadata validity columns
pub const STATION_DATE_FORMAT: &str = "%Y%m%d";

/// Smoothing defaults
pub const DEFAULT_WINDOW_WIDTH: usize = 7;

/// Grid defaults
pub const DEFAULT_RESOLUTION: u8 = 5;

/// Minimum present samples for a daily aggregate to be kept
pub const MIN_DAILY_SAMPLES: usize = 2;

/// Rendering defaults
pub const DEFAULT_FRAME_WIDTH: u32 = 720;
pub const DEFAULT_FRAME_HEIGHT: u32 = 900;
pub const DEFAULT_FRAME_DELAY_MS: u32 = 200;

/// Output file names
pub const FRAME_FILE_PREFIX: &str = "frame-";
pub const ANIMATION_FILE_NAME: &str = "animation.gif";
pub const INGEST_REPORT_FILE_NAME: &str = "ingest-report.json";

/// I/O
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
