pub mod extractor;
pub mod source;

pub use extractor::ArchiveExtractor;
pub use source::{extract_station_id, ArchiveSource, LocalDirSource, StationArchive};
