use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::error::Result;
use crate::utils::constants::{ARCHIVE_MARKER, STATION_ID_DIGITS};

/// One discovered per-station observation archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationArchive {
    pub station_id: u32,
    pub path: PathBuf,
}

/// Seam to whatever supplies observation archives. The pipeline only
/// needs discovery; transport (download, mirroring) lives behind it.
pub trait ArchiveSource {
    fn discover(&self) -> Result<Vec<StationArchive>>;
}

/// Archive source backed by a directory of already-downloaded zip files.
pub struct LocalDirSource {
    dir: PathBuf,
}

impl LocalDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArchiveSource for LocalDirSource {
    fn discover(&self) -> Result<Vec<StationArchive>> {
        let mut archives = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some("zip") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.contains(ARCHIVE_MARKER) {
                continue;
            }

            match extract_station_id(name) {
                Some(station_id) => archives.push(StationArchive { station_id, path }),
                None => warn!(file = name, "Archive name carries no station id; skipping"),
            }
        }

        archives.sort_by_key(|a| a.station_id);
        Ok(archives)
    }
}

/// Pull the 5-digit station id out of an archive file name such as
/// `stundenwerte_TU_00403_19500101_20231231_terminwerte.zip`.
pub fn extract_station_id(name: &str) -> Option<u32> {
    let bytes = name.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == STATION_ID_DIGITS {
                return name[start..i].parse().ok();
            }
        } else {
            i += 1;
        }
    }

    None
}
