use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;

use crate::archive::StationArchive;
use crate::error::{PipelineError, Result};

/// Extracts the observation data member of station archives into a
/// temporary directory that lives as long as the extractor.
pub struct ArchiveExtractor {
    temp_dir: TempDir,
}

impl ArchiveExtractor {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        Ok(Self { temp_dir })
    }

    pub fn temp_dir_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Extract the data member of `archive` and return the extracted
    /// path. Archives bundle metadata text files next to the data; the
    /// data member is the one named `produkt_*`, with a plain `.txt`
    /// member as fallback.
    pub fn extract_data_member(&self, archive: &StationArchive) -> Result<PathBuf> {
        let file = File::open(&archive.path)?;
        let mut zip = ZipArchive::new(file)?;

        let member_name = pick_data_member(&mut zip).ok_or_else(|| {
            PipelineError::InvalidFormat(format!(
                "Archive '{}' has no data member",
                archive.path.display()
            ))
        })?;

        let mut member = zip.by_name(&member_name)?;
        let dest = self
            .temp_dir
            .path()
            .join(format!("station-{:05}.txt", archive.station_id));

        let mut writer = BufWriter::new(File::create(&dest)?);
        std::io::copy(&mut member, &mut writer)?;
        writer.flush()?;

        Ok(dest)
    }
}

fn pick_data_member(zip: &mut ZipArchive<File>) -> Option<String> {
    let mut names = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        if let Ok(member) = zip.by_index(i) {
            names.push(member.name().to_string());
        }
    }

    names
        .iter()
        .find(|n| n.contains("produkt"))
        .or_else(|| names.iter().find(|n| n.ends_with(".txt")))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write_archive(dir: &Path, name: &str, members: &[(&str, &str)]) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (member, contents) in members {
            writer.start_file(*member, FileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_extracts_produkt_member() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_archive(
            dir.path(),
            "stundenwerte_TU_00403_terminwerte.zip",
            &[
                ("Metadaten_Stationsname_00403.txt", "metadata"),
                ("produkt_tu_termin_00403.txt", "403;2023070107;1;16.2;7.0;eor\n"),
            ],
        );

        let archive = StationArchive {
            station_id: 403,
            path,
        };
        let extractor = ArchiveExtractor::new()?;
        let extracted = extractor.extract_data_member(&archive)?;

        let contents = std::fs::read_to_string(extracted)?;
        assert!(contents.starts_with("403;"));

        Ok(())
    }

    #[test]
    fn test_archive_without_data_member_fails() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_archive(
            dir.path(),
            "stundenwerte_TU_00403_terminwerte.zip",
            &[("readme.pdf", "nothing")],
        );

        let archive = StationArchive {
            station_id: 403,
            path,
        };
        let extractor = ArchiveExtractor::new()?;
        assert!(extractor.extract_data_member(&archive).is_err());

        Ok(())
    }

    #[test]
    fn test_corrupt_archive_fails() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("stundenwerte_TU_00404_terminwerte.zip");
        std::fs::write(&path, b"not a zip file")?;

        let archive = StationArchive {
            station_id: 404,
            path,
        };
        let extractor = ArchiveExtractor::new()?;
        assert!(extractor.extract_data_member(&archive).is_err());

        Ok(())
    }
}
