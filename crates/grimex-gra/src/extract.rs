use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    compression,
    error::{EntryError, Error, Result},
    DirectoryEntry, ResourceHash,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    pub hash: ResourceHash,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct EntryFailure {
    pub hash: ResourceHash,
    pub error: EntryError,
}

#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Successfully written files, in directory order.
    pub extracted: Vec<ExtractedFile>,
    pub failures: Vec<EntryFailure>,
}

/// Inflates every entry into `out_dir`, named `<hash>.tmp`.
///
/// `reader` must be positioned where [`crate::read_archive`] left it. A
/// failing entry is recorded and skipped; only a payload region that ends
/// before the first entry is an error.
pub fn extract_entries<R: Read>(
    reader: &mut R,
    entries: &[DirectoryEntry],
    out_dir: &Path,
) -> Result<ExtractionReport> {
    let mut report = ExtractionReport::default();
    let Some(first) = entries.first() else {
        return Ok(report);
    };

    let skip = first.position as u64;
    let skipped = io::copy(&mut reader.by_ref().take(skip), &mut io::sink())?;
    if skipped < skip {
        return Err(Error::TruncatedArchive {
            what: "payload region",
        });
    }

    for entry in entries {
        let hash = entry.resource_hash();
        match extract_entry(reader, entry, out_dir) {
            Ok(path) => {
                debug!("Extracted {hash} to {}", path.display());
                report.extracted.push(ExtractedFile { hash, path });
            }
            Err(error) => {
                warn!("Failed to extract entry {hash}: {error}");
                report.failures.push(EntryFailure { hash, error });
            }
        }
    }

    Ok(report)
}

fn extract_entry<R: Read>(
    reader: &mut R,
    entry: &DirectoryEntry,
    out_dir: &Path,
) -> std::result::Result<PathBuf, EntryError> {
    let expected = entry.compressed_size as u64;
    let mut compressed = Vec::new();
    reader
        .by_ref()
        .take(expected)
        .read_to_end(&mut compressed)
        .map_err(EntryError::Read)?;
    if (compressed.len() as u64) < expected {
        return Err(EntryError::Truncated {
            expected,
            actual: compressed.len() as u64,
        });
    }

    let decompressed = compression::decompress(&compressed).map_err(EntryError::Decompress)?;

    let path = out_dir.join(entry.resource_hash().temp_file_name());
    std::fs::write(&path, decompressed).map_err(EntryError::Write)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{read_archive, ArchiveWriter, ModMetadata};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn archive_with(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ArchiveWriter::new(ModMetadata {
            dungeon_folder: "mod_assets".into(),
            ..Default::default()
        });
        for (path, data) in files {
            writer.add_file(*path, data.to_vec());
        }
        writer.to_bytes().unwrap()
    }

    #[test]
    fn test_extract_all_entries() {
        let temp = TempDir::new().unwrap();
        let data = archive_with(&[
            ("mod_assets/a.lua", &b"a = 1"[..]),
            ("mod_assets/b.lua", &b"b = 2"[..]),
        ]);
        let mut stream = Cursor::new(&data);
        let archive = read_archive(&mut stream).unwrap();
        let report = extract_entries(&mut stream, &archive.entries, temp.path()).unwrap();

        assert!(report.failures.is_empty());
        assert_eq!(report.extracted.len(), 2);
        let first = &report.extracted[0];
        assert_eq!(first.hash, ResourceHash::of_path("mod_assets/a.lua"));
        assert_eq!(
            first.path.file_name().unwrap().to_string_lossy(),
            first.hash.temp_file_name()
        );
        assert_eq!(std::fs::read(&first.path).unwrap(), b"a = 1");
        assert_eq!(std::fs::read(&report.extracted[1].path).unwrap(), b"b = 2");
    }

    #[test]
    fn test_corrupt_entry_does_not_stop_extraction() {
        let temp = TempDir::new().unwrap();
        let data = archive_with(&[
            ("mod_assets/a.lua", &b"first file"[..]),
            ("mod_assets/b.lua", &b"second file"[..]),
        ]);
        let archive = read_archive(&mut Cursor::new(&data)).unwrap();

        // Break the zlib header of the first payload.
        let mut data = data;
        let payload_start = data.len()
            - archive
                .entries
                .iter()
                .map(|e| e.compressed_size as usize)
                .sum::<usize>();
        data[payload_start] = 0x00;

        let mut stream = Cursor::new(&data);
        let archive = read_archive(&mut stream).unwrap();
        let report = extract_entries(&mut stream, &archive.entries, temp.path()).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].hash,
            ResourceHash::of_path("mod_assets/a.lua")
        );
        assert!(matches!(report.failures[0].error, EntryError::Decompress(_)));
        assert_eq!(report.extracted.len(), 1);
        assert_eq!(std::fs::read(&report.extracted[0].path).unwrap(), b"second file");
    }

    #[test]
    fn test_truncated_payload_is_reported_per_entry() {
        let temp = TempDir::new().unwrap();
        let data = archive_with(&[("mod_assets/a.lua", &b"only file"[..])]);
        let mut stream = Cursor::new(&data[..data.len() - 2]);
        let archive = read_archive(&mut stream).unwrap();
        let report = extract_entries(&mut stream, &archive.entries, temp.path()).unwrap();

        assert!(report.extracted.is_empty());
        assert!(matches!(
            report.failures[0].error,
            EntryError::Truncated { .. }
        ));
    }

    #[test]
    fn test_empty_directory() {
        let temp = TempDir::new().unwrap();
        let data = archive_with(&[]);
        let mut stream = Cursor::new(&data);
        let archive = read_archive(&mut stream).unwrap();
        let report = extract_entries(&mut stream, &archive.entries, temp.path()).unwrap();
        assert!(report.extracted.is_empty());
        assert!(report.failures.is_empty());
    }
}
