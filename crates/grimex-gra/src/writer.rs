use std::io::Write;

use crate::{
    compression, encode_record,
    error::{Error, Result},
    DirectoryEntry, DirectoryPointer, ModMetadata, Record, ResourceHash, Signature, VersionTag,
    HEADER_SIZE,
};

/// Editor version written when none is given.
pub const DEFAULT_EDITOR_VERSION: u32 = 2;

/// Packs files into a GRA2 container.
///
/// Payloads are laid out in insertion order directly after the metadata
/// blob, so the first entry's position is always 0.
pub struct ArchiveWriter {
    version: u32,
    metadata: ModMetadata,
    files: Vec<(String, Vec<u8>)>,
}

impl ArchiveWriter {
    pub fn new(metadata: ModMetadata) -> Self {
        Self {
            version: DEFAULT_EDITOR_VERSION,
            metadata,
            files: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn add_file(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.files.push((path.into(), data));
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let metadata = self.metadata.encode()?;

        let mut entries = Vec::with_capacity(self.files.len());
        let mut payloads = Vec::with_capacity(self.files.len());
        let mut position = 0u32;
        for (path, data) in &self.files {
            let compressed = compression::compress(data)?;
            let compressed_size = to_u32(compressed.len(), path)?;
            entries.push(DirectoryEntry {
                hash: ResourceHash::of_path(path).0,
                position,
                unknown1: 0,
                compressed_size,
                unknown2: 0,
            });
            position = position
                .checked_add(compressed_size)
                .ok_or_else(|| Error::InvalidArchive("payload region exceeds 4 GiB".into()))?;
            payloads.push(compressed);
        }

        let directory_end = HEADER_SIZE + entries.len() * DirectoryEntry::SIZE;
        let pointer = DirectoryPointer {
            hash: 0,
            directory_end: to_u32(directory_end, "directory")?,
            unknown1: 0,
            metadata_size: to_u32(metadata.len(), "metadata")?,
            unknown2: 0,
        };

        writer.write_all(&encode_record(&Signature::new())?)?;
        writer.write_all(&encode_record(&VersionTag {
            version: self.version,
        })?)?;
        writer.write_all(&encode_record(&pointer)?)?;
        for entry in &entries {
            writer.write_all(&encode_record(entry)?)?;
        }
        writer.write_all(&metadata)?;
        for payload in &payloads {
            writer.write_all(payload)?;
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }
}

fn to_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| Error::InvalidArchive(format!("{what} is too large ({len} bytes)")))
}
