//! Reader and writer for the GRA2 mod container used by Legend of Grimrock 2.
//!
//! The container never stores file names, only the FNV-1a hash of each
//! file's logical path. Fixed-size records are decoded with `binrw` from
//! exact-length buffers so the archive stream itself is only read forward.

pub mod bytes;
pub mod compression;
pub mod error;
pub mod extract;
pub mod hash;
pub mod reader;
pub mod writer;

use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};

pub use error::{EntryError, Error, Result};
pub use extract::{extract_entries, EntryFailure, ExtractedFile, ExtractionReport};
pub use hash::{fnv1a32, ResourceHash};
pub use reader::{read_archive, ArchiveDescription, ModMetadata};
pub use writer::ArchiveWriter;

pub const MAGIC: [u8; 4] = *b"GRA2";

/// Byte length of signature + version tag + directory pointer.
pub const HEADER_SIZE: usize = Signature::SIZE + VersionTag::SIZE + DirectoryPointer::SIZE;

/// A record with a fixed on-disk size.
pub trait Record {
    const SIZE: usize;
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub magic: [u8; 4],
}

impl Signature {
    pub fn new() -> Self {
        Self { magic: MAGIC }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for Signature {
    const SIZE: usize = 4;
}

/// Editor version that produced the archive. Informational only.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionTag {
    pub version: u32,
}

impl Record for VersionTag {
    const SIZE: usize = 4;
}

/// Header record pointing past the directory.
///
/// Shares its layout with [`DirectoryEntry`], but `position` is absolute here
/// (the offset where the directory ends and the metadata blob begins) and
/// `compressed_size` is the byte length of the metadata blob.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectoryPointer {
    pub hash: u32,
    pub directory_end: u32,
    pub unknown1: u32,
    pub metadata_size: u32,
    pub unknown2: u32,
}

impl Record for DirectoryPointer {
    const SIZE: usize = 20;
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectoryEntry {
    /// FNV-1a hash of the file's logical path.
    pub hash: u32,
    /// Payload offset, relative to the start of the payload region.
    pub position: u32,
    pub unknown1: u32,
    pub compressed_size: u32,
    pub unknown2: u32,
}

impl DirectoryEntry {
    pub fn resource_hash(&self) -> ResourceHash {
        ResourceHash(self.hash)
    }
}

impl Record for DirectoryEntry {
    const SIZE: usize = 20;
}

/// Decodes a fixed-size record from exactly `T::SIZE` bytes.
pub fn decode_record<T>(bytes: &[u8]) -> Result<T>
where
    T: Record + for<'a> BinRead<Args<'a> = ()>,
{
    if bytes.len() != T::SIZE {
        return Err(Error::InvalidArchive(format!(
            "record must be exactly {} bytes, got {}",
            T::SIZE,
            bytes.len()
        )));
    }

    T::read_le(&mut Cursor::new(bytes)).map_err(|e| Error::InvalidArchive(e.to_string()))
}

pub fn encode_record<T>(record: &T) -> Result<Vec<u8>>
where
    T: Record + for<'a> BinWrite<Args<'a> = ()>,
{
    let mut out = Cursor::new(Vec::with_capacity(T::SIZE));
    record
        .write_le(&mut out)
        .map_err(|e| Error::InvalidArchive(e.to_string()))?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_directory_entry_layout() {
        let bytes = [
            0x78, 0x56, 0x34, 0x12, // hash
            0x10, 0x00, 0x00, 0x00, // position
            0x00, 0x00, 0x00, 0x00, // unknown1
            0x2A, 0x00, 0x00, 0x00, // compressed size
            0x01, 0x00, 0x00, 0x00, // unknown2
        ];
        let entry: DirectoryEntry = decode_record(&bytes).unwrap();
        assert_eq!(entry.hash, 0x1234_5678);
        assert_eq!(entry.position, 0x10);
        assert_eq!(entry.compressed_size, 42);
        assert_eq!(entry.unknown2, 1);
        assert_eq!(encode_record(&entry).unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_decode_record_rejects_short_buffer() {
        let result = decode_record::<DirectoryEntry>(&[0u8; 12]);
        assert!(matches!(result, Err(Error::InvalidArchive(_))));
    }

    #[test]
    fn test_signature_validity() {
        assert!(Signature::new().is_valid());
        assert!(!Signature { magic: *b"GRA1" }.is_valid());
    }
}
