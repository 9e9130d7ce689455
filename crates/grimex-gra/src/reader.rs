use std::io::{Cursor, ErrorKind, Read};

use binrw::BinRead;
use tracing::debug;

use crate::{
    bytes::{read_prefixed_string, write_prefixed_string},
    decode_record, encode_record,
    error::{Error, Result},
    DirectoryEntry, DirectoryPointer, Record, Signature, VersionTag, HEADER_SIZE,
};

/// Descriptive fields stored in the metadata blob, in on-disk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModMetadata {
    pub uuid: String,
    pub dungeon_name: String,
    pub author: String,
    pub description: String,
    pub dungeon_folder: String,
}

impl ModMetadata {
    pub fn decode(blob: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(blob);
        Ok(Self {
            uuid: read_prefixed_string(&mut cursor)?,
            dungeon_name: read_prefixed_string(&mut cursor)?,
            author: read_prefixed_string(&mut cursor)?,
            description: read_prefixed_string(&mut cursor)?,
            dungeon_folder: read_prefixed_string(&mut cursor)?,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for field in [
            &self.uuid,
            &self.dungeon_name,
            &self.author,
            &self.description,
            &self.dungeon_folder,
        ] {
            write_prefixed_string(&mut out, field)?;
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescription {
    pub signature: Signature,
    pub version: VersionTag,
    pub pointer: DirectoryPointer,
    /// Directory entries in payload order.
    pub entries: Vec<DirectoryEntry>,
    pub metadata: ModMetadata,
}

impl ArchiveDescription {
    /// Re-encodes signature, version, pointer and directory exactly as stored.
    pub fn header_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.entries.len() * DirectoryEntry::SIZE);
        out.extend(encode_record(&self.signature)?);
        out.extend(encode_record(&self.version)?);
        out.extend(encode_record(&self.pointer)?);
        for entry in &self.entries {
            out.extend(encode_record(entry)?);
        }
        Ok(out)
    }
}

/// Decodes the archive header, directory and metadata from a forward-only stream.
///
/// On success the stream is left at the start of the payload region, ready
/// for [`crate::extract_entries`].
pub fn read_archive<R: Read>(reader: &mut R) -> Result<ArchiveDescription> {
    let signature: Signature = read_record(reader, "signature")?;
    if !signature.is_valid() {
        return Err(Error::InvalidArchive(format!(
            "expected signature {:?}, found {:?}",
            String::from_utf8_lossy(&crate::MAGIC),
            String::from_utf8_lossy(&signature.magic)
        )));
    }

    let version: VersionTag = read_record(reader, "version tag")?;
    let pointer: DirectoryPointer = read_record(reader, "directory pointer")?;

    let directory_end = pointer.directory_end as usize;
    let Some(directory_len) = directory_end.checked_sub(HEADER_SIZE) else {
        return Err(Error::InvalidArchive(format!(
            "directory ends at {directory_end}, before the end of the {HEADER_SIZE} byte header"
        )));
    };
    if directory_len % DirectoryEntry::SIZE != 0 {
        return Err(Error::InvalidArchive(format!(
            "directory of {directory_len} bytes is not a whole number of {} byte entries",
            DirectoryEntry::SIZE
        )));
    }

    let entry_count = directory_len / DirectoryEntry::SIZE;
    let mut entries = Vec::with_capacity(entry_count.min(4096));
    for _ in 0..entry_count {
        entries.push(read_record::<DirectoryEntry, _>(reader, "directory")?);
    }

    let blob = read_exact_vec(reader, pointer.metadata_size as u64, "metadata")?;
    let metadata = ModMetadata::decode(&blob)?;

    debug!(
        "Read GRA2 archive (editor version {}) with {} entries, dungeon folder '{}'",
        version.version,
        entries.len(),
        metadata.dungeon_folder
    );

    Ok(ArchiveDescription {
        signature,
        version,
        pointer,
        entries,
        metadata,
    })
}

fn read_record<T, R>(reader: &mut R, what: &'static str) -> Result<T>
where
    T: Record + for<'a> BinRead<Args<'a> = ()>,
    R: Read,
{
    let mut buf = [0u8; 32];
    let buf = &mut buf[..T::SIZE];
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => Error::TruncatedArchive { what },
        _ => Error::Io(e),
    })?;

    decode_record(buf)
}

/// Reads exactly `len` bytes without trusting `len` for the allocation.
pub(crate) fn read_exact_vec<R: Read>(
    reader: &mut R,
    len: u64,
    what: &'static str,
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(Error::TruncatedArchive { what });
    }
    Ok(buf)
}
