//! Primitive little-endian readers for the metadata blob.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

pub fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32> {
    cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| Error::InvalidArchive("metadata ends inside a length prefix".into()))
}

/// Reads a `u32` byte length followed by that many bytes of UTF-8.
///
/// The length is checked against the remaining buffer before anything is
/// allocated.
pub fn read_prefixed_string(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let len = read_u32(cursor)? as u64;
    let remaining = (cursor.get_ref().len() as u64).saturating_sub(cursor.position());
    if len > remaining {
        return Err(Error::InvalidArchive(format!(
            "metadata string of {len} bytes exceeds the {remaining} remaining bytes"
        )));
    }

    let mut buf = vec![0u8; len as usize];
    cursor.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| Error::InvalidArchive(format!("metadata string is not utf8: {e}")))
}

pub fn write_prefixed_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| Error::InvalidArchive(format!("string of {} bytes is too long", value.len())))?;
    writer.write_u32::<LittleEndian>(len)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}
