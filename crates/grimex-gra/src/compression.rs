use std::io::{Cursor, Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

#[derive(Debug, PartialEq, Eq)]
pub enum CompressionType {
    Zlib,
}

impl CompressionType {
    /// Checks for a zlib stream header (CMF/FLG pair with a valid check value).
    pub fn detect_from_slice(buf: &[u8]) -> Option<CompressionType> {
        match buf {
            &[cmf, flg, ..]
                if cmf & 0x0F == 8 && (u16::from(cmf) << 8 | u16::from(flg)) % 31 == 0 =>
            {
                Some(CompressionType::Zlib)
            }
            _ => None,
        }
    }
}

/// Inflates a zlib-wrapped deflate payload.
pub fn decompress(buf: &[u8]) -> std::io::Result<Vec<u8>> {
    if CompressionType::detect_from_slice(buf).is_none() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "payload does not start with a zlib header",
        ));
    }

    let mut decompressor = ZlibDecoder::new(Cursor::new(buf));
    let mut result_buf = vec![];
    decompressor.read_to_end(&mut result_buf)?;

    Ok(result_buf)
}

pub fn compress(buf: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut compressor = ZlibEncoder::new(Vec::new(), Compression::default());
    compressor.write_all(buf)?;
    compressor.finish()
}
