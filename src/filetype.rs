use std::{fs::File, io::Read, path::Path};

/// Binary asset kinds found in Grimrock mods. Anything else is treated as script.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileType {
    Animation,
    Model,
    Sound,
    OggVorbis,
    Texture,
    Cinematic,
}

impl FileType {
    pub fn detect_from_slice(buf: &[u8]) -> Option<Self> {
        let magic: [u8; 4] = buf.get(..4)?.try_into().ok()?;
        match &magic {
            b"ANIM" => Some(Self::Animation),
            b"MDL1" => Some(Self::Model),
            b"RIFF" => Some(Self::Sound),
            b"OggS" => Some(Self::OggVorbis),
            b"DDS " => Some(Self::Texture),
            b"DKIF" => Some(Self::Cinematic),
            _ => None,
        }
    }

    /// Reads only the first four bytes of `path`.
    pub fn detect_from_file(path: &Path) -> std::io::Result<Option<Self>> {
        let mut buf = Vec::with_capacity(4);
        File::open(path)?.take(4).read_to_end(&mut buf)?;
        Ok(Self::detect_from_slice(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_magics() {
        assert_eq!(
            FileType::detect_from_slice(b"DDS \x7c\x00\x00\x00"),
            Some(FileType::Texture)
        );
        assert_eq!(FileType::detect_from_slice(b"MDL1"), Some(FileType::Model));
        assert_eq!(
            FileType::detect_from_slice(b"DKIF\x00\x00"),
            Some(FileType::Cinematic)
        );
    }

    #[test]
    fn test_scripts_and_short_files_are_unknown() {
        assert_eq!(FileType::detect_from_slice(b"defineObject{}"), None);
        assert_eq!(FileType::detect_from_slice(b"dds "), None);
        assert_eq!(FileType::detect_from_slice(b"ANI"), None);
        assert_eq!(FileType::detect_from_slice(b""), None);
    }

    #[test]
    fn test_detect_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), b"OggS\x00\x02").unwrap();
        assert_eq!(
            FileType::detect_from_file(temp.path()).unwrap(),
            Some(FileType::OggVorbis)
        );
    }
}
