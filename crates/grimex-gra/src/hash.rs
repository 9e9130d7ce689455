use std::{fmt, str::FromStr};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Extension given to extracted files until their real name is known.
pub const TEMP_EXTENSION: &str = "tmp";

/// 32-bit FNV-1a.
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ b as u32).wrapping_mul(FNV_PRIME)
    })
}

/// Hash of a logical resource path, rendered as 8 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHash(pub u32);

impl ResourceHash {
    pub fn of_path(path: &str) -> Self {
        Self(fnv1a32(path.as_bytes()))
    }

    /// Name of the temporary file an entry with this hash is extracted to.
    pub fn temp_file_name(&self) -> String {
        format!("{self}.{TEMP_EXTENSION}")
    }

    /// Recovers the hash from a temporary file name such as `0a1b2c3d.tmp`.
    pub fn from_temp_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(TEMP_EXTENSION)?.strip_suffix('.')?;
        stem.parse().ok()
    }
}

impl fmt::Display for ResourceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl FromStr for ResourceHash {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u32::from_str_radix(s, 16).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a32_reference_values() {
        assert_eq!(fnv1a32(b""), 0x811c9dc5);
        assert_eq!(fnv1a32(b"a"), 0xe40c292c);
        assert_eq!(fnv1a32(b"foobar"), 0xbf9cf968);
    }

    #[test]
    fn test_display_is_zero_padded_lowercase() {
        assert_eq!(ResourceHash(0xAB).to_string(), "000000ab");
        assert_eq!(ResourceHash(0xDEADBEEF).to_string(), "deadbeef");
    }

    #[test]
    fn test_temp_file_name_round_trip() {
        let hash = ResourceHash::of_path("mod_assets/scripts/init.lua");
        let name = hash.temp_file_name();
        assert!(name.ends_with(".tmp"));
        assert_eq!(ResourceHash::from_temp_file_name(&name), Some(hash));
        assert_eq!(ResourceHash::from_temp_file_name("init.lua"), None);
        assert_eq!(ResourceHash::from_temp_file_name("xyz.tmp"), None);
    }
}
