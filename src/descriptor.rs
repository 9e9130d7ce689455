use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context;
use grimex_gra::ModMetadata;

pub const DESCRIPTOR_EXTENSION: &str = "dungeon_editor";

/// Name of the folder a mod is unpacked into.
pub fn mod_folder_name(metadata: &ModMetadata) -> String {
    [&metadata.dungeon_name, &metadata.uuid]
        .into_iter()
        .map(|name| sanitize_filename::sanitize(name.trim()))
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "unnamed-mod".to_string())
}

/// Quotes `s` the way Lua's `string.format("%q", s)` does.
pub fn lua_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\000"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn render(metadata: &ModMetadata) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "-- This file has been generated by grimex from a mod with UUID {}",
        metadata.uuid
    );
    out.push('\n');
    let _ = writeln!(out, "dungeonName {}", lua_quote(&metadata.dungeon_name));
    let _ = writeln!(out, "author {}", lua_quote(&metadata.author));
    let _ = writeln!(out, "description {}", lua_quote(&metadata.description));
    let _ = writeln!(out, "dungeonFolder {}", lua_quote(&metadata.dungeon_folder));
    out
}

/// Writes `<mod_dir>/<folder name>.dungeon_editor` and returns its path.
pub fn write(mod_dir: &Path, metadata: &ModMetadata) -> anyhow::Result<PathBuf> {
    let folder = mod_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| mod_folder_name(metadata));
    let path = mod_dir.join(format!("{folder}.{DESCRIPTOR_EXTENSION}"));
    std::fs::write(&path, render(metadata))
        .with_context(|| format!("Failed to write descriptor {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metadata() -> ModMetadata {
        ModMetadata {
            uuid: "0F1E2D3C".into(),
            dungeon_name: "Keep: Part 1/2".into(),
            author: "someone".into(),
            description: "Line one\nSays \"hi\"".into(),
            dungeon_folder: "mod_assets".into(),
        }
    }

    #[test]
    fn test_lua_quote() {
        assert_eq!(lua_quote("plain"), "\"plain\"");
        assert_eq!(lua_quote("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(lua_quote("a\nb\rc\0"), "\"a\\\nb\\rc\\000\"");
    }

    #[test]
    fn test_render() {
        assert_eq!(
            render(&metadata()),
            "-- This file has been generated by grimex from a mod with UUID 0F1E2D3C\n\
             \n\
             dungeonName \"Keep: Part 1/2\"\n\
             author \"someone\"\n\
             description \"Line one\\\nSays \\\"hi\\\"\"\n\
             dungeonFolder \"mod_assets\"\n"
        );
    }

    #[test]
    fn test_mod_folder_name() {
        assert_eq!(mod_folder_name(&metadata()), "Keep Part 12");
        let unnamed = ModMetadata {
            dungeon_name: "///".into(),
            uuid: "abc".into(),
            ..Default::default()
        };
        assert_eq!(mod_folder_name(&unnamed), "abc");
        assert_eq!(mod_folder_name(&ModMetadata::default()), "unnamed-mod");
    }

    #[test]
    fn test_write() {
        let temp = tempfile::TempDir::new().unwrap();
        let mod_dir = temp.path().join("Keep");
        std::fs::create_dir_all(&mod_dir).unwrap();
        let path = write(&mod_dir, &metadata()).unwrap();
        assert_eq!(path, mod_dir.join("Keep.dungeon_editor"));
        assert!(std::fs::read_to_string(path)
            .unwrap()
            .contains("dungeonFolder \"mod_assets\""));
    }
}
