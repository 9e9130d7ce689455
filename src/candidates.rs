use std::path::{Path, PathBuf};

use anyhow::Context;

/// Override list looked for beside the archive when none is given.
pub const RESOURCE_STRINGS_FILE: &str = "resourceStrings.txt";

/// Entry scripts every mod has, whether or not any script names them.
pub fn mandatory(dungeon_folder: &str) -> [String; 2] {
    [
        format!("{dungeon_folder}/dungeon.lua"),
        format!("{dungeon_folder}/init.lua"),
    ]
}

pub fn default_overrides_path(archive: &Path) -> PathBuf {
    archive
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(RESOURCE_STRINGS_FILE)
}

/// One candidate per non-empty line, taken verbatim apart from the line ending.
///
/// Whitespace is part of the hashed name, so it is never trimmed.
pub fn parse_overrides(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads the override list at `path`. A missing file is only an error when
/// `required` is set.
pub fn read_overrides(path: &Path, required: bool) -> anyhow::Result<Vec<String>> {
    if !required && !path.exists() {
        debug!("No resource string overrides at {}", path.display());
        return Ok(Vec::new());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read resource strings from {}", path.display()))?;
    let overrides = parse_overrides(&text);
    info!(
        "Loaded {} resource string overrides from {}",
        overrides.len(),
        path.display()
    );

    Ok(overrides)
}
