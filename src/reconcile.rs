use std::{
    fmt, fs, io,
    path::{Component, Path, PathBuf},
};

use grimex_gra::{ExtractedFile, ResourceHash};
use hashbrown::HashMap;

/// Candidate strings keyed by their FNV-1a hash.
///
/// A later candidate with the same hash replaces the earlier one; each such
/// replacement is logged and counted.
#[derive(Debug, Default)]
pub struct HashTable {
    names: HashMap<ResourceHash, String>,
    collisions: usize,
}

impl HashTable {
    pub fn insert(&mut self, candidate: &str) {
        let hash = ResourceHash::of_path(candidate);
        if let Some(previous) = self.names.insert(hash, candidate.to_string()) {
            if previous != candidate {
                warn!("Hash collision on {hash}: '{candidate}' replaces '{previous}'");
                self.collisions += 1;
            }
        }
    }

    pub fn get(&self, hash: ResourceHash) -> Option<&str> {
        self.names.get(&hash).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Recovered name for `hash`, or the temporary name it was extracted as.
    pub fn display_name(&self, hash: ResourceHash) -> String {
        match self.get(hash) {
            Some(name) => name.to_string(),
            None => hash.temp_file_name(),
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for HashTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::default();
        for candidate in iter {
            table.insert(candidate.as_ref());
        }
        table
    }
}

#[derive(Debug)]
pub enum UnresolvedReason {
    NoCandidate,
    /// The matching candidate would land outside the output directory.
    UnsafeCandidate(String),
    MoveFailed(String, io::Error),
}

/// An extracted file left under its temporary name.
#[derive(Debug)]
pub struct Unresolved {
    pub path: PathBuf,
    pub reason: UnresolvedReason,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not determine correct filename for {}",
            self.path.display()
        )?;
        match &self.reason {
            UnresolvedReason::NoCandidate => Ok(()),
            UnresolvedReason::UnsafeCandidate(candidate) => {
                write!(f, " (candidate '{candidate}' is not a relative path)")
            }
            UnresolvedReason::MoveFailed(candidate, e) => {
                write!(f, " (moving to '{candidate}' failed: {e})")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Final paths of renamed files.
    pub renamed: Vec<PathBuf>,
    pub unresolved: Vec<Unresolved>,
}

/// Moves every extracted file whose hash has a candidate to that candidate's
/// path under `out_dir`, replacing anything already there.
pub fn reconcile(out_dir: &Path, files: &[ExtractedFile], table: &HashTable) -> Reconciliation {
    let mut result = Reconciliation::default();

    for file in files {
        let candidate = file
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(ResourceHash::from_temp_file_name)
            .and_then(|hash| table.get(hash));

        let reason = match candidate {
            None => UnresolvedReason::NoCandidate,
            Some(candidate) => match relative_resource_path(candidate) {
                None => UnresolvedReason::UnsafeCandidate(candidate.to_string()),
                Some(relative) => {
                    let target = out_dir.join(relative);
                    match move_replacing(&file.path, &target) {
                        Ok(()) => {
                            debug!("Renamed {} to {candidate}", file.hash);
                            result.renamed.push(target);
                            continue;
                        }
                        Err(e) => UnresolvedReason::MoveFailed(candidate.to_string(), e),
                    }
                }
            },
        };

        let unresolved = Unresolved {
            path: file.path.clone(),
            reason,
        };
        warn!("{unresolved}");
        result.unresolved.push(unresolved);
    }

    result
}

/// Converts a candidate into a path that stays below the output directory.
///
/// Backslashes count as separators. Absolute paths, drive prefixes and `..`
/// are rejected.
pub fn relative_resource_path(candidate: &str) -> Option<PathBuf> {
    let normalized = candidate.replace('\\', "/");
    if normalized.starts_with('/') {
        return None;
    }

    let mut path = PathBuf::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

fn move_replacing(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn extracted(dir: &Path, logical: &str, data: &[u8]) -> ExtractedFile {
        let hash = ResourceHash::of_path(logical);
        let path = dir.join(hash.temp_file_name());
        fs::write(&path, data).unwrap();
        ExtractedFile { hash, path }
    }

    #[test]
    fn test_table_lookup() {
        let table: HashTable = ["chars/hero.model", "mymod/init.lua"].into_iter().collect();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(ResourceHash(0x0d9d_eabc)),
            Some("chars/hero.model")
        );
        assert_eq!(table.display_name(ResourceHash(0x92e8_663c)), "mymod/init.lua");
        assert_eq!(table.display_name(ResourceHash(0xab)), "000000ab.tmp");
    }

    #[test]
    fn test_every_candidate_resolves() {
        let candidates = ["a.lua", "b/c.dds", "costarring", "x.model"];
        let table: HashTable = candidates.into_iter().collect();
        for candidate in candidates {
            assert_eq!(table.get(ResourceHash::of_path(candidate)), Some(candidate));
        }
    }

    #[test]
    fn test_collision_last_write_wins() {
        let table: HashTable = ["costarring", "liquid", "liquid"].into_iter().collect();
        assert_eq!(table.len(), 1);
        assert_eq!(table.collisions(), 1);
        assert_eq!(table.get(ResourceHash::of_path("costarring")), Some("liquid"));
    }

    #[test]
    fn test_reconcile_renames_and_reports() {
        let temp = TempDir::new().unwrap();
        let out = temp.path();
        let hero = extracted(out, "chars/hero.model", b"MDL1");
        let orphan = extracted(out, "secret/unknown.lua", b"x = 1");
        let table: HashTable = ["chars/hero.model"].into_iter().collect();

        let result = reconcile(out, &[hero.clone(), orphan.clone()], &table);

        assert_eq!(result.renamed, vec![out.join("chars/hero.model")]);
        assert_eq!(fs::read(out.join("chars/hero.model")).unwrap(), b"MDL1");
        assert!(!hero.path.exists());

        assert_eq!(result.unresolved.len(), 1);
        assert_eq!(result.unresolved[0].path, orphan.path);
        assert!(matches!(
            result.unresolved[0].reason,
            UnresolvedReason::NoCandidate
        ));
        assert!(orphan.path.exists());
    }

    #[test]
    fn test_reconcile_replaces_existing_file() {
        let temp = TempDir::new().unwrap();
        let out = temp.path();
        fs::create_dir_all(out.join("mod")).unwrap();
        fs::write(out.join("mod/init.lua"), b"old").unwrap();
        let file = extracted(out, "mod/init.lua", b"new");
        let table: HashTable = ["mod/init.lua"].into_iter().collect();

        let result = reconcile(out, &[file], &table);

        assert!(result.unresolved.is_empty());
        assert_eq!(fs::read(out.join("mod/init.lua")).unwrap(), b"new");
    }

    #[test]
    fn test_reconcile_refuses_escaping_candidate() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let file = extracted(&out, "../evil.lua", b"x");
        let table: HashTable = ["../evil.lua"].into_iter().collect();

        let result = reconcile(&out, &[file.clone()], &table);

        assert!(result.renamed.is_empty());
        assert!(matches!(
            &result.unresolved[0].reason,
            UnresolvedReason::UnsafeCandidate(c) if c == "../evil.lua"
        ));
        assert!(file.path.exists());
        assert!(!temp.path().join("evil.lua").exists());
    }

    #[test]
    fn test_relative_resource_path() {
        assert_eq!(
            relative_resource_path(r"mod_assets\textures\a.dds"),
            Some(PathBuf::from("mod_assets/textures/a.dds"))
        );
        assert_eq!(
            relative_resource_path("./a/./b.lua"),
            Some(PathBuf::from("a/b.lua"))
        );
        assert_eq!(relative_resource_path("/etc/passwd"), None);
        assert_eq!(relative_resource_path(r"\abs.lua"), None);
        assert_eq!(relative_resource_path("a/../../b"), None);
        assert_eq!(relative_resource_path(""), None);
    }

    #[test]
    fn test_unresolved_message() {
        let unresolved = Unresolved {
            path: PathBuf::from("out/0000002a.tmp"),
            reason: UnresolvedReason::NoCandidate,
        };
        assert_eq!(
            unresolved.to_string(),
            "Could not determine correct filename for out/0000002a.tmp"
        );
    }
}
