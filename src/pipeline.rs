use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use grimex_gra::{extract_entries, read_archive, EntryFailure, ExtractedFile, ResourceHash};
use grimex_lua::{Diagnostic, ScriptScan};
use indexmap::IndexSet;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    candidates, descriptor,
    filetype::FileType,
    reconcile::{self, HashTable, Unresolved},
};

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub archive: PathBuf,
    /// Directory the mod folder is created in.
    pub output: PathBuf,
    /// Override list. When unset, `resourceStrings.txt` beside the archive is
    /// used if it exists.
    pub resource_strings: Option<PathBuf>,
    /// Leave every file under its `<hash>.tmp` name.
    pub keep_temp_names: bool,
    /// Threads for the parse stage. `None` uses rayon's global pool.
    pub jobs: Option<usize>,
}

/// A script diagnostic together with the file it was found in.
#[derive(Debug, Clone)]
pub struct FileDiagnostic {
    pub file: ResourceHash,
    pub diagnostic: Diagnostic,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub mod_dir: PathBuf,
    pub extracted: usize,
    pub renamed: usize,
    pub unresolved: Vec<Unresolved>,
    pub failed_entries: Vec<EntryFailure>,
    /// In extraction order, then discovery order within a file.
    pub diagnostics: Vec<FileDiagnostic>,
    pub candidates: usize,
    /// Final candidate table, used to name the files diagnostics refer to.
    pub hash_table: HashTable,
}

impl RunReport {
    pub fn diagnostic_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.diagnostics.iter().map(|d| {
            let file = self.hash_table.display_name(d.file);
            match d.diagnostic.position {
                Some(position) => format!("({file}:{position}) {}", d.diagnostic),
                None => format!("({file}) {}", d.diagnostic),
            }
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "Extracted {} files to {}: {} renamed from {} candidates, {} unresolved, {} failed, {} diagnostics, {} hash collisions",
            self.extracted,
            self.mod_dir.display(),
            self.renamed,
            self.candidates,
            self.unresolved.len(),
            self.failed_entries.len(),
            self.diagnostics.len(),
            self.hash_table.collisions(),
        )
    }
}

/// Decodes the archive, extracts every entry, recovers names from the mod's
/// scripts and renames what it can.
///
/// Only an unreadable archive header aborts; everything else lands in the
/// returned report.
pub fn run(options: &ExtractOptions) -> anyhow::Result<RunReport> {
    let file = File::open(&options.archive)
        .with_context(|| format!("Failed to open {}", options.archive.display()))?;
    let mut reader = BufReader::new(file);

    info!("Reading mod file {}", options.archive.display());
    let archive = read_archive(&mut reader)
        .with_context(|| format!("Failed to read mod file {}", options.archive.display()))?;

    let mod_dir = options
        .output
        .join(descriptor::mod_folder_name(&archive.metadata));
    std::fs::create_dir_all(&mod_dir)
        .with_context(|| format!("Failed to create {}", mod_dir.display()))?;
    descriptor::write(&mod_dir, &archive.metadata)?;

    info!(
        "Extracting {} files to {}",
        archive.entries.len(),
        mod_dir.display()
    );
    let extraction = extract_entries(&mut reader, &archive.entries, &mod_dir)
        .with_context(|| format!("Failed to extract {}", options.archive.display()))?;

    info!("Parsing {} extracted files", extraction.extracted.len());
    let scans = scan_files(&extraction.extracted, options.jobs)?;

    let mut resource_strings = IndexSet::new();
    let mut diagnostics = Vec::new();
    for (file, scan) in scans {
        resource_strings.extend(scan.resources);
        diagnostics.extend(
            scan.diagnostics
                .into_iter()
                .map(|diagnostic| FileDiagnostic { file, diagnostic }),
        );
    }
    resource_strings.extend(candidates::mandatory(&archive.metadata.dungeon_folder));

    let overrides = match &options.resource_strings {
        Some(path) => candidates::read_overrides(path, true)?,
        None => {
            let path = candidates::default_overrides_path(&options.archive);
            candidates::read_overrides(&path, false)?
        }
    };
    resource_strings.extend(overrides);

    let hash_table: HashTable = resource_strings.iter().collect();
    debug!(
        "{} candidates map to {} distinct hashes",
        resource_strings.len(),
        hash_table.len()
    );

    let reconciliation = if options.keep_temp_names {
        info!("Keeping temporary file names");
        reconcile::Reconciliation::default()
    } else {
        info!("Moving and renaming extracted files");
        reconcile::reconcile(&mod_dir, &extraction.extracted, &hash_table)
    };

    Ok(RunReport {
        mod_dir,
        extracted: extraction.extracted.len(),
        renamed: reconciliation.renamed.len(),
        unresolved: reconciliation.unresolved,
        failed_entries: extraction.failures,
        diagnostics,
        candidates: resource_strings.len(),
        hash_table,
    })
}

/// Scans every extracted file that isn't a known binary asset.
///
/// Results keep the order of `files`.
fn scan_files(
    files: &[ExtractedFile],
    jobs: Option<usize>,
) -> anyhow::Result<Vec<(ResourceHash, ScriptScan)>> {
    let scan_all = || -> Vec<(ResourceHash, ScriptScan)> {
        files
            .par_iter()
            .filter_map(|file| scan_file(file).map(|scan| (file.hash, scan)))
            .collect()
    };

    match jobs {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("Failed to build parse thread pool")?;
            Ok(pool.install(scan_all))
        }
        None => Ok(scan_all()),
    }
}

fn scan_file(file: &ExtractedFile) -> Option<ScriptScan> {
    match FileType::detect_from_file(&file.path) {
        Ok(Some(filetype)) => {
            debug!("Skipping {} ({filetype:?})", file.hash);
            return None;
        }
        Ok(None) => {}
        Err(e) => {
            warn!("Failed to read {}: {e}", file.path.display());
            return None;
        }
    }

    match std::fs::read(&file.path) {
        Ok(bytes) => Some(grimex_lua::scan_bytes(&bytes)),
        Err(e) => {
            warn!("Failed to read {}: {e}", file.path.display());
            None
        }
    }
}
