//! Input File Selection
//!
//! Lists a directory, keeps the names that follow the naming convention and
//! orders them by (core count, run index). Directory-listing order never
//! matters: when two names resolve to the same key, a name without zero-padded
//! tokens wins, then the lexicographically smaller one.

use crate::error::{Fault, SelectError};
use crate::naming::NamingConvention;
use crate::{InputFile, RunKey};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

/// Files to process plus the names that were rejected
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Study files ordered by (core count, run index)
    pub files: Vec<InputFile>,
    /// Malformed or duplicate names
    pub faults: Vec<Fault>,
}

impl Selection {
    /// Smallest core count among the selected files
    pub fn min_core_count(&self) -> Option<u32> {
        self.files.first().map(|f| f.core_count)
    }

    /// Distinct core counts in ascending order
    pub fn core_counts(&self) -> Vec<u32> {
        let mut cores: Vec<u32> = self.files.iter().map(|f| f.core_count).collect();
        cores.dedup();
        cores
    }
}

/// Select the study files of `directory`
pub fn select(directory: &Path, convention: &NamingConvention) -> Result<Selection, SelectError> {
    let io_err = |source| SelectError::Io {
        path: directory.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(directory).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::debug!(name = ?raw, "ignoring non UTF-8 file name"),
        }
    }

    select_names(directory, names, convention)
}

/// Select from an already listed set of names (no filesystem access)
pub fn select_names<I, S>(
    directory: &Path,
    names: I,
    convention: &NamingConvention,
) -> Result<Selection, SelectError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pattern = convention.compile()?;

    let mut names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
    names.sort_by_cached_key(|name| (pattern.is_padded(name), name.clone()));

    let mut by_key: BTreeMap<RunKey, InputFile> = BTreeMap::new();
    let mut faults = Vec::new();

    for name in names {
        let path = directory.join(&name);
        let key = match pattern.parse(&name) {
            None => {
                tracing::debug!(name = %name, "not a study file");
                continue;
            }
            Some(Err(reason)) => {
                tracing::warn!(path = %path.display(), reason = %reason, "malformed filename");
                faults.push(Fault::MalformedFilename { path, reason });
                continue;
            }
            Some(Ok(key)) => key,
        };

        match by_key.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(InputFile {
                    core_count: key.core_count,
                    run_index: key.run_index,
                    path,
                });
            }
            Entry::Occupied(existing) => {
                tracing::warn!(
                    path = %path.display(),
                    kept = %existing.get().path.display(),
                    "duplicate run"
                );
                faults.push(Fault::DuplicateRun {
                    path,
                    kept: existing.get().path.clone(),
                    core_count: key.core_count,
                    run_index: key.run_index,
                });
            }
        }
    }

    Ok(Selection {
        files: by_key.into_values().collect(),
        faults,
    })
}
