use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::logging;

/// File names gathered from every search-path directory, unsorted, plus
/// one modification timestamp per directory in path order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub names: Vec<String>,
    pub mtimes: Vec<u64>,
}

/// Splits a colon-delimited search-path string into its components.
/// An empty string yields no components; empty components are kept so
/// the result stays aligned with per-directory timestamp arrays.
pub fn split_search_path(value: &str) -> Vec<PathBuf> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(':').map(PathBuf::from).collect()
}

/// Modification time in seconds since the epoch. A missing directory
/// reports 0; any other stat failure is logged and also reports 0.
pub fn directory_mtime(path: &Path) -> u64 {
    match std::fs::metadata(path) {
        Ok(meta) => meta
            .modified()
            .ok()
            .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => 0,
        Err(error) => {
            logging::warn(&format!("stat failed for {}: {error}", path.display()));
            0
        }
    }
}

pub fn directory_mtimes(dirs: &[PathBuf]) -> Vec<u64> {
    dirs.iter().map(|dir| directory_mtime(dir)).collect()
}

/// Lists immediate child names of every directory. A directory that
/// cannot be enumerated contributes zero entries; scanning always
/// continues with the remaining directories.
pub fn scan(dirs: &[PathBuf]) -> ScanOutcome {
    let mut outcome = ScanOutcome {
        names: Vec::new(),
        mtimes: Vec::with_capacity(dirs.len()),
    };

    for dir in dirs {
        outcome.mtimes.push(directory_mtime(dir));

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(error) => {
                if error.kind() != std::io::ErrorKind::NotFound {
                    logging::warn(&format!("cannot list {}: {error}", dir.display()));
                }
                continue;
            }
        };

        for entry in entries {
            match entry {
                Ok(entry) => outcome
                    .names
                    .push(entry.file_name().to_string_lossy().into_owned()),
                Err(error) => {
                    logging::warn(&format!("enumeration failed in {}: {error}", dir.display()));
                    break;
                }
            }
        }
    }

    outcome
}
