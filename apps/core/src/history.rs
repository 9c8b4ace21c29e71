use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::logging;
use crate::string_pool::StringPool;

/// Reads the newline-delimited history file into a sorted pool. Blank
/// lines are skipped and surrounding whitespace (including a stray CR
/// from files written elsewhere) is stripped. A missing file is an
/// empty history, not an error.
pub fn load(path: &Path) -> StringPool {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return StringPool::new(),
        Err(error) => {
            logging::warn(&format!("history unreadable at {}: {error}", path.display()));
            return StringPool::new();
        }
    };

    let mut pool = StringPool::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        pool.add(line);
    }
    pool.sort();
    pool
}

/// Appends `command` to the history file unless the in-memory pool
/// already holds it. The dedup check runs before any filesystem
/// mutation; the pool is updated only after a successful write, so a
/// failed append leaves both file and pool unchanged. Lines end with a
/// single LF.
pub fn append_if_new(path: &Path, command: &str, pool: &mut StringPool) -> io::Result<bool> {
    let command = command.trim();
    if command.is_empty() || pool.contains(command) {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(command.as_bytes())?;
    file.write_all(b"\n")?;

    pool.insert_sorted(command);
    Ok(true)
}
