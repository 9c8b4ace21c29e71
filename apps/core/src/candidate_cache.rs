use std::fs;
use std::io;
use std::path::Path;

use crate::logging;
use crate::string_pool::StringPool;

/// On-disk layout, all integers little-endian:
///
/// ```text
/// [u64 search_path_len][search_path bytes]
/// [u64 mtime] x N           (one per search-path directory, in order)
/// [u64 entry_count]
/// [u64 entry_len][entry bytes] x entry_count
/// ```
///
/// The header must match the live environment exactly for the body to
/// be trusted; any mismatch means the caller rescans.
fn encode(search_path: &str, mtimes: &[u64], pool: &StringPool) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(search_path.len() as u64).to_le_bytes());
    out.extend_from_slice(search_path.as_bytes());
    for mtime in mtimes {
        out.extend_from_slice(&mtime.to_le_bytes());
    }
    out.extend_from_slice(&(pool.len() as u64).to_le_bytes());
    for entry in pool.iter() {
        out.extend_from_slice(&(entry.len() as u64).to_le_bytes());
        out.extend_from_slice(entry.as_bytes());
    }
    out
}

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn read_u64(&mut self) -> Result<u64, String> {
        if self.remaining() < 8 {
            return Err("truncated integer field".to_string());
        }
        let mut raw = [0_u8; 8];
        raw.copy_from_slice(&self.bytes[self.position..self.position + 8]);
        self.position += 8;
        Ok(u64::from_le_bytes(raw))
    }

    fn read_bytes(&mut self, len: u64) -> Result<&'a [u8], String> {
        let len = usize::try_from(len).map_err(|_| "declared length overflows".to_string())?;
        if self.remaining() < len {
            return Err("declared length exceeds file size".to_string());
        }
        let out = &self.bytes[self.position..self.position + len];
        self.position += len;
        Ok(out)
    }
}

/// `Ok(None)` is a header mismatch (silent rescan); `Err` is a corrupt
/// file (warned by the caller). Bounds are checked before every read so
/// a malformed length can never index past the buffer.
fn decode(
    raw: &[u8],
    live_search_path: &str,
    live_mtimes: &[u64],
) -> Result<Option<StringPool>, String> {
    let mut reader = Reader {
        bytes: raw,
        position: 0,
    };

    let path_len = reader.read_u64()?;
    let stored_path = reader.read_bytes(path_len)?;
    if stored_path != live_search_path.as_bytes() {
        return Ok(None);
    }

    for live in live_mtimes {
        if reader.read_u64()? != *live {
            return Ok(None);
        }
    }

    let count = reader.read_u64()?;
    // Every entry takes at least its 8-byte length prefix.
    if count
        .checked_mul(8)
        .map_or(true, |needed| needed > reader.remaining() as u64)
    {
        return Err("entry count exceeds file size".to_string());
    }

    let mut pool = StringPool::new();
    for _ in 0..count {
        let len = reader.read_u64()?;
        let bytes = reader.read_bytes(len)?;
        let entry = std::str::from_utf8(bytes).map_err(|_| "entry is not UTF-8".to_string())?;
        pool.add(entry);
    }
    pool.sort();
    Ok(Some(pool))
}

/// Returns the cached pool only when the stored search-path string and
/// every stored per-directory timestamp equal the live values. A missing
/// file is a quiet cache miss; unreadable or corrupt files are logged
/// at warning level and also miss.
pub fn try_load(path: &Path, live_search_path: &str, live_mtimes: &[u64]) -> Option<StringPool> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return None,
        Err(error) => {
            logging::warn(&format!(
                "candidate cache unreadable at {}: {error}",
                path.display()
            ));
            return None;
        }
    };

    match decode(&raw, live_search_path, live_mtimes) {
        Ok(pool) => pool,
        Err(reason) => {
            logging::warn(&format!(
                "candidate cache rejected at {}: {reason}",
                path.display()
            ));
            None
        }
    }
}

/// Writes a fresh cache file, creating the cache directory on demand.
/// Callers treat failures as non-fatal.
pub fn store(path: &Path, search_path: &str, mtimes: &[u64], pool: &StringPool) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))?;
        }
    }
    fs::write(path, encode(search_path, mtimes, pool))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
