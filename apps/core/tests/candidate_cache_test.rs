use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use quickrun_core::candidate_cache;
use quickrun_core::string_pool::StringPool;

fn unique_dir(label: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("quickrun-{label}-{unique}"))
}

fn sample_pool() -> StringPool {
    StringPool::from_unsorted(["lsof", "cat", "ls"])
}

#[test]
fn store_then_load_round_trips() {
    let dir = unique_dir("cache-roundtrip");
    let path = dir.join("candidates.bin");
    let mtimes = [1_700_000_000_u64, 1_700_000_123];

    candidate_cache::store(&path, "/usr/bin:/bin", &mtimes, &sample_pool()).unwrap();
    let loaded = candidate_cache::try_load(&path, "/usr/bin:/bin", &mtimes).unwrap();

    let entries: Vec<&str> = loaded.iter().collect();
    assert_eq!(entries, vec!["cat", "ls", "lsof"]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_file_is_a_cache_miss() {
    let path = unique_dir("cache-missing").join("candidates.bin");
    assert!(candidate_cache::try_load(&path, "/bin", &[0]).is_none());
}

#[test]
fn changed_search_path_invalidates() {
    let dir = unique_dir("cache-path-change");
    let path = dir.join("candidates.bin");
    let mtimes = [42_u64];

    candidate_cache::store(&path, "/bin", &mtimes, &sample_pool()).unwrap();
    assert!(candidate_cache::try_load(&path, "/usr/bin", &mtimes).is_none());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn changed_mtime_invalidates() {
    let dir = unique_dir("cache-mtime-change");
    let path = dir.join("candidates.bin");

    candidate_cache::store(&path, "/usr/bin:/bin", &[10, 20], &sample_pool()).unwrap();
    assert!(candidate_cache::try_load(&path, "/usr/bin:/bin", &[10, 21]).is_none());
    assert!(candidate_cache::try_load(&path, "/usr/bin:/bin", &[11, 20]).is_none());
    assert!(candidate_cache::try_load(&path, "/usr/bin:/bin", &[10, 20]).is_some());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn truncated_file_is_rejected_without_panicking() {
    let dir = unique_dir("cache-truncated");
    let path = dir.join("candidates.bin");
    let mtimes = [7_u64];

    candidate_cache::store(&path, "/bin", &mtimes, &sample_pool()).unwrap();
    let full = std::fs::read(&path).unwrap();
    for cut in [1, 4, 8, full.len() / 2, full.len() - 1] {
        std::fs::write(&path, &full[..cut]).unwrap();
        assert!(
            candidate_cache::try_load(&path, "/bin", &mtimes).is_none(),
            "cut={cut}"
        );
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn oversized_declared_lengths_are_rejected() {
    let dir = unique_dir("cache-overdeclared");
    let path = dir.join("candidates.bin");
    std::fs::create_dir_all(&dir).unwrap();

    // Header claims a path string far longer than the file.
    let mut raw = Vec::new();
    raw.extend_from_slice(&u64::MAX.to_le_bytes());
    raw.extend_from_slice(b"/bin");
    std::fs::write(&path, &raw).unwrap();
    assert!(candidate_cache::try_load(&path, "/bin", &[0]).is_none());

    // Valid header, absurd entry count.
    let mut raw = Vec::new();
    raw.extend_from_slice(&4_u64.to_le_bytes());
    raw.extend_from_slice(b"/bin");
    raw.extend_from_slice(&9_u64.to_le_bytes());
    raw.extend_from_slice(&u64::MAX.to_le_bytes());
    std::fs::write(&path, &raw).unwrap();
    assert!(candidate_cache::try_load(&path, "/bin", &[9]).is_none());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn empty_pool_round_trips() {
    let dir = unique_dir("cache-empty");
    let path = dir.join("candidates.bin");

    candidate_cache::store(&path, "", &[], &StringPool::new()).unwrap();
    let loaded = candidate_cache::try_load(&path, "", &[]).unwrap();
    assert!(loaded.is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}
