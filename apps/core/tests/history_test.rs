use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use quickrun_core::history;
use quickrun_core::string_pool::StringPool;

fn unique_dir(label: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("quickrun-{label}-{unique}"))
}

#[test]
fn missing_file_loads_as_empty_pool() {
    let path = unique_dir("history-missing").join("history");
    let pool = history::load(&path);
    assert!(pool.is_empty());
}

#[test]
fn load_skips_blanks_and_sorts() {
    let dir = unique_dir("history-load");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("history");
    std::fs::write(&path, "zsh\n\nls\n  \ncat\n").unwrap();

    let pool = history::load(&path);
    let entries: Vec<&str> = pool.iter().collect();
    assert_eq!(entries, vec!["cat", "ls", "zsh"]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn load_tolerates_crlf_line_endings() {
    let dir = unique_dir("history-crlf");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("history");
    std::fs::write(&path, "ls\r\ncat\r\n").unwrap();

    let pool = history::load(&path);
    assert!(pool.contains("ls"));
    assert!(pool.contains("cat"));
    assert_eq!(pool.len(), 2);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn append_creates_parent_directories() {
    let dir = unique_dir("history-parents");
    let path = dir.join("nested").join("history");
    let mut pool = StringPool::new();

    let added = history::append_if_new(&path, "htop", &mut pool).unwrap();
    assert!(added);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "htop\n");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn append_is_idempotent() {
    let dir = unique_dir("history-idempotent");
    let path = dir.join("history");
    let mut pool = StringPool::new();

    assert!(history::append_if_new(&path, "htop", &mut pool).unwrap());
    assert!(!history::append_if_new(&path, "htop", &mut pool).unwrap());

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().filter(|line| *line == "htop").count(), 1);
    assert_eq!(pool.len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn append_trims_and_ignores_empty_commands() {
    let dir = unique_dir("history-empty");
    let path = dir.join("history");
    let mut pool = StringPool::new();

    assert!(!history::append_if_new(&path, "   ", &mut pool).unwrap());
    assert!(!path.exists());

    assert!(history::append_if_new(&path, "  ls  ", &mut pool).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "ls\n");
    assert!(pool.contains("ls"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn appended_commands_survive_reload() {
    let dir = unique_dir("history-reload");
    let path = dir.join("history");
    let mut pool = StringPool::new();

    history::append_if_new(&path, "vim", &mut pool).unwrap();
    history::append_if_new(&path, "emacs", &mut pool).unwrap();

    let reloaded = history::load(&path);
    let entries: Vec<&str> = reloaded.iter().collect();
    assert_eq!(entries, vec!["emacs", "vim"]);

    std::fs::remove_dir_all(&dir).unwrap();
}
