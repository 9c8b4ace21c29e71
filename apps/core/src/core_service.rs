use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::candidate_cache;
use crate::config::{self, Config};
use crate::contract::{
    CoreRequest, CoreResponse, FirstMatchResponse, MatchResponse, RescanResponse, RunResponse,
};
use crate::history;
use crate::logging;
use crate::match_engine::MatchEngine;
use crate::scanner;
use crate::string_pool::StringPool;

#[derive(Debug)]
pub enum ServiceError {
    Config(String),
    InvalidRequest(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::InvalidRequest(error) => write!(f, "invalid request: {error}"),
        }
    }
}

impl std::error::Error for ServiceError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub stored: bool,
    pub launched: bool,
}

/// The surface the launcher shell depends on: prefix matching over
/// history and search-path candidates, history recording, rescans, and
/// fire-and-forget command spawning. Everything degrades to empty data
/// on I/O trouble; nothing here is fatal to the hosting process.
pub struct CoreService {
    config: Config,
    search_path: String,
    search_dirs: Vec<PathBuf>,
    history_path: PathBuf,
    engine: MatchEngine,
}

impl CoreService {
    /// Loads history, then candidates from the cache when its header
    /// matches the live environment, otherwise from a fresh scan that
    /// also rewrites the cache.
    pub fn new(config: Config) -> Result<Self, ServiceError> {
        config::validate(&config).map_err(|error| ServiceError::Config(error.to_string()))?;

        let search_path = std::env::var(&config.path_env).unwrap_or_default();
        let search_dirs = scanner::split_search_path(&search_path);
        let history_path = config.history_path();

        let history_pool = if config.no_history {
            StringPool::new()
        } else {
            history::load(&history_path)
        };
        let candidates = load_or_scan(&config, &search_path, &search_dirs);

        Ok(Self {
            config,
            search_path,
            search_dirs,
            history_path,
            engine: MatchEngine::new(history_pool, candidates),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn candidate_count(&self) -> usize {
        self.engine.candidate_count()
    }

    /// Explicit limits are capped at `max_results`; `None` returns the
    /// entire domain from every source.
    pub fn find_matches(&self, text: &str, limit: Option<usize>) -> Vec<String> {
        let capped = limit.map(|max| max.min(self.config.max_results as usize));
        self.engine.find_matches(text, capped)
    }

    pub fn get_first_match(&self, text: &str) -> Option<String> {
        self.engine.get_first_match(text)
    }

    /// Records a launched command in the history file and pool. Returns
    /// false when history is disabled, the command is already known, or
    /// the write fails (logged, no retry this session).
    pub fn append_if_new(&mut self, command: &str) -> bool {
        if self.config.no_history {
            return false;
        }

        match history::append_if_new(&self.history_path, command, self.engine.history_mut()) {
            Ok(added) => added,
            Err(error) => {
                logging::warn(&format!(
                    "history append failed at {}: {error}",
                    self.history_path.display()
                ));
                false
            }
        }
    }

    /// Re-reads the search-path variable, rescans every directory, and
    /// rewrites the cache. Returns the new candidate count.
    pub fn invalidate_and_rescan(&mut self) -> usize {
        self.search_path = std::env::var(&self.config.path_env).unwrap_or_default();
        self.search_dirs = scanner::split_search_path(&self.search_path);

        let outcome = scanner::scan(&self.search_dirs);
        let pool = StringPool::from_unsorted(outcome.names);
        if let Err(error) = candidate_cache::store(
            &self.config.candidate_cache_path(),
            &self.search_path,
            &outcome.mtimes,
            &pool,
        ) {
            logging::warn(&format!("candidate cache write failed: {error}"));
        }

        let count = pool.len();
        self.engine.replace_candidates(pool);
        count
    }

    /// Trims the input, records it in history, and spawns it as a
    /// single argv entry with no shell parsing. The child is not waited
    /// on; spawn failures are logged and reported, never fatal.
    pub fn run_command(&mut self, command: &str) -> RunStatus {
        let command = command.trim().to_string();
        if command.is_empty() {
            return RunStatus {
                stored: false,
                launched: false,
            };
        }

        let stored = self.append_if_new(&command);
        let launched = spawn_detached(&command, self.config.silent);
        RunStatus { stored, launched }
    }

    pub fn handle_command(&mut self, request: CoreRequest) -> Result<CoreResponse, ServiceError> {
        match request {
            CoreRequest::Match(request) => Ok(CoreResponse::Match(MatchResponse {
                matches: self.find_matches(&request.text, effective_limit(request.limit)),
            })),
            CoreRequest::FirstMatch(request) => Ok(CoreResponse::FirstMatch(FirstMatchResponse {
                matched: self.get_first_match(&request.text),
            })),
            CoreRequest::Run(request) => {
                if request.command.trim().is_empty() {
                    return Err(ServiceError::InvalidRequest("command is empty".to_string()));
                }
                let status = self.run_command(&request.command);
                Ok(CoreResponse::Run(RunResponse {
                    stored: status.stored,
                    launched: status.launched,
                }))
            }
            CoreRequest::Rescan => Ok(CoreResponse::Rescan(RescanResponse {
                candidates: self.invalidate_and_rescan(),
            })),
        }
    }
}

fn effective_limit(limit: Option<i64>) -> Option<usize> {
    match limit {
        None => None,
        Some(max) if max < 0 => None,
        Some(max) => Some(max as usize),
    }
}

fn load_or_scan(config: &Config, search_path: &str, search_dirs: &[PathBuf]) -> StringPool {
    let cache_path = config.candidate_cache_path();
    let live_mtimes = scanner::directory_mtimes(search_dirs);
    if let Some(pool) = candidate_cache::try_load(&cache_path, search_path, &live_mtimes) {
        return pool;
    }

    let outcome = scanner::scan(search_dirs);
    let pool = StringPool::from_unsorted(outcome.names);
    if let Err(error) = candidate_cache::store(&cache_path, search_path, &outcome.mtimes, &pool) {
        logging::warn(&format!(
            "candidate cache write failed at {}: {error}",
            cache_path.display()
        ));
    }
    pool
}

fn spawn_detached(command: &str, silent: bool) -> bool {
    let mut child = Command::new(command);
    if silent {
        child.stdout(Stdio::null()).stderr(Stdio::null());
    }

    match child.spawn() {
        Ok(_) => true,
        Err(error) => {
            logging::warn(&format!("failed to spawn '{command}': {error}"));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effective_limit;

    #[test]
    fn negative_or_absent_limit_means_unbounded() {
        assert_eq!(effective_limit(None), None);
        assert_eq!(effective_limit(Some(-1)), None);
        assert_eq!(effective_limit(Some(0)), Some(0));
        assert_eq!(effective_limit(Some(3)), Some(3));
    }
}
