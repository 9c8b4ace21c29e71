pub mod candidate_cache;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod history;
pub mod logging;
pub mod match_engine;
pub mod runtime;
pub mod scanner;
pub mod string_pool;
pub mod transport;
