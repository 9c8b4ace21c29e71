use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::config::{self, ConfigError};
use crate::core_service::{CoreService, ServiceError};
use crate::logging;
use crate::transport;

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Service(ServiceError),
    Io(io::Error),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Service(error) => write!(f, "service error: {error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ServiceError> for RuntimeError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<io::Error> for RuntimeError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Options {
    pub config_path: Option<PathBuf>,
    pub path_env: Option<String>,
    pub no_history: bool,
    pub silent: bool,
    pub rescan: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config requires a path")?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--env" => {
                let name = iter.next().ok_or("--env requires a variable name")?;
                options.path_env = Some(name.clone());
            }
            "--no-history" => options.no_history = true,
            "--silent" => options.silent = true,
            "--rescan" => options.rescan = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(options)
}

/// Headless runtime: the launcher shell drives the core with one JSON
/// request per stdin line and reads one JSON response per stdout line.
pub fn run_with_options(options: Options) -> Result<(), RuntimeError> {
    if let Err(error) = logging::init() {
        eprintln!("[quickrun-core] logging unavailable: {error}");
    }

    let mut config = config::load(options.config_path.clone())?;
    if !config.config_path.exists() {
        config::save(&config)?;
        println!(
            "[quickrun-core] wrote default config to {}",
            config.config_path.display()
        );
    }

    if let Some(path_env) = options.path_env {
        config.path_env = path_env;
    }
    if options.no_history {
        config.no_history = true;
    }
    if options.silent {
        config.silent = true;
    }

    logging::info(&format!(
        "startup path_env={} cache_dir={}",
        config.path_env,
        config.cache_dir.display()
    ));

    let mut service = CoreService::new(config)?;
    println!(
        "[quickrun-core] startup candidates={}",
        service.candidate_count()
    );

    if options.rescan {
        let count = service.invalidate_and_rescan();
        println!("[quickrun-core] rescan candidates={count}");
    }

    serve_stdio(&mut service)
}

fn serve_stdio(service: &mut CoreService) -> Result<(), RuntimeError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let payload = line.trim();
        if payload.is_empty() {
            continue;
        }
        let response = transport::handle_json(service, payload);
        writeln!(out, "{response}")?;
        out.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, Options};
    use std::path::PathBuf;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn no_args_yield_defaults() {
        assert_eq!(parse_cli_args(&[]).unwrap(), Options::default());
    }

    #[test]
    fn flags_are_recognized() {
        let options =
            parse_cli_args(&args(&["--no-history", "--silent", "--rescan"])).unwrap();
        assert!(options.no_history);
        assert!(options.silent);
        assert!(options.rescan);
    }

    #[test]
    fn config_and_env_take_values() {
        let options =
            parse_cli_args(&args(&["--config", "/tmp/q.toml", "--env", "RUNPATH"])).unwrap();
        assert_eq!(options.config_path, Some(PathBuf::from("/tmp/q.toml")));
        assert_eq!(options.path_env.as_deref(), Some("RUNPATH"));
    }

    #[test]
    fn missing_value_is_an_error() {
        assert!(parse_cli_args(&args(&["--config"])).is_err());
        assert!(parse_cli_args(&args(&["--env"])).is_err());
    }

    #[test]
    fn unknown_argument_is_an_error() {
        let error = parse_cli_args(&args(&["--bogus"])).unwrap_err();
        assert!(error.contains("--bogus"));
    }
}
