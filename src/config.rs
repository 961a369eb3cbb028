//! Runtime configuration resolved from flags, environment and `.env`.

use std::path::PathBuf;

use reqwest::Url;

use crate::cli::Cli;
use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/tasks";
pub const DEFAULT_LOG_FILE: &str = "taskdeck.log";

#[derive(Debug, Clone)]
pub struct Config {
    /// Collection URL of the task endpoint, e.g. `http://localhost:8000/tasks`.
    pub api_url: Url,
    /// Where the interactive UI writes its log.
    pub log_file: PathBuf,
}

impl Config {
    /// Build the configuration from parsed flags.
    ///
    /// Flags already carry their environment fallbacks (clap `env`), so `.env`
    /// must be loaded before `Cli::parse`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        Ok(Config {
            api_url: parse_api_url(&cli.api_url)?,
            log_file: cli.log_file.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }
}

/// Parse and check the API base URL.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["taskdeck", "--api-url", DEFAULT_API_URL, "list"]).unwrap();
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_parse_api_url() {
        assert!(parse_api_url("https://tasks.example.com/api/tasks/").is_ok());
        assert!(matches!(parse_api_url("not a url"), Err(ConfigError::InvalidUrl { .. })));
        assert!(matches!(
            parse_api_url("ftp://localhost/tasks"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }
}
