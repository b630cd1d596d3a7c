use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use photofeed_core::{FeedConfig, DEFAULT_PER_PAGE, DEFAULT_SITE};
use photofeed_engine::{FetchSettings, FieldSet, DEFAULT_API_BASE};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::logging::LogDestination;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "photofeed.ron";

/// The posts endpoint refuses larger pages.
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid api_base {value:?}: {source}")]
    ApiBase {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("per_page must be between 1 and 100, got {0}")]
    PerPage(u32),
    #[error("unknown log level {0:?}")]
    LogLevel(String),
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: String,
    pub default_site: String,
    pub per_page: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
    pub field_set: FieldSet,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            default_site: DEFAULT_SITE.to_string(),
            per_page: DEFAULT_PER_PAGE,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_response_bytes: fetch.max_bytes,
            field_set: fetch.fields,
            log_destination: LogDestination::File,
            log_file: PathBuf::from("./photofeed.log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] when `path` is `None`.
    ///
    /// Only the implicit default file may be missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        ron::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_base_url()?;
        self.log_level()?;
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(ConfigError::PerPage(self.per_page));
        }
        for (name, value) in [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("request_timeout_secs", self.request_timeout_secs),
            ("max_response_bytes", self.max_response_bytes),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroLimit(name));
            }
        }
        Ok(())
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        feed_logging::parse_level(&self.log_level)
            .ok_or_else(|| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            per_page: self.per_page,
            default_site: self.default_site.clone(),
        }
    }

    pub fn fetch_settings(&self) -> Result<FetchSettings, ConfigError> {
        Ok(FetchSettings {
            api_base: self.api_base_url()?,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_response_bytes,
            fields: self.field_set,
        })
    }

    fn api_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_base).map_err(|source| ConfigError::ApiBase {
            value: self.api_base.clone(),
            source,
        })
    }
}
