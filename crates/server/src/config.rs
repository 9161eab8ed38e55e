#![forbid(unsafe_code)]

use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tb_core::profile::SchemaProfile;
use tracing::level_filters::LevelFilter;

const DEFAULT_DB_PATH: &str = "./test.db";
const DEFAULT_BIND: &str = "127.0.0.1:3001";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "tb_server", version)]
#[command(about = "Testbank: question/answer test records over SQLite, served as JSON")]
pub struct Cli {
    /// YAML file with defaults for any of the options below.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// SQLite database file, created on first run.
    #[arg(long, env = "TESTBANK_DB", value_name = "PATH")]
    pub db: Option<PathBuf>,
    #[arg(long, env = "TESTBANK_BIND", value_name = "ADDR")]
    pub bind: Option<SocketAddr>,
    /// Schema profile: plain, categorized or indexed.
    #[arg(long, env = "TESTBANK_PROFILE")]
    pub profile: Option<String>,
    #[arg(long = "log-level", env = "TESTBANK_LOG", value_name = "LEVEL")]
    pub log_level: Option<String>,
    /// Compare the metadata index with the stored records at startup and log any drift.
    #[arg(long)]
    pub check_metadata: bool,
}

/// On-disk configuration. Every key is optional; unknown keys are an error.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub db: Option<PathBuf>,
    pub bind: Option<SocketAddr>,
    pub profile: Option<String>,
    pub log_level: Option<String>,
    pub check_metadata: Option<bool>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    pub profile: SchemaProfile,
    pub log_level: LevelFilter,
    pub check_metadata: bool,
}

impl ServiceConfig {
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match cli.config.as_deref() {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, cli)
    }

    /// Defaults, then the file, then flags and environment.
    pub fn resolve(file: FileConfig, cli: &Cli) -> Result<Self, ConfigError> {
        let db_path = cli
            .db
            .clone()
            .or(file.db)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let bind = match cli.bind.or(file.bind) {
            Some(bind) => bind,
            None => DEFAULT_BIND
                .parse()
                .map_err(|_| ConfigError::InvalidBind(DEFAULT_BIND.to_string()))?,
        };

        let profile = match cli.profile.as_deref().or(file.profile.as_deref()) {
            Some(raw) => SchemaProfile::parse(raw).map_err(ConfigError::InvalidProfile)?,
            None => SchemaProfile::default(),
        };

        let raw_level = cli
            .log_level
            .as_deref()
            .or(file.log_level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL);
        let log_level = raw_level
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::InvalidLogLevel(raw_level.to_string()))?;

        Ok(Self {
            db_path,
            bind,
            profile,
            log_level,
            check_metadata: cli.check_metadata || file.check_metadata.unwrap_or(false),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    InvalidBind(String),
    InvalidProfile(tb_core::profile::ProfileParseError),
    InvalidLogLevel(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "read {}: {source}", path.display()),
            Self::Yaml { path, source } => write!(f, "parse {}: {source}", path.display()),
            Self::InvalidBind(value) => write!(f, "invalid bind address {value:?}"),
            Self::InvalidProfile(err) => write!(f, "{err}"),
            Self::InvalidLogLevel(value) => write!(
                f,
                "invalid log level {value:?} (expected off, error, warn, info, debug or trace)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Yaml { source, .. } => Some(source),
            Self::InvalidProfile(err) => Some(err),
            _ => None,
        }
    }
}
