//! Configuration file handling for compilation settings.
//!
//! This module provides loading and parsing of `.relschema.json` configuration files
//! and merges them with command-line overrides into a [`CompilerConfig`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::relational::{BuildOptions, DdlCompiler, PostgresCompiler, SqlServerCompiler, TimestampForm};

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".relschema.json";

/// Smallest identifier limit that still leaves room for a readable prefix
/// next to the hash suffix.
pub const MIN_IDENTIFIER_LIMIT: usize = 16;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read {path}: {message}")]
    FileReadFailed { path: String, message: String },

    #[error("Invalid JSON in {path}: {message}")]
    JsonParseFailed { path: String, message: String },

    #[error("Invalid version '{value}': expected major.minor.patch")]
    InvalidVersion { value: String },

    #[error("Identifier limit {limit} is too small (minimum {min})")]
    IdentifierLimitTooSmall { limit: usize, min: usize },
}

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL (63-byte identifiers)
    #[default]
    #[value(name = "postgresql")]
    PostgreSql,
    /// SQL Server (128-character identifiers)
    #[value(name = "sqlserver")]
    SqlServer,
}

impl Dialect {
    pub fn default_identifier_limit(&self) -> usize {
        match self {
            Dialect::PostgreSql => 63,
            Dialect::SqlServer => 128,
        }
    }

    pub fn compiler(&self) -> Box<dyn DdlCompiler> {
        match self {
            Dialect::PostgreSql => Box::new(PostgresCompiler),
            Dialect::SqlServer => Box::new(SqlServerCompiler),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::PostgreSql => write!(f, "postgresql"),
            Dialect::SqlServer => write!(f, "sqlserver"),
        }
    }
}

/// A `major.minor.patch` technology version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TechVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl TechVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for TechVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for TechVersion {
    type Err = ConfigError;

    /// Parses `7`, `7.1` or `7.1.0`; missing parts are zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidVersion { value: s.to_string() };
        let parts = s
            .trim()
            .split('.')
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [major] => Ok(Self::new(*major, 0, 0)),
            [major, minor] => Ok(Self::new(*major, *minor, 0)),
            [major, minor, patch] => Ok(Self::new(*major, *minor, *patch)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for TechVersion {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TechVersion> for String {
    fn from(value: TechVersion) -> Self {
        value.to_string()
    }
}

/// Top-level configuration file structure. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub dialect: Option<Dialect>,
    pub identifier_limit: Option<usize>,
    pub target_version: Option<TechVersion>,
    pub utc_timestamp_threshold: Option<TechVersion>,
}

impl ConfigFile {
    /// Load configuration from `path`, or from `.relschema.json` in the
    /// current directory when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicitly given file doesn't exist
    /// - The file cannot be read
    /// - The JSON is invalid
    ///
    /// A missing default file is not an error; defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !config_path.exists() {
            if path.is_some() {
                return Err(ConfigError::FileNotFound {
                    path: config_path.display().to_string(),
                });
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::FileReadFailed {
            path: config_path.display().to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::JsonParseFailed {
            path: config_path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Resolved settings for one compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompilerConfig {
    pub dialect: Dialect,
    pub identifier_limit: usize,
    pub target_version: TechVersion,
    pub utc_timestamp_threshold: TechVersion,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::PostgreSql,
            identifier_limit: Dialect::PostgreSql.default_identifier_limit(),
            target_version: TechVersion::new(7, 0, 0),
            utc_timestamp_threshold: TechVersion::new(7, 0, 0),
        }
    }
}

impl CompilerConfig {
    /// Merge file settings with command-line overrides; overrides win.
    ///
    /// Without an explicit limit, the dialect's own limit applies.
    pub fn resolve(
        file: &ConfigFile,
        dialect: Option<Dialect>,
        identifier_limit: Option<usize>,
        target_version: Option<TechVersion>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let dialect = dialect.or(file.dialect).unwrap_or(defaults.dialect);
        let identifier_limit = identifier_limit
            .or(file.identifier_limit)
            .unwrap_or_else(|| dialect.default_identifier_limit());

        if identifier_limit < MIN_IDENTIFIER_LIMIT {
            return Err(ConfigError::IdentifierLimitTooSmall {
                limit: identifier_limit,
                min: MIN_IDENTIFIER_LIMIT,
            });
        }

        Ok(Self {
            dialect,
            identifier_limit,
            target_version: target_version.or(file.target_version).unwrap_or(defaults.target_version),
            utc_timestamp_threshold: file
                .utc_timestamp_threshold
                .unwrap_or(defaults.utc_timestamp_threshold),
        })
    }

    pub fn timestamp_form(&self) -> TimestampForm {
        if self.target_version >= self.utc_timestamp_threshold {
            TimestampForm::Utc
        } else {
            TimestampForm::Local
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            identifier_limit: self.identifier_limit,
            timestamp_form: self.timestamp_form(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_full_deserialization() {
        let json = r#"
        {
            "dialect": "sqlserver",
            "identifier_limit": 100,
            "target_version": "6.1.0",
            "utc_timestamp_threshold": "7.0.0"
        }
        "#;
        let config: ConfigFile = serde_json::from_str(json).unwrap();
        assert_eq!(config.dialect, Some(Dialect::SqlServer));
        assert_eq!(config.identifier_limit, Some(100));
        assert_eq!(config.target_version, Some(TechVersion::new(6, 1, 0)));
        assert_eq!(config.utc_timestamp_threshold, Some(TechVersion::new(7, 0, 0)));
    }

    #[test]
    fn test_empty_deserialization() {
        let config: ConfigFile = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_invalid_version_in_file() {
        let json = r#"{"target_version": "seven"}"#;
        assert!(serde_json::from_str::<ConfigFile>(json).is_err());
    }

    #[rstest]
    #[case("7", TechVersion::new(7, 0, 0))]
    #[case("7.1", TechVersion::new(7, 1, 0))]
    #[case("5.3.1", TechVersion::new(5, 3, 1))]
    #[case(" 6.0.0 ", TechVersion::new(6, 0, 0))]
    fn test_parse_version(#[case] input: &str, #[case] expected: TechVersion) {
        assert_eq!(input.parse::<TechVersion>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("7.x")]
    #[case("1.2.3.4")]
    #[case("-1.0.0")]
    fn test_parse_version_rejects(#[case] input: &str) {
        assert!(matches!(
            input.parse::<TechVersion>(),
            Err(ConfigError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_version_ordering() {
        assert!(TechVersion::new(7, 0, 0) > TechVersion::new(6, 9, 9));
        assert!(TechVersion::new(7, 1, 0) > TechVersion::new(7, 0, 12));
        assert_eq!(TechVersion::new(7, 1, 0).to_string(), "7.1.0");
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"dialect": "postgresql", "identifier_limit": 40}"#)
            .unwrap();
        file.flush().unwrap();

        let config = ConfigFile::load(Some(file.path())).unwrap();
        assert_eq!(config.dialect, Some(Dialect::PostgreSql));
        assert_eq!(config.identifier_limit, Some(40));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = ConfigFile::load(Some(Path::new("/nonexistent/.relschema.json")));
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ invalid json }").unwrap();
        file.flush().unwrap();

        let result = ConfigFile::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::JsonParseFailed { .. })));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = CompilerConfig::resolve(&ConfigFile::default(), None, None, None).unwrap();
        assert_eq!(config, CompilerConfig::default());
        assert_eq!(config.identifier_limit, 63);
    }

    #[test]
    fn test_resolve_dialect_sets_default_limit() {
        let config = CompilerConfig::resolve(&ConfigFile::default(), Some(Dialect::SqlServer), None, None).unwrap();
        assert_eq!(config.identifier_limit, 128);
    }

    #[test]
    fn test_resolve_overrides_win() {
        let file = ConfigFile {
            dialect: Some(Dialect::SqlServer),
            identifier_limit: Some(100),
            target_version: Some(TechVersion::new(5, 0, 0)),
            utc_timestamp_threshold: Some(TechVersion::new(6, 0, 0)),
        };
        let config = CompilerConfig::resolve(
            &file,
            Some(Dialect::PostgreSql),
            Some(50),
            Some(TechVersion::new(6, 1, 0)),
        )
        .unwrap();

        assert_eq!(config.dialect, Dialect::PostgreSql);
        assert_eq!(config.identifier_limit, 50);
        assert_eq!(config.target_version, TechVersion::new(6, 1, 0));
        assert_eq!(config.utc_timestamp_threshold, TechVersion::new(6, 0, 0));
    }

    #[test]
    fn test_resolve_rejects_tiny_limit() {
        let result = CompilerConfig::resolve(&ConfigFile::default(), None, Some(10), None);
        assert!(matches!(
            result,
            Err(ConfigError::IdentifierLimitTooSmall { limit: 10, min: 16 })
        ));
    }

    #[rstest]
    #[case(TechVersion::new(6, 1, 0), TimestampForm::Local)]
    #[case(TechVersion::new(7, 0, 0), TimestampForm::Utc)]
    #[case(TechVersion::new(7, 2, 0), TimestampForm::Utc)]
    fn test_timestamp_form(#[case] target: TechVersion, #[case] expected: TimestampForm) {
        let config = CompilerConfig {
            target_version: target,
            ..CompilerConfig::default()
        };
        assert_eq!(config.timestamp_form(), expected);
        assert_eq!(config.build_options().timestamp_form, expected);
    }
}
