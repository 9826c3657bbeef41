//! Run configuration (`driftx.toml`).
//!
//! Precedence, lowest first: built-in defaults, the TOML file, `.env` and
//! process environment, then command-line flags (applied by the caller).
//!
//! ```toml
//! [paths]
//! exports = "exports"
//! change_logs = "change_logs"
//!
//! [diff]
//! exclude = ["root['lastModifiedDateTime']", "**.version"]
//! categories = ["CompliancePolicies", "Scripts"]
//!
//! [log]
//! profile = "production"
//! ```

use driftx_core::diff::{ExclusionSet, DEFAULT_EXCLUSIONS};
use driftx_core::errors::{ExError, ExErrorKind, Result};
use driftx_core::logging_facility::Profile;
use driftx_core::snapshot::Category;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "driftx.toml";

pub const ENV_EXPORTS_DIR: &str = "DRIFTX_EXPORTS_DIR";
pub const ENV_CHANGE_LOG_DIR: &str = "DRIFTX_CHANGE_LOG_DIR";
/// Comma-separated patterns appended to the configured exclusions
pub const ENV_EXCLUDE: &str = "DRIFTX_EXCLUDE";
pub const ENV_LOG_PROFILE: &str = "DRIFTX_LOG_PROFILE";

/// Top-level configuration. Missing sections and fields take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Snapshot root of the current export
    #[serde(default)]
    pub exports: Option<PathBuf>,
    /// Directory receiving change log files
    #[serde(default = "default_change_logs")]
    pub change_logs: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            exports: None,
            change_logs: default_change_logs(),
        }
    }
}

fn default_change_logs() -> PathBuf {
    PathBuf::from("change_logs")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffConfig {
    /// Exclusion patterns; replaces the defaults when present
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Category directory names both generations must fall within. Empty
    /// means the generations must simply agree with each other.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            categories: Vec::new(),
        }
    }
}

fn default_exclude() -> Vec<String> {
    DEFAULT_EXCLUSIONS.iter().map(|p| p.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// `development` or `production`
    #[serde(default)]
    pub profile: Option<String>,
}

fn invalid_config(message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidConfig)
        .with_op("load_config")
        .with_message(message)
}

impl RunConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML or unknown fields, with the line
    /// number when one is known.
    pub fn parse(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {}: {}", line, message);
            }
            invalid_config(message)
        })
    }

    /// Load a configuration file.
    ///
    /// A missing file yields defaults unless `required` is set.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the file cannot be read, is required but missing,
    /// or does not parse.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(invalid_config(format!("could not read file: {}", e))
                    .with_path(path.display().to_string()));
            }
        };
        Self::parse(&contents).map_err(|e| e.with_path(path.display().to_string()))
    }

    /// Resolve the configuration for a run: `explicit` (which must exist) or
    /// `driftx.toml` in the working directory, then `.env` and the process
    /// environment on top.
    ///
    /// # Errors
    ///
    /// See [`RunConfig::load`].
    pub fn from_environment(explicit: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match explicit {
            Some(path) => Self::load(path, true)?,
            None => Self::load(Path::new(DEFAULT_CONFIG_FILE), false)?,
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = non_empty(ENV_EXPORTS_DIR) {
            self.paths.exports = Some(PathBuf::from(dir));
        }
        if let Some(dir) = non_empty(ENV_CHANGE_LOG_DIR) {
            self.paths.change_logs = PathBuf::from(dir);
        }
        if let Some(patterns) = non_empty(ENV_EXCLUDE) {
            self.diff.exclude.extend(
                patterns
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            );
        }
        if let Some(profile) = non_empty(ENV_LOG_PROFILE) {
            self.log.profile = Some(profile);
        }
    }

    /// The configured exclusions, parsed.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` for the first malformed pattern.
    pub fn exclusion_set(&self) -> Result<ExclusionSet> {
        Ok(ExclusionSet::parse_all(&self.diff.exclude)?)
    }

    /// The pinned category set, if one is configured.
    pub fn pinned_categories(&self) -> Option<BTreeSet<Category>> {
        if self.diff.categories.is_empty() {
            return None;
        }
        Some(
            self.diff
                .categories
                .iter()
                .map(|name| Category::from_dir_name(name.trim()))
                .collect(),
        )
    }

    /// The configured log profile, if any.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for an unknown profile name.
    pub fn log_profile(&self) -> Result<Option<Profile>> {
        self.log
            .profile
            .as_deref()
            .map(|p| p.parse::<Profile>().map_err(invalid_config))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RunConfig::parse("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.paths.change_logs, PathBuf::from("change_logs"));
        assert_eq!(config.diff.exclude, vec!["root['lastModifiedDateTime']"]);
        assert_eq!(config.pinned_categories(), None);
        assert_eq!(config.log_profile().unwrap(), None);
    }

    #[test]
    fn test_sections_are_read() {
        let config = RunConfig::parse(
            r#"
[paths]
exports = "/data/exports"

[diff]
exclude = ["**.version"]
categories = ["Scripts", "CompliancePolicies"]

[log]
profile = "production"
"#,
        )
        .unwrap();

        assert_eq!(config.paths.exports, Some(PathBuf::from("/data/exports")));
        assert_eq!(config.diff.exclude, vec!["**.version"]);
        assert_eq!(
            config.pinned_categories(),
            Some(BTreeSet::from([Category::CompliancePolicy, Category::Script]))
        );
        assert_eq!(config.log_profile().unwrap(), Some(Profile::Production));
    }

    #[test]
    fn test_unknown_field_reports_line() {
        let err = RunConfig::parse("[paths]\nexport = \"x\"\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
        assert!(err.message().contains("line"), "{}", err.message());
    }

    #[test]
    fn test_env_overrides_and_appends() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_EXPORTS_DIR, "/env/exports"),
            (ENV_CHANGE_LOG_DIR, "/env/logs"),
            (ENV_EXCLUDE, "**.version, *DateTime,"),
            (ENV_LOG_PROFILE, "dev"),
        ]);
        let mut config = RunConfig::default();
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.paths.exports, Some(PathBuf::from("/env/exports")));
        assert_eq!(config.paths.change_logs, PathBuf::from("/env/logs"));
        assert_eq!(
            config.diff.exclude,
            vec!["root['lastModifiedDateTime']", "**.version", "*DateTime"]
        );
        assert_eq!(config.log_profile().unwrap(), Some(Profile::Development));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = RunConfig::default();
        config.apply_env_from(|_| Some("  ".to_string()));
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_bad_pattern_and_profile_are_rejected() {
        let config = RunConfig::parse("[diff]\nexclude = [\"root\"]\n[log]\nprofile = \"loud\"\n")
            .unwrap();
        assert_eq!(
            config.exclusion_set().unwrap_err().kind(),
            ExErrorKind::InvalidPattern
        );
        assert_eq!(
            config.log_profile().unwrap_err().kind(),
            ExErrorKind::InvalidConfig
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("driftx.toml");

        assert_eq!(RunConfig::load(&path, false).unwrap(), RunConfig::default());
        let err = RunConfig::load(&path, true).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
        assert_eq!(err.path(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_load_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("driftx.toml");
        std::fs::write(&path, "not valid [[[toml").unwrap();

        let err = RunConfig::load(&path, false).unwrap_err();
        assert_eq!(err.path(), Some(path.display().to_string().as_str()));
    }
}
