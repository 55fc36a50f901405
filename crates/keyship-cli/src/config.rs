//! Client configuration at `~/.keyship/config.toml`.
//!
//! Supplies a default remote user and port. CLI flags always override config
//! file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Defaults applied when the matching flag is absent.
    #[serde(default)]
    pub default: DefaultConfig,
}

/// Defaults applied when the matching flag is absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultConfig {
    /// Remote account used when `--user` is not given.
    #[serde(default)]
    pub user: Option<String>,

    /// Remote SSH port used when `--port` is not given.
    #[serde(default)]
    pub port: Option<u16>,
}

impl Config {
    /// `~/.keyship/config.toml`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".keyship").join("config.toml"))
    }

    /// Load configuration from a TOML file, returning defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert!(cfg.default.user.is_none());
        assert!(cfg.default.port.is_none());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[default]
user = "deploy"
port = 2222
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.default.user.as_deref(), Some("deploy"));
        assert_eq!(cfg.default.port, Some(2222));
    }

    #[test]
    fn parse_partial_toml_config() {
        let cfg: Config = toml::from_str("[default]\nport = 22\n").unwrap();
        assert!(cfg.default.user.is_none());
        assert_eq!(cfg.default.port, Some(22));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::load(&tmp.path().join("nope.toml")).unwrap();
        assert!(cfg.default.user.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[default]\nport = \"not a number\"\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        assert!(toml::from_str::<Config>("[default]\nport = 70000\n").is_err());
    }
}
