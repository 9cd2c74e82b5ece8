use crate::error::{DepError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = ".depkeeper.toml";

pub const ENV_BUNDLE_UPDATE_CMD: &str = "DEPKEEPER_BUNDLE_UPDATE_CMD";
pub const ENV_NPM_UPDATE_CMD: &str = "DEPKEEPER_NPM_UPDATE_CMD";

pub const DEFAULT_BUNDLE_UPDATE_CMD: &str = "bundle update";
pub const DEFAULT_NPM_UPDATE_CMD: &str = "npm update";
pub const DEFAULT_PATCH_PROGRAM: &str = "patch";

/// Runtime configuration, read once at startup and handed to the components
/// that need it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Glob patterns (`*`, `?`) matched against file and directory names
    /// during discovery.
    pub ignored_paths: Vec<String>,
    pub bundle_update_cmd: String,
    pub npm_update_cmd: String,
    pub patch_program: String,
    pub patch_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignored_paths: Vec::new(),
            bundle_update_cmd: DEFAULT_BUNDLE_UPDATE_CMD.to_string(),
            npm_update_cmd: DEFAULT_NPM_UPDATE_CMD.to_string(),
            patch_program: DEFAULT_PATCH_PROGRAM.to_string(),
            patch_args: [
                "--forward",
                "--batch",
                "--reject-file=-",
                "--no-backup-if-mismatch",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Config {
    /// Load `<project>/.depkeeper.toml` if present, then apply environment
    /// overrides.
    pub fn load<P: AsRef<Path>>(project_path: P) -> Result<Self> {
        let config_path = project_path.as_ref().join(CONFIG_FILE_NAME);
        let mut config = if config_path.is_file() {
            log::debug!("Loading configuration from {}", config_path.display());
            let content =
                fs::read_to_string(&config_path).map_err(|e| DepError::io(&config_path, e))?;
            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DepError::Config(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e)))
    }

    /// Empty values are treated as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(cmd) = non_empty(ENV_BUNDLE_UPDATE_CMD) {
            log::debug!("{} overrides bundle update command: {}", ENV_BUNDLE_UPDATE_CMD, cmd);
            self.bundle_update_cmd = cmd;
        }
        if let Some(cmd) = non_empty(ENV_NPM_UPDATE_CMD) {
            log::debug!("{} overrides npm update command: {}", ENV_NPM_UPDATE_CMD, cmd);
            self.npm_update_cmd = cmd;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let mut config = Config::load(dir.path()).unwrap();
        config.apply_overrides(|_| None);
        assert_eq!(config.patch_program, "patch");
        assert!(config.ignored_paths.is_empty());
    }

    #[test]
    fn parses_partial_file() {
        let config = Config::parse(
            r#"
ignored_paths = ["vendor", "node_*"]
bundle_update_cmd = "bin/bundle update --conservative"
"#,
        )
        .unwrap();
        assert_eq!(config.ignored_paths, vec!["vendor", "node_*"]);
        assert_eq!(config.bundle_update_cmd, "bin/bundle update --conservative");
        assert_eq!(config.npm_update_cmd, DEFAULT_NPM_UPDATE_CMD);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Config::parse("bundle_cmd = \"x\"").unwrap_err();
        assert!(matches!(err, DepError::Config(_)));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::parse("bundle_update_cmd = \"from-file\"").unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_BUNDLE_UPDATE_CMD, "from-env update"),
            (ENV_NPM_UPDATE_CMD, "  "),
        ]
        .into_iter()
        .collect();

        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.bundle_update_cmd, "from-env update");
        assert_eq!(config.npm_update_cmd, DEFAULT_NPM_UPDATE_CMD);
    }
}
