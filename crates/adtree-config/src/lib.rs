use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

const CONFIG_DIR: &str = "~/.config/adtree";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LDIF export opened when no file is given on the command line
    pub ldif_path: Option<PathBuf>,
    /// Keep only the last value of each attribute
    pub scalar: bool,
    /// Show objectGUID as base64 rather than as a GUID
    pub raw_guid: bool,
}

impl Config {
    /// Config for a first run that remembers `ldif_path`. The path is made
    /// absolute so it still resolves from another working directory.
    pub fn remembering(ldif_path: &Path) -> Self {
        let ldif_path =
            std::path::absolute(ldif_path).unwrap_or_else(|_| ldif_path.to_path_buf());
        Self {
            ldif_path: Some(ldif_path),
            ..Self::default()
        }
    }

    /// Reads the config at `config_path`; `Ok(None)` when there is none yet.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        let content = match fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::ConfigReadError {
                    config_path: config_path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        Ok(Some(config.with_expanded_ldif_path()))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write {}", config_path.display()))
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        Path::new(shellexpand::tilde(CONFIG_DIR).as_ref()).join(CONFIG_FILE)
    }

    // `~` and `$VAR` in a hand-written ldif_path; left as-is when expansion fails
    fn with_expanded_ldif_path(mut self) -> Self {
        if let Some(path) = self.ldif_path.take() {
            self.ldif_path = Some(expand_path(&path).unwrap_or(path));
        }
        self
    }
}

fn expand_path(path: &Path) -> Option<PathBuf> {
    shellexpand::full(&path.to_string_lossy())
        .ok()
        .map(|expanded| PathBuf::from(expanded.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/adtree/config.toml"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config {
            ldif_path: Some(PathBuf::from("/tmp/export.ldif")),
            scalar: true,
            raw_guid: false,
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: Config = toml::from_str("scalar = true\n").unwrap();

        assert_eq!(config.ldif_path, None);
        assert!(config.scalar);
        assert!(!config.raw_guid);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/exports/corp.ldif");
        let expanded = expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("exports/corp.ldif"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("ADTREE_TEST_EXPORTS", "/test/env/path");
        }

        let path = PathBuf::from("$ADTREE_TEST_EXPORTS/corp.ldif");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, PathBuf::from("/test/env/path/corp.ldif"));

        unsafe {
            env::remove_var("ADTREE_TEST_EXPORTS");
        }
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/corp.ldif");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "scalar = \"not a bool\"").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let test_config = Config {
            ldif_path: Some(PathBuf::from("/tmp/export.ldif")),
            scalar: false,
            raw_guid: true,
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_remembered_path_is_absolute() {
        let config = Config::remembering(Path::new("exports/corp.ldif"));
        let ldif_path = config.ldif_path.unwrap();

        assert!(ldif_path.is_absolute());
        assert!(ldif_path.ends_with("exports/corp.ldif"));
        assert!(!config.scalar);
        assert!(!config.raw_guid);
    }

    #[test]
    fn test_remembered_path_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("adtree/config.toml");
        let export = temp_dir.path().join("corp.ldif");

        Config::remembering(&export).save_to_path(&config_file).unwrap();
        let reloaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(reloaded.ldif_path, Some(export));
    }

    #[test]
    fn test_unreadable_config_is_a_read_error() {
        let temp_dir = TempDir::new().unwrap();

        let result = Config::load_from_path(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ConfigReadError { .. })));
    }

    #[test]
    fn test_config_with_env_var_in_toml() {
        unsafe {
            env::set_var("ADTREE_EXPORT_ROOT", "/custom/exports");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "ldif_path = \"$ADTREE_EXPORT_ROOT/corp.ldif\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(
            config.ldif_path,
            Some(PathBuf::from("/custom/exports/corp.ldif"))
        );

        unsafe {
            env::remove_var("ADTREE_EXPORT_ROOT");
        }
    }
}
