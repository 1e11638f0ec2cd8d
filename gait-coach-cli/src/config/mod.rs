use anyhow::{Context, Result};
use gait_coach::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where reports go when `--output-dir` is not given
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// Write the per-frame rows next to the summary
    #[serde(default = "default_true")]
    pub write_rows: bool,

    /// Pretty-print the summary JSON
    #[serde(default = "default_true")]
    pub pretty: bool,
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            write_rows: default_true(),
            pretty: default_true(),
        }
    }
}

impl Config {
    /// Get config directory path (~/.gait-coach/)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".gait-coach"))
    }

    /// Get config file path (~/.gait-coach/config.toml)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Explicit path if given, otherwise the default location
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_file(),
        }
    }

    /// Load configuration, falling back to defaults when the file is absent.
    ///
    /// `GAIT_*` environment variables override the file's analysis settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_file = Self::resolve_path(path)?;

        let mut config = if config_file.exists() {
            let contents =
                fs::read_to_string(&config_file).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            tracing::info!("Config file not found, using defaults");
            Self::default()
        };

        config.analysis = config
            .analysis
            .overlay_env()
            .with_context(|| format!("Invalid analysis settings in {}", config_file.display()))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_file = Self::resolve_path(path)?;
        if let Some(config_dir) = config_file.parent() {
            fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_file, contents).context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.directory, PathBuf::from("."));
        assert!(config.output.write_rows);
        assert_eq!(config.analysis.gait.default_cycle_length, 22);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.analysis, deserialized.analysis);
        assert_eq!(config.output.directory, deserialized.output.directory);
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            min_visibility = 0.8

            [analysis.bands.front_knee]
            low = 75.0
            high = 95.0
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.min_visibility, 0.8);
        assert_eq!(config.analysis.bands.front_knee.low, 75.0);
        assert_eq!(config.analysis.bands.front_knee.tolerance, 10.0);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.output.write_rows = false;
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert!(!loaded.output.write_rows);
    }

    #[test]
    fn test_invalid_analysis_settings_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[analysis.gait]\ndefault_cycle_length = 0\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }
}
