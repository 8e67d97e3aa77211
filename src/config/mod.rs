use crate::models::HarnessConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Configuration manager for the harness settings file.
///
/// Loads and saves `Harness Settings.yaml` inside a configuration
/// directory. A missing file is not an error; defaults are returned so a
/// fresh checkout runs with the production timing profile.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager rooted at `config_dir`, creating the
    /// directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join("Harness Settings.yaml"),
            config_dir,
        })
    }

    /// Load the harness settings, falling back to defaults when the file
    /// does not exist.
    pub fn load_harness_config(&self) -> Result<HarnessConfig> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Harness settings not found at {}, using defaults",
                self.settings_path
            );
            return Ok(HarnessConfig::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read harness settings: {}", self.settings_path))?;

        let config: HarnessConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse harness settings: {}", self.settings_path))?;

        tracing::info!("Loaded harness settings from {}", self.settings_path);
        Ok(config)
    }

    /// Save the harness settings.
    pub fn save_harness_config(&self, config: &HarnessConfig) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(config)
            .context("Failed to serialize harness settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write harness settings: {}", self.settings_path))?;

        tracing::info!("Saved harness settings to {}", self.settings_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = manager.load_harness_config().unwrap();
        assert_eq!(config.harness_settings.hang_timeout_secs, 60);
        assert_eq!(config.harness_settings.poll_interval_ms, 10);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = HarnessConfig::default();
        config.harness_settings.hang_timeout_secs = 5;
        config.harness_settings.debug_mode = true;
        manager.save_harness_config(&config).unwrap();

        let loaded = manager.load_harness_config().unwrap();
        assert_eq!(loaded.harness_settings.hang_timeout_secs, 5);
        assert!(loaded.harness_settings.debug_mode);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let (manager, _temp_dir) = create_test_config_manager();

        fs::write(
            manager.config_dir().join("Harness Settings.yaml"),
            "Harness_Settings: [not, a, mapping]",
        )
        .unwrap();

        assert!(manager.load_harness_config().is_err());
    }
}
