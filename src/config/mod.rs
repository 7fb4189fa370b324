use crate::models::{CoachConfig, UserConfig};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Prefix of environment variables that override `FocusTimer Config.yaml`,
/// e.g. `FOCUS_TIMER_SOUND_ENABLED=false`.
pub const ENV_PREFIX: &str = "FOCUS_TIMER";

/// Configuration manager for loading and saving YAML configuration files.
///
/// Manages two configuration files:
/// - User config (`FocusTimer Config.yaml`): host preferences, layered with
///   `FOCUS_TIMER_*` environment variables
/// - Coach config (`FocusTimer Coach.yaml`): keyword rules and fallback replies
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    user_config_path: Utf8PathBuf,
    coach_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            user_config_path: config_dir.join("FocusTimer Config.yaml"),
            coach_config_path: config_dir.join("FocusTimer Coach.yaml"),
            config_dir,
        })
    }

    /// Load the user configuration, with process environment overrides.
    ///
    /// # Returns
    /// The merged UserConfig; defaults fill anything the file and
    /// environment leave out
    pub fn load_user_config(&self) -> Result<UserConfig> {
        self.load_user_config_from(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load the user configuration layered with an explicit environment source.
    pub fn load_user_config_from(&self, env: config::Environment) -> Result<UserConfig> {
        if !self.user_config_path.exists() {
            tracing::warn!(
                "User config file not found at {}, using defaults",
                self.user_config_path
            );
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::from(self.user_config_path.as_std_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(env.try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read user config: {}", self.user_config_path))?;

        let config: UserConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse user config: {}", self.user_config_path))?;

        tracing::info!("Loaded user config from {}", self.user_config_path);
        Ok(config)
    }

    /// Save the user configuration file.
    pub fn save_user_config(&self, config: &UserConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize user config to YAML")?;

        fs::write(&self.user_config_path, yaml_string)
            .with_context(|| format!("Failed to write user config: {}", self.user_config_path))?;

        tracing::info!("Saved user config to {}", self.user_config_path);
        Ok(())
    }

    /// Load the coach knowledge base.
    ///
    /// # Returns
    /// The loaded CoachConfig, or the built-in rules if the file doesn't exist
    pub fn load_coach_config(&self) -> Result<CoachConfig> {
        if !self.coach_config_path.exists() {
            tracing::warn!(
                "Coach config file not found at {}, using built-in rules",
                self.coach_config_path
            );
            return Ok(CoachConfig::default());
        }

        let file_contents = fs::read_to_string(&self.coach_config_path)
            .with_context(|| format!("Failed to read coach config: {}", self.coach_config_path))?;

        let config: CoachConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse coach config: {}", self.coach_config_path))?;

        tracing::info!(
            "Loaded {} coach rules from {}",
            config.rules.len(),
            self.coach_config_path
        );
        Ok(config)
    }

    /// Save the coach configuration file.
    pub fn save_coach_config(&self, config: &CoachConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize coach config to YAML")?;

        fs::write(&self.coach_config_path, yaml_string)
            .with_context(|| format!("Failed to write coach config: {}", self.coach_config_path))?;

        tracing::info!("Saved coach config to {}", self.coach_config_path);
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

    fn no_env() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX).source(Some(config::Map::new()))
    }

    #[test]
    fn test_create_config_manager() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert!(manager.config_dir().exists());
    }

    #[test]
    fn test_missing_user_config_uses_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        let loaded = manager.load_user_config_from(no_env()).unwrap();
        assert_eq!(loaded, UserConfig::default());
    }

    #[test]
    fn test_load_save_user_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = UserConfig {
            sound_enabled: false,
            flush_interval_secs: 10,
            ..UserConfig::default()
        };
        manager.save_user_config(&config).unwrap();

        let loaded = manager.load_user_config_from(no_env()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_user_config() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(
            manager.config_dir().join("FocusTimer Config.yaml"),
            "debug_mode: true\n",
        )
        .unwrap();

        let loaded = manager.load_user_config_from(no_env()).unwrap();
        assert!(loaded.debug_mode);
        assert!(loaded.sound_enabled);
        assert_eq!(loaded.flush_interval_secs, 30);
    }

    #[test]
    fn test_load_save_coach_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = CoachConfig::default();
        manager.save_coach_config(&config).unwrap();

        let loaded = manager.load_coach_config().unwrap();
        assert_eq!(loaded, config);
        let names: Vec<_> = loaded.rules.keys().map(String::as_str).collect();
        assert_eq!(names.first(), Some(&"focus"));
        assert_eq!(names.last(), Some(&"notifications"));
    }

    #[test]
    fn test_malformed_coach_config_is_an_error() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(
            manager.config_dir().join("FocusTimer Coach.yaml"),
            "Rules: [not, a, map",
        )
        .unwrap();

        assert!(manager.load_coach_config().is_err());
    }
}
