use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub datasets: DatasetConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            datasets: DatasetConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.config/playlog/config.toml),
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write current configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("playlog")
            .join("config.toml")
    }

    /// Data directory for the activity log, word data, and datasets.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("playlog")
    }
}

/// Activity-log storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the activity-log JSON file.
    pub log_file: Option<PathBuf>,
    /// Directory for export dumps.
    pub export_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_file: None,   // resolved at runtime to data_dir/activity-log.json
            export_dir: None, // resolved at runtime to data_dir/exports
        }
    }
}

impl StorageConfig {
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| AppConfig::data_dir().join("activity-log.json"))
    }

    pub fn export_path(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| AppConfig::data_dir().join("exports"))
    }
}

/// Dataset download and word-data configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Directory holding the words{3..7}.json dictionaries.
    pub word_data_dir: Option<PathBuf>,
    /// Directory where fetched datasets are placed.
    pub datasets_dir: Option<PathBuf>,
    /// URL of the master word list (one word per line).
    pub word_list_url: String,
    /// Base URL of the dictionary API used for definition lookups.
    pub definition_api_base: String,
    /// Rate limit for definition lookups.
    pub requests_per_second: f64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry attempts for failed downloads.
    pub max_retries: u32,
    /// User agent sent with HTTP requests.
    pub user_agent: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            word_data_dir: None, // resolved at runtime to data_dir/word-data
            datasets_dir: None,  // resolved at runtime to data_dir/datasets
            word_list_url:
                "https://raw.githubusercontent.com/dwyl/english-words/master/words_alpha.txt"
                    .into(),
            definition_api_base: "https://api.dictionaryapi.dev/api/v2/entries/en".into(),
            requests_per_second: 2.0,
            timeout_secs: 10,
            max_retries: 5,
            user_agent: "playlog/0.1".into(),
        }
    }
}

impl DatasetConfig {
    pub fn word_data_path(&self) -> PathBuf {
        self.word_data_dir
            .clone()
            .unwrap_or_else(|| AppConfig::data_dir().join("word-data"))
    }

    pub fn datasets_path(&self) -> PathBuf {
        self.datasets_dir
            .clone()
            .unwrap_or_else(|| AppConfig::data_dir().join("datasets"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("dictionaryapi.dev"));
        assert!(toml_str.contains("words_alpha.txt"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.datasets.word_list_url, config.datasets.word_list_url);
        assert_eq!(parsed.datasets.max_retries, config.datasets.max_retries);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig = toml::from_str("[datasets]\nmax_retries = 2\n").unwrap();
        assert_eq!(parsed.datasets.max_retries, 2);
        assert_eq!(parsed.datasets.requests_per_second, 2.0);
        assert!(parsed.storage.log_file.is_none());
    }

    #[test]
    fn test_log_path_override() {
        let mut storage = StorageConfig::default();
        assert!(storage.log_path().ends_with("activity-log.json"));

        storage.log_file = Some(PathBuf::from("/tmp/custom.json"));
        assert_eq!(storage.log_path(), PathBuf::from("/tmp/custom.json"));
    }
}
