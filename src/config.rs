//! Configuration management for the recommendation engine

use crate::error::{RecommenderError, Result};
use crate::recommendation::Strategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub recommendation: RecommendationConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Local model cache, one subdirectory per model name
    pub cache_dir: PathBuf,
    pub embedding_model: String,
    pub max_tokens: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub strategy: Strategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
    pub backfill_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub snapshot_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".emprega-recommender");

        Self {
            models: ModelConfig {
                cache_dir: base_dir.join("models"),
                embedding_model: "minishlab/potion-multilingual-128M".to_string(),
                max_tokens: 512,
                batch_size: 32,
            },
            recommendation: RecommendationConfig {
                strategy: Strategy::Lexical,
            },
            pipeline: PipelineConfig {
                max_attempts: 3,
                retry_delay_secs: 60,
                backfill_delay_secs: 0,
            },
            storage: StorageConfig {
                snapshot_path: base_dir.join("store.json"),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing the defaults there on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                RecommenderError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            RecommenderError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("emprega-recommender")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.max_attempts == 0 {
            return Err(RecommenderError::Configuration(
                "pipeline.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.models.batch_size == 0 {
            return Err(RecommenderError::Configuration(
                "models.batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.pipeline.retry_delay_secs)
    }

    pub fn backfill_delay(&self) -> Duration {
        Duration::from_secs(self.pipeline.backfill_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.pipeline.max_attempts, 3);
        assert_eq!(config.recommendation.strategy, Strategy::Lexical);
    }

    #[test]
    fn test_round_trip_keeps_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.recommendation.strategy = Strategy::Semantic;
        config.pipeline.retry_delay_secs = 5;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.recommendation.strategy, Strategy::Semantic);
        assert_eq!(loaded.retry_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.pipeline.max_attempts = 0;
        config.save_to(&path).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(RecommenderError::Configuration(_))
        ));
    }
}
