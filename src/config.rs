//! Configuration management for the resume screener

use crate::error::{Result, ScreenerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub ranking: RankingConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    /// Embedding model: a local directory under `models_dir`, a Hugging Face
    /// repo id, or the literal `hashing` for the offline feature-hashing
    /// provider.
    pub embedding_model: String,
}

/// Ranking options consumed by the core ranker.
///
/// `weight_entity` only contributes when `use_entities` is on; the default
/// weighting is semantic-only. Ties are always broken by candidate id
/// ascending so repeated runs produce identical orderings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Limit output to the first N ranked candidates. Scoring still runs
    /// over the full candidate set before truncation.
    #[serde(default)]
    pub top_k: Option<usize>,
    pub use_entities: bool,
    pub weight_semantic: f32,
    pub weight_entity: f32,
    pub tie_break: TieBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    IdAscending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Upper bound on concurrent candidate embedding tasks.
    pub max_concurrency: usize,
    /// Strip common English stop words during normalization.
    pub strip_stop_words: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Csv,
    Markdown,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: None,
            use_entities: false,
            // Semantic-only by default. A blended weighting such as
            // 0.7 / 0.3 is a reasonable alternative once entity
            // annotation is enabled.
            weight_semantic: 1.0,
            weight_entity: 0.0,
            tie_break: TieBreak::IdAscending,
        }
    }
}

impl RankingConfig {
    /// Reject invalid weights before any scoring begins.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("weight_semantic", self.weight_semantic),
            ("weight_entity", self.weight_entity),
        ] {
            if !value.is_finite() {
                return Err(ScreenerError::Configuration(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
            if value < 0.0 {
                return Err(ScreenerError::Configuration(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-screener")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "minishlab/M2V_base_output".to_string(),
            },
            ranking: RankingConfig::default(),
            processing: ProcessingConfig {
                max_concurrency: 4,
                strip_stop_words: false,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load config from the platform config path, creating it with defaults
    /// on first use.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load config from an explicit path, or the platform default when none
    /// is given.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                ScreenerError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            Ok(config)
        } else if path.is_some() {
            Err(ScreenerError::Configuration(format!(
                "Config file not found: {}",
                config_path.display()
            )))
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ScreenerError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-screener")
            .join("config.toml")
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_semantic_only() {
        let config = Config::default();
        assert_eq!(config.ranking.weight_semantic, 1.0);
        assert_eq!(config.ranking.weight_entity, 0.0);
        assert!(!config.ranking.use_entities);
        assert!(config.ranking.top_k.is_none());
        assert_eq!(config.ranking.tie_break, TieBreak::IdAscending);
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let ranking = RankingConfig {
            weight_entity: -0.3,
            ..RankingConfig::default()
        };
        assert!(matches!(
            ranking.validate(),
            Err(ScreenerError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_nan_weight() {
        let ranking = RankingConfig {
            weight_semantic: f32::NAN,
            ..RankingConfig::default()
        };
        assert!(ranking.validate().is_err());
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default();
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.models.embedding_model, config.models.embedding_model);
        assert_eq!(parsed.ranking.weight_semantic, config.ranking.weight_semantic);
        assert_eq!(parsed.processing.max_concurrency, 4);
    }

    #[test]
    fn test_top_k_absent_in_toml_means_unbounded() {
        let content = r#"
            [models]
            models_dir = "/tmp/models"
            embedding_model = "hashing"

            [ranking]
            use_entities = false
            weight_semantic = 1.0
            weight_entity = 0.0
            tie_break = "id_ascending"

            [processing]
            max_concurrency = 2
            strip_stop_words = false

            [output]
            format = "csv"
            detailed = false
            color_output = false
        "#;
        let parsed: Config = toml::from_str(content).unwrap();
        assert!(parsed.ranking.top_k.is_none());
        assert_eq!(parsed.output.format, OutputFormat::Csv);
    }
}
