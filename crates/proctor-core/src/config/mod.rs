//! Configuration system for proctor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ProctorError, ProctorResult};
use crate::traits::LlmConfig;

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Anthropic,
    OpenAI,
}

/// Provider configuration with type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    /// Provider type.
    pub provider: LlmProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: LlmConfig,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            config: LlmConfig {
                model: "gemini-1.5-flash".to_string(),
                ..Default::default()
            },
        }
    }
}

/// Paired-rating parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub k_factor: f64,
    /// Starting rating for learners, domains, and items.
    pub default_rating: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            k_factor: crate::rating::K_FACTOR,
            default_rating: crate::rating::DEFAULT_RATING,
        }
    }
}

/// Pass-probability estimator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Skill judged equivalent to a passing score.
    pub pass_threshold: f64,
    /// Subtracted from the threshold to map it onto the item rating scale.
    pub threshold_offset: f64,
    /// Answers required before an estimate is produced.
    pub min_questions: u32,
    pub medium_confidence_at: u32,
    pub high_confidence_at: u32,
    /// Number of most recent outcomes blended into the estimate.
    pub recent_window: usize,
    /// Weight of recent accuracy in the blend.
    pub recent_weight: f64,
    /// Upper bound on the reported percentage.
    pub max_estimate: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 1100.0,
            threshold_offset: 200.0,
            min_questions: 20,
            medium_confidence_at: 30,
            high_confidence_at: 50,
            recent_window: 25,
            recent_weight: 0.3,
            max_estimate: 99.0,
        }
    }
}

/// Adaptive selection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Half-width of the target difficulty window.
    pub difficulty_window: f64,
    /// Subtracted from the default rating for domains never attempted.
    pub unattempted_handicap: f64,
    /// Max candidates fetched from the bank per selection.
    pub candidate_limit: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            difficulty_window: 50.0,
            unattempted_handicap: 100.0,
            candidate_limit: 10,
        }
    }
}

/// Review scheduler parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub initial_interval_hours: u32,
    pub initial_ease: f64,
    pub min_ease: f64,
    pub max_ease: f64,
    pub ease_bonus: f64,
    pub ease_penalty: f64,
    /// Share of the previous mastery kept on each review.
    pub mastery_retention: f64,
    /// Default cap for due-review listings.
    pub due_limit: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            initial_interval_hours: 24,
            initial_ease: 2.5,
            min_ease: 1.3,
            max_ease: 2.5,
            ease_bonus: 0.1,
            ease_penalty: 0.2,
            mastery_retention: 0.7,
            due_limit: 10,
        }
    }
}

/// Simulation exam parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub total_questions: usize,
    pub time_limit_minutes: u32,
    /// Max offset applied to the target difficulty of generated items.
    pub difficulty_jitter: i32,
    pub pass_score: u32,
    pub max_score: u32,
    pub history_limit: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_questions: 60,
            time_limit_minutes: 90,
            difficulty_jitter: 200,
            pass_score: 700,
            max_score: 1000,
            history_limit: 20,
        }
    }
}

/// Content generator call parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            temperature: 0.8,
            max_tokens: 8192,
            top_p: 0.95,
        }
    }
}

/// Store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let proctor_dir = dirs::home_dir()
            .map(|h| h.join(".proctor"))
            .unwrap_or_else(|| PathBuf::from(".proctor"));

        Self {
            path: proctor_dir.join("proctor.db"),
        }
    }
}

/// Main engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub rating: RatingConfig,
    pub estimator: EstimatorConfig,
    pub selection: SelectionConfig,
    pub review: ReviewConfig,
    pub simulation: SimulationConfig,
    pub generator: GeneratorConfig,
    pub store: StoreConfig,
    pub llm: LlmProviderConfig,
}

impl EngineConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ProctorResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| ProctorError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ProctorError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| ProctorError::Configuration(e.to_string())),
            _ => Err(ProctorError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(provider) = std::env::var("PROCTOR_LLM_PROVIDER") {
            config.llm.provider = match provider.to_lowercase().as_str() {
                "anthropic" => LlmProvider::Anthropic,
                "openai" => LlmProvider::OpenAI,
                _ => LlmProvider::Gemini,
            };
        }
        if let Ok(model) = std::env::var("PROCTOR_LLM_MODEL") {
            config.llm.config.model = model;
        }
        let key_var = match config.llm.provider {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
        };
        if let Ok(api_key) = std::env::var(key_var) {
            config.llm.config.api_key = Some(api_key);
        }

        if let Ok(path) = std::env::var("PROCTOR_DB_PATH") {
            config.store.path = PathBuf::from(path);
        }
        if let Some(secs) = env_parse::<u64>("PROCTOR_GENERATOR_TIMEOUT_SECS") {
            config.generator.timeout_secs = secs;
        }
        if let Some(total) = env_parse::<usize>("PROCTOR_SIMULATION_QUESTIONS") {
            config.simulation.total_questions = total;
        }
        if let Some(threshold) = env_parse::<f64>("PROCTOR_PASS_THRESHOLD") {
            config.estimator.pass_threshold = threshold;
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Builder for EngineConfig.
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn rating(mut self, config: RatingConfig) -> Self {
        self.config.rating = config;
        self
    }

    pub fn estimator(mut self, config: EstimatorConfig) -> Self {
        self.config.estimator = config;
        self
    }

    pub fn selection(mut self, config: SelectionConfig) -> Self {
        self.config.selection = config;
        self
    }

    pub fn review(mut self, config: ReviewConfig) -> Self {
        self.config.review = config;
        self
    }

    pub fn simulation(mut self, config: SimulationConfig) -> Self {
        self.config.simulation = config;
        self
    }

    pub fn generator(mut self, config: GeneratorConfig) -> Self {
        self.config.generator = config;
        self
    }

    /// Set the SQLite database path.
    pub fn store_path(mut self, path: PathBuf) -> Self {
        self.config.store.path = path;
        self
    }

    pub fn llm(mut self, config: LlmProviderConfig) -> Self {
        self.config.llm = config;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> EngineConfig {
        self.config
    }
}
