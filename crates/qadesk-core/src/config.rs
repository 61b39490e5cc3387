//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_RETRIEVAL__TOP_K=8`). Typed
//! [`Settings`] are extracted with serde defaults and validated once at load.
//! Also provides helpers to expand `~` and `${VAR}` and to resolve relative
//! paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
    settings: Settings,
}

impl Config {
    /// Load from the current working directory, honouring `RUST_ENV`.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load `config.toml` and the env-specific overlay from `dir`.
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self::from_figment(figment)?;
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    /// Build from an already-assembled figment (used by tests and embedders).
    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        Ok(Self { figment, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        match env {
            "prod" | "production" => {
                if self.settings.generation.provider == GenerationProvider::Fake {
                    anyhow::bail!("generation.provider = \"fake\" is not allowed in production");
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

/// Typed view over the merged configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub chunking: ChunkingSettings,
    pub vocabulary: VocabularySettings,
    pub retrieval: RetrievalSettings,
    pub strategy: StrategySettings,
    pub generation: GenerationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub docs_dir: String,
    pub index_path: String,
    pub escalation_log: String,
    pub default_language: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            docs_dir: "data/docs".to_string(),
            index_path: "data/index/qadesk-index.json".to_string(),
            escalation_log: "data/escalations.jsonl".to_string(),
            default_language: "en".to_string(),
        }
    }
}

/// Chunk sizing: characters per chunk, words of overlap, minimum content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub target_chars: usize,
    pub overlap_words: usize,
    pub min_chunk_chars: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { target_chars: 500, overlap_words: 12, min_chunk_chars: 12 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularySettings {
    pub min_token_len: usize,
    pub min_document_frequency: usize,
}

impl Default for VocabularySettings {
    fn default() -> Self {
        Self { min_token_len: 3, min_document_frequency: 2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub similarity_floor: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5, similarity_floor: 0.05 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    pub high_confidence: f32,
    pub medium_confidence: f32,
    /// Also hand PARTIAL answers to the escalation sink.
    pub escalate_partial: bool,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self { high_confidence: 0.7, medium_confidence: 0.4, escalate_partial: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    Disabled,
    Http,
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub provider: GenerationProvider,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: u64,
    pub max_context_chars: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::Disabled,
            endpoint: None,
            model: None,
            timeout_secs: 30,
            max_context_chars: 2000,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let c = &self.chunking;
        if c.target_chars == 0 {
            return Err(Error::InvalidConfig("chunking.target_chars must be > 0".into()));
        }
        if c.overlap_words >= c.target_chars {
            return Err(Error::InvalidConfig("chunking.overlap_words must be < chunking.target_chars".into()));
        }
        if self.vocabulary.min_document_frequency == 0 {
            return Err(Error::InvalidConfig("vocabulary.min_document_frequency must be >= 1".into()));
        }
        let r = &self.retrieval;
        if r.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be >= 1".into()));
        }
        if !(0.0..=1.0).contains(&r.similarity_floor) {
            return Err(Error::InvalidConfig("retrieval.similarity_floor must be in [0.0, 1.0]".into()));
        }
        let s = &self.strategy;
        if !(s.medium_confidence >= 0.0 && s.high_confidence > s.medium_confidence && s.high_confidence <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "strategy thresholds must satisfy 1 >= high > medium >= 0 (high={}, medium={})",
                s.high_confidence, s.medium_confidence
            )));
        }
        let g = &self.generation;
        if g.max_context_chars == 0 {
            return Err(Error::InvalidConfig("generation.max_context_chars must be > 0".into()));
        }
        if g.timeout_secs == 0 {
            return Err(Error::InvalidConfig("generation.timeout_secs must be > 0".into()));
        }
        if g.provider == GenerationProvider::Http && (g.endpoint.is_none() || g.model.is_none()) {
            return Err(Error::InvalidConfig(
                "generation.endpoint and generation.model are required when provider = \"http\"".into(),
            ));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
