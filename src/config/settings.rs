//! Configuration for the semgraph engine.

use crate::error::{ConfigError, Result};
use crate::grammar::{ComponentKind, ConjunctPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grammar: GrammarConfig,
    pub similarity: SimilarityConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let w = &self.similarity.weights;
        for (name, value) in [
            ("noun", w.noun),
            ("verb", w.verb),
            ("desc", w.desc),
            ("prep", w.prep),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "similarity.weights.{name} must be non-negative"
                ))
                .into());
            }
        }
        if w.noun + w.verb + w.desc + w.prep == 0.0 {
            return Err(
                ConfigError::Invalid("similarity weights must not all be zero".to_string()).into(),
            );
        }
        if self.similarity.window == 0 {
            return Err(ConfigError::Invalid("similarity.window must be > 0".to_string()).into());
        }
        Ok(())
    }
}

/// Grammar-construction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Attachment policy for dependents trailing a conjunct group.
    pub conjunct_policy: ConjunctPolicy,
}

/// Similarity method selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Weighted per-component-type cosine comparison.
    #[default]
    ComponentWeighted,
    /// Ordered window-pair drift over a document.
    SequentialShift,
}

/// Per-component-kind weights for the similarity engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KindWeights {
    pub noun: f64,
    pub verb: f64,
    pub desc: f64,
    pub prep: f64,
}

impl Default for KindWeights {
    fn default() -> Self {
        Self {
            noun: 1.0,
            verb: 1.0,
            desc: 0.5,
            prep: 0.5,
        }
    }
}

impl KindWeights {
    pub fn get(&self, kind: ComponentKind) -> f64 {
        match kind {
            ComponentKind::Noun => self.noun,
            ComponentKind::Verb => self.verb,
            ComponentKind::Desc => self.desc,
            ComponentKind::Prep => self.prep,
        }
    }
}

/// Similarity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub method: Method,
    pub weights: KindWeights,
    /// Window size (in sentences) for the sequential-shift method.
    pub window: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            method: Method::ComponentWeighted,
            weights: KindWeights::default(),
            window: 1,
        }
    }
}

/// Document-pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Process sentences on the rayon thread pool.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}
