//! Error types for the semgraph engine.

use thiserror::Error;

/// Main error type for semgraph operations.
#[derive(Error, Debug)]
pub enum SemgraphError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),

    #[error("Story error: {0}")]
    Story(#[from] StoryError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Errors raised while building a sentence grammar.
///
/// Only `MalformedParse` is fatal for a sentence; the document pipeline
/// recovers by recording the reason on an empty grammar. The other
/// variants are recovered locally and logged.
#[derive(Error, Debug)]
pub enum GrammarError {
    /// The dependency structure is not a tree (cyclic head chain or a
    /// head index outside the sentence).
    #[error("malformed dependency parse: {0}")]
    MalformedParse(String),

    /// A head token matched no component rule. Recovered by falling
    /// back to a single-token description component.
    #[error("no component rule for token {index} ({pos}/{dep})")]
    UnknownComponentType {
        index: usize,
        pos: String,
        dep: String,
    },

    /// A sentence index outside the document.
    #[error("sentence index {0} out of range ({1} sentences)")]
    SentenceOutOfRange(usize, usize),
}

/// Errors raised while aggregating a story.
#[derive(Error, Debug)]
pub enum StoryError {
    /// A coreference mention or link pointed at a nonexistent sentence,
    /// token or phrase. The offending entity or action is dropped.
    #[error("dangling reference: {0}")]
    DanglingReference(String),
}

/// Serialization codec errors.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An index-based reference in the encoded structure pointed at a
    /// nonexistent entry.
    #[error("dangling reference in encoded data: {0}")]
    DanglingReference(String),

    #[error("unknown tag '{value}' for field '{field}'")]
    UnknownTag { field: String, value: String },
}

/// Result type alias for semgraph operations.
pub type Result<T> = std::result::Result<T, SemgraphError>;
