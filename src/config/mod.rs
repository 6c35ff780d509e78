//! Engine configuration.

mod settings;

pub use settings::{
    Config, GrammarConfig, KindWeights, Method, PipelineConfig, SimilarityConfig,
};
