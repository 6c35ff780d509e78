//! Semgraph: semantic grammar and phrase-graph engine.
//!
//! Converts dependency-parsed, coreference-resolved sentences (produced
//! by an external NLP engine) into a structured semantic
//! representation:
//!
//! - each sentence is partitioned into typed **components**
//!   (noun/verb/description/preposition token groups);
//! - components assemble into **phrases** forming a DAG, with
//!   coordination resolved into **conjunct groups**;
//! - phrases aggregate across sentences into narrative **actions** and
//!   **stories**, with coreference mentions canonicalized;
//! - structured **similarity** is computed from weighted per-component
//!   vector comparisons;
//! - the whole structure round-trips through a model-independent
//!   **serialization codec**.
//!
//! The statistical parser, tagger, lemmatizer, NER and coreference
//! resolver are external collaborators consumed only through their
//! output contracts (see [`nlp`]).

pub mod codec;
pub mod config;
pub mod error;
pub mod grammar;
pub mod nlp;
pub mod pipeline;
pub mod similarity;
pub mod story;
pub mod utils;

pub use codec::{decode_grammar, decode_story, encode_grammar, encode_story};
pub use config::{Config, GrammarConfig, KindWeights, Method, PipelineConfig, SimilarityConfig};
pub use error::{CodecError, ConfigError, GrammarError, Result, SemgraphError, StoryError};
pub use grammar::{
    Component, ComponentKind, ConjunctGroup, ConjunctPolicy, Dep, Grammar, Modal, Mood, Phrase,
    PhraseFilter, PhraseGraph, PhraseId, PhraseRef, Relation, RelationText, RuleTable, Tense,
};
pub use nlp::{CorefCluster, Doc, MentionInput, Pos, SentenceInput, Token, TokenInput};
pub use pipeline::Pipeline;
pub use similarity::{
    SequentialShift, Similarity, SimilarityEngine, SimilarityResult, WindowScore,
};
pub use story::{Action, ActionArg, Entity, PhraseKey, SentenceReport, Story, StoryReport};
