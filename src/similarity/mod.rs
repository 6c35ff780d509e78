//! Structured similarity over grammars.
//!
//! Two algorithms, selected by [`Method`](crate::config::Method):
//! component-weighted comparison of phrases, sentences or documents,
//! and sequential-shift drift over multi-sentence documents. Missing
//! vectors never raise; they yield [`Similarity::Undefined`].

mod shift;
mod weighted;

pub use shift::{sequential_shift, SequentialShift, WindowScore};
pub use weighted::{
    document_similarity, phrase_similarity, sentence_similarity, KindContribution,
    SimilarityResult,
};

use crate::config::{Method, SimilarityConfig};
use crate::grammar::{Grammar, PhraseRef};
use crate::nlp::Doc;

/// A similarity value: a score in `[0, 1]`, or the undefined sentinel
/// when required vectors are absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Similarity {
    Score(f64),
    Undefined,
}

impl Similarity {
    pub fn score(self) -> Option<f64> {
        match self {
            Similarity::Score(s) => Some(s),
            Similarity::Undefined => None,
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, Similarity::Undefined)
    }
}

/// Similarity engine bound to one configuration.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    config: SimilarityConfig,
}

impl SimilarityEngine {
    pub fn new(config: SimilarityConfig) -> Self {
        Self { config }
    }

    pub fn method(&self) -> Method {
        self.config.method
    }

    /// Component-weighted similarity between two phrases.
    pub fn phrases(&self, a: &PhraseRef<'_>, b: &PhraseRef<'_>) -> SimilarityResult {
        phrase_similarity(a, b, &self.config.weights)
    }

    /// Component-weighted similarity between two sentences.
    pub fn sentences(
        &self,
        doc_a: &Doc,
        a: &Grammar,
        doc_b: &Doc,
        b: &Grammar,
    ) -> SimilarityResult {
        sentence_similarity(doc_a, a, doc_b, b, &self.config.weights)
    }

    /// Component-weighted similarity between two documents.
    pub fn documents(
        &self,
        doc_a: &Doc,
        grammars_a: &[Grammar],
        doc_b: &Doc,
        grammars_b: &[Grammar],
    ) -> SimilarityResult {
        document_similarity(doc_a, grammars_a, doc_b, grammars_b, &self.config.weights)
    }

    /// Sequential-shift drift over one document.
    pub fn drift(&self, doc: &Doc, grammars: &[Grammar]) -> SequentialShift {
        sequential_shift(doc, grammars, &self.config.weights, self.config.window)
    }
}
