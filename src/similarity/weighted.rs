//! Component-weighted structured similarity.
//!
//! Each side is reduced to one mean embedding vector per component
//! kind; cosines between matching kinds are combined as a weighted
//! average normalized over the kinds present on either side. Kinds
//! absent on both sides contribute no weight, so the score behaves
//! like a fuzzy Jaccard similarity over component types.

use crate::config::KindWeights;
use crate::grammar::{ComponentKind, Grammar, PhraseRef};
use crate::nlp::Doc;
use crate::similarity::Similarity;
use crate::utils::{cosine_similarity, mean_vector};

/// Per-kind contribution to a similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct KindContribution {
    pub kind: ComponentKind,
    pub weight: f64,
    pub cosine: f64,
}

/// A similarity score plus the per-kind contributions that produced it.
/// Recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    pub similarity: Similarity,
    pub contributions: Vec<KindContribution>,
}

impl SimilarityResult {
    fn undefined() -> Self {
        Self {
            similarity: Similarity::Undefined,
            contributions: Vec::new(),
        }
    }
}

/// Mean embedding vector per component kind, `None` where no component
/// of that kind carries vectors.
pub(crate) type KindVectors = [Option<Vec<f32>>; 4];

pub(crate) fn kind_vectors<'a, I>(doc: &Doc, components: I) -> KindVectors
where
    I: IntoIterator<Item = &'a crate::grammar::Component>,
{
    let mut buckets: [Vec<&[f32]>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
    for comp in components {
        let slot = kind_slot(comp.kind);
        for &i in &comp.members {
            if let Some(vector) = doc.token(i).vector() {
                buckets[slot].push(vector);
            }
        }
    }
    buckets.map(|bucket| {
        if bucket.is_empty() {
            None
        } else {
            mean_vector(bucket)
        }
    })
}

fn kind_slot(kind: ComponentKind) -> usize {
    match kind {
        ComponentKind::Noun => 0,
        ComponentKind::Verb => 1,
        ComponentKind::Desc => 2,
        ComponentKind::Prep => 3,
    }
}

/// Compare two kind-vector profiles.
pub(crate) fn weighted(a: &KindVectors, b: &KindVectors, weights: &KindWeights) -> SimilarityResult {
    if a.iter().all(Option::is_none) || b.iter().all(Option::is_none) {
        return SimilarityResult::undefined();
    }
    let mut union_weight = 0.0;
    let mut score = 0.0;
    let mut contributions = Vec::new();
    for kind in ComponentKind::ALL {
        let slot = kind_slot(kind);
        let weight = weights.get(kind);
        match (&a[slot], &b[slot]) {
            (Some(va), Some(vb)) => {
                union_weight += weight;
                let cosine = cosine_similarity(va, vb).unwrap_or(0.0).clamp(0.0, 1.0);
                score += weight * cosine;
                contributions.push(KindContribution {
                    kind,
                    weight,
                    cosine,
                });
            }
            (Some(_), None) | (None, Some(_)) => union_weight += weight,
            (None, None) => {}
        }
    }
    if union_weight == 0.0 {
        return SimilarityResult::undefined();
    }
    SimilarityResult {
        similarity: Similarity::Score((score / union_weight).clamp(0.0, 1.0)),
        contributions,
    }
}

/// Structured similarity between two phrases. Symmetric.
pub fn phrase_similarity(
    a: &PhraseRef<'_>,
    b: &PhraseRef<'_>,
    weights: &KindWeights,
) -> SimilarityResult {
    weighted(
        &phrase_kind_vectors(a),
        &phrase_kind_vectors(b),
        weights,
    )
}

fn phrase_kind_vectors(phrase: &PhraseRef<'_>) -> KindVectors {
    let grammar = phrase.grammar();
    let components = phrase
        .subdag_ids()
        .into_iter()
        .map(|id| &grammar.components()[grammar.phrases()[id].component]);
    kind_vectors(phrase.doc(), components)
}

/// Structured similarity between two sentences.
pub fn sentence_similarity(
    doc_a: &Doc,
    a: &Grammar,
    doc_b: &Doc,
    b: &Grammar,
    weights: &KindWeights,
) -> SimilarityResult {
    weighted(
        &kind_vectors(doc_a, a.components()),
        &kind_vectors(doc_b, b.components()),
        weights,
    )
}

/// Structured similarity between two documents.
pub fn document_similarity(
    doc_a: &Doc,
    grammars_a: &[Grammar],
    doc_b: &Doc,
    grammars_b: &[Grammar],
    weights: &KindWeights,
) -> SimilarityResult {
    weighted(
        &kind_vectors(doc_a, grammars_a.iter().flat_map(Grammar::components)),
        &kind_vectors(doc_b, grammars_b.iter().flat_map(Grammar::components)),
        weights,
    )
}
