//! Sequential-shift similarity: topical drift across a document.
//!
//! Adjacent sentence windows are compared with the component-weighted
//! scorer; the ordered window-pair scores characterize how the topic
//! moves through the document. Windows with missing vectors score
//! undefined and are excluded from the mean.

use crate::config::KindWeights;
use crate::grammar::Grammar;
use crate::nlp::Doc;
use crate::similarity::weighted::{kind_vectors, weighted};
use crate::similarity::Similarity;

/// Similarity between one pair of adjacent sentence windows.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowScore {
    /// Sentence range `[start, end)` of the left window.
    pub left: (usize, usize),
    /// Sentence range `[start, end)` of the right window.
    pub right: (usize, usize),
    pub similarity: Similarity,
}

/// Result of a sequential-shift pass over a document.
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialShift {
    /// Mean of the defined window scores; undefined when none are.
    pub mean: Similarity,
    windows: Vec<WindowScore>,
}

impl SequentialShift {
    /// Window-pair scores in document order. Restartable: iterating
    /// never consumes the result.
    pub fn scores(&self) -> impl Iterator<Item = &WindowScore> + '_ {
        self.windows.iter()
    }

    pub fn windows(&self) -> &[WindowScore] {
        &self.windows
    }
}

/// Compute the sequential shift of a document with the given window
/// size (in sentences).
pub fn sequential_shift(
    doc: &Doc,
    grammars: &[Grammar],
    weights: &KindWeights,
    window: usize,
) -> SequentialShift {
    let window = window.max(1);
    let n = grammars.len();
    let mut windows = Vec::new();
    let mut sum = 0.0;
    let mut defined = 0usize;

    let mut i = 0;
    while i + window < n {
        let left = (i, i + window);
        let right = (i + window, (i + 2 * window).min(n));
        let left_vecs = kind_vectors(
            doc,
            grammars[left.0..left.1].iter().flat_map(Grammar::components),
        );
        let right_vecs = kind_vectors(
            doc,
            grammars[right.0..right.1]
                .iter()
                .flat_map(Grammar::components),
        );
        let similarity = weighted(&left_vecs, &right_vecs, weights).similarity;
        if let Similarity::Score(score) = similarity {
            sum += score;
            defined += 1;
        }
        windows.push(WindowScore {
            left,
            right,
            similarity,
        });
        i += 1;
    }

    let mean = if defined == 0 {
        Similarity::Undefined
    } else {
        Similarity::Score(sum / defined as f64)
    };
    SequentialShift { mean, windows }
}
