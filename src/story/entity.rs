//! Canonical entities resolved from coreference clusters.

use crate::nlp::MentionInput;

/// One canonicalized entity: a coreference cluster whose representative
/// is its first mention in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Index of the source cluster in the input cluster list.
    pub cluster: usize,
    /// The representative mention (first by sentence, then by offset).
    pub canonical: MentionInput,
    /// All valid mentions, sorted in document order.
    pub mentions: Vec<MentionInput>,
}

impl Entity {
    /// Whether a sentence-local token index inside `sent` falls within
    /// one of this entity's mentions.
    pub fn covers(&self, sent: usize, local_index: usize) -> bool {
        self.mentions
            .iter()
            .any(|m| m.sent == sent && m.start <= local_index && local_index < m.end)
    }
}
