//! Narrative actions.

use crate::grammar::PhraseId;

/// Cross-sentence reference to one phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhraseKey {
    pub sent: usize,
    pub phrase: PhraseId,
}

/// One argument of an action.
///
/// `local` is the phrase as it appears in the action's own sentence;
/// `canonical` is set when coreference substitutes a mention from
/// another sentence. Both are kept, so the substitution is explicit
/// and reversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionArg {
    pub local: PhraseKey,
    pub canonical: Option<PhraseKey>,
}

impl ActionArg {
    /// The canonical reference if substituted, the local one otherwise.
    pub fn resolved(&self) -> PhraseKey {
        self.canonical.unwrap_or(self.local)
    }
}

/// A subject–verb–object–description tuple representing one narrative
/// event. Derived data: recomputable from the grammars plus the
/// coreference links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub verb: PhraseKey,
    pub subjects: Vec<ActionArg>,
    pub objects: Vec<ActionArg>,
    pub descriptions: Vec<PhraseKey>,
}
