//! Serialized form of the phrase-graph structure.
//!
//! A nested, order-preserving structure of primitives: token table,
//! per-sentence component/conjunct/phrase tables, entity and action
//! tables, all referencing each other by index. Sufficient to
//! reconstruct the full object graph without the original parser or
//! embedding model.

use serde::{Deserialize, Serialize};

use crate::grammar::{ComponentKind, Modal, Mood, Tense};
use crate::nlp::{MentionInput, Pos};

/// One token of the token table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenData {
    pub text: String,
    pub lemma: String,
    pub pos: Pos,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub morph: Vec<String>,
    pub dep: String,
    pub head: usize,
    pub sent: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
    /// Embedding vector, persisted verbatim when present at encode
    /// time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
}

/// One component: head index, member indices, type tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentData {
    pub head: usize,
    pub kind: ComponentKind,
    pub members: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neg: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tense: Option<Tense>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal: Option<Modal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
}

/// One conjunct group, members referenced by phrase id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConjunctData {
    pub members: Vec<usize>,
    pub lead: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cconj: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preconj: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared: Vec<usize>,
}

/// One phrase: head component reference plus role-labelled children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseData {
    pub component: usize,
    /// Relation flag names, in stable order.
    pub dep: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sconj: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
}

/// One sentence grammar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarData {
    pub sent: usize,
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phrases: Vec<PhraseData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conjuncts: Vec<ConjunctData>,
}

/// One canonical entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityData {
    pub cluster: usize,
    pub canonical: MentionInput,
    pub mentions: Vec<MentionInput>,
}

/// Cross-sentence phrase reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhraseKeyData {
    pub sent: usize,
    pub phrase: usize,
}

/// One action argument: local reference plus optional canonical
/// substitution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionArgData {
    pub local: PhraseKeyData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<PhraseKeyData>,
}

/// One narrative action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub verb: PhraseKeyData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<ActionArgData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ActionArgData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<PhraseKeyData>,
}

/// A complete story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryData {
    pub tokens: Vec<TokenData>,
    pub sentences: Vec<GrammarData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<EntityData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionData>,
    #[serde(default)]
    pub dropped_mentions: usize,
    #[serde(default)]
    pub dropped_actions: usize,
}

/// A standalone sentence grammar with its token slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarExport {
    pub tokens: Vec<TokenData>,
    pub grammar: GrammarData,
}
