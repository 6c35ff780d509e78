//! Part-of-speech tags and input contract types.
//!
//! These types mirror the output contract of the external dependency
//! parser: per sentence an ordered token list with text, lemma, POS tag,
//! dependency label and sentence-local head index, plus optional
//! embedding vectors and coreference-cluster ids.

use serde::{Deserialize, Serialize};

/// Universal-Dependencies-style part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    Space,
    X,
}

impl Pos {
    /// Tag name as emitted by the parser.
    pub fn name(self) -> &'static str {
        match self {
            Pos::Adj => "ADJ",
            Pos::Adp => "ADP",
            Pos::Adv => "ADV",
            Pos::Aux => "AUX",
            Pos::Cconj => "CCONJ",
            Pos::Det => "DET",
            Pos::Intj => "INTJ",
            Pos::Noun => "NOUN",
            Pos::Num => "NUM",
            Pos::Part => "PART",
            Pos::Pron => "PRON",
            Pos::Propn => "PROPN",
            Pos::Punct => "PUNCT",
            Pos::Sconj => "SCONJ",
            Pos::Sym => "SYM",
            Pos::Verb => "VERB",
            Pos::Space => "SPACE",
            Pos::X => "X",
        }
    }

    /// Punctuation and whitespace tokens never start a component.
    pub fn is_punct_like(self) -> bool {
        matches!(self, Pos::Punct | Pos::Space)
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One token as produced by the external parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInput {
    /// Surface text.
    pub text: String,
    /// Lemmatized form.
    pub lemma: String,
    /// Part-of-speech tag.
    pub pos: Pos,
    /// Morphological tags (e.g. `"Tense=Past"`).
    #[serde(default)]
    pub morph: Vec<String>,
    /// Dependency label relative to the head.
    pub dep: String,
    /// Sentence-local index of the head token. The sentence root points
    /// at itself.
    pub head: usize,
    /// Coreference-cluster id, if the coreference resolver assigned one.
    #[serde(default)]
    pub cluster: Option<usize>,
    /// Embedding vector, if the embedding collaborator provided one.
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
}

/// One parsed sentence: the per-sentence input contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceInput {
    pub tokens: Vec<TokenInput>,
}

/// A single mention inside a coreference cluster: a sentence-local
/// token span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionInput {
    pub sent: usize,
    pub start: usize,
    pub end: usize,
}

/// A coreference cluster: mentions asserted to denote the same
/// real-world referent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorefCluster {
    pub mentions: Vec<MentionInput>,
}
