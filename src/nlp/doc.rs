//! Document token table and the read-only token view.
//!
//! `Doc` owns every token of a parsed document in a single table with
//! document-level indices; `Token` is a copy-free view into it. Grammar
//! structures hold token indices, never token copies.

use crate::error::{GrammarError, Result};
use crate::nlp::types::{Pos, SentenceInput, TokenInput};

/// Stored form of one token. Head and sentence indices are
/// document-level; the sentence root points at itself.
#[derive(Debug, Clone)]
pub(crate) struct TokenRecord {
    pub text: String,
    pub lemma: String,
    pub pos: Pos,
    pub morph: Vec<String>,
    pub dep: String,
    pub head: usize,
    pub sent: usize,
    pub cluster: Option<usize>,
    pub vector: Option<Vec<f32>>,
}

/// A parsed document: the token table plus sentence boundaries.
#[derive(Debug, Clone, Default)]
pub struct Doc {
    tokens: Vec<TokenRecord>,
    bounds: Vec<(usize, usize)>,
}

impl Doc {
    /// Build a document from per-sentence parser output, rebasing
    /// sentence-local head indices to document offsets.
    ///
    /// Fails with `MalformedParse` if any head index lies outside its
    /// sentence. The input contract guarantees in-range heads, so a
    /// violation is rejected at ingestion rather than deferred.
    pub fn from_sentences(sentences: Vec<SentenceInput>) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut bounds = Vec::new();
        for (sent, sentence) in sentences.into_iter().enumerate() {
            let offset = tokens.len();
            let len = sentence.tokens.len();
            for tok in &sentence.tokens {
                if tok.head >= len {
                    return Err(GrammarError::MalformedParse(format!(
                        "sentence {sent}: head index {} out of range ({len} tokens)",
                        tok.head
                    ))
                    .into());
                }
            }
            for TokenInput {
                text,
                lemma,
                pos,
                morph,
                dep,
                head,
                cluster,
                vector,
            } in sentence.tokens
            {
                tokens.push(TokenRecord {
                    text,
                    lemma,
                    pos,
                    morph,
                    dep,
                    head: offset + head,
                    sent,
                    cluster,
                    vector,
                });
            }
            bounds.push((offset, offset + len));
        }
        Ok(Self { tokens, bounds })
    }

    /// Rebuild a document from stored records (codec use).
    pub(crate) fn from_records(tokens: Vec<TokenRecord>, bounds: Vec<(usize, usize)>) -> Self {
        Self { tokens, bounds }
    }

    /// Number of tokens in the document.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of sentences.
    pub fn n_sentences(&self) -> usize {
        self.bounds.len()
    }

    /// Document-level `[start, end)` token range of a sentence.
    pub fn sentence_bounds(&self, sent: usize) -> Option<(usize, usize)> {
        self.bounds.get(sent).copied()
    }

    /// View of the token at a document-level index.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn token(&self, index: usize) -> Token<'_> {
        assert!(index < self.tokens.len(), "token index out of range");
        Token { doc: self, index }
    }

    /// Iterate over all tokens of the document.
    pub fn tokens(&self) -> impl Iterator<Item = Token<'_>> + '_ {
        (0..self.tokens.len()).map(move |index| Token { doc: self, index })
    }

    /// Iterate over the tokens of one sentence.
    pub fn sentence_tokens(&self, sent: usize) -> impl Iterator<Item = Token<'_>> + '_ {
        let (start, end) = self.sentence_bounds(sent).unwrap_or((0, 0));
        (start..end).map(move |index| Token { doc: self, index })
    }

    /// Dimension of the embedding vectors, if any token carries one.
    pub fn vector_dim(&self) -> Option<usize> {
        self.tokens
            .iter()
            .find_map(|t| t.vector.as_ref().map(Vec::len))
    }

    pub(crate) fn record(&self, index: usize) -> &TokenRecord {
        &self.tokens[index]
    }
}

/// Read-only view of one token: a document reference plus an index.
#[derive(Clone, Copy)]
pub struct Token<'a> {
    doc: &'a Doc,
    index: usize,
}

impl<'a> Token<'a> {
    /// Document-level index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &'a str {
        &self.doc.record(self.index).text
    }

    pub fn lemma(&self) -> &'a str {
        &self.doc.record(self.index).lemma
    }

    pub fn pos(&self) -> Pos {
        self.doc.record(self.index).pos
    }

    pub fn morph(&self) -> &'a [String] {
        &self.doc.record(self.index).morph
    }

    /// Dependency label relative to the head.
    pub fn dep(&self) -> &'a str {
        &self.doc.record(self.index).dep
    }

    /// Document-level index of the head token.
    pub fn head_index(&self) -> usize {
        self.doc.record(self.index).head
    }

    /// View of the head token.
    pub fn head(&self) -> Token<'a> {
        self.doc.token(self.head_index())
    }

    /// Whether this token is the root of its sentence.
    pub fn is_sent_root(&self) -> bool {
        self.head_index() == self.index
    }

    /// Index of the sentence this token belongs to.
    pub fn sent_index(&self) -> usize {
        self.doc.record(self.index).sent
    }

    pub fn cluster(&self) -> Option<usize> {
        self.doc.record(self.index).cluster
    }

    pub fn vector(&self) -> Option<&'a [f32]> {
        self.doc.record(self.index).vector.as_deref()
    }

    /// Whether a named morphological tag is present (e.g. `"Tense=Past"`).
    pub fn has_morph(&self, tag: &str) -> bool {
        self.morph().iter().any(|m| m == tag)
    }

    /// Direct dependents of this token within its sentence.
    pub fn children(&self) -> impl Iterator<Item = Token<'a>> + 'a {
        let doc = self.doc;
        let index = self.index;
        doc.sentence_tokens(self.sent_index())
            .filter(move |t| t.head_index() == index && t.index() != index)
    }
}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Token({} {:?} {}/{})",
            self.index,
            self.text(),
            self.pos(),
            self.dep()
        )
    }
}
