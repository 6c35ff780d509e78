//! Grammar components and the sentence partition builder.
//!
//! A component is a typed token group with exactly one head: a noun with
//! its determiner and compounds, a verb with its auxiliaries and
//! particle, a preposition chain, or a description. The builder
//! partitions every sentence token into exactly one component.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GrammarError;
use crate::grammar::rules::RuleTable;
use crate::nlp::{Doc, Token};

/// Component type, decided by the rule table from the head token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Noun,
    Verb,
    Desc,
    Prep,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Noun,
        ComponentKind::Verb,
        ComponentKind::Desc,
        ComponentKind::Prep,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Noun => "noun",
            ComponentKind::Verb => "verb",
            ComponentKind::Desc => "desc",
            ComponentKind::Prep => "prep",
        }
    }
}

/// Tense of a verb component, recovered from auxiliaries and morphology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tense {
    Past,
    Present,
    Future,
}

/// Modality of a verb component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modal {
    Ability,
    Possibility,
    Necessity,
    Obligation,
    Need,
}

/// Mood of a verb component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Real,
    Imperative,
}

/// A typed token group headed by one salient token.
///
/// `members` are the tokens pulled in by the type-specific inclusion
/// rules (head included); `sub` are leftover subtree tokens folded into
/// the nearest component. Together with the other components of the
/// sentence they partition the token set.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Document-level index of the head token.
    pub head: usize,
    pub kind: ComponentKind,
    /// Sorted token indices structurally part of the component.
    pub members: Vec<usize>,
    /// Sorted leftover subtree tokens (punctuation, unattached words).
    pub sub: Vec<usize>,
    /// Negation token, if present among the members.
    pub neg: Option<usize>,
    /// Verb components only.
    pub tense: Option<Tense>,
    pub modal: Option<Modal>,
    pub mood: Option<Mood>,
}

impl Component {
    fn new(head: usize, kind: ComponentKind) -> Self {
        Self {
            head,
            kind,
            members: vec![head],
            sub: Vec::new(),
            neg: None,
            tense: None,
            modal: None,
            mood: None,
        }
    }

    /// All tokens of the component (members and sub), sorted.
    pub fn tokens(&self) -> Vec<usize> {
        let mut all: Vec<usize> = self.members.iter().chain(&self.sub).copied().collect();
        all.sort_unstable();
        all
    }

    /// Surface text of the member tokens, in sentence order.
    pub fn text(&self, doc: &Doc) -> String {
        self.members
            .iter()
            .map(|&i| doc.token(i).text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index) || self.sub.contains(&index)
    }
}

/// Partitions one sentence's tokens into components.
pub(crate) struct ComponentBuilder<'a> {
    doc: &'a Doc,
    rules: &'a RuleTable,
}

impl<'a> ComponentBuilder<'a> {
    pub fn new(doc: &'a Doc, rules: &'a RuleTable) -> Self {
        Self { doc, rules }
    }

    /// Build the component partition of a sentence.
    ///
    /// Returns the components in head-token order and the mapping from
    /// each token index to its owning component.
    pub fn build(
        &self,
        sent: usize,
    ) -> Result<(Vec<Component>, HashMap<usize, usize>), GrammarError> {
        let (start, end) = self
            .doc
            .sentence_bounds(sent)
            .ok_or(GrammarError::SentenceOutOfRange(sent, self.doc.n_sentences()))?;
        self.check_tree(start, end)?;

        let mut components = self.find_heads(start, end);
        if components.is_empty() && end > start {
            // Degenerate sentence (e.g. all punctuation): root a single
            // description component at the sentence root so the
            // partition invariant still holds.
            let root = (start..end)
                .find(|&i| self.doc.token(i).is_sent_root())
                .unwrap_or(start);
            components.push(Component::new(root, ComponentKind::Desc));
        }

        let mut owner: HashMap<usize, usize> = components
            .iter()
            .enumerate()
            .map(|(ci, c)| (c.head, ci))
            .collect();

        self.claim_members(&mut components, &mut owner);
        self.attach_leftovers(start, end, &mut components, &mut owner);

        for comp in &mut components {
            comp.members.sort_unstable();
            comp.sub.sort_unstable();
            if comp.kind == ComponentKind::Verb {
                self.set_verb_attrs(comp);
            }
        }
        Ok((components, owner))
    }

    /// Reject head structures that are not trees.
    fn check_tree(&self, start: usize, end: usize) -> Result<(), GrammarError> {
        let len = end - start;
        for i in start..end {
            let mut current = i;
            for _ in 0..=len {
                let head = self.doc.token(current).head_index();
                if head == current {
                    break;
                }
                if head == i {
                    return Err(GrammarError::MalformedParse(format!(
                        "cyclic head chain through token {i}"
                    )));
                }
                current = head;
            }
        }
        Ok(())
    }

    /// Pass 1: decide which tokens head components, in token order.
    fn find_heads(&self, start: usize, end: usize) -> Vec<Component> {
        let mut components = Vec::new();
        for i in start..end {
            let tok = self.doc.token(i);
            if tok.pos().is_punct_like() || self.rules.attaches_to_parent(tok.dep()) {
                continue;
            }
            match self.rules.head_kind(&tok) {
                Some(kind) => components.push(Component::new(i, kind)),
                None => {
                    let err = GrammarError::UnknownComponentType {
                        index: i,
                        pos: tok.pos().to_string(),
                        dep: tok.dep().to_string(),
                    };
                    warn!(error = %err, "defaulting to a description component");
                    components.push(Component::new(i, ComponentKind::Desc));
                }
            }
        }
        components
    }

    /// Pass 2: pull structurally-included children into each component.
    fn claim_members(&self, components: &mut [Component], owner: &mut HashMap<usize, usize>) {
        for ci in 0..components.len() {
            let head = components[ci].head;
            let kind = components[ci].kind;
            let mut queue: Vec<Token<'_>> = self.doc.token(head).children().collect();
            while let Some(child) = queue.pop() {
                let idx = child.index();
                if owner.contains_key(&idx) || !self.rules.includes(kind, child.dep()) {
                    continue;
                }
                owner.insert(idx, ci);
                components[ci].members.push(idx);
                if self.rules.is_negation(child.dep()) {
                    components[ci].neg = Some(idx);
                }
                // Preposition chains and similar recursive inclusions.
                if self.rules.includes_recursively(kind, child.dep()) {
                    queue.extend(child.children());
                }
            }
        }
    }

    /// Pass 3: fold every remaining token into the nearest component.
    ///
    /// Punctuation and whitespace go to the nearest preceding component;
    /// other tokens climb their head chain first.
    fn attach_leftovers(
        &self,
        start: usize,
        end: usize,
        components: &mut [Component],
        owner: &mut HashMap<usize, usize>,
    ) {
        for i in start..end {
            if owner.contains_key(&i) {
                continue;
            }
            let tok = self.doc.token(i);
            let target = if tok.pos().is_punct_like() {
                self.nearest_component(i, start, end, owner)
            } else {
                self.climb_to_owner(tok, owner)
                    .or_else(|| self.nearest_component(i, start, end, owner))
            };
            if let Some(ci) = target {
                owner.insert(i, ci);
                components[ci].sub.push(i);
            } else {
                debug!(index = i, "token left without a component owner");
            }
        }
    }

    fn climb_to_owner(&self, tok: Token<'_>, owner: &HashMap<usize, usize>) -> Option<usize> {
        let mut current = tok;
        loop {
            if current.is_sent_root() {
                return owner.get(&current.index()).copied();
            }
            current = current.head();
            if let Some(&ci) = owner.get(&current.index()) {
                return Some(ci);
            }
        }
    }

    fn nearest_component(
        &self,
        index: usize,
        start: usize,
        end: usize,
        owner: &HashMap<usize, usize>,
    ) -> Option<usize> {
        (start..index)
            .rev()
            .find_map(|j| owner.get(&j).copied())
            .or_else(|| (index + 1..end).find_map(|j| owner.get(&j).copied()))
    }

    /// Recover tense, modality and mood from auxiliaries and morphology.
    fn set_verb_attrs(&self, comp: &mut Component) {
        let head = self.doc.token(comp.head);
        let auxes: Vec<Token<'_>> = comp
            .members
            .iter()
            .map(|&i| self.doc.token(i))
            .filter(|t| self.rules.is_auxiliary(t.dep()))
            .collect();

        let mut tense = None;
        for aux in &auxes {
            tense = match aux.lemma() {
                "will" | "shall" => Some(Tense::Future),
                "have" => Some(Tense::Past),
                _ if aux.has_morph("Tense=Past") => Some(Tense::Past),
                _ if aux.has_morph("Tense=Pres") => Some(Tense::Present),
                _ => None,
            };
            if tense.is_some() {
                break;
            }
        }
        comp.tense = tense.or_else(|| {
            if head.has_morph("Tense=Past") {
                Some(Tense::Past)
            } else {
                Some(Tense::Present)
            }
        });

        comp.modal = auxes.iter().find_map(|aux| match aux.lemma() {
            "can" | "could" => Some(Modal::Ability),
            "may" | "might" => Some(Modal::Possibility),
            "must" => Some(Modal::Necessity),
            "should" | "ought" => Some(Modal::Obligation),
            "need" => Some(Modal::Need),
            _ => None,
        });

        comp.mood = if head.is_sent_root() && head.has_morph("VerbForm=Inf") {
            Some(Mood::Imperative)
        } else {
            Some(Mood::Real)
        };
    }
}
