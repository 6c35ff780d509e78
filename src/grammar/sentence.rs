//! Sentence grammar: build orchestration and queries.
//!
//! `Grammar::build` runs the full per-sentence pipeline (component
//! partition, conjunct resolution, phrase linking, conjunct rewrite
//! passes) and freezes the result. Everything is immutable afterwards,
//! so queries and traversals are restartable and side-effect free.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::grammar::components::{Component, ComponentBuilder, ComponentKind};
use crate::grammar::conjuncts::{self, ConjunctGroup, ConjunctPolicy};
use crate::grammar::graph::PhraseGraph;
use crate::grammar::phrases::{Dep, Phrase, PhraseId};
use crate::grammar::rules::RuleTable;
use crate::nlp::{Doc, Token};

/// The semantic grammar of one sentence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    sent: usize,
    start: usize,
    end: usize,
    components: Vec<Component>,
    phrases: Vec<Phrase>,
    graph: PhraseGraph,
    conjuncts: Vec<ConjunctGroup>,
    failure: Option<String>,
}

impl Grammar {
    /// Build the grammar of one sentence. Pure and deterministic: the
    /// same token and dependency data always yields an identical
    /// phrase graph.
    pub fn build(
        doc: &Doc,
        sent: usize,
        rules: &RuleTable,
        policy: ConjunctPolicy,
    ) -> Result<Self> {
        let (start, end) = doc
            .sentence_bounds(sent)
            .ok_or(crate::error::GrammarError::SentenceOutOfRange(
                sent,
                doc.n_sentences(),
            ))?;
        let (components, owner) = ComponentBuilder::new(doc, rules).build(sent)?;

        let n = components.len();
        let mut phrases: Vec<Phrase> = (0..n)
            .map(|ci| Phrase {
                component: ci,
                dep: Dep::empty(),
                sconj: None,
                lead: None,
            })
            .collect();
        let mut graph = PhraseGraph::new(n);

        // Initial links following the dependency tree.
        for ci in 0..n {
            match find_parent(doc, &components, &owner, ci) {
                Some(parent) => {
                    phrases[ci].dep = rules.relation(doc, &components[ci], &components[parent]);
                    phrases[ci].sconj = find_sconj(doc, rules, &components[ci]);
                    graph.try_link(parent, ci);
                }
                None => phrases[ci].dep = Dep::ROOT,
            }
        }

        // Conjunct groups; members inherit the lead's relation.
        let mut groups = conjuncts::find_groups(doc, &components, &owner, rules);
        for group in &groups {
            let lead = group.lead_phrase();
            let lead_dep = phrases[lead].dep;
            for &m in &group.members {
                phrases[m].lead = Some(lead);
                if m != lead {
                    phrases[m].dep |= lead_dep;
                }
            }
        }

        destroy_conjunct_links(&phrases, &mut graph);
        propagate_children_conjuncts(&groups, &mut graph);
        propagate_subjects(&phrases, &groups, &mut graph);
        propagate_descriptions(&phrases, &groups, &mut graph);
        propagate_cdesc_subclauses(&phrases, &groups, &mut graph);
        if policy == ConjunctPolicy::BroadestScope {
            share_trailing_dependents(&phrases, &components, &mut groups, &mut graph);
        }

        graph.freeze();
        debug_assert!(graph.is_acyclic());

        Ok(Self {
            sent,
            start,
            end,
            components,
            phrases,
            graph,
            conjuncts: groups,
            failure: None,
        })
    }

    /// An empty grammar recording why the sentence failed to build.
    pub fn failed(doc: &Doc, sent: usize, reason: impl Into<String>) -> Self {
        let (start, end) = doc.sentence_bounds(sent).unwrap_or((0, 0));
        Self {
            sent,
            start,
            end,
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(
        sent: usize,
        start: usize,
        end: usize,
        components: Vec<Component>,
        phrases: Vec<Phrase>,
        graph: PhraseGraph,
        conjuncts: Vec<ConjunctGroup>,
        failure: Option<String>,
    ) -> Self {
        Self {
            sent,
            start,
            end,
            components,
            phrases,
            graph,
            conjuncts,
            failure,
        }
    }

    // Accessors ----------------------------------------------------------

    pub fn sent_index(&self) -> usize {
        self.sent
    }

    /// Document-level `[start, end)` token range of the sentence.
    pub fn token_bounds(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub fn graph(&self) -> &PhraseGraph {
        &self.graph
    }

    pub fn conjunct_groups(&self) -> &[ConjunctGroup] {
        &self.conjuncts
    }

    /// Why the sentence failed to build, if it did.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Root phrase ids (conjoined roots included).
    pub fn roots(&self) -> Vec<PhraseId> {
        (0..self.phrases.len())
            .filter(|&id| self.phrases[id].dep.contains(Dep::ROOT))
            .collect()
    }

    /// Fraction of sentence tokens covered by components.
    pub fn coverage(&self) -> f64 {
        let len = self.end.saturating_sub(self.start);
        if len == 0 {
            return 0.0;
        }
        let covered: usize = self.components.iter().map(|c| c.tokens().len()).sum();
        covered as f64 / len as f64
    }

    /// View of one phrase.
    pub fn phrase<'a>(&'a self, doc: &'a Doc, id: PhraseId) -> PhraseRef<'a> {
        PhraseRef {
            doc,
            grammar: self,
            id,
        }
    }

    /// Iterate over all phrases, in head-token order.
    pub fn iter_phrases<'a>(&'a self, doc: &'a Doc) -> impl Iterator<Item = PhraseRef<'a>> + 'a {
        (0..self.phrases.len()).map(move |id| self.phrase(doc, id))
    }

    /// Lazily filter phrases. Restartable: every call yields a fresh
    /// iterator over the immutable arena.
    pub fn query<'a>(
        &'a self,
        doc: &'a Doc,
        filter: PhraseFilter,
    ) -> impl Iterator<Item = PhraseRef<'a>> + 'a {
        self.iter_phrases(doc).filter(move |p| filter.matches(p))
    }

    /// All root-to-leaf semantic relations reachable in the DAG.
    ///
    /// One relation per (subject, object) combination of every verb
    /// phrase reachable from the roots; a shared sub-phrase appears in
    /// the relations of every verb that governs it. Deterministic order;
    /// restartable (rebuilt per call).
    pub fn iter_relations(&self) -> impl Iterator<Item = Relation> + '_ {
        let mut reachable = vec![false; self.phrases.len()];
        for root in self.roots() {
            for id in self.graph.subdag(root) {
                reachable[id] = true;
            }
        }
        let mut relations = Vec::new();
        for id in 0..self.phrases.len() {
            if !reachable[id] || self.components[self.phrases[id].component].kind != ComponentKind::Verb
            {
                continue;
            }
            let child_deps = |want: fn(Dep) -> bool| -> Vec<PhraseId> {
                self.graph
                    .children(id)
                    .iter()
                    .copied()
                    .filter(|&c| want(self.phrases[c].dep))
                    .collect()
            };
            let subjects = child_deps(|d| d.contains(Dep::SUBJ));
            let objects = child_deps(|d| d.is_object());
            let descriptions = child_deps(|d| d.is_description());

            let subject_slots: Vec<Option<PhraseId>> = if subjects.is_empty() {
                vec![None]
            } else {
                subjects.into_iter().map(Some).collect()
            };
            let object_slots: Vec<Option<PhraseId>> = if objects.is_empty() {
                vec![None]
            } else {
                objects.into_iter().map(Some).collect()
            };
            for &subject in &subject_slots {
                for &object in &object_slots {
                    relations.push(Relation {
                        subject,
                        verb: id,
                        object,
                        descriptions: descriptions.clone(),
                    });
                }
            }
        }
        relations.into_iter()
    }
}

/// One semantic relation: subject–verb–object plus descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub subject: Option<PhraseId>,
    pub verb: PhraseId,
    pub object: Option<PhraseId>,
    pub descriptions: Vec<PhraseId>,
}

impl Relation {
    /// Render the relation as surface text per slot.
    ///
    /// The verb slot is the verb component alone; argument slots render
    /// their full phrase subdags.
    pub fn texts(&self, doc: &Doc, grammar: &Grammar) -> RelationText {
        let text = |id: PhraseId| grammar.phrase(doc, id).text();
        let verb = grammar.components[grammar.phrases[self.verb].component].text(doc);
        RelationText {
            subject: self.subject.map(text),
            verb,
            object: self.object.map(text),
            descriptions: self.descriptions.iter().map(|&d| text(d)).collect(),
        }
    }
}

/// Text form of a relation, used for comparison and reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationText {
    pub subject: Option<String>,
    pub verb: String,
    pub object: Option<String>,
    pub descriptions: Vec<String>,
}

/// Phrase filter for [`Grammar::query`].
#[derive(Debug, Clone, Default)]
pub struct PhraseFilter {
    dep: Option<Dep>,
    kind: Option<ComponentKind>,
    lemma: Option<String>,
    contains: Option<String>,
}

impl PhraseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the phrase relation to intersect `dep`.
    pub fn dep(mut self, dep: Dep) -> Self {
        self.dep = Some(dep);
        self
    }

    /// Require the head component kind.
    pub fn kind(mut self, kind: ComponentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Require the head token lemma.
    pub fn lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// Require the phrase text to contain a substring.
    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.contains = Some(needle.into());
        self
    }

    fn matches(&self, phrase: &PhraseRef<'_>) -> bool {
        if let Some(dep) = self.dep {
            if !phrase.dep().intersects(dep) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if phrase.kind() != kind {
                return false;
            }
        }
        if let Some(lemma) = &self.lemma {
            if phrase.head_token().lemma() != lemma {
                return false;
            }
        }
        if let Some(needle) = &self.contains {
            if !phrase.text().contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Read-only view of one phrase within its grammar and document.
#[derive(Clone, Copy)]
pub struct PhraseRef<'a> {
    doc: &'a Doc,
    grammar: &'a Grammar,
    id: PhraseId,
}

impl<'a> PhraseRef<'a> {
    pub fn id(&self) -> PhraseId {
        self.id
    }

    pub fn grammar(&self) -> &'a Grammar {
        self.grammar
    }

    pub fn doc(&self) -> &'a Doc {
        self.doc
    }

    fn phrase(&self) -> &'a Phrase {
        &self.grammar.phrases[self.id]
    }

    pub fn dep(&self) -> Dep {
        self.phrase().dep
    }

    pub fn sconj(&self) -> Option<usize> {
        self.phrase().sconj
    }

    /// Head component of the phrase.
    pub fn component(&self) -> &'a Component {
        &self.grammar.components[self.phrase().component]
    }

    pub fn kind(&self) -> ComponentKind {
        self.component().kind
    }

    pub fn head_token(&self) -> Token<'a> {
        self.doc.token(self.component().head)
    }

    pub fn children(&self) -> Vec<PhraseRef<'a>> {
        self.grammar
            .graph
            .children(self.id)
            .iter()
            .map(|&c| self.grammar.phrase(self.doc, c))
            .collect()
    }

    pub fn parents(&self) -> Vec<PhraseRef<'a>> {
        self.grammar
            .graph
            .parents(self.id)
            .iter()
            .map(|&p| self.grammar.phrase(self.doc, p))
            .collect()
    }

    /// Phrase ids of the subdag rooted here, first-seen order.
    pub fn subdag_ids(&self) -> Vec<PhraseId> {
        self.grammar.graph.subdag(self.id)
    }

    /// Sorted member-token indices of the whole subdag, including the
    /// subordinating conjunctions of nested phrases.
    pub fn token_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        for sub in self.subdag_ids() {
            let phrase = &self.grammar.phrases[sub];
            indices.extend(&self.grammar.components[phrase.component].members);
            if sub != self.id {
                if let Some(sconj) = phrase.sconj {
                    indices.push(sconj);
                }
            }
        }
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Surface text of the phrase subdag, in sentence order.
    pub fn text(&self) -> String {
        self.token_indices()
            .iter()
            .map(|&i| self.doc.token(i).text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn head_text(&self) -> &'a str {
        self.head_token().text()
    }

    /// The conjunct group this phrase belongs to, if any.
    pub fn conjunct_group(&self) -> Option<&'a ConjunctGroup> {
        self.grammar.conjuncts.iter().find(|g| g.contains(self.id))
    }
}

impl std::fmt::Debug for PhraseRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PhraseRef({} {:?} {:?})",
            self.id,
            self.text(),
            self.dep()
        )
    }
}

// Construction internals -------------------------------------------------

/// Component whose phrase governs `ci`: the owner of the head-of-head
/// token, climbing past tokens of the same component.
fn find_parent(
    doc: &Doc,
    components: &[Component],
    owner: &HashMap<usize, usize>,
    ci: usize,
) -> Option<usize> {
    let mut current = doc.token(components[ci].head);
    loop {
        if current.is_sent_root() {
            return None;
        }
        current = current.head();
        if let Some(&parent) = owner.get(&current.index()) {
            if parent != ci {
                return Some(parent);
            }
        }
    }
}

fn find_sconj(doc: &Doc, rules: &RuleTable, comp: &Component) -> Option<usize> {
    comp.members
        .iter()
        .chain(&comp.sub)
        .map(|&i| doc.token(i))
        .find(|t| rules.is_subordinator(t))
        .map(|t| t.index())
}

/// Drop the raw conj edges; coordination is re-expressed through the
/// group structure.
fn destroy_conjunct_links(phrases: &[Phrase], graph: &mut PhraseGraph) {
    for parent in 0..graph.len() {
        for child in graph.children(parent).to_vec() {
            if phrases[child].dep.contains(Dep::CONJ) {
                graph.unlink(parent, child);
            }
        }
    }
}

/// Parents of a group lead adopt every member of the group.
fn propagate_children_conjuncts(groups: &[ConjunctGroup], graph: &mut PhraseGraph) {
    for group in groups {
        let lead = group.lead_phrase();
        for parent in graph.parents(lead).to_vec() {
            for &member in &group.members {
                if member != lead {
                    graph.try_link(parent, member);
                }
            }
        }
    }
}

fn has_child_with(graph: &PhraseGraph, phrases: &[Phrase], id: PhraseId, want: Dep) -> bool {
    graph
        .children(id)
        .iter()
        .any(|&c| phrases[c].dep.intersects(want))
}

/// Subject-free conjunct members share the lead's subjects.
fn propagate_subjects(phrases: &[Phrase], groups: &[ConjunctGroup], graph: &mut PhraseGraph) {
    propagate_from_lead(phrases, groups, graph, Dep::SUBJ, None);
}

/// Description-free conjunct members share the lead's descriptions.
fn propagate_descriptions(phrases: &[Phrase], groups: &[ConjunctGroup], graph: &mut PhraseGraph) {
    propagate_from_lead(
        phrases,
        groups,
        graph,
        Dep::DESC | Dep::CDESC | Dep::ADESC,
        None,
    );
}

/// Clausal descriptions share their subclauses along the group.
fn propagate_cdesc_subclauses(
    phrases: &[Phrase],
    groups: &[ConjunctGroup],
    graph: &mut PhraseGraph,
) {
    propagate_from_lead(phrases, groups, graph, Dep::SUBCL, Some(Dep::CDESC));
}

fn propagate_from_lead(
    phrases: &[Phrase],
    groups: &[ConjunctGroup],
    graph: &mut PhraseGraph,
    want: Dep,
    lead_requires: Option<Dep>,
) {
    for group in groups {
        let lead = group.lead_phrase();
        if let Some(required) = lead_requires {
            if !phrases[lead].dep.intersects(required) {
                continue;
            }
        }
        let shared: Vec<PhraseId> = graph
            .children(lead)
            .iter()
            .copied()
            .filter(|&c| phrases[c].dep.intersects(want))
            .collect();
        if shared.is_empty() {
            continue;
        }
        for &member in &group.members {
            if member == lead || has_child_with(graph, phrases, member, want) {
                continue;
            }
            for &child in &shared {
                if !graph.try_link(member, child) {
                    debug!(member, child, "conjunct propagation link rejected");
                }
            }
        }
    }
}

/// Broadest-scope policy: dependents trailing the whole group are
/// recorded on the group, and trailing objects are shared with
/// object-free members.
fn share_trailing_dependents(
    phrases: &[Phrase],
    components: &[Component],
    groups: &mut [ConjunctGroup],
    graph: &mut PhraseGraph,
) {
    for group in groups.iter_mut() {
        let last_head = group
            .members
            .iter()
            .map(|&m| components[phrases[m].component].head)
            .max()
            .unwrap_or(0);
        let mut shared = Vec::new();
        for &member in &group.members {
            for child in graph.children(member).to_vec() {
                if group.members.contains(&child) {
                    continue;
                }
                if components[phrases[child].component].head <= last_head {
                    continue;
                }
                shared.push(child);
                if phrases[child].dep.intersects(Dep::DOBJ) {
                    for &other in &group.members {
                        if other != member && !has_child_with(graph, phrases, other, Dep::DOBJ) {
                            graph.try_link(other, child);
                        }
                    }
                }
            }
        }
        shared.sort_unstable();
        shared.dedup();
        group.shared = shared;
    }
}
