//! Cross-sentence aggregation: entities, actions and stories.
//!
//! The story aggregator is the barrier of the pipeline: it consumes
//! every sentence grammar, canonicalizes coreference clusters and
//! extracts narrative actions. Dangling references never abort the
//! build: the offending mention or action is dropped, logged and
//! counted in the report.

mod action;
mod entity;

pub use action::{Action, ActionArg, PhraseKey};
pub use entity::Entity;

use tracing::warn;

use crate::grammar::{ComponentKind, Dep, Grammar, PhraseId, PhraseRef};
use crate::nlp::{CorefCluster, Doc, MentionInput};

/// Per-sentence entry of the story report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceReport {
    pub sent: usize,
    pub components: usize,
    pub phrases: usize,
    /// Why the sentence yielded an empty grammar, if it did.
    pub failure: Option<String>,
}

/// Build report surfaced to callers instead of raised errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryReport {
    pub sentences: Vec<SentenceReport>,
    /// Coreference mentions dropped for referencing nonexistent tokens.
    pub dropped_mentions: usize,
    /// Actions dropped for dangling canonical references.
    pub dropped_actions: usize,
}

/// An ordered collection of sentence grammars with canonical entities
/// and aggregated actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    grammars: Vec<Grammar>,
    entities: Vec<Entity>,
    actions: Vec<Action>,
    report: StoryReport,
}

impl Story {
    /// Aggregate sentence grammars into a story.
    ///
    /// `grammars` must be ordered by sentence: `grammars[i]` is the
    /// grammar of sentence `i` of `doc` (failed sentences included as
    /// empty grammars).
    pub fn build(doc: &Doc, grammars: Vec<Grammar>, clusters: &[CorefCluster]) -> Self {
        let mut report = StoryReport::default();
        let entities = resolve_entities(doc, clusters, &mut report);
        let actions = extract_actions(&grammars, &entities, &mut report);
        report.sentences = grammars
            .iter()
            .map(|g| SentenceReport {
                sent: g.sent_index(),
                components: g.components().len(),
                phrases: g.phrases().len(),
                failure: g.failure().map(str::to_string),
            })
            .collect();
        Self {
            grammars,
            entities,
            actions,
            report,
        }
    }

    pub(crate) fn from_parts(
        grammars: Vec<Grammar>,
        entities: Vec<Entity>,
        actions: Vec<Action>,
        report: StoryReport,
    ) -> Self {
        Self {
            grammars,
            entities,
            actions,
            report,
        }
    }

    pub fn grammars(&self) -> &[Grammar] {
        &self.grammars
    }

    pub fn grammar(&self, sent: usize) -> Option<&Grammar> {
        self.grammars.get(sent)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn report(&self) -> &StoryReport {
        &self.report
    }

    /// Resolve a phrase key against the story's grammars.
    pub fn phrase<'a>(&'a self, doc: &'a Doc, key: PhraseKey) -> Option<PhraseRef<'a>> {
        let grammar = self.grammars.get(key.sent)?;
        if key.phrase >= grammar.phrases().len() {
            return None;
        }
        Some(grammar.phrase(doc, key.phrase))
    }
}

/// Validate clusters and pick canonical mentions (first in document
/// order). Invalid mentions are dropped; clusters left without valid
/// mentions produce no entity.
fn resolve_entities(
    doc: &Doc,
    clusters: &[CorefCluster],
    report: &mut StoryReport,
) -> Vec<Entity> {
    let mut entities = Vec::new();
    for (index, cluster) in clusters.iter().enumerate() {
        let mut mentions: Vec<MentionInput> = Vec::new();
        for mention in &cluster.mentions {
            let valid = doc
                .sentence_bounds(mention.sent)
                .is_some_and(|(start, end)| {
                    mention.start < mention.end && mention.end <= end - start
                });
            if valid {
                mentions.push(*mention);
            } else {
                warn!(
                    cluster = index,
                    sent = mention.sent,
                    start = mention.start,
                    end = mention.end,
                    "dropping coreference mention with dangling reference",
                );
                report.dropped_mentions += 1;
            }
        }
        if mentions.is_empty() {
            continue;
        }
        mentions.sort_by_key(|m| (m.sent, m.start, m.end));
        let canonical = mentions[0];
        entities.push(Entity {
            cluster: index,
            canonical,
            mentions,
        });
    }
    entities
}

/// Extract one action per verb phrase reachable from the sentence
/// roots. Actions whose coreference substitution dangles are dropped.
fn extract_actions(
    grammars: &[Grammar],
    entities: &[Entity],
    report: &mut StoryReport,
) -> Vec<Action> {
    let mut actions = Vec::new();
    for grammar in grammars {
        let sent = grammar.sent_index();
        let mut reachable = vec![false; grammar.phrases().len()];
        for root in grammar.roots() {
            for id in grammar.graph().subdag(root) {
                reachable[id] = true;
            }
        }
        for id in 0..grammar.phrases().len() {
            if !reachable[id]
                || grammar.components()[grammar.phrases()[id].component].kind
                    != ComponentKind::Verb
            {
                continue;
            }
            match build_action(grammars, entities, grammar, sent, id) {
                Some(action) => actions.push(action),
                None => {
                    warn!(sent, phrase = id, "dropping action with dangling reference");
                    report.dropped_actions += 1;
                }
            }
        }
    }
    actions
}

fn build_action(
    grammars: &[Grammar],
    entities: &[Entity],
    grammar: &Grammar,
    sent: usize,
    verb: PhraseId,
) -> Option<Action> {
    let children = grammar.graph().children(verb);
    let dep_of = |id: PhraseId| grammar.phrases()[id].dep;

    let mut subjects = Vec::new();
    let mut objects = Vec::new();
    let mut descriptions = Vec::new();
    for &child in children {
        let dep = dep_of(child);
        let key = PhraseKey { sent, phrase: child };
        if dep.contains(Dep::SUBJ) {
            subjects.push(ActionArg {
                local: key,
                canonical: canonicalize(grammars, entities, grammar, sent, child)?,
            });
        }
        if dep.is_object() {
            objects.push(ActionArg {
                local: key,
                canonical: canonicalize(grammars, entities, grammar, sent, child)?,
            });
        }
        if dep.is_description() {
            descriptions.push(key);
        }
    }
    Some(Action {
        verb: PhraseKey { sent, phrase: verb },
        subjects,
        objects,
        descriptions,
    })
}

/// Find the canonical substitution for a phrase, if its head token
/// falls inside a non-canonical coreference mention.
///
/// Returns `Some(None)` when no substitution applies and `None` when
/// the canonical mention cannot be resolved to a phrase (a dangling
/// reference; the caller drops the action).
fn canonicalize(
    grammars: &[Grammar],
    entities: &[Entity],
    grammar: &Grammar,
    sent: usize,
    phrase: PhraseId,
) -> Option<Option<PhraseKey>> {
    let (start, _) = grammar.token_bounds();
    let head = grammar.components()[grammar.phrases()[phrase].component].head;
    let local = head - start;

    let entity = match entities.iter().find(|e| e.covers(sent, local)) {
        Some(entity) => entity,
        None => return Some(None),
    };
    let canonical = entity.canonical;
    if canonical.sent == sent && canonical.start <= local && local < canonical.end {
        // The phrase already is the canonical mention.
        return Some(None);
    }
    let target = grammars.get(canonical.sent)?;
    let phrase_id = phrase_in_span(target, canonical)?;
    Some(Some(PhraseKey {
        sent: canonical.sent,
        phrase: phrase_id,
    }))
}

/// The phrase of a grammar whose head token lies within a mention
/// span. Noun phrases win over other kinds.
fn phrase_in_span(grammar: &Grammar, mention: MentionInput) -> Option<PhraseId> {
    let (start, _) = grammar.token_bounds();
    let in_span = |id: PhraseId| {
        let head = grammar.components()[grammar.phrases()[id].component].head;
        head >= start + mention.start && head < start + mention.end
    };
    let candidates: Vec<PhraseId> = (0..grammar.phrases().len()).filter(|&id| in_span(id)).collect();
    candidates
        .iter()
        .copied()
        .find(|&id| grammar.components()[grammar.phrases()[id].component].kind == ComponentKind::Noun)
        .or_else(|| candidates.first().copied())
}
