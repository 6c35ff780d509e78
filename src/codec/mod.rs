//! Serialization codec.
//!
//! Converts stories and grammars to and from an order-preserving
//! structure of primitives, reconstructible without the original
//! parser or embedding model. Encoding is stable under re-encoding:
//! `encode(decode(encode(x))) == encode(x)` byte for byte.

mod data;

pub use data::{
    ActionArgData, ActionData, ComponentData, ConjunctData, EntityData, GrammarData,
    GrammarExport, PhraseData, PhraseKeyData, StoryData, TokenData,
};

use tracing::warn;

use crate::error::{CodecError, Result};
use crate::grammar::{
    Component, ConjunctGroup, Dep, Grammar, Phrase, PhraseGraph,
};
use crate::nlp::{Doc, Token};
use crate::story::{
    Action, ActionArg, Entity, PhraseKey, SentenceReport, Story, StoryReport,
};

// Encoding ---------------------------------------------------------------

/// Encode a story into an order-preserving JSON structure.
pub fn encode_story(doc: &Doc, story: &Story) -> Result<serde_json::Value> {
    let data = StoryData {
        tokens: doc.tokens().map(|t| token_data(&t, 0, None)).collect(),
        sentences: story.grammars().iter().map(|g| grammar_data(g, 0)).collect(),
        entities: story
            .entities()
            .iter()
            .map(|e| EntityData {
                cluster: e.cluster,
                canonical: e.canonical,
                mentions: e.mentions.clone(),
            })
            .collect(),
        actions: story.actions().iter().map(action_data).collect(),
        dropped_mentions: story.report().dropped_mentions,
        dropped_actions: story.report().dropped_actions,
    };
    Ok(serde_json::to_value(data).map_err(CodecError::Serialization)?)
}

/// Encode one sentence grammar together with its token slice,
/// rebased to start at index zero.
pub fn encode_grammar(doc: &Doc, grammar: &Grammar) -> Result<serde_json::Value> {
    let (start, end) = grammar.token_bounds();
    let export = GrammarExport {
        tokens: (start..end)
            .map(|i| token_data(&doc.token(i), start, Some(0)))
            .collect(),
        grammar: grammar_data(grammar, start),
    };
    Ok(serde_json::to_value(export).map_err(CodecError::Serialization)?)
}

/// Serialize an encoded structure to canonical bytes.
pub fn to_bytes(value: &serde_json::Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value).map_err(CodecError::Serialization)?)
}

/// Parse canonical bytes back into an encoded structure.
pub fn from_bytes(bytes: &[u8]) -> Result<serde_json::Value> {
    Ok(serde_json::from_slice(bytes).map_err(CodecError::Serialization)?)
}

fn token_data(tok: &Token<'_>, offset: usize, sent_override: Option<usize>) -> TokenData {
    TokenData {
        text: tok.text().to_string(),
        lemma: tok.lemma().to_string(),
        pos: tok.pos(),
        morph: tok.morph().to_vec(),
        dep: tok.dep().to_string(),
        head: tok.head_index() - offset,
        sent: sent_override.unwrap_or_else(|| tok.sent_index()),
        cluster: tok.cluster(),
        vector: tok.vector().map(<[f32]>::to_vec),
    }
}

fn grammar_data(grammar: &Grammar, offset: usize) -> GrammarData {
    let (start, end) = grammar.token_bounds();
    let shift = |i: usize| i - offset;
    GrammarData {
        sent: if offset == 0 { grammar.sent_index() } else { 0 },
        start: start - offset,
        end: end - offset,
        failure: grammar.failure().map(str::to_string),
        components: grammar
            .components()
            .iter()
            .map(|c| ComponentData {
                head: shift(c.head),
                kind: c.kind,
                members: c.members.iter().map(|&i| shift(i)).collect(),
                sub: c.sub.iter().map(|&i| shift(i)).collect(),
                neg: c.neg.map(shift),
                tense: c.tense,
                modal: c.modal,
                mood: c.mood,
            })
            .collect(),
        phrases: (0..grammar.phrases().len())
            .map(|id| {
                let phrase = &grammar.phrases()[id];
                PhraseData {
                    component: phrase.component,
                    dep: phrase.dep.names().iter().map(|s| s.to_string()).collect(),
                    sconj: phrase.sconj.map(shift),
                    lead: phrase.lead,
                    children: grammar.graph().children(id).to_vec(),
                }
            })
            .collect(),
        conjuncts: grammar
            .conjunct_groups()
            .iter()
            .map(|g| ConjunctData {
                members: g.members.clone(),
                lead: g.lead,
                cconj: g.cconj.map(shift),
                preconj: g.preconj.map(shift),
                shared: g.shared.clone(),
            })
            .collect(),
    }
}

fn action_data(action: &Action) -> ActionData {
    let key = |k: PhraseKey| PhraseKeyData {
        sent: k.sent,
        phrase: k.phrase,
    };
    let arg = |a: &ActionArg| ActionArgData {
        local: key(a.local),
        canonical: a.canonical.map(key),
    };
    ActionData {
        verb: key(action.verb),
        subjects: action.subjects.iter().map(arg).collect(),
        objects: action.objects.iter().map(arg).collect(),
        descriptions: action.descriptions.iter().copied().map(key).collect(),
    }
}

// Decoding ---------------------------------------------------------------

/// Decode a story encoded with [`encode_story`].
pub fn decode_story(value: &serde_json::Value) -> Result<(Doc, Story)> {
    let data: StoryData =
        serde_json::from_value(value.clone()).map_err(CodecError::Serialization)?;

    let bounds: Vec<(usize, usize)> = data.sentences.iter().map(|s| (s.start, s.end)).collect();
    let doc = decode_doc(&data.tokens, bounds)?;

    let mut grammars = Vec::with_capacity(data.sentences.len());
    for sentence in &data.sentences {
        grammars.push(decode_grammar_data(sentence, doc.len())?);
    }

    let entities: Vec<Entity> = data
        .entities
        .iter()
        .map(|e| Entity {
            cluster: e.cluster,
            canonical: e.canonical,
            mentions: e.mentions.clone(),
        })
        .collect();

    let mut actions = Vec::new();
    for action in &data.actions {
        match decode_action(action, &grammars) {
            Some(action) => actions.push(action),
            None => warn!("dropping action with dangling reference during decode"),
        }
    }

    let report = StoryReport {
        sentences: grammars
            .iter()
            .map(|g| SentenceReport {
                sent: g.sent_index(),
                components: g.components().len(),
                phrases: g.phrases().len(),
                failure: g.failure().map(str::to_string),
            })
            .collect(),
        dropped_mentions: data.dropped_mentions,
        dropped_actions: data.dropped_actions,
    };

    Ok((doc, Story::from_parts(grammars, entities, actions, report)))
}

/// Decode a grammar encoded with [`encode_grammar`].
pub fn decode_grammar(value: &serde_json::Value) -> Result<(Doc, Grammar)> {
    let export: GrammarExport =
        serde_json::from_value(value.clone()).map_err(CodecError::Serialization)?;
    let bounds = vec![(export.grammar.start, export.grammar.end)];
    let doc = decode_doc(&export.tokens, bounds)?;
    let grammar = decode_grammar_data(&export.grammar, doc.len())?;
    Ok((doc, grammar))
}

fn decode_doc(tokens: &[TokenData], bounds: Vec<(usize, usize)>) -> Result<Doc> {
    let n = tokens.len();
    let covered: usize = bounds.iter().map(|(s, e)| e.saturating_sub(*s)).sum();
    if covered != n || bounds.iter().any(|&(s, e)| s > e || e > n) {
        return Err(CodecError::DanglingReference(format!(
            "sentence bounds {bounds:?} do not cover the {n}-token table"
        ))
        .into());
    }
    let records = tokens
        .iter()
        .map(|t| {
            if t.head >= n {
                return Err(CodecError::DanglingReference(format!(
                    "token head {} out of range ({n} tokens)",
                    t.head
                )));
            }
            Ok(crate::nlp::TokenRecord {
                text: t.text.clone(),
                lemma: t.lemma.clone(),
                pos: t.pos,
                morph: t.morph.clone(),
                dep: t.dep.clone(),
                head: t.head,
                sent: t.sent,
                cluster: t.cluster,
                vector: t.vector.clone(),
            })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Doc::from_records(records, bounds))
}

fn decode_grammar_data(data: &GrammarData, doc_len: usize) -> Result<Grammar> {
    let n = data.phrases.len();
    if data.components.len() != n {
        return Err(CodecError::DanglingReference(format!(
            "sentence {}: {} phrases for {} components",
            data.sent,
            n,
            data.components.len()
        ))
        .into());
    }

    let mut components = Vec::with_capacity(n);
    for c in &data.components {
        let out_of_range = std::iter::once(c.head)
            .chain(c.members.iter().copied())
            .chain(c.sub.iter().copied())
            .chain(c.neg)
            .any(|i| i >= doc_len);
        if out_of_range {
            return Err(CodecError::DanglingReference(format!(
                "sentence {}: component token index out of range",
                data.sent
            ))
            .into());
        }
        components.push(Component {
            head: c.head,
            kind: c.kind,
            members: c.members.clone(),
            sub: c.sub.clone(),
            neg: c.neg,
            tense: c.tense,
            modal: c.modal,
            mood: c.mood,
        });
    }

    let mut phrases = Vec::with_capacity(n);
    let mut graph = PhraseGraph::new(n);
    for (id, p) in data.phrases.iter().enumerate() {
        if p.component >= n {
            return Err(CodecError::DanglingReference(format!(
                "sentence {}: phrase {} references component {}",
                data.sent, id, p.component
            ))
            .into());
        }
        phrases.push(Phrase {
            component: p.component,
            dep: Dep::from_names(&p.dep)?,
            sconj: p.sconj,
            lead: p.lead.filter(|&l| l < n),
        });
        for &child in &p.children {
            if child < n {
                graph.try_link(id, child);
            } else {
                warn!(
                    sent = data.sent,
                    phrase = id,
                    child,
                    "dropping dangling child reference during decode",
                );
            }
        }
    }
    graph.freeze();

    let conjuncts: Vec<ConjunctGroup> = data
        .conjuncts
        .iter()
        .filter_map(|g| {
            let valid = g.members.iter().all(|&m| m < n)
                && g.lead < g.members.len()
                && g.shared.iter().all(|&s| s < n);
            if !valid {
                warn!(sent = data.sent, "dropping dangling conjunct group during decode");
                return None;
            }
            Some(ConjunctGroup {
                members: g.members.clone(),
                lead: g.lead,
                cconj: g.cconj,
                preconj: g.preconj,
                shared: g.shared.clone(),
            })
        })
        .collect();

    Ok(Grammar::from_parts(
        data.sent,
        data.start,
        data.end,
        components,
        phrases,
        graph,
        conjuncts,
        data.failure.clone(),
    ))
}

fn decode_action(data: &ActionData, grammars: &[Grammar]) -> Option<Action> {
    let key = |k: PhraseKeyData| -> Option<PhraseKey> {
        let grammar = grammars.get(k.sent)?;
        (k.phrase < grammar.phrases().len()).then_some(PhraseKey {
            sent: k.sent,
            phrase: k.phrase,
        })
    };
    let arg = |a: &ActionArgData| -> Option<ActionArg> {
        Some(ActionArg {
            local: key(a.local)?,
            canonical: match a.canonical {
                Some(c) => Some(key(c)?),
                None => None,
            },
        })
    };
    Some(Action {
        verb: key(data.verb)?,
        subjects: data.subjects.iter().map(arg).collect::<Option<Vec<_>>>()?,
        objects: data.objects.iter().map(arg).collect::<Option<Vec<_>>>()?,
        descriptions: data
            .descriptions
            .iter()
            .map(|&d| key(d))
            .collect::<Option<Vec<_>>>()?,
    })
}
