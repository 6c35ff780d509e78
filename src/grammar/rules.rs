//! Data-driven grammar rule tables.
//!
//! All language-specific decisions live here as lookup tables over
//! `(POS, dependency label)` pairs: which tokens head components of
//! which kind, which labels fold into the parent component, which
//! labels are pulled into a component by its kind, and how a component
//! relates to its governor. The engine itself stays rule-set agnostic;
//! [`RuleTable::english`] is the one shipped rule set.

use crate::grammar::components::{Component, ComponentKind, Mood};
use crate::grammar::phrases::Dep;
use crate::nlp::{Doc, Pos, Token};

/// A component-head rule: tokens with one of these POS tags head a
/// component of `kind`, unless an exclusion applies.
#[derive(Debug, Clone)]
pub struct HeadRule {
    pub kind: ComponentKind,
    pub pos: Vec<Pos>,
}

/// An inclusion rule: children with one of these labels are pulled into
/// a component of `kind`. Recursive labels keep pulling through the
/// claimed child's own children (preposition chains, compound nouns).
#[derive(Debug, Clone)]
pub struct IncludeRule {
    pub kind: ComponentKind,
    pub label: String,
    pub recursive: bool,
}

/// Dependency labels recognized for coordination structures.
#[derive(Debug, Clone)]
pub struct CoordinationLabels {
    /// Conjoined sibling (e.g. `conj`).
    pub conjunct: String,
    /// Coordinating conjunction token (e.g. `cc`).
    pub coordinator: String,
    /// Preconjunction token (e.g. `preconj` for "either").
    pub preconjunction: String,
}

/// Label sets used by the relation-assignment rules.
#[derive(Debug, Clone, Default)]
pub struct RelationLabels {
    pub subject: Vec<String>,
    pub passive_subject: Vec<String>,
    pub direct_object: Vec<String>,
    pub indirect_object: Vec<String>,
    pub agent: Vec<String>,
    pub preposition: Vec<String>,
    pub adjectival_complement: Vec<String>,
    pub clausal: Vec<String>,
    pub open_clausal: Vec<String>,
    pub relative_clause: Vec<String>,
    pub adnominal_clause: Vec<String>,
    pub nominal_modifier: Vec<String>,
    pub apposition: Vec<String>,
    pub possessive: Vec<String>,
}

/// The complete rule set for one language.
#[derive(Debug, Clone)]
pub struct RuleTable {
    attach_to_parent: Vec<String>,
    heads: Vec<HeadRule>,
    includes: Vec<IncludeRule>,
    coordination: CoordinationLabels,
    relations: RelationLabels,
    negation: String,
    auxiliary: Vec<String>,
    subordinator: String,
}

impl RuleTable {
    /// The English rule set, written against spacy-style dependency
    /// labels and UD POS tags.
    pub fn english() -> Self {
        let s = |v: &[&str]| v.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        Self {
            attach_to_parent: s(&[
                "det", "predet", "amod", "aux", "auxpass", "prt", "neg", "expl", "compound",
                "nummod", "poss", "case", "mark", "cc", "preconj", "punct",
            ]),
            heads: vec![
                HeadRule {
                    kind: ComponentKind::Verb,
                    pos: vec![Pos::Verb, Pos::Aux],
                },
                HeadRule {
                    kind: ComponentKind::Noun,
                    pos: vec![Pos::Noun, Pos::Propn, Pos::Pron],
                },
                HeadRule {
                    kind: ComponentKind::Prep,
                    pos: vec![Pos::Adp],
                },
                HeadRule {
                    kind: ComponentKind::Desc,
                    pos: vec![Pos::Adj, Pos::Adv],
                },
            ],
            includes: [
                (ComponentKind::Noun, "det", false),
                (ComponentKind::Noun, "predet", false),
                (ComponentKind::Noun, "amod", true),
                (ComponentKind::Noun, "compound", true),
                (ComponentKind::Noun, "nummod", false),
                (ComponentKind::Noun, "poss", false),
                (ComponentKind::Noun, "case", false),
                (ComponentKind::Noun, "advmod", false),
                (ComponentKind::Noun, "neg", false),
                (ComponentKind::Verb, "aux", false),
                (ComponentKind::Verb, "auxpass", false),
                (ComponentKind::Verb, "prt", false),
                (ComponentKind::Verb, "neg", false),
                (ComponentKind::Verb, "expl", false),
                (ComponentKind::Prep, "prep", true),
                (ComponentKind::Prep, "case", false),
                (ComponentKind::Desc, "advmod", true),
                (ComponentKind::Desc, "det", false),
                (ComponentKind::Desc, "neg", false),
            ]
            .iter()
            .map(|(kind, label, recursive)| IncludeRule {
                kind: *kind,
                label: label.to_string(),
                recursive: *recursive,
            })
            .collect(),
            coordination: CoordinationLabels {
                conjunct: "conj".to_string(),
                coordinator: "cc".to_string(),
                preconjunction: "preconj".to_string(),
            },
            relations: RelationLabels {
                subject: s(&["nsubj", "nsubjpass", "csubj", "csubjpass"]),
                passive_subject: s(&["nsubjpass", "csubjpass"]),
                direct_object: s(&["dobj", "obj"]),
                indirect_object: s(&["iobj", "dative"]),
                agent: s(&["agent"]),
                preposition: s(&["prep"]),
                adjectival_complement: s(&["acomp", "oprd", "attr"]),
                clausal: s(&["ccomp", "advcl"]),
                open_clausal: s(&["xcomp"]),
                relative_clause: s(&["relcl", "acl:relcl"]),
                adnominal_clause: s(&["acl"]),
                nominal_modifier: s(&["nmod", "npadvmod"]),
                apposition: s(&["appos"]),
                possessive: s(&["poss"]),
            },
            negation: "neg".to_string(),
            auxiliary: s(&["aux", "auxpass"]),
            subordinator: "mark".to_string(),
        }
    }

    /// Whether a label always folds into the parent's component.
    pub fn attaches_to_parent(&self, dep: &str) -> bool {
        self.attach_to_parent.iter().any(|l| l == dep)
    }

    /// Decide the component kind a token heads, or `None` if it does
    /// not head one (chained prepositions and modifier-of-modifier
    /// adverbs fold into the component above them).
    pub fn head_kind(&self, tok: &Token<'_>) -> Option<ComponentKind> {
        let kind = self
            .heads
            .iter()
            .find(|rule| rule.pos.contains(&tok.pos()))
            .map(|rule| rule.kind)?;
        if tok.is_sent_root() {
            return Some(kind);
        }
        let parent = tok.head();
        match kind {
            // "out of": the inner preposition folds into the chain.
            ComponentKind::Prep
                if parent.pos() == Pos::Adp
                    && self.relations.preposition.iter().any(|l| l == tok.dep()) =>
            {
                None
            }
            // "very long": the adverb folds into the description.
            ComponentKind::Desc
                if tok.pos() == Pos::Adv
                    && tok.dep() == "advmod"
                    && matches!(parent.pos(), Pos::Adj | Pos::Adv) =>
            {
                None
            }
            _ => Some(kind),
        }
    }

    /// Whether children with this label are pulled into a `kind`
    /// component.
    pub fn includes(&self, kind: ComponentKind, dep: &str) -> bool {
        self.includes
            .iter()
            .any(|r| r.kind == kind && r.label == dep)
    }

    /// Whether the inclusion keeps pulling through the claimed child's
    /// own children.
    pub fn includes_recursively(&self, kind: ComponentKind, dep: &str) -> bool {
        self.includes
            .iter()
            .any(|r| r.kind == kind && r.label == dep && r.recursive)
    }

    pub fn is_negation(&self, dep: &str) -> bool {
        dep == self.negation
    }

    pub fn is_auxiliary(&self, dep: &str) -> bool {
        self.auxiliary.iter().any(|l| l == dep)
    }

    pub fn is_conjunct(&self, dep: &str) -> bool {
        dep == self.coordination.conjunct
    }

    pub fn is_coordinator(&self, dep: &str) -> bool {
        dep == self.coordination.coordinator
    }

    pub fn is_preconjunction(&self, dep: &str) -> bool {
        dep == self.coordination.preconjunction
    }

    /// Whether a token subordinates its clause to the parent.
    pub fn is_subordinator(&self, tok: &Token<'_>) -> bool {
        tok.dep() == self.subordinator || tok.pos() == Pos::Sconj
    }

    /// Grammatical relation of `child` to `parent`.
    ///
    /// Deterministic mapping from the child head token's label and POS
    /// plus both component kinds; several flags may combine (a passive
    /// subject is `SUBJ | DOBJ`, a conjoined object `CONJ | DOBJ`).
    pub fn relation(&self, doc: &Doc, child: &Component, parent: &Component) -> Dep {
        let tok = doc.token(child.head);
        let label = tok.dep();
        let rel = &self.relations;
        let has = |set: &[String]| set.iter().any(|l| l == label);

        let mut dep = Dep::empty();
        if self.is_conjunct(label) {
            dep |= Dep::CONJ;
        }
        if child.kind == ComponentKind::Prep || has(&rel.preposition) {
            return dep | Dep::PREP;
        }
        if has(&rel.subject) {
            dep |= Dep::SUBJ;
        }
        if has(&rel.agent) {
            return dep | Dep::AGENT;
        }
        match parent.kind {
            ComponentKind::Prep => {
                if child.kind == ComponentKind::Desc {
                    return dep | Dep::DESC;
                }
                dep |= Dep::POBJ;
            }
            ComponentKind::Noun => {
                if child.kind == ComponentKind::Desc || has(&rel.possessive) {
                    dep |= Dep::DESC;
                }
                if has(&rel.relative_clause) {
                    dep |= Dep::RELCL;
                }
                if has(&rel.adnominal_clause) && child.kind == ComponentKind::Verb {
                    dep |= Dep::SUBCL;
                }
                if has(&rel.nominal_modifier) {
                    dep |= Dep::NMOD;
                }
                if has(&rel.apposition) {
                    dep |= Dep::APPOS;
                }
            }
            ComponentKind::Verb => {
                if has(&rel.passive_subject) || has(&rel.direct_object) {
                    dep |= Dep::DOBJ;
                }
                if has(&rel.indirect_object) {
                    dep |= Dep::IOBJ;
                }
                if has(&rel.adjectival_complement) {
                    dep |= Dep::ADESC;
                }
                if matches!(child.kind, ComponentKind::Desc | ComponentKind::Noun)
                    && has(&rel.clausal)
                {
                    dep |= Dep::CDESC;
                }
                if child.kind == ComponentKind::Desc && tok.pos() == Pos::Adv {
                    dep |= Dep::DESC;
                }
                if parent.mood == Some(Mood::Imperative) && has(&rel.nominal_modifier) {
                    dep |= Dep::SUBJ;
                }
            }
            ComponentKind::Desc => {
                if child.kind == ComponentKind::Desc {
                    dep |= Dep::DESC;
                }
                if has(&rel.clausal) {
                    dep |= Dep::CDESC;
                }
            }
        }
        if child.kind == ComponentKind::Verb
            && !has(&rel.adjectival_complement)
            && !has(&rel.open_clausal)
            && !dep.intersects(Dep::CONJ | Dep::DESC)
        {
            dep |= Dep::SUBCL;
        }
        if has(&rel.open_clausal) {
            dep |= Dep::XCOMP;
        }
        if dep.is_empty() {
            Dep::MISC
        } else {
            dep
        }
    }
}
