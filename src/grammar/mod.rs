//! Grammar construction: components, conjuncts, phrases and sentences.

mod components;
mod conjuncts;
mod graph;
mod phrases;
mod rules;
mod sentence;

pub use components::{Component, ComponentKind, Modal, Mood, Tense};
pub use conjuncts::{ConjunctGroup, ConjunctPolicy};
pub use graph::PhraseGraph;
pub use phrases::{Dep, Phrase, PhraseId};
pub use rules::{CoordinationLabels, HeadRule, IncludeRule, RelationLabels, RuleTable};
pub use sentence::{Grammar, PhraseFilter, PhraseRef, Relation, RelationText};
