//! Phrases and grammatical relations.
//!
//! Phrases live in an index-addressed arena owned by the sentence
//! grammar: `PhraseId` is the index, and parent/child structure is kept
//! in a separate [`PhraseGraph`](crate::grammar::PhraseGraph) so one
//! phrase can be a child of several parents.

use bitflags::bitflags;

use crate::error::CodecError;

/// Stable identifier of a phrase within its sentence grammar.
///
/// Phrase ids coincide with component indices: one phrase per component,
/// created in head-token order.
pub type PhraseId = usize;

bitflags! {
    /// Grammatical relation of a phrase to a parent phrase.
    ///
    /// Relations are flag sets, not single values: a passive subject is
    /// both `SUBJ` and `DOBJ`, a coordinated object is `CONJ | DOBJ`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Dep: u32 {
        /// Sentence root phrase.
        const ROOT = 1 << 0;
        /// Subject.
        const SUBJ = 1 << 1;
        /// Direct object.
        const DOBJ = 1 << 2;
        /// Indirect object.
        const IOBJ = 1 << 3;
        /// Description (modifier).
        const DESC = 1 << 4;
        /// Clausal description.
        const CDESC = 1 << 5;
        /// Adjectival complement description.
        const ADESC = 1 << 6;
        /// Preposition.
        const PREP = 1 << 7;
        /// Prepositional object (complement).
        const POBJ = 1 << 8;
        /// Subclause.
        const SUBCL = 1 << 9;
        /// Relative clause.
        const RELCL = 1 << 10;
        /// Open clausal complement.
        const XCOMP = 1 << 11;
        /// Appositional modifier.
        const APPOS = 1 << 12;
        /// Nominal modifier.
        const NMOD = 1 << 13;
        /// Passive agent.
        const AGENT = 1 << 14;
        /// Conjoined phrase.
        const CONJ = 1 << 15;
        /// Unclassified relation.
        const MISC = 1 << 16;
    }
}

const DEP_NAMES: &[(Dep, &str)] = &[
    (Dep::ROOT, "root"),
    (Dep::SUBJ, "subj"),
    (Dep::DOBJ, "dobj"),
    (Dep::IOBJ, "iobj"),
    (Dep::DESC, "desc"),
    (Dep::CDESC, "cdesc"),
    (Dep::ADESC, "adesc"),
    (Dep::PREP, "prep"),
    (Dep::POBJ, "pobj"),
    (Dep::SUBCL, "subcl"),
    (Dep::RELCL, "relcl"),
    (Dep::XCOMP, "xcomp"),
    (Dep::APPOS, "appos"),
    (Dep::NMOD, "nmod"),
    (Dep::AGENT, "agent"),
    (Dep::CONJ, "conj"),
    (Dep::MISC, "misc"),
];

impl Dep {
    /// Any description-like relation.
    pub fn is_description(self) -> bool {
        self.intersects(Dep::DESC | Dep::CDESC | Dep::ADESC)
    }

    /// Any object relation.
    pub fn is_object(self) -> bool {
        self.intersects(Dep::DOBJ | Dep::IOBJ)
    }

    /// Stable names of the set flags, in declaration order.
    pub fn names(self) -> Vec<&'static str> {
        DEP_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Rebuild a flag set from serialized names.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, CodecError> {
        let mut dep = Dep::empty();
        for name in names {
            let name = name.as_ref();
            let flag = DEP_NAMES
                .iter()
                .find(|(_, n)| *n == name)
                .map(|(flag, _)| *flag)
                .ok_or_else(|| CodecError::UnknownTag {
                    field: "dep".to_string(),
                    value: name.to_string(),
                })?;
            dep |= flag;
        }
        Ok(dep)
    }
}

/// One phrase: a head component plus its relation to the parent.
///
/// Child phrases are recorded in the sentence's phrase graph, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct Phrase {
    /// Index of the head component (equals the phrase id).
    pub component: usize,
    /// Relation to the parent phrase(s).
    pub dep: Dep,
    /// Subordinating conjunction token, if any.
    pub sconj: Option<usize>,
    /// Lead phrase of the conjunct group this phrase belongs to, if any.
    pub lead: Option<PhraseId>,
}

impl Phrase {
    /// Whether this phrase leads its conjunct group (or belongs to none).
    pub fn is_lead(&self, id: PhraseId) -> bool {
        self.lead.is_none() || self.lead == Some(id)
    }
}
