//! Coordination structures.
//!
//! Components whose heads are linked by the coordinating relation under
//! a common governor form one flat conjunct group. Shared dependents
//! are attached by reference during the sentence rewrite passes, never
//! copied.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grammar::components::Component;
use crate::grammar::phrases::PhraseId;
use crate::grammar::rules::RuleTable;
use crate::nlp::Doc;

/// Attachment policy for dependents trailing a conjunct group.
///
/// With `"X and Y in Z"` the trailing modifier may belong to Y alone or
/// to the whole coordination. `BroadestScope` records it on the group
/// (and shares trailing objects with object-free members);
/// `NearestMember` leaves it where the parser attached it. A heuristic,
/// not a linguistic guarantee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConjunctPolicy {
    #[default]
    BroadestScope,
    NearestMember,
}

/// A group of conjoined phrases.
#[derive(Debug, Clone, PartialEq)]
pub struct ConjunctGroup {
    /// Member phrase ids, in sentence order.
    pub members: Vec<PhraseId>,
    /// Index of the lead member within `members`.
    pub lead: usize,
    /// Coordinating conjunction token.
    pub cconj: Option<usize>,
    /// Preconjunction token (e.g. "either").
    pub preconj: Option<usize>,
    /// Trailing dependents attached to the group as a whole under the
    /// broadest-scope policy.
    pub shared: Vec<PhraseId>,
}

impl ConjunctGroup {
    /// Phrase id of the lead member.
    pub fn lead_phrase(&self) -> PhraseId {
        self.members[self.lead]
    }

    pub fn contains(&self, id: PhraseId) -> bool {
        self.members.contains(&id)
    }
}

/// Find conjunct groups among a sentence's components.
///
/// Components and phrases share indices, so the returned groups are
/// phrased in `PhraseId`s. Chains (`X, Y and Z`) flatten into a single
/// group rooted at the chain top, whose own relation is not `conj`.
pub(crate) fn find_groups(
    doc: &Doc,
    components: &[Component],
    owner: &HashMap<usize, usize>,
    rules: &RuleTable,
) -> Vec<ConjunctGroup> {
    // Map each conjunct component to the component its head token
    // attaches to (the previous conjunct or the chain top).
    let mut chain_parent: HashMap<usize, usize> = HashMap::new();
    for (ci, comp) in components.iter().enumerate() {
        let tok = doc.token(comp.head);
        if !rules.is_conjunct(tok.dep()) || tok.is_sent_root() {
            continue;
        }
        if let Some(&parent) = owner.get(&tok.head_index()) {
            if parent != ci {
                chain_parent.insert(ci, parent);
            }
        }
    }

    // Resolve every chained component to its top.
    let top_of = |mut ci: usize| -> usize {
        let mut hops = 0;
        while let Some(&parent) = chain_parent.get(&ci) {
            ci = parent;
            hops += 1;
            if hops > components.len() {
                break;
            }
        }
        ci
    };

    let mut grouped: HashMap<usize, Vec<usize>> = HashMap::new();
    for &ci in chain_parent.keys() {
        grouped.entry(top_of(ci)).or_default().push(ci);
    }

    let mut groups = Vec::new();
    let mut tops: Vec<usize> = grouped.keys().copied().collect();
    tops.sort_unstable();
    for top in tops {
        let mut members = grouped.remove(&top).unwrap();
        members.push(top);
        members.sort_unstable();

        let cconj = members.iter().find_map(|&m| {
            doc.token(components[m].head)
                .children()
                .find(|t| rules.is_coordinator(t.dep()))
                .map(|t| t.index())
        });
        let preconj = doc
            .token(components[members[0]].head)
            .children()
            .find(|t| rules.is_preconjunction(t.dep()))
            .map(|t| t.index());
        let lead = members.iter().position(|&m| m == top).unwrap_or(0);

        groups.push(ConjunctGroup {
            members,
            lead,
            cconj,
            preconj,
            shared: Vec::new(),
        });
    }
    groups
}
