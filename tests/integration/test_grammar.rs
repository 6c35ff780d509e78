//! Grammar construction: partition, phrase DAG, conjuncts, queries.

use semgraph::{
    ComponentKind, ConjunctPolicy, Dep, Doc, Grammar, PhraseFilter, Pos, RuleTable, SentenceInput,
};

use crate::common::{merchants_doc, tok};

fn build(doc: &Doc, sent: usize) -> Grammar {
    Grammar::build(doc, sent, &RuleTable::english(), ConjunctPolicy::BroadestScope).unwrap()
}

#[test]
fn test_merchants_scenario() {
    let doc = merchants_doc();
    let grammar = build(&doc, 0);

    // A verb component headed by "travelled".
    let travelled = grammar
        .iter_phrases(&doc)
        .find(|p| p.head_text() == "travelled")
        .expect("verb phrase for travelled");
    assert_eq!(travelled.kind(), ComponentKind::Verb);
    assert!(travelled.dep().contains(Dep::ROOT));

    // Its subject is the noun component "The merchants".
    let subjects: Vec<_> = travelled
        .children()
        .into_iter()
        .filter(|c| c.dep().contains(Dep::SUBJ))
        .collect();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].text(), "The merchants");
    assert_eq!(subjects[0].kind(), ComponentKind::Noun);

    // A coordinated conjunct group {"buy spices", "rest in our taverns"}.
    assert_eq!(grammar.conjunct_groups().len(), 1);
    let group = &grammar.conjunct_groups()[0];
    let texts: Vec<String> = group
        .members
        .iter()
        .map(|&m| grammar.phrase(&doc, m).text())
        .collect();
    assert_eq!(texts, vec!["buy spices", "rest in our taverns"]);

    // Both members attach to "travelled" as complement phrases.
    for &member in &group.members {
        let phrase = grammar.phrase(&doc, member);
        assert!(phrase.dep().contains(Dep::XCOMP), "dep = {:?}", phrase.dep());
        assert!(phrase
            .parents()
            .iter()
            .any(|p| p.head_text() == "travelled"));
    }

    // "spices" stays with "buy" only: it precedes "rest" and must not
    // be shared across the group.
    let rest = grammar
        .iter_phrases(&doc)
        .find(|p| p.head_text() == "rest")
        .unwrap();
    assert!(!rest.text().contains("spices"));
}

#[test]
fn test_partition_invariant_over_fixture() {
    let doc = merchants_doc();
    let grammar = build(&doc, 0);

    let (start, end) = grammar.token_bounds();
    let mut counts = vec![0usize; end - start];
    for comp in grammar.components() {
        for i in comp.tokens() {
            counts[i - start] += 1;
        }
    }
    assert!(
        counts.iter().all(|&n| n == 1),
        "every token must belong to exactly one component: {counts:?}"
    );
    assert!((grammar.coverage() - 1.0).abs() < 1e-12);
}

#[test]
fn test_phrase_graph_is_acyclic() {
    let doc = merchants_doc();
    let grammar = build(&doc, 0);
    assert!(grammar.graph().is_acyclic());
    for id in 0..grammar.phrases().len() {
        let reachable = grammar.graph().subdag(id);
        // A phrase is reported once, and never as its own descendant.
        assert_eq!(reachable.iter().filter(|&&p| p == id).count(), 1);
    }
}

#[test]
fn test_sentence_without_conjunctions_has_no_groups() {
    let doc = Doc::from_sentences(vec![SentenceInput {
        tokens: vec![
            tok("The", "the", Pos::Det, "det", 1),
            tok("dog", "dog", Pos::Noun, "nsubj", 2),
            tok("slept", "sleep", Pos::Verb, "ROOT", 2),
            tok(".", ".", Pos::Punct, "punct", 2),
        ],
    }])
    .unwrap();
    let grammar = build(&doc, 0);
    assert!(grammar.conjunct_groups().is_empty());
}

#[test]
fn test_iter_relations_covers_all_verbs() {
    let doc = merchants_doc();
    let grammar = build(&doc, 0);

    let relations: Vec<_> = grammar
        .iter_relations()
        .map(|r| r.texts(&doc, &grammar))
        .collect();
    assert_eq!(relations.len(), 3);

    assert_eq!(relations[0].subject.as_deref(), Some("The merchants"));
    assert_eq!(relations[0].verb, "travelled");
    assert_eq!(relations[0].object.as_deref(), Some("a long way"));

    assert!(relations.iter().any(|r| r.verb.contains("buy")
        && r.object.as_deref() == Some("spices")));
    assert!(relations.iter().any(|r| r.verb.contains("rest")));

    // Restartable: a second pass yields the identical sequence.
    let again: Vec<_> = grammar
        .iter_relations()
        .map(|r| r.texts(&doc, &grammar))
        .collect();
    assert_eq!(relations, again);
}

#[test]
fn test_query_by_kind_and_content() {
    let doc = merchants_doc();
    let grammar = build(&doc, 0);

    let verbs: Vec<_> = grammar
        .query(&doc, PhraseFilter::new().kind(ComponentKind::Verb))
        .collect();
    assert_eq!(verbs.len(), 3);

    let spices: Vec<_> = grammar
        .query(&doc, PhraseFilter::new().contains("spices"))
        .collect();
    assert!(!spices.is_empty());

    let by_lemma: Vec<_> = grammar
        .query(&doc, PhraseFilter::new().lemma("travel"))
        .collect();
    assert_eq!(by_lemma.len(), 1);

    let subjects: Vec<_> = grammar
        .query(&doc, PhraseFilter::new().dep(Dep::SUBJ))
        .collect();
    assert_eq!(subjects.len(), 1);
}

#[test]
fn test_shared_subject_propagates_to_conjoined_verbs() {
    // "The birds sang and danced .": "danced" has no subject of its
    // own and must share "The birds" by reference.
    let doc = Doc::from_sentences(vec![SentenceInput {
        tokens: vec![
            tok("The", "the", Pos::Det, "det", 1),
            tok("birds", "bird", Pos::Noun, "nsubj", 2),
            tok("sang", "sing", Pos::Verb, "ROOT", 2),
            tok("and", "and", Pos::Cconj, "cc", 2),
            tok("danced", "dance", Pos::Verb, "conj", 2),
            tok(".", ".", Pos::Punct, "punct", 2),
        ],
    }])
    .unwrap();
    let grammar = build(&doc, 0);

    let danced = grammar
        .iter_phrases(&doc)
        .find(|p| p.head_text() == "danced")
        .unwrap();
    let subject = danced
        .children()
        .into_iter()
        .find(|c| c.dep().contains(Dep::SUBJ))
        .expect("propagated subject");
    assert_eq!(subject.text(), "The birds");

    // The same phrase node, referenced from both parents.
    assert_eq!(subject.parents().len(), 2);

    // Both verbs are roots after conjunct propagation.
    assert_eq!(grammar.roots().len(), 2);

    // Relations revisit the shared subject once per verb.
    let relations: Vec<_> = grammar
        .iter_relations()
        .map(|r| r.texts(&doc, &grammar))
        .collect();
    assert_eq!(relations.len(), 2);
    assert!(relations
        .iter()
        .all(|r| r.subject.as_deref() == Some("The birds")));
}

#[test]
fn test_trailing_object_shared_under_broadest_scope() {
    // "They buy and sell apples .": the trailing object belongs to
    // the whole coordination.
    let sentence = || {
        vec![
            tok("They", "they", Pos::Pron, "nsubj", 1),
            tok("buy", "buy", Pos::Verb, "ROOT", 1),
            tok("and", "and", Pos::Cconj, "cc", 1),
            tok("sell", "sell", Pos::Verb, "conj", 1),
            tok("apples", "apple", Pos::Noun, "dobj", 3),
            tok(".", ".", Pos::Punct, "punct", 1),
        ]
    };
    let doc = Doc::from_sentences(vec![SentenceInput { tokens: sentence() }]).unwrap();
    let grammar = build(&doc, 0);

    let buy = grammar
        .iter_phrases(&doc)
        .find(|p| p.head_text() == "buy")
        .unwrap();
    let sell = grammar
        .iter_phrases(&doc)
        .find(|p| p.head_text() == "sell")
        .unwrap();
    for phrase in [&buy, &sell] {
        assert!(
            phrase
                .children()
                .iter()
                .any(|c| c.dep().contains(Dep::DOBJ) && c.text() == "apples"),
            "{} must govern the shared object",
            phrase.head_text()
        );
    }
    let group = &grammar.conjunct_groups()[0];
    assert_eq!(group.shared.len(), 1);

    // Under the nearest-member policy the object stays where the
    // parser put it.
    let doc2 = Doc::from_sentences(vec![SentenceInput { tokens: sentence() }]).unwrap();
    let nearest =
        Grammar::build(&doc2, 0, &RuleTable::english(), ConjunctPolicy::NearestMember).unwrap();
    let buy2 = nearest
        .iter_phrases(&doc2)
        .find(|p| p.head_text() == "buy")
        .unwrap();
    assert!(!buy2
        .children()
        .iter()
        .any(|c| c.dep().contains(Dep::DOBJ)));
    assert!(nearest.conjunct_groups()[0].shared.is_empty());
}

#[test]
fn test_build_is_deterministic() {
    let doc = merchants_doc();
    let a = build(&doc, 0);
    let b = build(&doc, 0);
    assert_eq!(a, b);
}

#[test]
fn test_verb_attributes_recovered() {
    let doc = merchants_doc();
    let grammar = build(&doc, 0);
    let travelled = grammar
        .components()
        .iter()
        .find(|c| c.kind == ComponentKind::Verb && doc.token(c.head).text() == "travelled")
        .unwrap();
    assert_eq!(travelled.tense, Some(semgraph::Tense::Past));
}
