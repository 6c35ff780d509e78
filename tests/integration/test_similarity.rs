//! Similarity engine: bounds, symmetry, sentinels, drift.

use semgraph::{
    Config, ConjunctPolicy, Doc, Grammar, Method, Pos, RuleTable, SentenceInput, Similarity,
    SimilarityConfig, SimilarityEngine,
};

use crate::common::{tok, with_vector};

fn subject_verb(
    subject: &str,
    verb: &str,
    subject_vec: Vec<f32>,
    verb_vec: Vec<f32>,
) -> SentenceInput {
    SentenceInput {
        tokens: vec![
            with_vector(tok(subject, subject, Pos::Noun, "nsubj", 1), subject_vec),
            with_vector(tok(verb, verb, Pos::Verb, "ROOT", 1), verb_vec),
        ],
    }
}

fn build_all(doc: &Doc) -> Vec<Grammar> {
    let rules = RuleTable::english();
    (0..doc.n_sentences())
        .map(|i| Grammar::build(doc, i, &rules, ConjunctPolicy::BroadestScope).unwrap())
        .collect()
}

fn engine() -> SimilarityEngine {
    SimilarityEngine::new(SimilarityConfig::default())
}

#[test]
fn test_identical_sentences_score_one() {
    let doc = Doc::from_sentences(vec![
        subject_verb("dogs", "bark", vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 0.0]),
        subject_verb("dogs", "bark", vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 0.0]),
    ])
    .unwrap();
    let grammars = build_all(&doc);

    let result = engine().sentences(&doc, &grammars[0], &doc, &grammars[1]);
    let score = result.similarity.score().unwrap();
    assert!((score - 1.0).abs() < 1e-9, "got {score}");
    assert_eq!(result.contributions.len(), 2);
}

#[test]
fn test_similarity_symmetric_and_bounded() {
    let doc = Doc::from_sentences(vec![
        subject_verb("dogs", "bark", vec![1.0, 0.2, 0.5], vec![0.3, 1.0, 0.1]),
        subject_verb("cats", "purr", vec![0.4, 0.9, 0.0], vec![0.8, 0.1, 0.6]),
    ])
    .unwrap();
    let grammars = build_all(&doc);
    let engine = engine();

    let ab = engine.sentences(&doc, &grammars[0], &doc, &grammars[1]);
    let ba = engine.sentences(&doc, &grammars[1], &doc, &grammars[0]);
    let ab = ab.similarity.score().unwrap();
    let ba = ba.similarity.score().unwrap();
    assert!((ab - ba).abs() < 1e-12, "asymmetric: {ab} vs {ba}");
    assert!((0.0..=1.0).contains(&ab));
}

#[test]
fn test_disjoint_kind_coverage_scores_zero() {
    // One sentence carries vectors only on its noun, the other only on
    // its verb: no shared kind, but both sides have vectors.
    let doc = Doc::from_sentences(vec![
        SentenceInput {
            tokens: vec![
                with_vector(tok("dogs", "dog", Pos::Noun, "nsubj", 1), vec![1.0, 0.0]),
                tok("bark", "bark", Pos::Verb, "ROOT", 1),
            ],
        },
        SentenceInput {
            tokens: vec![
                tok("cats", "cat", Pos::Noun, "nsubj", 1),
                with_vector(tok("purr", "purr", Pos::Verb, "ROOT", 1), vec![1.0, 0.0]),
            ],
        },
    ])
    .unwrap();
    let grammars = build_all(&doc);

    let result = engine().sentences(&doc, &grammars[0], &doc, &grammars[1]);
    assert_eq!(result.similarity.score(), Some(0.0));
    assert!(result.contributions.is_empty());
}

#[test]
fn test_missing_vectors_yield_undefined_sentinel() {
    let doc = Doc::from_sentences(vec![
        SentenceInput {
            tokens: vec![
                tok("dogs", "dog", Pos::Noun, "nsubj", 1),
                tok("bark", "bark", Pos::Verb, "ROOT", 1),
            ],
        },
        subject_verb("cats", "purr", vec![1.0, 0.0], vec![0.0, 1.0]),
    ])
    .unwrap();
    let grammars = build_all(&doc);

    let result = engine().sentences(&doc, &grammars[0], &doc, &grammars[1]);
    assert!(result.similarity.is_undefined());
}

#[test]
fn test_phrase_similarity_of_phrase_with_itself() {
    let doc = Doc::from_sentences(vec![subject_verb(
        "dogs",
        "bark",
        vec![1.0, 0.5],
        vec![0.5, 1.0],
    )])
    .unwrap();
    let grammars = build_all(&doc);
    let root = grammars[0].roots()[0];
    let phrase = grammars[0].phrase(&doc, root);

    let result = engine().phrases(&phrase, &phrase);
    let score = result.similarity.score().unwrap();
    assert!((score - 1.0).abs() < 1e-9);
}

#[test]
fn test_drift_over_document() {
    let doc = Doc::from_sentences(vec![
        subject_verb("dogs", "bark", vec![1.0, 0.0], vec![1.0, 0.0]),
        subject_verb("cats", "purr", vec![1.0, 0.1], vec![1.0, 0.1]),
        subject_verb("markets", "crash", vec![0.0, 1.0], vec![0.0, 1.0]),
    ])
    .unwrap();
    let grammars = build_all(&doc);

    let engine = SimilarityEngine::new(SimilarityConfig {
        method: Method::SequentialShift,
        ..SimilarityConfig::default()
    });
    assert_eq!(engine.method(), Method::SequentialShift);

    let shift = engine.drift(&doc, &grammars);
    assert_eq!(shift.windows().len(), 2);
    let first = shift.windows()[0].similarity.score().unwrap();
    let second = shift.windows()[1].similarity.score().unwrap();
    assert!(
        first > second,
        "adjacent similar sentences must score higher than the topic break ({first} vs {second})"
    );
    let mean = shift.mean.score().unwrap();
    assert!((0.0..=1.0).contains(&mean));
}

#[test]
fn test_document_similarity() {
    let doc_a = Doc::from_sentences(vec![subject_verb(
        "dogs",
        "bark",
        vec![1.0, 0.0],
        vec![0.0, 1.0],
    )])
    .unwrap();
    let doc_b = Doc::from_sentences(vec![subject_verb(
        "hounds",
        "howl",
        vec![0.9, 0.1],
        vec![0.1, 0.9],
    )])
    .unwrap();
    let grammars_a = build_all(&doc_a);
    let grammars_b = build_all(&doc_b);

    let result = engine().documents(&doc_a, &grammars_a, &doc_b, &grammars_b);
    let score = result.similarity.score().unwrap();
    assert!(score > 0.9 && score <= 1.0);
}

#[test]
fn test_config_recognizes_both_methods() {
    let config = Config::from_toml_str(
        r#"
        [similarity]
        method = "component-weighted"
        "#,
    )
    .unwrap();
    assert_eq!(config.similarity.method, Method::ComponentWeighted);

    let config = Config::from_toml_str(
        r#"
        [similarity]
        method = "sequential-shift"
        "#,
    )
    .unwrap();
    assert_eq!(config.similarity.method, Method::SequentialShift);

    let undefined = Similarity::Undefined;
    assert!(undefined.is_undefined());
    assert_eq!(undefined.score(), None);
}
