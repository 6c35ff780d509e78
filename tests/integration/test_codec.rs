//! Codec round-trip laws over the full pipeline.

use semgraph::{codec, Config, Doc, Pipeline, SentenceInput, Story, TokenInput};

use crate::common::{merchants_sentence, whales_sentences, with_vector};

fn vectored(sentences: Vec<SentenceInput>) -> Vec<SentenceInput> {
    // Give every token a deterministic vector derived from its text.
    sentences
        .into_iter()
        .map(|s| SentenceInput {
            tokens: s
                .tokens
                .into_iter()
                .map(|t| {
                    let seed = t.text.bytes().map(f32::from).sum::<f32>();
                    with_vector(t, vec![seed, 1.0, seed * 0.25])
                })
                .collect(),
        })
        .collect()
}

fn sample() -> (Doc, Story) {
    let mut sentences = vec![merchants_sentence()];
    sentences.extend(whales_sentences());
    let doc = Doc::from_sentences(vectored(sentences)).unwrap();
    let story = Pipeline::new(Config::default()).process(&doc, &[]);
    (doc, story)
}

fn relation_texts(doc: &Doc, story: &Story) -> Vec<semgraph::RelationText> {
    story
        .grammars()
        .iter()
        .flat_map(|g| g.iter_relations().map(|r| r.texts(doc, g)).collect::<Vec<_>>())
        .collect()
}

#[test]
fn test_round_trip_preserves_relation_tuples() {
    let (doc, story) = sample();
    let encoded = codec::encode_story(&doc, &story).unwrap();
    let (doc2, story2) = codec::decode_story(&encoded).unwrap();

    assert_eq!(relation_texts(&doc, &story), relation_texts(&doc2, &story2));
    assert_eq!(story.actions(), story2.actions());
    assert_eq!(story.grammars().len(), story2.grammars().len());
    for (a, b) in story.grammars().iter().zip(story2.grammars()) {
        assert_eq!(a.conjunct_groups(), b.conjunct_groups());
        assert_eq!(a.components(), b.components());
    }
}

#[test]
fn test_encode_decode_encode_is_byte_stable() {
    let (doc, story) = sample();
    let encoded = codec::encode_story(&doc, &story).unwrap();
    let bytes = codec::to_bytes(&encoded).unwrap();

    let (doc2, story2) = codec::decode_story(&codec::from_bytes(&bytes).unwrap()).unwrap();
    let re_encoded = codec::encode_story(&doc2, &story2).unwrap();
    assert_eq!(bytes, codec::to_bytes(&re_encoded).unwrap());
}

#[test]
fn test_decode_without_vectors_similarity_undefined() {
    // Encode a story whose tokens never carried vectors: decoded
    // similarity must return the undefined sentinel, not fail.
    let mut sentences = vec![merchants_sentence()];
    sentences.extend(whales_sentences());
    let doc = Doc::from_sentences(sentences).unwrap();
    let story = Pipeline::new(Config::default()).process(&doc, &[]);

    let encoded = codec::encode_story(&doc, &story).unwrap();
    let (doc2, story2) = codec::decode_story(&encoded).unwrap();

    let engine = semgraph::SimilarityEngine::new(semgraph::SimilarityConfig::default());
    let result = engine.sentences(&doc2, &story2.grammars()[0], &doc2, &story2.grammars()[1]);
    assert!(result.similarity.is_undefined());

    let drift = engine.drift(&doc2, story2.grammars());
    assert!(drift.mean.is_undefined());
}

#[test]
fn test_decoded_story_queries_like_original() {
    let (doc, story) = sample();
    let encoded = codec::encode_story(&doc, &story).unwrap();
    let (doc2, story2) = codec::decode_story(&encoded).unwrap();

    let merchants = &story2.grammars()[0];
    let group = &merchants.conjunct_groups()[0];
    let texts: Vec<String> = group
        .members
        .iter()
        .map(|&m| merchants.phrase(&doc2, m).text())
        .collect();
    assert_eq!(texts, vec!["buy spices", "rest in our taverns"]);
}

#[test]
fn test_failed_sentence_round_trips() {
    let doc = Doc::from_sentences(vec![
        SentenceInput {
            tokens: vec![
                TokenInput {
                    text: "a".into(),
                    lemma: "a".into(),
                    pos: semgraph::Pos::Noun,
                    morph: Vec::new(),
                    dep: "nsubj".into(),
                    head: 1,
                    cluster: None,
                    vector: None,
                },
                TokenInput {
                    text: "b".into(),
                    lemma: "b".into(),
                    pos: semgraph::Pos::Noun,
                    morph: Vec::new(),
                    dep: "nsubj".into(),
                    head: 0,
                    cluster: None,
                    vector: None,
                },
            ],
        },
    ])
    .unwrap();
    let story = Pipeline::new(Config::default()).process(&doc, &[]);
    assert!(story.grammars()[0].failure().is_some());

    let encoded = codec::encode_story(&doc, &story).unwrap();
    let (_, story2) = codec::decode_story(&encoded).unwrap();
    assert_eq!(
        story.grammars()[0].failure(),
        story2.grammars()[0].failure()
    );
    assert!(story2.grammars()[0].is_empty());
}

#[test]
fn test_grammar_export_standalone() {
    let (doc, story) = sample();
    let grammar = &story.grammars()[1];
    let encoded = codec::encode_grammar(&doc, grammar).unwrap();
    let (doc2, grammar2) = codec::decode_grammar(&encoded).unwrap();

    // Rebased to a one-sentence document, same relations.
    assert_eq!(doc2.n_sentences(), 1);
    let left: Vec<_> = grammar
        .iter_relations()
        .map(|r| r.texts(&doc, grammar))
        .collect();
    let right: Vec<_> = grammar2
        .iter_relations()
        .map(|r| r.texts(&doc2, &grammar2))
        .collect();
    assert_eq!(left, right);

    // Standalone encoding is also re-encode stable.
    let re_encoded = codec::encode_grammar(&doc2, &grammar2).unwrap();
    assert_eq!(
        codec::to_bytes(&encoded).unwrap(),
        codec::to_bytes(&re_encoded).unwrap()
    );
}
