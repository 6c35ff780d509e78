//! Story aggregation: entities, actions, coreference substitution.

use semgraph::{Config, CorefCluster, Doc, MentionInput, Pipeline, Pos, SentenceInput};

use crate::common::{tok, whales_doc, whales_sentences};

fn whales_cluster() -> CorefCluster {
    CorefCluster {
        mentions: vec![
            MentionInput {
                sent: 0,
                start: 0,
                end: 3,
            },
            MentionInput {
                sent: 1,
                start: 0,
                end: 1,
            },
        ],
    }
}

#[test]
fn test_pronoun_resolves_to_canonical_entity() {
    let doc = whales_doc();
    let story = Pipeline::new(Config::default()).process(&doc, &[whales_cluster()]);

    assert_eq!(story.entities().len(), 1);
    let entity = &story.entities()[0];
    assert_eq!(entity.canonical.sent, 0);

    let action = story
        .actions()
        .iter()
        .find(|a| a.verb.sent == 1)
        .expect("action for the second sentence");
    let subject = &action.subjects[0];

    // Local reference is the pronoun, retained for reversibility.
    assert_eq!(story.phrase(&doc, subject.local).unwrap().text(), "They");

    // The substituted canonical phrase contains "Blue Whales".
    let canonical = subject.canonical.expect("coreference substitution");
    assert_eq!(canonical.sent, 0);
    let text = story.phrase(&doc, canonical).unwrap().text();
    assert!(text.contains("Blue Whales"), "canonical text: {text}");
}

#[test]
fn test_actions_extracted_for_both_sentences() {
    let doc = whales_doc();
    let story = Pipeline::new(Config::default()).process(&doc, &[whales_cluster()]);

    assert_eq!(story.actions().len(), 2);
    let first = &story.actions()[0];
    assert_eq!(first.verb.sent, 0);
    assert_eq!(story.phrase(&doc, first.verb).unwrap().head_text(), "won");
    assert_eq!(first.objects.len(), 1);
    assert_eq!(
        story.phrase(&doc, first.objects[0].local).unwrap().text(),
        "the game"
    );
    // The first mention is already canonical: no substitution.
    assert!(first.subjects[0].canonical.is_none());
}

#[test]
fn test_no_clusters_no_entities() {
    let doc = whales_doc();
    let story = Pipeline::new(Config::default()).process(&doc, &[]);
    assert!(story.entities().is_empty());
    assert!(story.actions().iter().all(|a| a
        .subjects
        .iter()
        .all(|s| s.canonical.is_none())));
}

#[test]
fn test_dangling_canonical_drops_action_only() {
    // The canonical mention points into a sentence whose parse is
    // cyclic and therefore yields an empty grammar. The dependent
    // action is dropped; the rest of the story survives.
    let mut sentences = vec![SentenceInput {
        tokens: vec![
            tok("a", "a", Pos::Noun, "nsubj", 1),
            tok("b", "b", Pos::Noun, "nsubj", 0),
        ],
    }];
    sentences.extend(whales_sentences());
    let doc = Doc::from_sentences(sentences).unwrap();

    let cluster = CorefCluster {
        mentions: vec![
            MentionInput {
                sent: 0,
                start: 0,
                end: 1,
            },
            MentionInput {
                sent: 2,
                start: 0,
                end: 1,
            },
        ],
    };
    let story = Pipeline::new(Config::default()).process(&doc, &[cluster]);

    assert!(story.grammars()[0].failure().is_some());
    // The "celebrated" action (sent 2) depended on the broken
    // canonical mention and was dropped; "won" (sent 1) survives.
    assert_eq!(story.report().dropped_actions, 1);
    assert!(story.actions().iter().any(|a| a.verb.sent == 1));
    assert!(!story.actions().iter().any(|a| a.verb.sent == 2));
}

#[test]
fn test_out_of_range_mention_dropped_and_counted() {
    let doc = whales_doc();
    let cluster = CorefCluster {
        mentions: vec![
            MentionInput {
                sent: 0,
                start: 0,
                end: 3,
            },
            MentionInput {
                sent: 0,
                start: 50,
                end: 51,
            },
        ],
    };
    let story = Pipeline::new(Config::default()).process(&doc, &[cluster]);
    assert_eq!(story.report().dropped_mentions, 1);
    assert_eq!(story.entities().len(), 1);
    assert_eq!(story.entities()[0].mentions.len(), 1);
}

#[test]
fn test_report_lists_every_sentence() {
    let doc = whales_doc();
    let story = Pipeline::new(Config::default()).process(&doc, &[]);
    let report = story.report();
    assert_eq!(report.sentences.len(), 2);
    assert!(report.sentences.iter().all(|s| s.failure.is_none()));
    assert!(report.sentences.iter().all(|s| s.components > 0));
}
